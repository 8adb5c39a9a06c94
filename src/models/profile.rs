//! Represents user accounts: customers and venue managers.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::{booking::Booking, venue::Media, venue::Venue};

/// A Holidaze account as returned by the profile and login endpoints.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// Public handle; unique, letters, digits and underscores only.
    pub name: String,

    pub email: String,

    #[serde(default)]
    pub bio: Option<String>,

    #[serde(default)]
    pub avatar: Option<Media>,

    #[serde(default)]
    pub banner: Option<Media>,

    /// Set at registration. Grants access to the venue-management views.
    #[serde(default)]
    pub venue_manager: bool,

    /// Bookings made by this profile (`_bookings=true`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bookings: Option<Vec<Booking>>,

    /// Venues owned by this profile (`_venues=true`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venues: Option<Vec<Venue>>,
}

/// Lightweight profile reference embedded in venues and bookings.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ProfileRef {
    pub name: String,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub avatar: Option<Media>,
}

/// Payload for `POST /auth/register`.
#[derive(Serialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub venue_manager: bool,
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("venue_manager", &self.venue_manager)
            .finish()
    }
}

/// Payload for `POST /auth/login`.
#[derive(Serialize, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Login response: the profile plus its bearer token.
#[derive(Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatedProfile {
    #[serde(flatten)]
    pub profile: Profile,

    pub access_token: String,
}

impl fmt::Debug for AuthenticatedProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthenticatedProfile")
            .field("profile", &self.profile)
            .field("access_token", &"<redacted>")
            .finish()
    }
}
