//! Represents a bookable venue and the payload used to create or edit one.

use serde::{Deserialize, Serialize};

use crate::models::{booking::Booking, profile::ProfileRef};

/// A media reference (image) attached to a venue or profile.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Media {
    /// Absolute URL of the image.
    pub url: String,

    /// Alternative text; the API allows it to be empty.
    #[serde(default)]
    pub alt: String,
}

/// Free-text location of a venue. Every field is optional.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct Location {
    pub address: Option<String>,
    pub city: Option<String>,
    pub zip: Option<String>,
    pub country: Option<String>,
    pub continent: Option<String>,
}

/// Amenity flags.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(default)]
pub struct VenueMeta {
    pub wifi: bool,
    pub parking: bool,
    pub breakfast: bool,
    pub pets: bool,
}

/// A lodging venue listed on Holidaze.
///
/// `bookings` is only populated when the venue was requested with
/// `_bookings=true` by an authenticated caller; `owner` only with `_owner=true`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Venue {
    /// API identifier (UUID string).
    pub id: String,

    /// Display name.
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Nightly price. Always positive for venues created through this client.
    pub price: f64,

    /// Maximum number of guests per booking.
    pub max_guests: u32,

    /// Ordered media; the first entry is the cover image.
    #[serde(default)]
    pub media: Vec<Media>,

    #[serde(default)]
    pub location: Location,

    #[serde(default)]
    pub meta: VenueMeta,

    #[serde(default)]
    pub rating: Option<f64>,

    /// Owning manager.
    #[serde(default)]
    pub owner: Option<ProfileRef>,

    /// Existing reservations for this venue.
    #[serde(default)]
    pub bookings: Option<Vec<Booking>>,

    #[serde(default)]
    pub created: Option<String>,

    #[serde(default)]
    pub updated: Option<String>,
}

impl Venue {
    /// Cover image, if any.
    pub fn cover(&self) -> Option<&Media> {
        self.media.first()
    }

    /// Reservations attached to this venue, or an empty slice when they were
    /// not requested.
    pub fn reservations(&self) -> &[Booking] {
        self.bookings.as_deref().unwrap_or(&[])
    }

    /// Name of the owning manager, when the API included it.
    pub fn owner_name(&self) -> Option<&str> {
        self.owner.as_ref().map(|owner| owner.name.as_str())
    }
}

/// Writable venue fields sent on create (`POST`) and update (`PUT`).
///
/// Built from a [`crate::services::validation_service::VenueForm`] so the
/// positivity invariants on `price` and `max_guests` hold before any request.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VenueDraft {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub max_guests: u32,
    pub media: Vec<Media>,
    pub meta: VenueMeta,
    pub location: Location,
}
