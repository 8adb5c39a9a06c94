//! Represents the client-side authenticated session and its persisted form.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::profile::Profile;

/// The current authenticated identity held by the client.
///
/// An empty session (the default) has neither profile nor token. Role flags
/// are always derived, never stored.
#[derive(Clone, Default, PartialEq)]
pub struct Session {
    pub profile: Option<Profile>,
    pub token: Option<String>,
}

impl Session {
    /// Session for an authenticated profile.
    pub fn authenticated(profile: Profile, token: impl Into<String>) -> Self {
        Self {
            profile: Some(profile),
            token: Some(token.into()),
        }
    }

    /// Bearer token, if one is held and non-empty.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref().filter(|token| !token.is_empty())
    }

    /// True when a non-empty bearer token is held.
    pub fn is_logged_in(&self) -> bool {
        self.token().is_some()
    }

    /// True when logged in as a venue manager.
    pub fn is_manager(&self) -> bool {
        self.is_logged_in()
            && self
                .profile
                .as_ref()
                .is_some_and(|profile| profile.venue_manager)
    }

    /// Public handle of the logged-in profile.
    pub fn profile_name(&self) -> Option<&str> {
        self.profile.as_ref().map(|profile| profile.name.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.profile.is_none() && self.token.is_none()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("profile", &self.profile_name())
            .field("logged_in", &self.is_logged_in())
            .field("manager", &self.is_manager())
            .finish()
    }
}

/// Serialized layout of the `holidaze_auth` storage entry.
///
/// Both fields are written together in a single entry; there is no version
/// marker and no migration.
#[derive(Serialize, Deserialize, Clone, PartialEq)]
pub struct StoredSession {
    pub user: Profile,
    pub token: String,
}

impl From<StoredSession> for Session {
    fn from(stored: StoredSession) -> Self {
        Session::authenticated(stored.user, stored.token)
    }
}
