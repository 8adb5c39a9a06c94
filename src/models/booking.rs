//! Represents a reservation of a venue for a date range.

use serde::{Deserialize, Serialize};

use crate::models::{profile::ProfileRef, venue::Venue};

/// A booking made by a customer against a venue.
///
/// The booking covers the half-open interval `[date_from, date_to)`. Dates are
/// kept exactly as the API returned them so that a malformed record can be
/// recognised by the availability checker instead of failing deserialization
/// of the whole venue.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    /// API identifier (UUID string).
    pub id: String,

    /// First night of the stay (inclusive).
    pub date_from: String,

    /// Departure date (exclusive).
    pub date_to: String,

    /// Number of guests on this booking.
    pub guests: u32,

    /// The booked venue, when requested with `_venue=true`.
    #[serde(default)]
    pub venue: Option<Box<Venue>>,

    /// The customer who made the booking, when requested with `_customer=true`.
    #[serde(default)]
    pub customer: Option<ProfileRef>,

    #[serde(default)]
    pub created: Option<String>,

    #[serde(default)]
    pub updated: Option<String>,
}

impl Booking {
    /// Bare interval record, as used when only the dates matter.
    pub fn interval(id: impl Into<String>, date_from: impl Into<String>, date_to: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            date_from: date_from.into(),
            date_to: date_to.into(),
            guests: 1,
            venue: None,
            customer: None,
            created: None,
            updated: None,
        }
    }
}

/// Request body for `POST /holidaze/bookings`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewBooking {
    pub date_from: String,
    pub date_to: String,
    pub guests: u32,
    pub venue_id: String,
}
