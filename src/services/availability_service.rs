//! src/services/availability_service.rs
//!
//! Availability checks for booking a venue. Everything here is pure: no I/O,
//! no errors, only decisions. Reservations are half-open intervals
//! `[date_from, date_to)`, so a stay may start on the day another one ends.
//!
//! The result is advisory. Another customer can book the same nights between
//! this check and submission; the API performs the authoritative check and
//! reports that case as a domain error.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::cmp::Ordering;
use thiserror::Error;
use tracing::warn;

use crate::models::{booking::Booking, session::Session};

/// How to treat an existing reservation whose dates cannot be parsed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MalformedDatePolicy {
    /// Skip the record: it never blocks a booking. A warning is logged.
    #[default]
    Lenient,
    /// Treat the record as overlapping every candidate.
    Strict,
}

/// The first precondition that stopped a booking from being submitted.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BookingRejection {
    #[error("you must be logged in to book a venue")]
    NotLoggedIn,
    #[error("check-in and check-out must be valid dates")]
    InvalidDate,
    #[error("check-out must be after check-in")]
    EmptyRange,
    #[error("at least one guest is required")]
    NoGuests,
    #[error("this venue allows at most {max_guests} guests")]
    OverCapacity { max_guests: u32 },
    #[error("the venue is already booked for some of the selected dates")]
    Overlap,
}

/// Parse a booking date as sent or returned by the API.
///
/// Accepts RFC 3339 timestamps, naive `YYYY-MM-DDTHH:MM:SS[.f]` date-times
/// (taken as UTC) and plain `YYYY-MM-DD` dates (midnight UTC).
pub fn parse_booking_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(parsed.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc())
}

/// Stateless checker configured with a malformed-date policy.
#[derive(Clone, Copy, Debug, Default)]
pub struct AvailabilityChecker {
    policy: MalformedDatePolicy,
}

impl AvailabilityChecker {
    pub fn new(policy: MalformedDatePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> MalformedDatePolicy {
        self.policy
    }

    /// True if `[candidate_from, candidate_to)` intersects any reservation.
    ///
    /// `[a, b)` and `[c, d)` overlap iff `a < d && b > c`. A pair that cannot
    /// be compared because a date fails to parse is decided by the policy.
    pub fn intervals_overlap(
        &self,
        candidate_from: &str,
        candidate_to: &str,
        existing: &[Booking],
    ) -> bool {
        let Some((from, to)) =
            parse_booking_date(candidate_from).zip(parse_booking_date(candidate_to))
        else {
            return self.policy == MalformedDatePolicy::Strict && !existing.is_empty();
        };

        existing.iter().any(|booking| {
            match parse_booking_date(&booking.date_from).zip(parse_booking_date(&booking.date_to)) {
                Some((reserved_from, reserved_to)) => from < reserved_to && to > reserved_from,
                None => self.unparseable_pair(booking),
            }
        })
    }

    fn unparseable_pair(&self, booking: &Booking) -> bool {
        match self.policy {
            MalformedDatePolicy::Lenient => {
                warn!(
                    booking_id = %booking.id,
                    date_from = %booking.date_from,
                    date_to = %booking.date_to,
                    "skipping overlap check for booking with unparseable dates"
                );
                false
            }
            MalformedDatePolicy::Strict => true,
        }
    }

    /// Evaluate every booking precondition in order and report the first
    /// failure.
    pub fn check_booking(
        &self,
        session: &Session,
        candidate_from: &str,
        candidate_to: &str,
        guests: i64,
        max_guests: u32,
        existing: &[Booking],
    ) -> Result<(), BookingRejection> {
        if !session.is_logged_in() {
            return Err(BookingRejection::NotLoggedIn);
        }

        let (Some(from), Some(to)) = (
            parse_booking_date(candidate_from),
            parse_booking_date(candidate_to),
        ) else {
            return Err(BookingRejection::InvalidDate);
        };
        if to <= from {
            return Err(BookingRejection::EmptyRange);
        }

        if guests < 1 {
            return Err(BookingRejection::NoGuests);
        }
        if guests > i64::from(max_guests) {
            return Err(BookingRejection::OverCapacity { max_guests });
        }

        if self.intervals_overlap(candidate_from, candidate_to, existing) {
            return Err(BookingRejection::Overlap);
        }

        Ok(())
    }

    /// Single yes/no answer used to enable or disable submission.
    pub fn can_submit_booking(
        &self,
        session: &Session,
        candidate_from: &str,
        candidate_to: &str,
        guests: i64,
        max_guests: u32,
        existing: &[Booking],
    ) -> bool {
        self.check_booking(
            session,
            candidate_from,
            candidate_to,
            guests,
            max_guests,
            existing,
        )
        .is_ok()
    }
}

/// [`AvailabilityChecker::intervals_overlap`] with the lenient policy.
pub fn intervals_overlap(candidate_from: &str, candidate_to: &str, existing: &[Booking]) -> bool {
    AvailabilityChecker::default().intervals_overlap(candidate_from, candidate_to, existing)
}

/// [`AvailabilityChecker::can_submit_booking`] with the lenient policy.
pub fn can_submit_booking(
    session: &Session,
    candidate_from: &str,
    candidate_to: &str,
    guests: i64,
    max_guests: u32,
    existing: &[Booking],
) -> bool {
    AvailabilityChecker::default().can_submit_booking(
        session,
        candidate_from,
        candidate_to,
        guests,
        max_guests,
        existing,
    )
}

/// Bookings starting at or after `now`, earliest first.
///
/// Bookings without a parseable start date are left out.
pub fn upcoming_bookings(bookings: &[Booking], now: DateTime<Utc>) -> Vec<Booking> {
    let mut upcoming: Vec<(DateTime<Utc>, &Booking)> = bookings
        .iter()
        .filter_map(|booking| parse_booking_date(&booking.date_from).map(|from| (from, booking)))
        .filter(|(from, _)| *from >= now)
        .collect();
    upcoming.sort_by_key(|(from, _)| *from);
    upcoming.into_iter().map(|(_, booking)| booking.clone()).collect()
}

/// Bookings ordered by arrival. Unparseable start dates sort last, keeping
/// their relative order.
pub fn sorted_by_arrival(bookings: &[Booking]) -> Vec<Booking> {
    let mut sorted = bookings.to_vec();
    sorted.sort_by(|a, b| {
        match (parse_booking_date(&a.date_from), parse_booking_date(&b.date_from)) {
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    });
    sorted
}
