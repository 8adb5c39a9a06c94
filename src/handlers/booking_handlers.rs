//! Booking a venue from its details page.

use tracing::{info, warn};

use super::AppState;
use crate::{
    errors::AppError,
    models::booking::NewBooking,
    routes::routes::{Capability, Route},
};

/// Book `venue_id` for `[date_from, date_to)`.
///
/// The local availability check runs against the bookings the API returned
/// for the venue. It only saves a round trip: the API stays the authority
/// and may still refuse the booking.
pub async fn book_venue(
    state: &AppState,
    venue_id: &str,
    date_from: &str,
    date_to: &str,
    guests: i64,
) -> Result<String, AppError> {
    let route = Route::VenueDetails(venue_id.to_string());
    let (session, token) = state.enter_with(&route, Capability::BookVenue)?;

    let venue = state.settle(
        state.repository.get_venue(venue_id, Some(&token)).await,
        &route,
    )?;
    state.checker.check_booking(
        &session,
        date_from,
        date_to,
        guests,
        venue.max_guests,
        venue.reservations(),
    )?;

    // check_booking rejected anything below one guest.
    let guests = u32::try_from(guests).map_err(|_| {
        AppError::validation(format!("this venue allows at most {} guests", venue.max_guests))
    })?;
    let request = NewBooking {
        date_from: date_from.to_string(),
        date_to: date_to.to_string(),
        guests,
        venue_id: venue.id.clone(),
    };
    let booking = state
        .settle(state.repository.create_booking(&token, &request).await, &route)
        .inspect_err(|err| warn!(venue = %venue.id, error = %err, "booking refused"))?;

    info!(venue = %venue.id, booking = %booking.id, "booking created");
    Ok(format!(
        "Booked {} from {} to {} for {} guest(s). Booking id {}",
        venue.name, request.date_from, request.date_to, request.guests, booking.id
    ))
}
