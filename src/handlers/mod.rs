//! User actions. Each handler runs the same pipeline: route guard or
//! capability check, local validation, repository call, and a forced logout
//! when the repository reports an authorization failure. Handlers return the
//! rendered output so the CLI only has to print it.

pub mod booking_handlers;
pub mod session_handlers;
pub mod venue_handlers;

use std::{sync::Arc, time::Duration};

use crate::{
    errors::AppError,
    models::{booking::Booking, session::Session, venue::Venue},
    routes::routes::{Capability, Navigation, Route, can, force_logout, guard},
    services::{
        api_service::{ApiResult, VenueRepository},
        availability_service::AvailabilityChecker,
        search_service::VenueSearch,
        session_service::SessionStore,
        storage_service::LocalStorage,
    },
};

/// Shared state handed to every handler.
pub struct AppState {
    pub repository: Arc<dyn VenueRepository>,
    pub session: SessionStore<Arc<dyn LocalStorage>>,
    pub checker: AvailabilityChecker,
    pub search: VenueSearch,
}

impl AppState {
    /// Build the state, rehydrating the session persisted in `storage`.
    pub fn new(
        repository: Arc<dyn VenueRepository>,
        storage: Arc<dyn LocalStorage>,
        checker: AvailabilityChecker,
        search_debounce: Duration,
    ) -> Self {
        Self {
            search: VenueSearch::new(repository.clone(), search_debounce),
            session: SessionStore::initialize(storage),
            repository,
            checker,
        }
    }

    /// Pass the guard for `route`, returning the current session.
    fn enter(&self, route: &Route) -> Result<Session, AppError> {
        let session = self.session.snapshot();
        match guard(&session, route) {
            Navigation::Allow => Ok(session),
            Navigation::Redirect { to, from } => Err(redirect_error(to, from)),
        }
    }

    /// Pass the guard for `route` and check `capability`, returning the
    /// session together with its bearer token.
    fn enter_with(
        &self,
        route: &Route,
        capability: Capability,
    ) -> Result<(Session, String), AppError> {
        let session = self.enter(route)?;
        if !can(&session, capability) {
            let redirect = if session.is_logged_in() {
                Route::Profile
            } else {
                Route::Login
            };
            return Err(redirect_error(redirect, Some(route.path())));
        }
        let token = session
            .token()
            .map(str::to_string)
            .ok_or_else(|| redirect_error(Route::Login, Some(route.path())))?;
        Ok((session, token))
    }

    /// Unwrap a repository result, logging out first when the token was
    /// rejected.
    fn settle<T>(&self, result: ApiResult<T>, route: &Route) -> Result<T, AppError> {
        result.map_err(|err| {
            if err.is_unauthorized() {
                force_logout(&self.session, Some(route));
            }
            AppError::from(err)
        })
    }
}

fn redirect_error(to: Route, from: Option<String>) -> AppError {
    let requested = from.unwrap_or_else(|| "that page".into());
    let message = match to {
        Route::Login => format!("log in to open {requested} (see {to})"),
        _ => format!("{requested} is only available to venue managers (see {to})"),
    };
    AppError::forbidden(to, message)
}

fn render_venue_line(venue: &Venue) -> String {
    let city = venue.location.city.as_deref().unwrap_or("-");
    format!(
        "{}  {}  {} NOK/night  max {} guests  {}",
        venue.id, venue.name, venue.price, venue.max_guests, city
    )
}

fn render_booking_line(booking: &Booking) -> String {
    let customer = booking
        .customer
        .as_ref()
        .map(|customer| format!("  by {}", customer.name))
        .unwrap_or_default();
    let venue = booking
        .venue
        .as_ref()
        .map(|venue| format!("  at {}", venue.name))
        .unwrap_or_default();
    format!(
        "{}  {} -> {}  {} guest(s){}{}",
        booking.id,
        short_date(&booking.date_from),
        short_date(&booking.date_to),
        booking.guests,
        venue,
        customer
    )
}

/// `2024-06-01T00:00:00.000Z` -> `2024-06-01`.
fn short_date(raw: &str) -> &str {
    raw.get(..10).unwrap_or(raw)
}

fn join_lines<I: IntoIterator<Item = String>>(lines: I, empty: &str) -> String {
    let lines: Vec<String> = lines.into_iter().collect();
    if lines.is_empty() {
        empty.to_string()
    } else {
        lines.join("\n")
    }
}
