//! Browsing venues and the manager's venue dashboard.

use tracing::info;

use super::{AppState, join_lines, render_booking_line, render_venue_line};
use crate::{
    errors::AppError,
    models::venue::{Venue, VenueMeta},
    routes::routes::{Capability, Route, can_manage_venue},
    services::{
        availability_service::sorted_by_arrival, search_service::sort_by_name,
        validation_service::VenueForm,
    },
};

/// Field overrides for an existing venue. `None` keeps the current value.
#[derive(Clone, Debug, Default)]
pub struct VenueChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<String>,
    pub max_guests: Option<String>,
    pub media_urls: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub wifi: Option<bool>,
    pub parking: Option<bool>,
    pub breakfast: Option<bool>,
    pub pets: Option<bool>,
}

impl VenueChanges {
    fn apply(self, form: VenueForm) -> VenueForm {
        VenueForm {
            name: self.name.unwrap_or(form.name),
            description: self.description.unwrap_or(form.description),
            price: self.price.unwrap_or(form.price),
            max_guests: self.max_guests.unwrap_or(form.max_guests),
            media_urls: self.media_urls.unwrap_or(form.media_urls),
            city: self.city.unwrap_or(form.city),
            country: self.country.unwrap_or(form.country),
            meta: VenueMeta {
                wifi: self.wifi.unwrap_or(form.meta.wifi),
                parking: self.parking.unwrap_or(form.meta.parking),
                breakfast: self.breakfast.unwrap_or(form.meta.breakfast),
                pets: self.pets.unwrap_or(form.meta.pets),
            },
        }
    }
}

/// `/venues`: every venue, or those matching `query`, sorted by name.
pub async fn list_venues(state: &AppState, query: Option<&str>) -> Result<String, AppError> {
    let route = Route::Venues;
    let venues = state.settle(state.search.submit(query.unwrap_or_default()).await, &route)?;
    // A single CLI invocation never supersedes its own search.
    let venues = venues.unwrap_or_default();
    Ok(join_lines(venues.iter().map(render_venue_line), "No venues found."))
}

/// `/venues/{id}`: details, plus the booked ranges when logged in.
pub async fn show_venue(state: &AppState, id: &str) -> Result<String, AppError> {
    let route = Route::VenueDetails(id.to_string());
    let session = state.enter(&route)?;
    let venue = state.settle(state.repository.get_venue(id, session.token()).await, &route)?;

    let mut out = vec![
        venue.name.clone(),
        venue.description.clone(),
        format!(
            "{} NOK/night, up to {} guests",
            venue.price, venue.max_guests
        ),
    ];
    let place: Vec<&str> = [&venue.location.city, &venue.location.country]
        .into_iter()
        .filter_map(|part| part.as_deref())
        .filter(|part| !part.is_empty())
        .collect();
    if !place.is_empty() {
        out.push(place.join(", "));
    }
    if let Some(cover) = venue.cover() {
        out.push(format!("cover: {}", cover.url));
    }
    out.push(amenities(venue.meta));
    if let Some(owner) = venue.owner_name() {
        out.push(format!("managed by {owner}"));
    }

    if session.is_logged_in() {
        let booked = sorted_by_arrival(venue.reservations());
        if booked.is_empty() {
            out.push("No dates booked yet.".into());
        } else {
            out.push("Booked:".into());
            out.extend(booked.iter().map(render_booking_line));
        }
    } else {
        out.push(format!("Log in at {} to book this venue.", Route::Login));
    }
    Ok(out.join("\n"))
}

fn amenities(meta: VenueMeta) -> String {
    let flags = [
        (meta.wifi, "wifi"),
        (meta.parking, "parking"),
        (meta.breakfast, "breakfast"),
        (meta.pets, "pets"),
    ];
    let offered: Vec<&str> = flags
        .into_iter()
        .filter_map(|(on, label)| on.then_some(label))
        .collect();
    if offered.is_empty() {
        "amenities: none".into()
    } else {
        format!("amenities: {}", offered.join(", "))
    }
}

/// `/manage/venues`: venues owned by the logged-in manager.
pub async fn managed_venues(state: &AppState) -> Result<String, AppError> {
    let route = Route::ManageVenues;
    let (session, token) = state.enter_with(&route, Capability::ViewManagedVenues)?;
    let name = session.profile_name().unwrap_or_default().to_string();

    let mut venues = state.settle(
        state.repository.list_managed_venues(&name, &token).await,
        &route,
    )?;
    sort_by_name(&mut venues);
    Ok(join_lines(
        venues.iter().map(render_venue_line),
        "You do not manage any venues yet.",
    ))
}

pub async fn create_venue(state: &AppState, form: VenueForm) -> Result<String, AppError> {
    let route = Route::ManageVenues;
    let (_, token) = state.enter_with(&route, Capability::CreateVenue)?;
    let draft = form.into_draft()?;

    let created = state.settle(state.repository.create_venue(&token, &draft).await, &route)?;
    info!(venue = %created.id, "venue created");
    Ok(format!("Created venue {} ({})", created.name, created.id))
}

/// Edit a venue the manager owns, keeping every field not overridden.
pub async fn update_venue(
    state: &AppState,
    id: &str,
    changes: VenueChanges,
) -> Result<String, AppError> {
    let route = Route::ManageVenues;
    let (token, venue) = owned_venue(state, &route, id, Capability::EditVenue).await?;
    let draft = changes.apply(VenueForm::from_venue(&venue)).into_draft()?;

    let updated = state.settle(
        state.repository.update_venue(&token, id, &draft).await,
        &route,
    )?;
    info!(venue = %updated.id, "venue updated");
    Ok(format!("Updated venue {} ({})", updated.name, updated.id))
}

pub async fn delete_venue(state: &AppState, id: &str) -> Result<String, AppError> {
    let route = Route::ManageVenues;
    let (token, venue) = owned_venue(state, &route, id, Capability::DeleteVenue).await?;

    state.settle(state.repository.delete_venue(&token, id).await, &route)?;
    info!(venue = %id, "venue deleted");
    Ok(format!("Deleted venue {} ({id})", venue.name))
}

/// `/manage/bookings`: bookings made against one of the manager's venues.
pub async fn venue_bookings(state: &AppState, id: &str) -> Result<String, AppError> {
    let route = Route::ManageBookings;
    let (_, venue) = owned_venue(state, &route, id, Capability::ViewVenueBookings).await?;

    let bookings = sorted_by_arrival(venue.reservations());
    let header = format!("Bookings for {}:", venue.name);
    let lines = join_lines(bookings.iter().map(render_booking_line), "No bookings yet.");
    Ok(format!("{header}\n{lines}"))
}

/// Fetch venue `id` with its bookings and make sure the session owns it.
async fn owned_venue(
    state: &AppState,
    route: &Route,
    id: &str,
    capability: Capability,
) -> Result<(String, Venue), AppError> {
    let (session, token) = state.enter_with(route, capability)?;
    let venue = state.settle(state.repository.get_venue(id, Some(&token)).await, route)?;
    if !can_manage_venue(&session, &venue) {
        return Err(AppError::forbidden(
            Route::ManageVenues,
            format!("You can only manage your own venues; {} is not yours.", venue.name),
        ));
    }
    Ok((token, venue))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        errors::ErrorKind,
        models::booking::Booking,
        services::{
            availability_service::AvailabilityChecker, storage_service::{LocalStorage, MemoryStorage},
        },
        test_support::{FakeRepository, owned_venue as fixture, profile, token_for, venue},
    };
    use std::{sync::Arc, time::Duration};

    fn state_with(repository: Arc<FakeRepository>) -> AppState {
        let storage: Arc<dyn LocalStorage> = Arc::new(MemoryStorage::new());
        AppState::new(
            repository,
            storage,
            AvailabilityChecker::default(),
            Duration::ZERO,
        )
    }

    fn logged_in(repository: Arc<FakeRepository>, name: &str, manager: bool) -> AppState {
        let state = state_with(repository);
        state.session.login(profile(name, manager), token_for(name));
        state
    }

    fn form(name: &str) -> VenueForm {
        VenueForm {
            name: name.into(),
            description: "By the sea".into(),
            price: "800".into(),
            max_guests: "3".into(),
            ..VenueForm::default()
        }
    }

    #[tokio::test]
    async fn search_lists_matching_venues_by_name() {
        let repository = Arc::new(FakeRepository::with_venues(vec![
            venue("v-2", "fjord cabin", 4),
            venue("v-1", "City Loft", 2),
            venue("v-3", "Fjord View", 6),
        ]));
        let state = state_with(repository.clone());

        let output = list_venues(&state, Some("fjord")).await.unwrap();
        let names: Vec<&str> = output
            .lines()
            .map(|line| line.split("  ").nth(1).unwrap_or_default())
            .collect();
        assert_eq!(names, vec!["fjord cabin", "Fjord View"]);
        assert_eq!(repository.calls(), vec!["search_venues:fjord"]);

        let all = list_venues(&state, None).await.unwrap();
        assert_eq!(all.lines().count(), 3);
    }

    #[tokio::test]
    async fn anonymous_details_hide_bookings() {
        let mut cabin = venue("v-1", "Fjord Cabin", 4);
        cabin.bookings = Some(vec![Booking::interval("b-1", "2024-06-01", "2024-06-05")]);
        let state = state_with(Arc::new(FakeRepository::with_venues(vec![cabin])));

        let output = show_venue(&state, "v-1").await.unwrap();
        assert!(output.starts_with("Fjord Cabin"));
        assert!(output.contains("Log in at /login"));
        assert!(!output.contains("b-1"));
    }

    #[tokio::test]
    async fn logged_in_details_list_bookings_by_arrival() {
        let mut cabin = venue("v-1", "Fjord Cabin", 4);
        cabin.bookings = Some(vec![
            Booking::interval("b-late", "2024-08-01", "2024-08-03"),
            Booking::interval("b-early", "2024-06-01", "2024-06-05"),
        ]);
        let state = logged_in(Arc::new(FakeRepository::with_venues(vec![cabin])), "kari", false);

        let output = show_venue(&state, "v-1").await.unwrap();
        let early = output.find("b-early").expect("early listed");
        let late = output.find("b-late").expect("late listed");
        assert!(early < late);
    }

    #[tokio::test]
    async fn unknown_venue_is_a_domain_error() {
        let state = state_with(Arc::new(FakeRepository::new()));
        let err = show_venue(&state, "missing").await.expect_err("404");
        assert_eq!(err.kind, ErrorKind::Domain);
    }

    #[tokio::test]
    async fn customer_cannot_open_dashboard() {
        let repository = Arc::new(FakeRepository::new());
        let state = logged_in(repository.clone(), "kari", false);

        let err = managed_venues(&state).await.expect_err("managers only");
        assert_eq!(
            err.kind,
            ErrorKind::Forbidden {
                redirect: Route::Profile
            }
        );
        let err = create_venue(&state, form("Sneaky")).await.expect_err("managers only");
        assert_eq!(err.exit_code(), 5);
        assert!(repository.calls().is_empty());
    }

    #[tokio::test]
    async fn manager_creates_and_lists_own_venues() {
        let repository = Arc::new(FakeRepository::with_venues(vec![fixture(
            "v-other",
            "Other Place",
            2,
            "per_manager",
        )]));
        let state = logged_in(repository.clone(), "ola_manager", true);

        let created = create_venue(&state, form("Sea House")).await.unwrap();
        assert!(created.starts_with("Created venue Sea House"));

        let listed = managed_venues(&state).await.unwrap();
        assert!(listed.contains("Sea House"));
        assert!(!listed.contains("Other Place"));
    }

    #[tokio::test]
    async fn invalid_form_is_rejected_before_request() {
        let repository = Arc::new(FakeRepository::new());
        let state = logged_in(repository.clone(), "ola_manager", true);

        let err = create_venue(
            &state,
            VenueForm {
                price: "-5".into(),
                ..form("Sea House")
            },
        )
        .await
        .expect_err("negative price");
        assert_eq!(err.kind, ErrorKind::Validation);
        assert!(repository.calls().is_empty());
    }

    #[tokio::test]
    async fn update_keeps_fields_that_were_not_changed() {
        let mut cabin = fixture("v-1", "Fjord Cabin", 4, "ola_manager");
        cabin.location.city = Some("Bergen".into());
        cabin.meta.parking = true;
        let repository = Arc::new(FakeRepository::with_venues(vec![cabin]));
        let state = logged_in(repository.clone(), "ola_manager", true);

        update_venue(
            &state,
            "v-1",
            VenueChanges {
                price: Some("1500".into()),
                wifi: Some(true),
                ..VenueChanges::default()
            },
        )
        .await
        .unwrap();

        let stored = repository.venue("v-1").expect("still there");
        assert_eq!(stored.price, 1500.0);
        assert_eq!(stored.name, "Fjord Cabin");
        assert_eq!(stored.max_guests, 4);
        assert_eq!(stored.location.city.as_deref(), Some("Bergen"));
        assert!(stored.meta.wifi && stored.meta.parking);
    }

    #[tokio::test]
    async fn managers_cannot_touch_venues_they_do_not_own() {
        let repository = Arc::new(FakeRepository::with_venues(vec![fixture(
            "v-1",
            "Fjord Cabin",
            4,
            "per_manager",
        )]));
        let state = logged_in(repository.clone(), "ola_manager", true);

        let err = delete_venue(&state, "v-1").await.expect_err("not owner");
        assert_eq!(
            err.kind,
            ErrorKind::Forbidden {
                redirect: Route::ManageVenues
            }
        );
        assert!(repository.venue("v-1").is_some());
        assert!(venue_bookings(&state, "v-1").await.is_err());
    }

    #[tokio::test]
    async fn owner_deletes_venue_and_sees_bookings() {
        let mut cabin = fixture("v-1", "Fjord Cabin", 4, "ola_manager");
        cabin.bookings = Some(vec![Booking::interval("b-1", "2024-06-01", "2024-06-05")]);
        let repository = Arc::new(FakeRepository::with_venues(vec![cabin]));
        let state = logged_in(repository.clone(), "ola_manager", true);

        let bookings = venue_bookings(&state, "v-1").await.unwrap();
        assert!(bookings.starts_with("Bookings for Fjord Cabin:"));
        assert!(bookings.contains("b-1  2024-06-01 -> 2024-06-05"));

        let output = delete_venue(&state, "v-1").await.unwrap();
        assert_eq!(output, "Deleted venue Fjord Cabin (v-1)");
        assert!(repository.venue("v-1").is_none());
    }
}
