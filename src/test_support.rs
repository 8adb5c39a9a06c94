//! Test utilities shared by the unit tests in `src/`.
//!
//! `FakeRepository` is an in-memory stand-in for the Holidaze API. Tokens
//! have the form `token-{profile name}`; anything else is rejected as
//! unauthorized, like an expired token would be.

use async_trait::async_trait;
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use crate::{
    models::{
        booking::{Booking, NewBooking},
        profile::{AuthenticatedProfile, Credentials, Profile, ProfileRef, Registration},
        session::Session,
        venue::{Location, Media, Venue, VenueDraft, VenueMeta},
    },
    services::{
        api_service::{ApiError, ApiResult, VenueRepository},
        session_service::SessionStore,
        storage_service::{LocalStorage, MemoryStorage},
    },
};

pub fn profile(name: &str, venue_manager: bool) -> Profile {
    Profile {
        name: name.into(),
        email: format!("{name}@stud.noroff.no"),
        bio: None,
        avatar: None,
        banner: None,
        venue_manager,
        bookings: None,
        venues: None,
    }
}

pub fn venue(id: &str, name: &str, max_guests: u32) -> Venue {
    Venue {
        id: id.into(),
        name: name.into(),
        description: format!("{name} description"),
        price: 950.0,
        max_guests,
        media: Vec::new(),
        location: Location::default(),
        meta: VenueMeta::default(),
        rating: None,
        owner: None,
        bookings: Some(Vec::new()),
        created: None,
        updated: None,
    }
}

pub fn owned_venue(id: &str, name: &str, max_guests: u32, owner: &str) -> Venue {
    Venue {
        owner: Some(ProfileRef {
            name: owner.into(),
            email: None,
            avatar: None,
        }),
        ..venue(id, name, max_guests)
    }
}

pub fn token_for(name: &str) -> String {
    format!("token-{name}")
}

/// Session store over fresh in-memory storage, logged in as `profile`.
pub fn store_logged_in_as(profile: Profile) -> SessionStore<Arc<dyn LocalStorage>> {
    let storage: Arc<dyn LocalStorage> = Arc::new(MemoryStorage::new());
    let store = SessionStore::new(storage);
    let token = token_for(&profile.name);
    store.login(profile, token);
    store
}

pub fn anonymous_store() -> SessionStore<Arc<dyn LocalStorage>> {
    let storage: Arc<dyn LocalStorage> = Arc::new(MemoryStorage::new());
    SessionStore::new(storage)
}

pub fn session_as(profile: Profile) -> Session {
    let token = token_for(&profile.name);
    Session::authenticated(profile, token)
}

#[derive(Default)]
struct FakeState {
    venues: Vec<Venue>,
    profiles: HashMap<String, Profile>,
    calls: Vec<String>,
    forced_failure: Option<ApiError>,
    booking_failure: Option<ApiError>,
    next_id: u32,
}

#[derive(Default)]
pub struct FakeRepository {
    state: Mutex<FakeState>,
    latency: Duration,
}

impl FakeRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_venues(venues: Vec<Venue>) -> Self {
        let repository = Self::new();
        repository.state().venues = venues;
        repository
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn with_profile(self, profile: Profile) -> Self {
        self.state().profiles.insert(profile.name.clone(), profile);
        self
    }

    /// Make every authenticated call fail with `error`.
    pub fn fail_authenticated_with(&self, error: ApiError) {
        self.state().forced_failure = Some(error);
    }

    /// Refuse every new booking with `error`, as the API does when the nights
    /// were taken after the venue was fetched.
    pub fn refuse_bookings_with(&self, error: ApiError) {
        self.state().booking_failure = Some(error);
    }

    pub fn calls(&self) -> Vec<String> {
        self.state().calls.clone()
    }

    pub fn venue(&self, id: &str) -> Option<Venue> {
        self.state().venues.iter().find(|venue| venue.id == id).cloned()
    }

    fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().expect("fake repository lock")
    }

    async fn record(&self, call: String) {
        self.state().calls.push(call);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    fn authorize(&self, token: &str) -> ApiResult<String> {
        if let Some(error) = self.state().forced_failure.clone() {
            return Err(error);
        }
        token
            .strip_prefix("token-")
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .ok_or_else(|| ApiError::Unauthorized("Invalid authorization token provided".into()))
    }

    fn not_found(what: &str) -> ApiError {
        ApiError::Domain {
            status: 404,
            message: format!("No {what} with such ID"),
        }
    }
}

#[async_trait]
impl VenueRepository for FakeRepository {
    async fn list_venues(&self) -> ApiResult<Vec<Venue>> {
        self.record("list_venues".into()).await;
        Ok(self.state().venues.clone())
    }

    async fn get_venue(&self, id: &str, token: Option<&str>) -> ApiResult<Venue> {
        self.record(format!("get_venue:{id}")).await;
        if let Some(token) = token {
            self.authorize(token)?;
        }
        let mut venue = self.venue(id).ok_or_else(|| Self::not_found("venue"))?;
        if token.is_none() {
            venue.bookings = None;
        }
        Ok(venue)
    }

    async fn search_venues(&self, query: &str) -> ApiResult<Vec<Venue>> {
        self.record(format!("search_venues:{query}")).await;
        let needle = query.to_lowercase();
        Ok(self
            .state()
            .venues
            .iter()
            .filter(|venue| venue.name.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    async fn get_profile(&self, name: &str, token: &str) -> ApiResult<Profile> {
        self.record(format!("get_profile:{name}")).await;
        self.authorize(token)?;
        self.state()
            .profiles
            .get(name)
            .cloned()
            .ok_or_else(|| Self::not_found("profile"))
    }

    async fn list_managed_venues(&self, name: &str, token: &str) -> ApiResult<Vec<Venue>> {
        self.record(format!("list_managed_venues:{name}")).await;
        self.authorize(token)?;
        Ok(self
            .state()
            .venues
            .iter()
            .filter(|venue| venue.owner_name() == Some(name))
            .cloned()
            .collect())
    }

    async fn create_venue(&self, token: &str, draft: &VenueDraft) -> ApiResult<Venue> {
        self.record("create_venue".into()).await;
        let owner = self.authorize(token)?;
        let mut state = self.state();
        state.next_id += 1;
        let created = Venue {
            description: draft.description.clone(),
            price: draft.price,
            media: draft.media.clone(),
            location: draft.location.clone(),
            meta: draft.meta,
            ..owned_venue(
                &format!("v-new-{}", state.next_id),
                &draft.name,
                draft.max_guests,
                &owner,
            )
        };
        state.venues.push(created.clone());
        Ok(created)
    }

    async fn update_venue(&self, token: &str, id: &str, draft: &VenueDraft) -> ApiResult<Venue> {
        self.record(format!("update_venue:{id}")).await;
        self.authorize(token)?;
        let mut state = self.state();
        let venue = state
            .venues
            .iter_mut()
            .find(|venue| venue.id == id)
            .ok_or_else(|| Self::not_found("venue"))?;
        venue.name = draft.name.clone();
        venue.description = draft.description.clone();
        venue.price = draft.price;
        venue.max_guests = draft.max_guests;
        venue.media = draft.media.clone();
        venue.meta = draft.meta;
        venue.location = draft.location.clone();
        Ok(venue.clone())
    }

    async fn delete_venue(&self, token: &str, id: &str) -> ApiResult<()> {
        self.record(format!("delete_venue:{id}")).await;
        self.authorize(token)?;
        let mut state = self.state();
        let before = state.venues.len();
        state.venues.retain(|venue| venue.id != id);
        if state.venues.len() == before {
            return Err(Self::not_found("venue"));
        }
        Ok(())
    }

    async fn create_booking(&self, token: &str, booking: &NewBooking) -> ApiResult<Booking> {
        self.record(format!("create_booking:{}", booking.venue_id)).await;
        let customer = self.authorize(token)?;
        let mut state = self.state();
        if let Some(error) = state.booking_failure.clone() {
            return Err(error);
        }
        state.next_id += 1;
        let created = Booking {
            guests: booking.guests,
            customer: Some(ProfileRef {
                name: customer.clone(),
                email: None,
                avatar: None,
            }),
            ..Booking::interval(
                format!("b-new-{}", state.next_id),
                booking.date_from.clone(),
                booking.date_to.clone(),
            )
        };
        let venue = state
            .venues
            .iter_mut()
            .find(|venue| venue.id == booking.venue_id)
            .ok_or_else(|| Self::not_found("venue"))?;
        venue.bookings.get_or_insert_with(Vec::new).push(created.clone());
        if let Some(profile) = state.profiles.get_mut(&customer) {
            profile.bookings.get_or_insert_with(Vec::new).push(created.clone());
        }
        Ok(created)
    }

    async fn update_avatar(&self, token: &str, name: &str, avatar: &Media) -> ApiResult<Profile> {
        self.record(format!("update_avatar:{name}")).await;
        self.authorize(token)?;
        let mut state = self.state();
        let profile = state
            .profiles
            .get_mut(name)
            .ok_or_else(|| Self::not_found("profile"))?;
        profile.avatar = Some(avatar.clone());
        Ok(profile.clone())
    }

    async fn register(&self, registration: &Registration) -> ApiResult<Profile> {
        self.record(format!("register:{}", registration.name)).await;
        let mut state = self.state();
        if state.profiles.contains_key(&registration.name) {
            return Err(ApiError::Domain {
                status: 400,
                message: "Profile already exists".into(),
            });
        }
        let created = Profile {
            email: registration.email.clone(),
            ..profile(&registration.name, registration.venue_manager)
        };
        state
            .profiles
            .insert(registration.name.clone(), created.clone());
        Ok(created)
    }

    async fn login(&self, credentials: &Credentials) -> ApiResult<AuthenticatedProfile> {
        self.record(format!("login:{}", credentials.email)).await;
        let state = self.state();
        let profile = state
            .profiles
            .values()
            .find(|profile| profile.email == credentials.email)
            .cloned()
            .ok_or_else(|| ApiError::Unauthorized("Invalid email or password".into()))?;
        let access_token = token_for(&profile.name);
        Ok(AuthenticatedProfile {
            profile,
            access_token,
        })
    }
}
