//! Client-side routes and the access policy that guards them.
//!
//! ## Structure
//! - **Public**
//!   - `/` home, `/venues` browse and search, `/venues/{id}` details
//!   - `/login`, `/register`
//! - **Authenticated**
//!   - `/profile` own profile, avatar and upcoming bookings
//! - **Venue manager**
//!   - `/manage/venues` create, edit and delete owned venues
//!   - `/manage/bookings` bookings made against owned venues
//!
//! Role checks live here and nowhere else: route guards and individual actions
//! both go through [`authorize`].

use std::fmt;
use tracing::debug;

use crate::{
    models::{session::Session, venue::Venue},
    services::{session_service::SessionStore, storage_service::LocalStorage},
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    Home,
    Venues,
    VenueDetails(String),
    Login,
    Register,
    Profile,
    ManageVenues,
    ManageBookings,
    NotFound,
}

/// What a session must satisfy to use a route or capability.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
    Public,
    Authenticated,
    Manager,
}

/// Individual actions gated by role.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Capability {
    BookVenue,
    ViewProfile,
    UpdateAvatar,
    ViewManagedVenues,
    CreateVenue,
    EditVenue,
    DeleteVenue,
    ViewVenueBookings,
}

/// Outcome of a route guard.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Navigation {
    Allow,
    /// Go to `to`; `from` remembers the requested path for after login.
    Redirect { to: Route, from: Option<String> },
}

impl Route {
    /// Map a path to its route. Trailing slashes are ignored.
    pub fn parse(path: &str) -> Route {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            [] => Route::Home,
            ["venues"] => Route::Venues,
            ["venues", id] => Route::VenueDetails((*id).to_string()),
            ["login"] => Route::Login,
            ["register"] => Route::Register,
            ["profile"] => Route::Profile,
            ["manage", "venues"] => Route::ManageVenues,
            ["manage", "bookings"] => Route::ManageBookings,
            _ => Route::NotFound,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".into(),
            Route::Venues => "/venues".into(),
            Route::VenueDetails(id) => format!("/venues/{id}"),
            Route::Login => "/login".into(),
            Route::Register => "/register".into(),
            Route::Profile => "/profile".into(),
            Route::ManageVenues => "/manage/venues".into(),
            Route::ManageBookings => "/manage/bookings".into(),
            Route::NotFound => "/404".into(),
        }
    }

    pub fn access(&self) -> Access {
        match self {
            Route::Profile => Access::Authenticated,
            Route::ManageVenues | Route::ManageBookings => Access::Manager,
            _ => Access::Public,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

impl Capability {
    pub fn access(self) -> Access {
        match self {
            Capability::BookVenue | Capability::ViewProfile | Capability::UpdateAvatar => {
                Access::Authenticated
            }
            Capability::ViewManagedVenues
            | Capability::CreateVenue
            | Capability::EditVenue
            | Capability::DeleteVenue
            | Capability::ViewVenueBookings => Access::Manager,
        }
    }
}

/// The role policy.
pub fn authorize(session: &Session, access: Access) -> bool {
    match access {
        Access::Public => true,
        Access::Authenticated => session.is_logged_in(),
        Access::Manager => session.is_manager(),
    }
}

pub fn can(session: &Session, capability: Capability) -> bool {
    authorize(session, capability.access())
}

/// A manager may only edit, delete or inspect bookings of venues they own.
pub fn can_manage_venue(session: &Session, venue: &Venue) -> bool {
    authorize(session, Access::Manager)
        && session.profile_name().is_some()
        && venue.owner_name() == session.profile_name()
}

/// Decide whether `session` may open `route`.
///
/// Logged-out visitors go to `/login`; customers asking for a manager route
/// go to `/profile`. Either way the requested path is remembered.
pub fn guard(session: &Session, route: &Route) -> Navigation {
    let access = route.access();
    if authorize(session, access) {
        return Navigation::Allow;
    }

    let to = if session.is_logged_in() {
        Route::Profile
    } else {
        Route::Login
    };
    debug!(route = %route, redirect = %to, "route guard redirect");
    Navigation::Redirect {
        to,
        from: Some(route.path()),
    }
}

/// Where to go after a successful login.
pub fn post_login_destination(from: Option<&str>) -> Route {
    match from.map(Route::parse) {
        Some(Route::Login | Route::Register | Route::NotFound) | None => Route::Profile,
        Some(route) => route,
    }
}

/// React to an authorization failure reported by an authenticated call:
/// drop the session and send the user to the login entry point.
pub fn force_logout<S: LocalStorage>(store: &SessionStore<S>, from: Option<&Route>) -> Navigation {
    store.logout();
    Navigation::Redirect {
        to: Route::Login,
        from: from.map(Route::path),
    }
}
