//! Login, registration, logout and profile handlers.

use tracing::info;

use super::{AppState, join_lines, render_booking_line};
use crate::{
    errors::{AppError, ErrorKind},
    models::{
        profile::{Credentials, Registration},
        venue::Media,
    },
    routes::routes::{Capability, Route, post_login_destination},
    services::{
        api_service::ApiError, availability_service::upcoming_bookings,
        validation_service::validate_registration,
    },
};
use chrono::{DateTime, Utc};

/// Log in with email and password and start a session.
///
/// `from` is the path the user originally asked for, if any.
pub async fn login(
    state: &AppState,
    credentials: Credentials,
    from: Option<&str>,
) -> Result<String, AppError> {
    // A 401 here means bad credentials, not an expired session.
    let authenticated = state
        .repository
        .login(&credentials)
        .await
        .map_err(|err| match err {
            ApiError::Unauthorized(message) => AppError::new(ErrorKind::Domain, message),
            other => AppError::from(other),
        })?;
    let name = authenticated.profile.name.clone();
    let manager = authenticated.profile.venue_manager;
    state
        .session
        .login(authenticated.profile, authenticated.access_token);

    let role = if manager { "venue manager" } else { "customer" };
    Ok(format!(
        "Logged in as {name} ({role}). Continue at {}",
        post_login_destination(from)
    ))
}

/// Register a new account, then log straight in with the same credentials.
pub async fn register(
    state: &AppState,
    registration: Registration,
    from: Option<&str>,
) -> Result<String, AppError> {
    validate_registration(&registration)?;

    let created = state.settle(
        state.repository.register(&registration).await,
        &Route::Register,
    )?;
    info!(profile = %created.name, "registered new profile");

    let credentials = Credentials {
        email: registration.email,
        password: registration.password,
    };
    let logged_in = login(state, credentials, from).await?;
    Ok(format!("Account {} created. {logged_in}", created.name))
}

pub fn logout(state: &AppState) -> String {
    let was_logged_in = state.session.is_logged_in();
    state.session.logout();
    if was_logged_in {
        "Logged out.".to_string()
    } else {
        "Already logged out.".to_string()
    }
}

pub fn whoami(state: &AppState) -> String {
    let session = state.session.snapshot();
    match (&session.profile, session.is_logged_in()) {
        (Some(profile), true) => {
            let role = if session.is_manager() {
                "venue manager"
            } else {
                "customer"
            };
            let avatar = profile
                .avatar
                .as_ref()
                .map(|avatar| format!("\navatar: {}", avatar.url))
                .unwrap_or_default();
            format!("{} <{}> ({role}){avatar}", profile.name, profile.email)
        }
        _ => "Not logged in.".to_string(),
    }
}

/// Upcoming bookings of the logged-in profile (`/profile`).
pub async fn my_bookings(state: &AppState, now: DateTime<Utc>) -> Result<String, AppError> {
    let route = Route::Profile;
    let (session, token) = state.enter_with(&route, Capability::ViewProfile)?;
    let name = session.profile_name().unwrap_or_default().to_string();

    let profile = state.settle(state.repository.get_profile(&name, &token).await, &route)?;
    let bookings = profile.bookings.unwrap_or_default();
    let upcoming = upcoming_bookings(&bookings, now);

    let header = match upcoming.len() {
        0 => "You have no upcoming bookings.".to_string(),
        1 => "You have 1 upcoming booking.".to_string(),
        n => format!("You have {n} upcoming bookings."),
    };
    let lines = join_lines(upcoming.iter().map(render_booking_line), "");
    Ok(if lines.is_empty() {
        header
    } else {
        format!("{header}\n{lines}")
    })
}

/// Replace the avatar of the logged-in profile.
pub async fn update_avatar(
    state: &AppState,
    url: String,
    alt: Option<String>,
) -> Result<String, AppError> {
    let route = Route::Profile;
    let (session, token) = state.enter_with(&route, Capability::UpdateAvatar)?;
    let name = session.profile_name().unwrap_or_default().to_string();

    if url.trim().is_empty() {
        return Err(AppError::validation("Avatar URL is required."));
    }
    let avatar = Media {
        url: url.trim().to_string(),
        alt: alt.unwrap_or_else(|| name.clone()),
    };

    let updated = state.settle(
        state.repository.update_avatar(&token, &name, &avatar).await,
        &route,
    )?;
    let avatar = updated.avatar.unwrap_or(avatar);
    state.session.update_profile(|mut profile| {
        profile.avatar = Some(avatar.clone());
        profile
    });
    Ok(format!("Avatar updated: {}", avatar.url))
}
