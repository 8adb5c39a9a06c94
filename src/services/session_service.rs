//! src/services/session_service.rs
//!
//! SessionStore, the single owner of "who is logged in". The current
//! [`Session`] lives in a `tokio::sync::watch` channel so any number of readers
//! can take snapshots or subscribe to changes, while only the store's own
//! methods ever write. Every change is mirrored to [`LocalStorage`] under
//! [`STORAGE_KEY`]; storage failures are logged and otherwise ignored, leaving
//! the in-memory state authoritative for the rest of the process.

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::{
    models::{
        profile::Profile,
        session::{Session, StoredSession},
    },
    services::storage_service::LocalStorage,
};

/// Storage key of the persisted `{ user, token }` entry.
pub const STORAGE_KEY: &str = "holidaze_auth";

pub struct SessionStore<S> {
    storage: S,
    state: watch::Sender<Session>,
}

impl<S: LocalStorage> SessionStore<S> {
    /// Store starting from an empty session, ignoring anything persisted.
    pub fn new(storage: S) -> Self {
        let (state, _) = watch::channel(Session::default());
        Self { storage, state }
    }

    /// Rehydrate the session persisted in `storage`.
    ///
    /// A missing, unreadable or unparseable entry yields an empty session.
    pub fn initialize(storage: S) -> Self {
        let session = load_session(&storage);
        let (state, _) = watch::channel(session);
        Self { storage, state }
    }

    /// Copy of the current session.
    pub fn snapshot(&self) -> Session {
        self.state.borrow().clone()
    }

    /// Receiver notified after every change.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    pub fn is_logged_in(&self) -> bool {
        self.state.borrow().is_logged_in()
    }

    pub fn is_manager(&self) -> bool {
        self.state.borrow().is_manager()
    }

    /// Current bearer token, for attaching to authenticated calls.
    pub fn token(&self) -> Option<String> {
        self.state.borrow().token().map(str::to_string)
    }

    /// Record a successful login and persist profile and token together.
    ///
    /// Every mutator writes storage while holding the channel's lock, so a
    /// concurrent `logout` and `update_profile` cannot interleave their
    /// storage and memory writes.
    pub fn login(&self, profile: Profile, token: impl Into<String>) {
        let session = Session::authenticated(profile, token);
        info!(profile = ?session.profile_name(), "session started");
        self.state.send_modify(|current| {
            self.persist(&session);
            *current = session;
        });
    }

    /// Clear the session in memory and in storage. Calling it while logged out
    /// does nothing observable.
    pub fn logout(&self) {
        let cleared = self.state.send_if_modified(|session| {
            if let Err(err) = self.storage.remove_item(STORAGE_KEY) {
                warn!("failed to remove persisted session: {}", err);
            }
            if session.is_empty() {
                return false;
            }
            *session = Session::default();
            true
        });
        if cleared {
            info!("session cleared");
        }
    }

    /// Replace the profile with `update(profile)` and re-persist it with the
    /// current token. No-op when logged out.
    pub fn update_profile<F>(&self, update: F)
    where
        F: FnOnce(Profile) -> Profile,
    {
        let updated = self.state.send_if_modified(|session| {
            let (Some(profile), Some(token)) = (session.profile.clone(), session.token()) else {
                return false;
            };
            let next = Session::authenticated(update(profile), token);
            self.persist(&next);
            *session = next;
            true
        });
        if !updated {
            debug!("profile update ignored: not logged in");
        }
    }

    fn persist(&self, session: &Session) {
        let (Some(user), Some(token)) = (session.profile.clone(), session.token.clone()) else {
            return;
        };
        let stored = StoredSession { user, token };
        let written = serde_json::to_string(&stored)
            .map_err(std::io::Error::other)
            .and_then(|json| self.storage.set_item(STORAGE_KEY, &json));
        if let Err(err) = written {
            warn!("failed to persist session: {}", err);
        }
    }
}

fn load_session<S: LocalStorage>(storage: &S) -> Session {
    let raw = match storage.get_item(STORAGE_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Session::default(),
        Err(err) => {
            warn!("could not read persisted session: {}", err);
            return Session::default();
        }
    };

    match serde_json::from_str::<StoredSession>(&raw) {
        Ok(stored) => {
            debug!(profile = %stored.user.name, "restored persisted session");
            stored.into()
        }
        Err(err) => {
            warn!("could not parse stored auth data: {}", err);
            Session::default()
        }
    }
}
