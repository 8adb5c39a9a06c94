//! src/services/api_service.rs
//!
//! The venue/booking repository: the `VenueRepository` port consumed by the
//! handlers, and `HolidazeClient`, its reqwest adapter for the Noroff v2
//! Holidaze API. The adapter owns transport details only: URLs, headers,
//! the `{ "data": ... }` envelope and mapping HTTP failures onto [`ApiError`].

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::models::{
    booking::{Booking, NewBooking},
    profile::{AuthenticatedProfile, Credentials, Profile, Registration},
    venue::{Media, Venue, VenueDraft},
};

pub const DEFAULT_API_BASE: &str = "https://v2.api.noroff.dev";
const API_KEY_HEADER: &str = "X-Noroff-API-Key";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The request never produced a usable response.
    #[error("network error: {0}")]
    Transport(String),
    /// The response body could not be decoded.
    #[error("unexpected response from the API: {0}")]
    Decode(String),
    /// The bearer token was rejected (missing, expired or invalid).
    #[error("not authorized: {0}")]
    Unauthorized(String),
    /// The API rejected the request, e.g. validation or a booking conflict.
    #[error("{message}")]
    Domain { status: u16, message: String },
}

impl ApiError {
    /// Whether the caller should force a logout.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized(_))
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Operations the client needs from the Holidaze backend.
///
/// Methods taking a `token` are authenticated and send it as a bearer token.
#[async_trait]
pub trait VenueRepository: Send + Sync {
    async fn list_venues(&self) -> ApiResult<Vec<Venue>>;

    /// Fetch one venue. Its bookings are included only when a token is given.
    async fn get_venue(&self, id: &str, token: Option<&str>) -> ApiResult<Venue>;

    async fn search_venues(&self, query: &str) -> ApiResult<Vec<Venue>>;

    /// Fetch a profile together with its bookings and owned venues.
    async fn get_profile(&self, name: &str, token: &str) -> ApiResult<Profile>;

    async fn list_managed_venues(&self, name: &str, token: &str) -> ApiResult<Vec<Venue>>;

    async fn create_venue(&self, token: &str, draft: &VenueDraft) -> ApiResult<Venue>;

    async fn update_venue(&self, token: &str, id: &str, draft: &VenueDraft) -> ApiResult<Venue>;

    async fn delete_venue(&self, token: &str, id: &str) -> ApiResult<()>;

    async fn create_booking(&self, token: &str, booking: &NewBooking) -> ApiResult<Booking>;

    async fn update_avatar(&self, token: &str, name: &str, avatar: &Media) -> ApiResult<Profile>;

    async fn register(&self, registration: &Registration) -> ApiResult<Profile>;

    async fn login(&self, credentials: &Credentials) -> ApiResult<AuthenticatedProfile>;
}

#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Deserialize, Default)]
struct ErrorBody {
    #[serde(default)]
    errors: Vec<ErrorEntry>,
}

#[derive(Deserialize)]
struct ErrorEntry {
    message: String,
}

#[derive(Serialize)]
struct AvatarUpdate<'a> {
    avatar: &'a Media,
}

/// Reqwest-backed repository for one API base URL.
#[derive(Clone)]
pub struct HolidazeClient {
    client: Client,
    base_url: Url,
    api_key: Option<String>,
}

impl HolidazeClient {
    /// Build a client with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        base_url: Url,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url,
            api_key,
        })
    }

    fn url(&self, segments: &[&str], query: &[(&str, &str)]) -> ApiResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::Transport(format!("invalid API base `{}`", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    fn request(&self, method: Method, url: Url, token: Option<&str>) -> RequestBuilder {
        debug!("{} {}", method, url);
        let mut request = self
            .client
            .request(method, url)
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(key) = &self.api_key {
            request = request.header(API_KEY_HEADER, key);
        }
        request
    }

    async fn send_data<T: DeserializeOwned>(&self, request: RequestBuilder) -> ApiResult<T> {
        let body = self.send(request).await?;
        let envelope: Envelope<T> = serde_json::from_slice(&body)
            .map_err(|err| ApiError::Decode(format!("invalid JSON payload: {err}")))?;
        Ok(envelope.data)
    }

    async fn send(&self, request: RequestBuilder) -> ApiResult<Vec<u8>> {
        let response = request.send().await.map_err(map_transport_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, &body));
        }
        Ok(body.to_vec())
    }
}

#[async_trait]
impl VenueRepository for HolidazeClient {
    async fn list_venues(&self) -> ApiResult<Vec<Venue>> {
        let url = self.url(&["holidaze", "venues"], &[("_owner", "true")])?;
        self.send_data(self.request(Method::GET, url, None)).await
    }

    async fn get_venue(&self, id: &str, token: Option<&str>) -> ApiResult<Venue> {
        let mut query = vec![("_owner", "true")];
        if token.is_some() {
            query.push(("_bookings", "true"));
        }
        let url = self.url(&["holidaze", "venues", id], &query)?;
        self.send_data(self.request(Method::GET, url, token)).await
    }

    async fn search_venues(&self, query: &str) -> ApiResult<Vec<Venue>> {
        let url = self.url(&["holidaze", "venues", "search"], &[("q", query)])?;
        self.send_data(self.request(Method::GET, url, None)).await
    }

    async fn get_profile(&self, name: &str, token: &str) -> ApiResult<Profile> {
        let url = self.url(
            &["holidaze", "profiles", name],
            &[("_bookings", "true"), ("_venues", "true")],
        )?;
        self.send_data(self.request(Method::GET, url, Some(token)))
            .await
    }

    async fn list_managed_venues(&self, name: &str, token: &str) -> ApiResult<Vec<Venue>> {
        let url = self.url(
            &["holidaze", "profiles", name, "venues"],
            &[("_bookings", "true")],
        )?;
        self.send_data(self.request(Method::GET, url, Some(token)))
            .await
    }

    async fn create_venue(&self, token: &str, draft: &VenueDraft) -> ApiResult<Venue> {
        let url = self.url(&["holidaze", "venues"], &[])?;
        self.send_data(self.request(Method::POST, url, Some(token)).json(draft))
            .await
    }

    async fn update_venue(&self, token: &str, id: &str, draft: &VenueDraft) -> ApiResult<Venue> {
        let url = self.url(&["holidaze", "venues", id], &[])?;
        self.send_data(self.request(Method::PUT, url, Some(token)).json(draft))
            .await
    }

    async fn delete_venue(&self, token: &str, id: &str) -> ApiResult<()> {
        let url = self.url(&["holidaze", "venues", id], &[])?;
        self.send(self.request(Method::DELETE, url, Some(token)))
            .await?;
        Ok(())
    }

    async fn create_booking(&self, token: &str, booking: &NewBooking) -> ApiResult<Booking> {
        let url = self.url(&["holidaze", "bookings"], &[])?;
        self.send_data(self.request(Method::POST, url, Some(token)).json(booking))
            .await
    }

    async fn update_avatar(&self, token: &str, name: &str, avatar: &Media) -> ApiResult<Profile> {
        let url = self.url(&["holidaze", "profiles", name], &[])?;
        self.send_data(
            self.request(Method::PUT, url, Some(token))
                .json(&AvatarUpdate { avatar }),
        )
        .await
    }

    async fn register(&self, registration: &Registration) -> ApiResult<Profile> {
        let url = self.url(&["auth", "register"], &[])?;
        self.send_data(self.request(Method::POST, url, None).json(registration))
            .await
    }

    async fn login(&self, credentials: &Credentials) -> ApiResult<AuthenticatedProfile> {
        let url = self.url(&["auth", "login"], &[("_holidaze", "true")])?;
        self.send_data(self.request(Method::POST, url, None).json(credentials))
            .await
    }
}

fn map_transport_error(error: reqwest::Error) -> ApiError {
    if error.is_timeout() {
        ApiError::Transport(format!("request timed out: {error}"))
    } else {
        ApiError::Transport(error.to_string())
    }
}

/// Map a non-success response onto the error taxonomy, using the first
/// message of the API's `{ "errors": [{ "message": ... }] }` body when present.
fn map_status_error(status: StatusCode, body: &[u8]) -> ApiError {
    let message = serde_json::from_slice::<ErrorBody>(body)
        .unwrap_or_default()
        .errors
        .into_iter()
        .map(|entry| entry.message)
        .find(|message| !message.trim().is_empty())
        .unwrap_or_else(|| format!("request failed with status {}", status.as_u16()));

    match status {
        StatusCode::UNAUTHORIZED => ApiError::Unauthorized(message),
        _ if status.is_client_error() => ApiError::Domain {
            status: status.as_u16(),
            message,
        },
        _ => ApiError::Transport(message),
    }
}
