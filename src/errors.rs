use std::fmt;

use crate::{
    routes::routes::Route,
    services::{
        api_service::ApiError, availability_service::BookingRejection,
        validation_service::ValidationError,
    },
};

/// Which class of failure ended a user action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caught locally before any request was sent.
    Validation,
    /// The API rejected the request.
    Domain,
    /// The token was rejected; the session has been cleared.
    Unauthorized,
    /// A route guard refused access and points elsewhere.
    Forbidden { redirect: Route },
    /// The API could not be reached or answered with garbage.
    Network,
    Internal,
}

/// A lightweight error for one user action that keeps the message local.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppError {
    pub kind: ErrorKind,
    pub message: String,
}

impl AppError {
    /// Create a new AppError with a specific kind and message.
    pub fn new(kind: ErrorKind, msg: impl Into<String>) -> Self {
        Self {
            kind,
            message: msg.into(),
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, msg)
    }

    /// Shortcut for a guard redirect.
    pub fn forbidden(redirect: Route, msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Forbidden { redirect }, msg)
    }

    /// Shortcut for a forced logout; the user is pointed at the login route.
    pub fn session_expired(detail: &str) -> Self {
        Self::new(
            ErrorKind::Unauthorized,
            format!(
                "{detail}. You have been logged out; log in again at {}",
                Route::Login
            ),
        )
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, msg)
    }

    /// Process exit code for this failure.
    pub fn exit_code(&self) -> i32 {
        match self.kind {
            ErrorKind::Validation => 2,
            ErrorKind::Domain => 3,
            ErrorKind::Unauthorized => 4,
            ErrorKind::Forbidden { .. } => 5,
            ErrorKind::Network => 6,
            ErrorKind::Internal => 1,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl From<ApiError> for AppError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Unauthorized(detail) => AppError::session_expired(&detail),
            ApiError::Domain { message, .. } => AppError::new(ErrorKind::Domain, message),
            ApiError::Transport(_) | ApiError::Decode(_) => {
                AppError::new(ErrorKind::Network, err.to_string())
            }
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::validation(err.to_string())
    }
}

impl From<BookingRejection> for AppError {
    fn from(err: BookingRejection) -> Self {
        AppError::validation(err.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_errors_map_onto_user_facing_classes() {
        let expired = AppError::from(ApiError::Unauthorized("Invalid token".into()));
        assert_eq!(expired.kind, ErrorKind::Unauthorized);
        assert!(expired.message.contains("/login"));

        let rejected = AppError::from(ApiError::Domain {
            status: 409,
            message: "The venue is already booked for the selected dates".into(),
        });
        assert_eq!(rejected.kind, ErrorKind::Domain);
        assert_eq!(
            rejected.to_string(),
            "The venue is already booked for the selected dates"
        );

        let offline = AppError::from(ApiError::Transport("connection refused".into()));
        assert_eq!(offline.kind, ErrorKind::Network);
        assert_eq!(offline.exit_code(), 6);
    }

    #[test]
    fn local_failures_are_validation_errors() {
        let err = AppError::from(BookingRejection::OverCapacity { max_guests: 4 });
        assert_eq!(err.kind, ErrorKind::Validation);
        assert_eq!(err.to_string(), "this venue allows at most 4 guests");
        assert_eq!(AppError::from(ValidationError::Price).exit_code(), 2);
    }
}
