//! Error taxonomy shared by the backends and the workflows

use thiserror::Error;

use crate::validation::ValidationError;

/// Message shown for any transport-level failure
pub const CONNECTIVITY_MESSAGE: &str =
    "Network connection failed, please check your network and try again";

/// Message shown when sign-in is refused because the email is not verified
pub const EMAIL_NOT_CONFIRMED_MESSAGE: &str =
    "Email not verified. Please check your inbox and click the verification link.";

/// Failure reported by a backend (identity service or data store).
///
/// Classification happens where the failure is observed, so callers never
/// need to inspect message text.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The request never got a response
    #[error("Connection failed: {0}")]
    Connectivity(String),

    /// Missing, expired or rejected access token
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Sign-in refused until the account's email is confirmed
    #[error("Email not confirmed")]
    EmailNotConfirmed,

    /// The backend answered with an error
    #[error("{message}")]
    Api { status: u16, message: String },

    /// Response body did not match the expected shape
    #[error("Unexpected response: {0}")]
    Decode(String),

    /// Embedded storage failure
    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<reqwest::Error> for BackendError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_connect() || e.is_timeout() || e.is_request() {
            BackendError::Connectivity(e.to_string())
        } else if e.is_decode() {
            BackendError::Decode(e.to_string())
        } else {
            BackendError::Api {
                status: e.status().map(|s| s.as_u16()).unwrap_or(0),
                message: e.to_string(),
            }
        }
    }
}

impl From<rusqlite::Error> for BackendError {
    fn from(e: rusqlite::Error) -> Self {
        BackendError::Storage(e.to_string())
    }
}

impl From<serde_json::Error> for BackendError {
    fn from(e: serde_json::Error) -> Self {
        BackendError::Decode(e.to_string())
    }
}

/// Error surfaced by a workflow to the front end
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Please sign in first (run `fittrack login`)")]
    AuthRequired,

    #[error("{}", CONNECTIVITY_MESSAGE)]
    Connectivity,

    #[error("{}", EMAIL_NOT_CONFIRMED_MESSAGE)]
    EmailNotConfirmed,

    #[error("{0}")]
    Backend(String),

    #[error("Could not store session: {0}")]
    SessionStorage(String),
}

impl AppError {
    /// Whether a front end should offer to retry the action
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::Connectivity | AppError::Backend(_))
    }
}

impl From<BackendError> for AppError {
    fn from(e: BackendError) -> Self {
        match e {
            BackendError::Connectivity(_) => AppError::Connectivity,
            BackendError::Unauthorized(_) => AppError::AuthRequired,
            BackendError::EmailNotConfirmed => AppError::EmailNotConfirmed,
            BackendError::Api { message, .. } => AppError::Backend(message),
            other => AppError::Backend(other.to_string()),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_errors_map_to_app_errors() {
        assert!(matches!(
            AppError::from(BackendError::Connectivity("refused".into())),
            AppError::Connectivity
        ));
        assert!(matches!(
            AppError::from(BackendError::Unauthorized("jwt expired".into())),
            AppError::AuthRequired
        ));
        assert!(matches!(
            AppError::from(BackendError::EmailNotConfirmed),
            AppError::EmailNotConfirmed
        ));
    }

    #[test]
    fn test_api_message_passes_through() {
        let err = AppError::from(BackendError::Api {
            status: 400,
            message: "Invalid login credentials".into(),
        });
        assert_eq!(err.to_string(), "Invalid login credentials");
        assert!(err.is_retryable());
    }

    #[test]
    fn test_validation_not_retryable() {
        let err = AppError::from(ValidationError::InvalidReps);
        assert!(!err.is_retryable());
        assert_eq!(err.to_string(), ValidationError::InvalidReps.to_string());
    }

    #[test]
    fn test_connectivity_message() {
        assert_eq!(AppError::Connectivity.to_string(), CONNECTIVITY_MESSAGE);
    }
}
