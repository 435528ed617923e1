//! # API Error Type
//!
//! Unified error type for app commands, plus the app's own storage and
//! configuration errors.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Booking App                        │
//! │                                                                         │
//! │  Host UI                     Rust                                       │
//! │  ───────                     ────                                       │
//! │                                                                         │
//! │  commands::submit_booking(..)                                           │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Result<T, ApiError>                                             │  │
//! │  │         │                                                        │  │
//! │  │  Missing field?  ── ValidationError ──────────────┐              │  │
//! │  │  Server said no? ── ClientError::Rejected ────────┼──► ApiError ─┼► │
//! │  │  Offline?        ── ClientError::Network ─────────┤              │  │
//! │  │  Disk full?      ── StorageError ─────────────────┘              │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  { "code": "SERVER_REJECTION", "message": "Time slot already taken" }   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use thiserror::Error;

use booking_client::ClientError;
use booking_core::{CoreError, DecodeError, ValidationError};

use crate::messages;
use crate::state::{ConfirmError, TransitionError};

// =============================================================================
// API Error
// =============================================================================

/// Error returned from app commands.
///
/// ## Serialization
/// ```json
/// { "code": "NETWORK_ERROR", "message": "Network error. Please try again." }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for command responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Required field missing or malformed; no request was sent
    ValidationError,

    /// No response from the API
    NetworkError,

    /// The API answered with a non-2xx status
    ServerRejection,

    /// Resource not found (404)
    NotFound,

    /// Session token payload unreadable
    DecodeError,

    /// Another confirmation prompt is still open
    ConfirmationPending,

    /// Command needs a session and there is none
    NotAuthenticated,

    /// Command is not valid for the active view
    InvalidState,

    /// Session persistence failed
    StorageError,

    /// Configuration could not be loaded
    ConfigError,

    /// Internal error
    Internal,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates a not-authenticated error.
    pub fn not_authenticated() -> Self {
        ApiError::new(ErrorCode::NotAuthenticated, "Please log in first.")
    }

    /// Creates an invalid-state error.
    pub fn invalid_state(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::InvalidState, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    /// Maps a client error, using `fallback` when the server gave no text.
    pub fn from_client(err: ClientError, fallback: &str) -> Self {
        let message = if err.is_network() {
            messages::NETWORK_ERROR.to_string()
        } else {
            err.user_message(fallback)
        };
        let code = match err {
            ClientError::Network(_) | ClientError::Timeout => ErrorCode::NetworkError,
            ClientError::Rejected { .. } => ErrorCode::ServerRejection,
            ClientError::NotFound { .. } => ErrorCode::NotFound,
            ClientError::InvalidResponse(ref e) => {
                tracing::error!("Invalid API response: {}", e);
                ErrorCode::ServerRejection
            }
            ClientError::InvalidUrl(_) | ClientError::Setup(_) => ErrorCode::Internal,
        };
        ApiError::new(code, message)
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

/// Converts client errors with a generic fallback.
impl From<ClientError> for ApiError {
    fn from(err: ClientError) -> Self {
        let fallback = err.to_string();
        ApiError::from_client(err, &fallback)
    }
}

/// Converts validation errors to API errors.
impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(e) => e.into(),
            CoreError::Decode(e) => e.into(),
            CoreError::NoEstablishment => ApiError::invalid_state(err.to_string()),
            CoreError::MonthOutOfRange(_) => ApiError::validation(err.to_string()),
        }
    }
}

impl From<DecodeError> for ApiError {
    fn from(err: DecodeError) -> Self {
        ApiError::new(ErrorCode::DecodeError, err.to_string())
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        tracing::error!("Session storage failed: {}", err);
        ApiError::new(ErrorCode::StorageError, "Could not save your session.")
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        ApiError::new(ErrorCode::ConfigError, err.to_string())
    }
}

impl From<ConfirmError> for ApiError {
    fn from(err: ConfirmError) -> Self {
        ApiError::new(ErrorCode::ConfirmationPending, err.to_string())
    }
}

impl From<TransitionError> for ApiError {
    fn from(err: TransitionError) -> Self {
        match err {
            TransitionError::NotAllowed { .. } => ApiError::invalid_state(err.to_string()),
            TransitionError::Storage(e) => e.into(),
        }
    }
}

// =============================================================================
// Storage Error
// =============================================================================

/// Session persistence failures.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt session file: {0}")]
    Parse(String),

    #[error("Failed to encode session file: {0}")]
    Encode(String),
}

// =============================================================================
// Config Error
// =============================================================================

/// Configuration load / validation failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Result alias for config loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_errors_use_generic_text() {
        let err = ApiError::from_client(ClientError::Timeout, "Could not log in.");
        assert_eq!(err.code, ErrorCode::NetworkError);
        assert_eq!(err.message, messages::NETWORK_ERROR);
    }

    #[test]
    fn test_rejection_keeps_server_text() {
        let err = ApiError::from_client(
            ClientError::Rejected {
                status: 400,
                message: Some("Email already registered".into()),
            },
            "Could not register.",
        );
        assert_eq!(err.code, ErrorCode::ServerRejection);
        assert_eq!(err.message, "Email already registered");
    }

    #[test]
    fn test_validation_error_converts() {
        let err: ApiError = CoreError::from(ValidationError::required("clientName")).into();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.message, "clientName is required");
    }

    #[test]
    fn test_serializes_screaming_code() {
        let err = ApiError::new(ErrorCode::ConfirmationPending, "busy");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "CONFIRMATION_PENDING");
    }
}
