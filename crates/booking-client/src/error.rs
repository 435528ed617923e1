//! # Client Error Types
//!
//! ## Error Categories
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Client Error Categories                            │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │   Transport     │  │   Server said   │  │   Local                 │ │
//! │  │                 │  │   no            │  │                         │ │
//! │  │  Network        │  │  Rejected       │  │  InvalidUrl             │ │
//! │  │  Timeout        │  │  NotFound       │  │  Setup                  │ │
//! │  │                 │  │  InvalidResponse│  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  Transport errors become "Network error. Please try again."            │
//! │  Rejections show the server's `message` verbatim when it sent one.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing here retries; every failure is reported once to the caller.

use thiserror::Error;

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Everything that can go wrong talking to the REST API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    // =========================================================================
    // Transport
    // =========================================================================
    /// Request never produced an HTTP response.
    #[error("Network error: {0}")]
    Network(String),

    /// Request exceeded the configured timeout.
    #[error("Request timed out")]
    Timeout,

    // =========================================================================
    // Server Responses
    // =========================================================================
    /// Non-2xx response.
    #[error("Request rejected with status {status}")]
    Rejected {
        status: u16,
        /// `message` field of the error body, if any.
        message: Option<String>,
    },

    /// 404 for the addressed resource.
    #[error("{resource} not found")]
    NotFound {
        resource: String,
        message: Option<String>,
    },

    /// 2xx response whose body did not match the expected shape.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    // =========================================================================
    // Local
    // =========================================================================
    /// Base URL cannot address API paths.
    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),

    /// HTTP client could not be constructed.
    #[error("HTTP client setup failed: {0}")]
    Setup(String),
}

impl ClientError {
    /// True for failures where no response was received.
    pub fn is_network(&self) -> bool {
        matches!(self, ClientError::Network(_) | ClientError::Timeout)
    }

    /// The server-provided message, if the server sent one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ClientError::Rejected { message, .. } | ClientError::NotFound { message, .. } => {
                message.as_deref().filter(|m| !m.trim().is_empty())
            }
            _ => None,
        }
    }

    /// Text for the message banner: the server's words, else `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        self.server_message().unwrap_or(fallback).to_string()
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout
        } else if err.is_decode() {
            ClientError::InvalidResponse(err.to_string())
        } else if err.is_builder() {
            ClientError::Setup(err.to_string())
        } else {
            ClientError::Network(err.to_string())
        }
    }
}

impl From<url::ParseError> for ClientError {
    fn from(err: url::ParseError) -> Self {
        ClientError::InvalidUrl(err.to_string())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_prefers_server_text() {
        let err = ClientError::Rejected {
            status: 409,
            message: Some("Time slot already taken".into()),
        };
        assert_eq!(
            err.user_message("Could not complete the booking."),
            "Time slot already taken"
        );
    }

    #[test]
    fn test_user_message_falls_back() {
        let err = ClientError::Rejected {
            status: 500,
            message: Some("  ".into()),
        };
        assert_eq!(err.user_message("Could not log in."), "Could not log in.");
        assert_eq!(
            ClientError::Timeout.user_message("fallback"),
            "fallback"
        );
    }

    #[test]
    fn test_network_classification() {
        assert!(ClientError::Network("refused".into()).is_network());
        assert!(ClientError::Timeout.is_network());
        assert!(!ClientError::InvalidResponse("x".into()).is_network());
    }
}
