//! # Error Types
//!
//! Domain-specific error types for booking-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  booking-core errors (this file)                                       │
//! │  ├── CoreError        - General domain errors                          │
//! │  ├── ValidationError  - Required fields / formats before a request     │
//! │  └── DecodeError      - Malformed session token payloads               │
//! │                                                                         │
//! │  booking-client errors (separate crate)                                │
//! │  └── ClientError      - Network / server rejection                     │
//! │                                                                         │
//! │  App errors                                                            │
//! │  └── ApiError         - What the host UI sees (serialized)             │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError → Host UI                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (field, segment count, etc.)
//! 3. Errors are enum variants, never String

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core domain errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A booking operation needs an establishment that was never bound.
    #[error("No establishment selected")]
    NoEstablishment,

    /// Calendar navigation stepped outside the representable date range.
    #[error("Month out of range: {0}")]
    MonthOutOfRange(String),

    /// Token payload could not be decoded.
    #[error("Token decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before any request is issued; a failed validation never
/// reaches the network.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or blank.
    #[error("{field} is required")]
    Required { field: String },

    /// Invalid format (e.g., time slot not `HH:mm`, duration not an integer).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

impl ValidationError {
    /// Shorthand for [`ValidationError::Required`].
    pub fn required(field: &str) -> Self {
        ValidationError::Required {
            field: field.to_string(),
        }
    }

    /// Name of the offending field.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::InvalidFormat { field, .. }
            | ValidationError::NotAllowed { field, .. } => field,
        }
    }
}

// =============================================================================
// Decode Error
// =============================================================================

/// Reasons a session token payload could not be read.
///
/// ## Token Shape
/// ```text
///   header . payload . signature
///            ───┬───
///               └── base64url(JSON claims), the only part we read
/// ```
/// The signature is never verified here; the claims are a UI hint and
/// the server re-validates the token on every authenticated call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Token does not have exactly three dot-separated segments.
    #[error("expected 3 token segments, found {0}")]
    SegmentCount(usize),

    /// Payload segment is not valid base64.
    #[error("payload is not valid base64: {0}")]
    Base64(String),

    /// Payload bytes are not a JSON object with the expected claims.
    #[error("payload is not valid claims JSON: {0}")]
    Json(String),
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::required("clientName");
        assert_eq!(err.to_string(), "clientName is required");
        assert_eq!(err.field(), "clientName");

        let err = ValidationError::InvalidFormat {
            field: "time".to_string(),
            reason: "expected HH:mm".to_string(),
        };
        assert_eq!(err.to_string(), "time has invalid format: expected HH:mm");
    }

    #[test]
    fn test_decode_error_messages() {
        assert_eq!(
            DecodeError::SegmentCount(2).to_string(),
            "expected 3 token segments, found 2"
        );
    }

    #[test]
    fn test_errors_convert_to_core_error() {
        let core_err: CoreError = ValidationError::required("date").into();
        assert!(matches!(core_err, CoreError::Validation(_)));

        let core_err: CoreError = DecodeError::SegmentCount(1).into();
        assert!(matches!(core_err, CoreError::Decode(_)));
    }
}
