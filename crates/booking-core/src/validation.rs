//! # Validation Module
//!
//! Required-field and format checks that run before any request.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Host UI                                                      │
//! │  └── `required` attributes, immediate feedback                         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: App commands (Rust)                                          │
//! │  └── THIS MODULE: blank fields, slot format, role rules                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: REST API                                                     │
//! │  └── Authoritative checks; its `message` is shown verbatim             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{NaiveDate, NaiveTime};

use crate::error::ValidationError;
use crate::types::Role;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Primitive Checks
// =============================================================================

/// Returns the trimmed value, or `Required` when it is blank.
pub fn require<'a>(field: &str, value: &'a str) -> ValidationResult<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::required(field));
    }
    Ok(value)
}

/// Same as [`require`] for optional inputs.
pub fn require_some<'a>(field: &str, value: Option<&'a str>) -> ValidationResult<&'a str> {
    require(field, value.unwrap_or_default())
}

/// Validates an `HH:mm` slot as returned by the availability endpoint.
pub fn validate_time_slot(slot: &str) -> ValidationResult<NaiveTime> {
    let slot = require("time", slot)?;
    let invalid = || ValidationError::InvalidFormat {
        field: "time".to_string(),
        reason: format!("expected HH:mm, got '{}'", slot),
    };
    if slot.len() != 5 {
        return Err(invalid());
    }
    NaiveTime::parse_from_str(slot, "%H:%M").map_err(|_| invalid())
}

/// Builds the booking timestamp `YYYY-MM-DD HH:mm`.
///
/// ## Example
/// ```rust
/// use booking_core::validation::appointment_timestamp;
/// use chrono::NaiveDate;
///
/// let date = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
/// assert_eq!(appointment_timestamp(date, "10:00").unwrap(), "2024-06-10 10:00");
/// ```
pub fn appointment_timestamp(date: NaiveDate, slot: &str) -> ValidationResult<String> {
    let time = validate_time_slot(slot)?;
    Ok(format!("{} {}", date.format("%Y-%m-%d"), time.format("%H:%M")))
}

// =============================================================================
// Form Checks
// =============================================================================

/// Login form: both fields required.
pub fn validate_login(email: &str, password: &str) -> ValidationResult<()> {
    require("email", email)?;
    require("password", password)?;
    Ok(())
}

/// Registration form.
///
/// ## Rules
/// - email and password required
/// - employees must name the establishment they belong to
///
/// Returns the establishment id to send (blank ids are dropped).
pub fn validate_registration<'a>(
    email: &str,
    password: &str,
    role: Role,
    establishment_id: Option<&'a str>,
) -> ValidationResult<Option<&'a str>> {
    validate_login(email, password)?;
    match role {
        Role::Employee => require_some("establishmentId", establishment_id).map(Some),
        Role::Establishment => Ok(establishment_id
            .map(str::trim)
            .filter(|id| !id.is_empty())),
    }
}

/// New employee form: name, email and phone required.
pub fn validate_new_employee(name: &str, email: &str, phone: &str) -> ValidationResult<()> {
    require("name", name)?;
    require("email", email)?;
    require("phone", phone)?;
    Ok(())
}

/// New service form. Returns the parsed duration in minutes.
pub fn validate_new_service(name: &str, price: &str, duration: &str) -> ValidationResult<u32> {
    require("name", name)?;
    require("price", price)?;
    let duration = require("duration", duration)?;
    duration
        .parse::<u32>()
        .map_err(|_| ValidationError::InvalidFormat {
            field: "duration".to_string(),
            reason: "must be a whole number of minutes".to_string(),
        })
}

// =============================================================================
// Unit Tests
// =============================================================================
