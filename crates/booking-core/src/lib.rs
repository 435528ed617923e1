//! # booking-core: Pure Domain Logic for the Booking Client
//!
//! Everything the booking client decides without touching the network,
//! storage or a clock: which view a URL asks for, what a session token
//! claims, which dates a month grid shows, and which availability query a
//! selection change requires.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Booking Client Architecture                        │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Host UI (web view / TUI)                     │   │
//! │  │    Auth ─► Plans ─► Dashboard        Public booking wizard      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ commands                               │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    booking-app                                  │   │
//! │  │    AppRouter, BookingWizard, SessionStore, timers               │   │
//! │  └──────────────┬───────────────────────────────┬──────────────────┘   │
//! │                 │                               │                       │
//! │  ┌──────────────▼──────────────────┐  ┌─────────▼──────────────────┐   │
//! │  │  ★ booking-core (THIS CRATE) ★  │  │  booking-client            │   │
//! │  │                                 │  │  RemoteBookingService      │   │
//! │  │  bootstrap  token  calendar     │  │  (reqwest)                 │   │
//! │  │  booking    validation  types   │  └────────────────────────────┘   │
//! │  │                                 │                                   │
//! │  │  NO I/O • NO TIMERS • NO CLOCK  │                                   │
//! │  └─────────────────────────────────┘                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Session, views, establishments, appointments
//! - [`bootstrap`] - URL query classification at page load
//! - [`token`] - Unverified token payload decoding
//! - [`calendar`] - Sunday-first month grids
//! - [`booking`] - Wizard selection and the availability cascade
//! - [`validation`] - Required fields and formats
//! - [`plans`] - Plan catalog
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use booking_core::booking::BookingSelection;
//! use chrono::NaiveDate;
//!
//! let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
//! let mut selection = BookingSelection::new("42", today);
//!
//! selection.set_services(["cut", "wash"]);
//! selection.select_employee(Some("ana".to_string()));
//! let query = selection
//!     .select_date(NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(), today)
//!     .unwrap()
//!     .expect("all inputs present");
//!
//! // A response for an older generation would be ignored.
//! assert!(selection.apply_availability(query.generation, vec!["09:00".into()]));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod booking;
pub mod bootstrap;
pub mod calendar;
pub mod error;
pub mod plans;
pub mod token;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use booking::{AvailabilityQuery, BookingRequest, BookingSelection};
pub use bootstrap::{BootstrapParams, BootstrapSignal, PaymentOutcome};
pub use error::{CoreError, CoreResult, DecodeError, ValidationError};
pub use token::{decode_token, TokenClaims, TokenDecode};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Seconds the payment status page counts down before leaving.
pub const PAYMENT_REDIRECT_SECS: u32 = 5;

/// Seconds a banner message stays visible.
pub const MESSAGE_DISPLAY_SECS: u64 = 5;
