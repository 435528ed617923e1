//! # Commands Module
//!
//! Every operation a host UI can invoke on the booking app.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs        ◄─── You are here (exports)
//! ├── router.rs     ◄─── Views, session, messages, confirmations, plans
//! ├── auth.rs       ◄─── Login / registration
//! ├── booking.rs    ◄─── Public booking wizard
//! ├── dashboard.rs  ◄─── Management lists
//! └── config.rs     ◄─── Configuration retrieval
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Command Flow                                         │
//! │                                                                         │
//! │  Host UI                                                                │
//! │  ───────                                                                │
//! │  select_booking_date(&app, "2024-06-14")                                │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  async fn select_booking_date(                                          │
//! │      app: &BookingApp,      ◄── Shared app context                     │
//! │      date: NaiveDate,       ◄── Typed input                            │
//! │  ) -> Result<Vec<String>, ApiError>                                     │
//! │         │                                                               │
//! │         │ (JSON serialization)                                          │
//! │         ▼                                                               │
//! │  Host receives: ["09:00", "09:30"] or { code, message }                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Commands that can switch the view finish with
//! [`BookingApp::sync_view`](crate::BookingApp::sync_view) so the matching
//! wizard or dashboard is mounted before they return.

pub mod auth;
pub mod booking;
pub mod config;
pub mod dashboard;
pub mod router;

pub use auth::*;
pub use booking::*;
pub use config::*;
pub use dashboard::*;
pub use router::*;
