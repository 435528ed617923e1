//! # booking-client: REST API Client
//!
//! The booking app never builds a URL or parses a response itself; it
//! talks to a [`RemoteBookingService`]. Production uses
//! [`HttpBookingService`], tests substitute fakes.
//!
//! ## Usage
//! ```rust,no_run
//! use booking_client::{HttpBookingService, RemoteBookingService, DEFAULT_TIMEOUT};
//!
//! # async fn run() -> Result<(), booking_client::ClientError> {
//! let api = HttpBookingService::new("http://localhost:3000/api", DEFAULT_TIMEOUT)?;
//! let details = api.establishment_details("42").await?;
//! println!("{} offers {} services", details.name, details.services.len());
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod http;
pub mod service;

pub use error::{ClientError, ClientResult};
pub use http::{HttpBookingService, DEFAULT_TIMEOUT};
pub use service::{
    AppointmentScope, LoginResponse, MessageBody, NewEmployee, NewService, RegisterRequest,
    RemoteBookingService,
};
