//! # Auth Commands
//!
//! Login and registration on the Auth view.

use booking_core::ViewState;
use tracing::debug;

use crate::error::ApiError;
use crate::state::{AuthMode, RegistrationForm};
use crate::BookingApp;

/// Gets which auth form is showing.
pub fn get_auth_mode(app: &BookingApp) -> AuthMode {
    app.auth().mode()
}

/// Switches between the login and registration forms.
pub fn set_auth_mode(app: &BookingApp, mode: AuthMode) {
    debug!(?mode, "set_auth_mode command");
    app.auth().set_mode(mode);
}

/// Logs in with email and password.
///
/// ## Returns
/// The landing view: `Dashboard` with an active plan, else `PlanSelection`.
///
/// ## Errors
/// - `VALIDATION_ERROR` when either field is blank (nothing is sent)
/// - `SERVER_REJECTION` with the server's text, e.g. bad credentials
/// - `INVALID_STATE` outside the Auth view
pub async fn login(app: &BookingApp, email: String, password: String) -> Result<ViewState, ApiError> {
    debug!("login command");
    app.auth().login(&email, &password).await?;
    Ok(app.sync_view().await)
}

/// Registers an account and switches back to the login form.
///
/// Employees must name the establishment they belong to.
pub async fn register(app: &BookingApp, form: RegistrationForm) -> Result<String, ApiError> {
    debug!(role = %form.role, "register command");
    app.auth().register(form).await
}

// =============================================================================
// Unit Tests
// =============================================================================
