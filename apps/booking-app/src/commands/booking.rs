//! # Booking Commands
//!
//! The public booking wizard, available while the PublicBooking view is
//! mounted.
//!
//! ## Wizard Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  client name/phone ─┐                                                   │
//! │  services ──────────┼──► (all three set) ──► GET availability ──► slots │
//! │  employee ──────────┤                             ▲                     │
//! │  date ──────────────┘  any change re-fetches ─────┘                     │
//! │                                                                         │
//! │  time slot ──► submit_booking ──► POST appointment ──► reset wizard    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every command here fails with `INVALID_STATE` when no booking page is
//! open.

use booking_core::calendar::CalendarDay;
use chrono::NaiveDate;
use tracing::debug;

use crate::error::ApiError;
use crate::state::WizardSnapshot;
use crate::BookingApp;

/// Gets everything the booking page renders.
pub fn get_booking_state(app: &BookingApp) -> Result<WizardSnapshot, ApiError> {
    Ok(app.wizard()?.snapshot())
}

/// Reloads the establishment's services and employees.
pub async fn reload_establishment(app: &BookingApp) -> Result<WizardSnapshot, ApiError> {
    debug!("reload_establishment command");
    let wizard = app.wizard()?;
    let loaded = wizard.load().await;
    app.sync_view().await;
    loaded?;
    Ok(wizard.snapshot())
}

pub fn set_client_name(app: &BookingApp, name: String) -> Result<(), ApiError> {
    app.wizard()?.set_client_name(name);
    Ok(())
}

pub fn set_client_phone(app: &BookingApp, phone: String) -> Result<(), ApiError> {
    app.wizard()?.set_client_phone(phone);
    Ok(())
}

/// Adds or removes one service.
///
/// ## Returns
/// The slots for the new selection (empty while incomplete).
pub async fn toggle_booking_service(
    app: &BookingApp,
    service_id: String,
) -> Result<Vec<String>, ApiError> {
    debug!(%service_id, "toggle_booking_service command");
    Ok(app.wizard()?.toggle_service(&service_id).await)
}

/// Replaces the whole service selection.
pub async fn set_booking_services(
    app: &BookingApp,
    service_ids: Vec<String>,
) -> Result<Vec<String>, ApiError> {
    debug!(count = service_ids.len(), "set_booking_services command");
    Ok(app.wizard()?.set_services(service_ids).await)
}

/// Picks the employee; `None` clears the choice.
pub async fn select_booking_employee(
    app: &BookingApp,
    employee_id: Option<String>,
) -> Result<Vec<String>, ApiError> {
    debug!(?employee_id, "select_booking_employee command");
    Ok(app.wizard()?.select_employee(employee_id).await)
}

/// Picks a calendar day.
///
/// ## Errors
/// `VALIDATION_ERROR` for a day before today.
pub async fn select_booking_date(
    app: &BookingApp,
    date: NaiveDate,
) -> Result<Vec<String>, ApiError> {
    debug!(%date, "select_booking_date command");
    app.wizard()?.select_date(date).await
}

/// Clears the chosen day; the offered slots empty without a lookup.
pub fn clear_booking_date(app: &BookingApp) -> Result<Vec<String>, ApiError> {
    debug!("clear_booking_date command");
    Ok(app.wizard()?.clear_date())
}

/// Picks one of the offered slots.
pub fn select_booking_time(app: &BookingApp, slot: String) -> Result<(), ApiError> {
    debug!(%slot, "select_booking_time command");
    app.wizard()?.select_time(&slot)
}

/// Shows the previous month; returns its first day.
pub fn show_previous_month(app: &BookingApp) -> Result<NaiveDate, ApiError> {
    app.wizard()?.previous_month()
}

/// Shows the next month; returns its first day.
pub fn show_next_month(app: &BookingApp) -> Result<NaiveDate, ApiError> {
    app.wizard()?.next_month()
}

/// Gets the 42-cell grid for the displayed month.
pub fn get_booking_calendar(app: &BookingApp) -> Result<Vec<CalendarDay>, ApiError> {
    Ok(app.wizard()?.calendar())
}

/// Books the appointment.
///
/// ## Errors
/// - `VALIDATION_ERROR` when any field is missing (nothing is sent)
/// - `SERVER_REJECTION` with the server's text, e.g. slot already taken
pub async fn submit_booking(app: &BookingApp) -> Result<(), ApiError> {
    debug!("submit_booking command");
    app.wizard()?.submit().await
}

// =============================================================================
// Unit Tests
// =============================================================================
