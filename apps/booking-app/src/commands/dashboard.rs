//! # Dashboard Commands
//!
//! Management lists for the Dashboard view: profile, employees, weekly
//! availability, services and appointments.
//!
//! ## Removal With Confirmation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Host task A                         Host task B                        │
//! │  ───────────                         ───────────                        │
//! │  delete_service(&app, "s1")                                             │
//! │     │ prompt opens ─────────────────► get_pending_confirmation(&app)    │
//! │     │ (awaiting)                      respond_confirmation(id, true)    │
//! │     ◄──────────────────────────────────────┘                            │
//! │     ▼                                                                   │
//! │  DELETE /services/s1 ──► list refreshed ──► Ok(true)                    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use booking_core::{AppointmentStatus, EstablishmentProfile};
use serde::Deserialize;
use tracing::debug;

use crate::error::ApiError;
use crate::state::{DashboardState, WeeklySchedule};
use crate::BookingApp;

/// New employee form.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeForm {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// New service form. `duration` is minutes as typed.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceForm {
    pub name: String,
    pub price: String,
    pub duration: String,
}

/// Gets everything the dashboard renders.
pub fn get_dashboard(app: &BookingApp) -> Result<DashboardState, ApiError> {
    Ok(app.dashboard()?.snapshot())
}

/// Reloads every list the account can see.
pub async fn refresh_dashboard(app: &BookingApp) -> Result<DashboardState, ApiError> {
    debug!("refresh_dashboard command");
    let dashboard = app.dashboard()?;
    dashboard.load_all().await?;
    Ok(dashboard.snapshot())
}

// =============================================================================
// Profile
// =============================================================================

pub async fn save_profile(app: &BookingApp, profile: EstablishmentProfile) -> Result<(), ApiError> {
    debug!("save_profile command");
    app.dashboard()?.save_profile(profile).await
}

// =============================================================================
// Employees
// =============================================================================

pub async fn add_employee(app: &BookingApp, form: EmployeeForm) -> Result<(), ApiError> {
    debug!("add_employee command");
    app.dashboard()?
        .add_employee(&form.name, &form.email, &form.phone)
        .await
}

/// Removes an employee once the user confirms.
///
/// ## Returns
/// `true` if removed, `false` if the user said no.
pub async fn delete_employee(app: &BookingApp, employee_id: String) -> Result<bool, ApiError> {
    debug!(%employee_id, "delete_employee command");
    app.dashboard()?.delete_employee(&employee_id).await
}

// =============================================================================
// Weekly Availability
// =============================================================================

/// Opens the weekly hours of one employee for editing.
pub async fn select_availability_employee(
    app: &BookingApp,
    employee_id: Option<String>,
) -> Result<WeeklySchedule, ApiError> {
    debug!(?employee_id, "select_availability_employee command");
    app.dashboard()?
        .select_availability_employee(employee_id)
        .await
}

/// Edits one weekday (0 = Sunday). Blank times clear that end.
pub fn set_availability_day(
    app: &BookingApp,
    day_of_week: u8,
    start: Option<String>,
    end: Option<String>,
) -> Result<(), ApiError> {
    app.dashboard()?.set_availability_day(day_of_week, start, end)
}

/// Saves the edited week. Returns how many days were sent.
pub async fn save_availability(app: &BookingApp) -> Result<usize, ApiError> {
    debug!("save_availability command");
    app.dashboard()?.save_availability().await
}

// =============================================================================
// Services
// =============================================================================

pub async fn add_service(app: &BookingApp, form: ServiceForm) -> Result<(), ApiError> {
    debug!("add_service command");
    app.dashboard()?
        .add_service(&form.name, &form.price, &form.duration)
        .await
}

/// Removes a service once the user confirms.
pub async fn delete_service(app: &BookingApp, service_id: String) -> Result<bool, ApiError> {
    debug!(%service_id, "delete_service command");
    app.dashboard()?.delete_service(&service_id).await
}

// =============================================================================
// Appointments
// =============================================================================

pub async fn update_appointment_status(
    app: &BookingApp,
    appointment_id: String,
    status: AppointmentStatus,
) -> Result<(), ApiError> {
    debug!(%appointment_id, %status, "update_appointment_status command");
    app.dashboard()?
        .update_appointment_status(&appointment_id, status)
        .await
}

// =============================================================================
// Unit Tests
// =============================================================================
