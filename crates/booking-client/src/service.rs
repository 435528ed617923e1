//! # RemoteBookingService
//!
//! The REST API as seen by the app: one async method per endpoint.
//!
//! ## Endpoints
//! ```text
//! ┌──────────────────────────────────────────────┬──────────────────────────┐
//! │ Public                                       │ Method                   │
//! ├──────────────────────────────────────────────┼──────────────────────────┤
//! │ POST /auth/login                             │ login                    │
//! │ POST /auth/register                          │ register                 │
//! │ GET  /establishment/public/:id               │ establishment_details    │
//! │ POST /booking/availability                   │ availability             │
//! │ POST /booking                                │ book                     │
//! ├──────────────────────────────────────────────┼──────────────────────────┤
//! │ Bearer token                                 │                          │
//! ├──────────────────────────────────────────────┼──────────────────────────┤
//! │ GET|PUT  /establishment/:id                  │ (update_)profile         │
//! │ GET|POST /establishment/:id/employees        │ employees / add_employee │
//! │ DELETE   /employees/:id                      │ delete_employee          │
//! │ GET|PUT  /employees/:id/availability         │ (update_)employee_avail. │
//! │ GET|POST /establishment/:id/services         │ services / add_service   │
//! │ DELETE   /services/:id                       │ delete_service           │
//! │ GET      /establishment/:id/appointments     │ appointments             │
//! │ GET      /employee/:id/appointments          │ appointments             │
//! │ PUT      /appointments/:id/status            │ update_appointment_status│
//! └──────────────────────────────────────────────┴──────────────────────────┘
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use booking_core::types::flex;
use booking_core::{
    Appointment, AppointmentStatus, AvailabilityQuery, BookingRequest, Employee,
    EstablishmentDetails, EstablishmentProfile, Role, ServiceOffering, Session,
    WeeklyAvailability,
};

use crate::error::ClientResult;

// =============================================================================
// Request Bodies
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub establishment_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewEmployee {
    pub name: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewService {
    pub name: String,
    pub price: String,
    /// Minutes.
    pub duration: u32,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct StatusUpdate {
    pub status: AppointmentStatus,
}

// =============================================================================
// Response Bodies
// =============================================================================

/// Successful login payload.
///
/// The server has used both English and Portuguese names for the plan
/// fields; both are accepted.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub role: Role,
    #[serde(default, deserialize_with = "flex::option_string_or_number")]
    pub establishment_id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, alias = "planoAtivo")]
    pub plan_active: bool,
    #[serde(
        default,
        alias = "dataExpiracaoPlano",
        deserialize_with = "flex::option_string_or_number"
    )]
    pub plan_expires_at: Option<String>,
}

impl LoginResponse {
    /// Builds the session; `email_entered` fills in a missing email.
    pub fn into_session(self, email_entered: &str) -> Session {
        Session {
            token: self.token,
            role: self.role,
            establishment_id: self.establishment_id.filter(|id| !id.is_empty()),
            email: self.email.unwrap_or_else(|| email_entered.to_string()),
            plan_active: self.plan_active,
            plan_expires_at: self.plan_expires_at,
        }
    }
}

/// `{ "message": "..." }` bodies used for both success notes and errors.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageBody {
    #[serde(default)]
    pub message: Option<String>,
}

// =============================================================================
// Appointment Scope
// =============================================================================

/// Whose appointments to list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppointmentScope {
    /// All appointments of an establishment.
    Establishment(String),
    /// Appointments assigned to one employee.
    Employee(String),
}

impl AppointmentScope {
    pub(crate) fn segments(&self) -> [&str; 3] {
        match self {
            AppointmentScope::Establishment(id) => ["establishment", id.as_str(), "appointments"],
            AppointmentScope::Employee(id) => ["employee", id.as_str(), "appointments"],
        }
    }
}

// =============================================================================
// Service Trait
// =============================================================================

/// The REST API collaborator.
///
/// Implemented by [`crate::HttpBookingService`]; tests provide fakes.
#[async_trait]
pub trait RemoteBookingService: Send + Sync {
    // ---- public ------------------------------------------------------------

    async fn login(&self, email: &str, password: &str) -> ClientResult<Session>;

    /// Returns the server's confirmation message, if it sent one.
    async fn register(&self, request: &RegisterRequest) -> ClientResult<Option<String>>;

    async fn establishment_details(&self, establishment_id: &str)
        -> ClientResult<EstablishmentDetails>;

    /// Offered `HH:mm` slots for the query's triple.
    async fn availability(&self, query: &AvailabilityQuery) -> ClientResult<Vec<String>>;

    async fn book(&self, request: &BookingRequest) -> ClientResult<()>;

    // ---- authenticated -----------------------------------------------------

    async fn establishment_profile(
        &self,
        token: &str,
        establishment_id: &str,
    ) -> ClientResult<EstablishmentProfile>;

    async fn update_establishment_profile(
        &self,
        token: &str,
        establishment_id: &str,
        profile: &EstablishmentProfile,
    ) -> ClientResult<()>;

    async fn employees(&self, token: &str, establishment_id: &str) -> ClientResult<Vec<Employee>>;

    async fn add_employee(
        &self,
        token: &str,
        establishment_id: &str,
        employee: &NewEmployee,
    ) -> ClientResult<()>;

    async fn delete_employee(&self, token: &str, employee_id: &str) -> ClientResult<()>;

    async fn employee_availability(
        &self,
        token: &str,
        employee_id: &str,
    ) -> ClientResult<Vec<WeeklyAvailability>>;

    async fn update_employee_availability(
        &self,
        token: &str,
        employee_id: &str,
        windows: &[WeeklyAvailability],
    ) -> ClientResult<()>;

    async fn services(
        &self,
        token: &str,
        establishment_id: &str,
    ) -> ClientResult<Vec<ServiceOffering>>;

    async fn add_service(
        &self,
        token: &str,
        establishment_id: &str,
        service: &NewService,
    ) -> ClientResult<()>;

    async fn delete_service(&self, token: &str, service_id: &str) -> ClientResult<()>;

    async fn appointments(
        &self,
        token: &str,
        scope: &AppointmentScope,
    ) -> ClientResult<Vec<Appointment>>;

    async fn update_appointment_status(
        &self,
        token: &str,
        appointment_id: &str,
        status: AppointmentStatus,
    ) -> ClientResult<()>;
}

// =============================================================================
// Unit Tests
// =============================================================================
