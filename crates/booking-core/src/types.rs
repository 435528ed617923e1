//! # Domain Types
//!
//! Core data types shared by the router, the booking wizard, and the
//! dashboard lists.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Domain Types                                   │
//! │                                                                         │
//! │  Identity             Public booking          Dashboard                 │
//! │  ────────             ──────────────          ─────────                 │
//! │  Session              EstablishmentDetails    EstablishmentProfile      │
//! │  Role                 ServiceOffering         Appointment               │
//! │                       Employee                AppointmentStatus         │
//! │  View routing                                 WeeklyAvailability        │
//! │  ────────────         Feedback                                          │
//! │  ViewState            ────────                                          │
//! │                       Notification / MessageKind                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire Leniency
//! The REST API is not consistent about identifier types: some endpoints
//! return `"id": 7`, others `"id": "7"`. Identifiers and prices are
//! normalized to `String` on the way in (see [`flex`]).

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::bootstrap::PaymentOutcome;
use crate::error::ValidationError;

// =============================================================================
// Role
// =============================================================================

/// Account role of an authenticated user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Owner account managing an establishment.
    Establishment,
    /// Employee account attached to an establishment.
    Employee,
}

impl Role {
    /// Wire/storage representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Establishment => "establishment",
            Role::Employee => "employee",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "establishment" => Ok(Role::Establishment),
            "employee" => Ok(Role::Employee),
            _ => Err(ValidationError::NotAllowed {
                field: "role".to_string(),
                allowed: vec!["establishment".to_string(), "employee".to_string()],
            }),
        }
    }
}

// =============================================================================
// Session
// =============================================================================

/// The authenticated identity.
///
/// ## Invariants
/// - `token` and `role` are always present together; "no session" is
///   `Option<Session>::None`, never a half-filled struct.
/// - Replaced wholesale on login / token redirect, destroyed on logout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Opaque bearer token.
    pub token: String,

    /// Account role.
    pub role: Role,

    /// Establishment the account belongs to (absent for unattached employees).
    pub establishment_id: Option<String>,

    /// Login email.
    pub email: String,

    /// Whether a paid or free plan is active.
    pub plan_active: bool,

    /// Plan expiry as sent by the server (ISO date or date-time).
    pub plan_expires_at: Option<String>,
}

impl Session {
    /// Parses the date part of `plan_expires_at`, if any.
    pub fn plan_expiry_date(&self) -> Option<chrono::NaiveDate> {
        let raw = self.plan_expires_at.as_deref()?;
        let date_part = raw.get(..10)?;
        chrono::NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
    }
}

// =============================================================================
// View State
// =============================================================================

/// The single active top-level view.
///
/// Exactly one variant is active at a time, so "two views visible" is
/// unrepresentable and switching views is a single assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "view", rename_all = "camelCase")]
pub enum ViewState {
    /// Bootstrap has not finished yet.
    Loading,
    /// Login / register forms.
    Auth,
    /// Session exists but no plan is active.
    PlanSelection,
    /// Authenticated management area.
    Dashboard,
    /// Public booking wizard bound to one establishment.
    #[serde(rename_all = "camelCase")]
    PublicBooking { establishment_id: String },
    /// Terminal page after the payment gateway redirects back.
    PaymentStatus { outcome: PaymentOutcome },
}

impl ViewState {
    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            ViewState::Loading => "loading",
            ViewState::Auth => "auth",
            ViewState::PlanSelection => "plan_selection",
            ViewState::Dashboard => "dashboard",
            ViewState::PublicBooking { .. } => "public_booking",
            ViewState::PaymentStatus { .. } => "payment_status",
        }
    }

    /// Landing view for a restored or freshly authenticated session.
    pub fn for_session(session: &Session) -> Self {
        if session.plan_active {
            ViewState::Dashboard
        } else {
            ViewState::PlanSelection
        }
    }
}

// =============================================================================
// Notifications
// =============================================================================

/// Severity of a transient banner message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    #[default]
    Info,
    Success,
    Error,
}

/// A banner message. `id` lets a clear timer check it still owns the slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: u64,
    pub text: String,
    pub kind: MessageKind,
}

// =============================================================================
// Public Booking Entities
// =============================================================================

/// A bookable service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ServiceOffering {
    #[serde(deserialize_with = "flex::string_or_number")]
    pub id: String,
    pub name: String,
    /// Price as displayed (the server sends either a number or a string).
    #[serde(default, deserialize_with = "flex::string_or_number")]
    pub price: String,
    /// Duration in minutes.
    #[serde(default)]
    pub duration: u32,
}

/// An employee that can be booked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    #[serde(deserialize_with = "flex::string_or_number")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

/// Public view of an establishment: what the booking wizard needs.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct EstablishmentDetails {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub services: Vec<ServiceOffering>,
    #[serde(default)]
    pub employees: Vec<Employee>,
}

// =============================================================================
// Dashboard Entities
// =============================================================================

/// Editable establishment profile.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct EstablishmentProfile {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub description: String,
}

/// Lifecycle of a booked appointment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    #[default]
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    pub const ALL: [AppointmentStatus; 4] = [
        AppointmentStatus::Pending,
        AppointmentStatus::Confirmed,
        AppointmentStatus::Completed,
        AppointmentStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "pending",
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AppointmentStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AppointmentStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s.trim())
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "status".to_string(),
                allowed: AppointmentStatus::ALL
                    .iter()
                    .map(|s| s.as_str().to_string())
                    .collect(),
            })
    }
}

/// A booked appointment as listed on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    #[serde(deserialize_with = "flex::string_or_number")]
    pub id: String,
    #[serde(alias = "appointmentDateTime")]
    pub date_time: String,
    #[serde(default)]
    pub service_name: String,
    #[serde(default)]
    pub client_name: String,
    #[serde(default)]
    pub client_phone: String,
    #[serde(default)]
    pub employee_name: String,
    #[serde(default)]
    pub status: AppointmentStatus,
}

/// One weekday window of an employee's recurring availability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyAvailability {
    /// 0 = Sunday .. 6 = Saturday.
    pub day_of_week: u8,
    /// `HH:mm`
    pub start_time: String,
    /// `HH:mm`
    pub end_time: String,
}

// =============================================================================
// Lenient Deserializers
// =============================================================================

/// Deserializers that accept either JSON strings or numbers.
pub mod flex {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        Str(String),
        Int(i64),
        Float(f64),
    }

    impl From<StringOrNumber> for String {
        fn from(value: StringOrNumber) -> Self {
            match value {
                StringOrNumber::Str(s) => s,
                StringOrNumber::Int(n) => n.to_string(),
                StringOrNumber::Float(f) => f.to_string(),
            }
        }
    }

    /// `"7"` and `7` both become `"7"`.
    pub fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        StringOrNumber::deserialize(deserializer).map(String::from)
    }

    /// Same as [`string_or_number`], allowing `null` / absent.
    pub fn option_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<StringOrNumber>::deserialize(deserializer).map(|v| v.map(String::from))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse_and_display() {
        assert_eq!("employee".parse::<Role>().unwrap(), Role::Employee);
        assert_eq!(Role::Establishment.to_string(), "establishment");
        assert!("admin".parse::<Role>().is_err());
    }

    #[test]
    fn test_view_for_session_follows_plan_flag() {
        let mut session = Session {
            token: "t".into(),
            role: Role::Establishment,
            establishment_id: Some("9".into()),
            email: "a@b.c".into(),
            plan_active: true,
            plan_expires_at: None,
        };
        assert_eq!(ViewState::for_session(&session), ViewState::Dashboard);
        session.plan_active = false;
        assert_eq!(ViewState::for_session(&session), ViewState::PlanSelection);
    }

    #[test]
    fn test_plan_expiry_date_accepts_datetime() {
        let session = Session {
            token: "t".into(),
            role: Role::Establishment,
            establishment_id: None,
            email: "a@b.c".into(),
            plan_active: true,
            plan_expires_at: Some("2024-07-01T00:00:00.000Z".into()),
        };
        assert_eq!(
            session.plan_expiry_date(),
            chrono::NaiveDate::from_ymd_opt(2024, 7, 1)
        );
    }

    #[test]
    fn test_numeric_ids_are_normalized() {
        let json = r#"{"name":"Studio","services":[{"id":3,"name":"Cut","price":49.5,"duration":30}],
                       "employees":[{"id":"e1","name":"Ana"}]}"#;
        let details: EstablishmentDetails = serde_json::from_str(json).unwrap();
        assert_eq!(details.services[0].id, "3");
        assert_eq!(details.services[0].price, "49.5");
        assert_eq!(details.employees[0].id, "e1");
        assert_eq!(details.description, None);
    }

    #[test]
    fn test_appointment_accepts_original_field_names() {
        let json = r#"{"id":1,"appointmentDateTime":"2024-06-10 10:00","serviceName":"Cut",
                       "clientName":"Bo","clientPhone":"555","employeeName":"Ana","status":"confirmed"}"#;
        let appt: Appointment = serde_json::from_str(json).unwrap();
        assert_eq!(appt.date_time, "2024-06-10 10:00");
        assert_eq!(appt.status, AppointmentStatus::Confirmed);
    }

    #[test]
    fn test_appointment_status_parse() {
        assert_eq!(
            "completed".parse::<AppointmentStatus>().unwrap(),
            AppointmentStatus::Completed
        );
        assert!("archived".parse::<AppointmentStatus>().is_err());
    }

    #[test]
    fn test_view_state_serializes_tagged() {
        let view = ViewState::PublicBooking {
            establishment_id: "42".into(),
        };
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["view"], "publicBooking");
        assert_eq!(json["establishmentId"], "42");
    }
}
