//! In-memory fakes shared by the app's unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use booking_client::{
    AppointmentScope, ClientError, ClientResult, NewEmployee, NewService, RegisterRequest,
    RemoteBookingService,
};
use booking_core::{
    Appointment, AppointmentStatus, AvailabilityQuery, BookingRequest, Employee,
    EstablishmentDetails, EstablishmentProfile, ServiceOffering, Session, WeeklyAvailability,
};
use url::Url;

use crate::state::Navigator;

/// Three-part token whose payload is `payload_json`.
pub fn make_token(payload_json: &str) -> String {
    format!(
        "eyJhbGciOiJIUzI1NiJ9.{}.signature",
        URL_SAFE_NO_PAD.encode(payload_json)
    )
}

// =============================================================================
// Navigator
// =============================================================================

#[derive(Default)]
pub struct RecordingNavigator {
    replaced: Mutex<Vec<String>>,
    root_visits: AtomicUsize,
}

impl RecordingNavigator {
    pub fn replaced(&self) -> Vec<String> {
        self.replaced.lock().unwrap().clone()
    }

    pub fn root_visits(&self) -> usize {
        self.root_visits.load(Ordering::SeqCst)
    }
}

impl Navigator for RecordingNavigator {
    fn replace_url(&self, url: &Url) {
        self.replaced.lock().unwrap().push(url.to_string());
    }

    fn navigate_root(&self) {
        self.root_visits.fetch_add(1, Ordering::SeqCst);
    }
}

// =============================================================================
// Remote Service
// =============================================================================

/// Canned responses plus a record of every call.
#[derive(Default)]
pub struct FakeState {
    pub login: Option<ClientResult<Session>>,
    pub register: Option<ClientResult<Option<String>>>,
    pub details: Option<ClientResult<EstablishmentDetails>>,
    /// Slots by employee id; missing employees get an empty list.
    pub slots: HashMap<String, ClientResult<Vec<String>>>,
    pub slot_delay: HashMap<String, Duration>,
    pub book: Option<ClientResult<()>>,
    pub profile: Option<ClientResult<EstablishmentProfile>>,
    pub employees: Vec<Employee>,
    pub services: Vec<ServiceOffering>,
    pub appointments: Vec<Appointment>,
    pub weekly: Vec<WeeklyAvailability>,
    /// Per-employee windows; employees not listed get `weekly`.
    pub weekly_by_employee: HashMap<String, Vec<WeeklyAvailability>>,
    pub weekly_delay: HashMap<String, Duration>,
    /// Returned by every list read when set.
    pub fail_lists: Option<ClientError>,
    /// Returned by every write when set.
    pub fail_writes: Option<ClientError>,

    pub calls: Vec<String>,
    pub availability_queries: Vec<AvailabilityQuery>,
    pub bookings: Vec<BookingRequest>,
    pub saved_weekly: Vec<Vec<WeeklyAvailability>>,
    pub tokens: Vec<String>,
}

#[derive(Default)]
pub struct FakeService {
    state: Mutex<FakeState>,
}

impl FakeService {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut FakeState) -> R,
    {
        f(&mut self.state.lock().unwrap())
    }

    pub fn calls(&self) -> Vec<String> {
        self.with(|s| s.calls.clone())
    }

    pub fn call_count(&self, prefix: &str) -> usize {
        self.with(|s| s.calls.iter().filter(|c| c.starts_with(prefix)).count())
    }

    fn record(&self, call: String) {
        self.with(|s| s.calls.push(call));
    }

    fn authed(&self, token: &str, call: String) {
        self.with(|s| {
            s.tokens.push(token.to_string());
            s.calls.push(call);
        });
    }

    fn read<T: Clone>(&self, pick: impl FnOnce(&FakeState) -> T) -> ClientResult<T> {
        self.with(|s| match &s.fail_lists {
            Some(e) => Err(e.clone()),
            None => Ok(pick(s)),
        })
    }

    fn write(&self) -> ClientResult<()> {
        self.with(|s| match &s.fail_writes {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        })
    }
}

#[async_trait]
impl RemoteBookingService for FakeService {
    async fn login(&self, email: &str, _password: &str) -> ClientResult<Session> {
        self.record(format!("login:{email}"));
        self.with(|s| s.login.clone())
            .unwrap_or_else(|| Err(ClientError::Network("no login configured".into())))
    }

    async fn register(&self, request: &RegisterRequest) -> ClientResult<Option<String>> {
        self.record(format!("register:{}", request.email));
        self.with(|s| s.register.clone()).unwrap_or(Ok(None))
    }

    async fn establishment_details(
        &self,
        establishment_id: &str,
    ) -> ClientResult<EstablishmentDetails> {
        self.record(format!("details:{establishment_id}"));
        self.with(|s| s.details.clone())
            .unwrap_or_else(|| Ok(EstablishmentDetails::default()))
    }

    async fn availability(&self, query: &AvailabilityQuery) -> ClientResult<Vec<String>> {
        let (delay, result) = self.with(|s| {
            s.calls.push(format!("availability:{}", query.employee_id));
            s.availability_queries.push(query.clone());
            (
                s.slot_delay.get(&query.employee_id).copied(),
                s.slots
                    .get(&query.employee_id)
                    .cloned()
                    .unwrap_or_else(|| Ok(Vec::new())),
            )
        });
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        result
    }

    async fn book(&self, request: &BookingRequest) -> ClientResult<()> {
        self.with(|s| {
            s.calls.push("book".into());
            s.bookings.push(request.clone());
            s.book.clone().unwrap_or(Ok(()))
        })
    }

    async fn establishment_profile(
        &self,
        token: &str,
        establishment_id: &str,
    ) -> ClientResult<EstablishmentProfile> {
        self.authed(token, format!("profile:{establishment_id}"));
        self.with(|s| s.profile.clone())
            .unwrap_or_else(|| Ok(EstablishmentProfile::default()))
    }

    async fn update_establishment_profile(
        &self,
        token: &str,
        establishment_id: &str,
        _profile: &EstablishmentProfile,
    ) -> ClientResult<()> {
        self.authed(token, format!("update_profile:{establishment_id}"));
        self.write()
    }

    async fn employees(&self, token: &str, establishment_id: &str) -> ClientResult<Vec<Employee>> {
        self.authed(token, format!("employees:{establishment_id}"));
        self.read(|s| s.employees.clone())
    }

    async fn add_employee(
        &self,
        token: &str,
        establishment_id: &str,
        employee: &NewEmployee,
    ) -> ClientResult<()> {
        self.authed(token, format!("add_employee:{establishment_id}:{}", employee.name));
        self.write()
    }

    async fn delete_employee(&self, token: &str, employee_id: &str) -> ClientResult<()> {
        self.authed(token, format!("delete_employee:{employee_id}"));
        self.write()
    }

    async fn employee_availability(
        &self,
        token: &str,
        employee_id: &str,
    ) -> ClientResult<Vec<WeeklyAvailability>> {
        self.authed(token, format!("weekly:{employee_id}"));
        let delay = self.with(|s| s.weekly_delay.get(employee_id).copied());
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.read(|s| {
            s.weekly_by_employee
                .get(employee_id)
                .cloned()
                .unwrap_or_else(|| s.weekly.clone())
        })
    }

    async fn update_employee_availability(
        &self,
        token: &str,
        employee_id: &str,
        windows: &[WeeklyAvailability],
    ) -> ClientResult<()> {
        self.authed(token, format!("update_weekly:{employee_id}"));
        self.with(|s| s.saved_weekly.push(windows.to_vec()));
        self.write()
    }

    async fn services(
        &self,
        token: &str,
        establishment_id: &str,
    ) -> ClientResult<Vec<ServiceOffering>> {
        self.authed(token, format!("services:{establishment_id}"));
        self.read(|s| s.services.clone())
    }

    async fn add_service(
        &self,
        token: &str,
        establishment_id: &str,
        service: &NewService,
    ) -> ClientResult<()> {
        self.authed(
            token,
            format!("add_service:{establishment_id}:{}:{}", service.name, service.duration),
        );
        self.write()
    }

    async fn delete_service(&self, token: &str, service_id: &str) -> ClientResult<()> {
        self.authed(token, format!("delete_service:{service_id}"));
        self.write()
    }

    async fn appointments(
        &self,
        token: &str,
        scope: &AppointmentScope,
    ) -> ClientResult<Vec<Appointment>> {
        let call = match scope {
            AppointmentScope::Establishment(id) => format!("appointments:establishment:{id}"),
            AppointmentScope::Employee(id) => format!("appointments:employee:{id}"),
        };
        self.authed(token, call);
        self.read(|s| s.appointments.clone())
    }

    async fn update_appointment_status(
        &self,
        token: &str,
        appointment_id: &str,
        status: AppointmentStatus,
    ) -> ClientResult<()> {
        self.authed(token, format!("status:{appointment_id}:{status}"));
        self.write()
    }
}
