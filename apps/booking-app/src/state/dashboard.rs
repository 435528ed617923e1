//! # Dashboard
//!
//! The authenticated management area.
//!
//! ## Lists
//! ```text
//! ┌──────────────┬──────────────────────────────────┬─────────────────────────┐
//! │ List         │ Read                             │ Writes                  │
//! ├──────────────┼──────────────────────────────────┼─────────────────────────┤
//! │ profile      │ GET /establishment/:id           │ PUT                     │
//! │ employees    │ GET /establishment/:id/employees │ POST, DELETE (confirm)  │
//! │ availability │ GET /employees/:id/availability  │ PUT (complete days)     │
//! │ services     │ GET /establishment/:id/services  │ POST, DELETE (confirm)  │
//! │ appointments │ GET /{establishment|employee}/…  │ PUT …/status            │
//! └──────────────┴──────────────────────────────────┴─────────────────────────┘
//! ```
//!
//! Each list has its own [`ListState`], so one failing list never blanks
//! the others. Every call carries the session token.

use std::future::Future;
use std::sync::{Arc, Mutex};

use booking_client::{
    AppointmentScope, ClientResult, NewEmployee, NewService, RemoteBookingService,
};
use booking_core::validation::{validate_new_employee, validate_new_service, validate_time_slot};
use booking_core::{
    Appointment, AppointmentStatus, CoreError, Employee, EstablishmentProfile, MessageKind, Role,
    ServiceOffering, Session, ValidationError, WeeklyAvailability,
};
use serde::Serialize;
use tracing::{debug, info, warn};
use url::Url;

use super::router::AppRouter;
use crate::error::ApiError;
use crate::messages;

// =============================================================================
// List State
// =============================================================================

/// One independently refreshed list.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListState<T> {
    pub items: T,
    pub loading: bool,
    pub error: Option<String>,
}

// =============================================================================
// Weekly Schedule
// =============================================================================

/// Working hours for one weekday. Both ends empty means "off".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DayWindow {
    pub start: Option<String>,
    pub end: Option<String>,
}

/// Editable 7-day table, index 0 = Sunday.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WeeklySchedule {
    pub days: [DayWindow; 7],
}

impl WeeklySchedule {
    pub fn from_windows(windows: &[WeeklyAvailability]) -> Self {
        let mut schedule = WeeklySchedule::default();
        for window in windows {
            if let Some(day) = schedule.days.get_mut(usize::from(window.day_of_week)) {
                day.start = Some(window.start_time.clone());
                day.end = Some(window.end_time.clone());
            }
        }
        schedule
    }

    /// Days with both a start and an end, in weekday order.
    pub fn to_windows(&self) -> Vec<WeeklyAvailability> {
        (0u8..)
            .zip(self.days.iter())
            .filter_map(|(day_of_week, day)| match (&day.start, &day.end) {
                (Some(start), Some(end)) => Some(WeeklyAvailability {
                    day_of_week,
                    start_time: start.clone(),
                    end_time: end.clone(),
                }),
                _ => None,
            })
            .collect()
    }
}

// =============================================================================
// Dashboard
// =============================================================================

/// Everything the Dashboard view renders.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardState {
    pub profile: ListState<Option<EstablishmentProfile>>,
    pub employees: ListState<Vec<Employee>>,
    pub services: ListState<Vec<ServiceOffering>>,
    pub appointments: ListState<Vec<Appointment>>,
    pub availability: ListState<WeeklySchedule>,
    /// Employee whose weekly hours are being edited.
    pub availability_employee: Option<String>,
    /// Shareable booking page for this establishment.
    pub public_link: Option<String>,
    /// Bumped on every employee switch; older weekly fetches are dropped.
    #[serde(skip)]
    availability_generation: u64,
}

type Slot<T> = fn(&mut DashboardState) -> &mut ListState<T>;

fn profile_slot(s: &mut DashboardState) -> &mut ListState<Option<EstablishmentProfile>> {
    &mut s.profile
}

fn employees_slot(s: &mut DashboardState) -> &mut ListState<Vec<Employee>> {
    &mut s.employees
}

fn services_slot(s: &mut DashboardState) -> &mut ListState<Vec<ServiceOffering>> {
    &mut s.services
}

fn appointments_slot(s: &mut DashboardState) -> &mut ListState<Vec<Appointment>> {
    &mut s.appointments
}

/// Dashboard data and actions for the signed-in account.
#[derive(Clone)]
pub struct Dashboard {
    router: AppRouter,
    service: Arc<dyn RemoteBookingService>,
    app_origin: String,
    state: Arc<Mutex<DashboardState>>,
}

impl Dashboard {
    pub fn new(
        router: AppRouter,
        service: Arc<dyn RemoteBookingService>,
        app_origin: impl Into<String>,
    ) -> Self {
        Dashboard {
            router,
            service,
            app_origin: app_origin.into(),
            state: Arc::new(Mutex::new(DashboardState::default())),
        }
    }

    fn with_state<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut DashboardState) -> R,
    {
        let mut state = self.state.lock().expect("Dashboard mutex poisoned");
        f(&mut state)
    }

    pub fn snapshot(&self) -> DashboardState {
        self.with_state(|s| s.clone())
    }

    fn session(&self) -> Result<Session, ApiError> {
        self.router.session().ok_or_else(ApiError::not_authenticated)
    }

    /// Token and establishment id, for establishment-scoped calls.
    fn establishment(&self) -> Result<(String, String), ApiError> {
        let session = self.session()?;
        match session.establishment_id {
            Some(id) => Ok((session.token, id)),
            None => Err(ApiError::invalid_state(CoreError::NoEstablishment.to_string())),
        }
    }

    /// Runs a read and records its outcome in one list.
    async fn track<T, Fut>(&self, slot: Slot<T>, fallback: &str, fetch: Fut) -> Result<T, ApiError>
    where
        T: Clone,
        Fut: Future<Output = ClientResult<T>>,
    {
        self.with_state(|s| {
            let list = slot(s);
            list.loading = true;
            list.error = None;
        });

        match fetch.await {
            Ok(items) => {
                self.with_state(|s| {
                    let list = slot(s);
                    list.items = items.clone();
                    list.loading = false;
                });
                Ok(items)
            }
            Err(e) => {
                warn!(error = %e, "Dashboard list failed to load");
                let network = e.is_network();
                let err = ApiError::from_client(e, fallback);
                self.with_state(|s| {
                    let list = slot(s);
                    list.loading = false;
                    list.error = Some(err.message.clone());
                });
                if network {
                    self.router.notify(err.message.clone(), MessageKind::Error);
                }
                Err(err)
            }
        }
    }

    /// Runs a write and reports it through the message channel.
    async fn perform<Fut>(&self, success: &str, fallback: &str, write: Fut) -> Result<(), ApiError>
    where
        Fut: Future<Output = ClientResult<()>>,
    {
        match write.await {
            Ok(()) => {
                self.router.notify(success, MessageKind::Success);
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Dashboard update failed");
                let err = ApiError::from_client(e, fallback);
                self.router.notify(err.message.clone(), MessageKind::Error);
                Err(err)
            }
        }
    }

    /// Surfaces a form error through the message channel.
    fn reported<T>(&self, check: Result<T, ApiError>) -> Result<T, ApiError> {
        check.map_err(|err| {
            self.router.notify(err.message.clone(), MessageKind::Error);
            err
        })
    }

    // =========================================================================
    // Mount
    // =========================================================================

    /// Loads what the signed-in account can see.
    ///
    /// With an establishment: profile, employees, services and appointments.
    /// An employee without one: appointments only.
    pub async fn load_all(&self) -> Result<(), ApiError> {
        let session = self.session()?;
        if session.establishment_id.is_some() {
            debug!("Loading establishment dashboard");
            let _ = tokio::join!(
                self.refresh_profile(),
                self.refresh_employees(),
                self.refresh_services(),
                self.refresh_appointments(),
            );
        } else if session.role == Role::Employee {
            debug!("Loading employee dashboard");
            let _ = self.refresh_appointments().await;
        }
        Ok(())
    }

    // =========================================================================
    // Profile
    // =========================================================================

    pub async fn refresh_profile(&self) -> Result<EstablishmentProfile, ApiError> {
        let (token, id) = self.establishment()?;
        let fetch = async { self.service.establishment_profile(&token, &id).await.map(Some) };
        let profile = self
            .track(profile_slot, messages::PROFILE_LOAD_FAILED, fetch)
            .await?
            .unwrap_or_default();

        let link = self.public_link(&id);
        self.with_state(|s| s.public_link = link);
        Ok(profile)
    }

    /// `{app_origin}/?establishmentId={id}`
    fn public_link(&self, establishment_id: &str) -> Option<String> {
        match Url::parse(&self.app_origin) {
            Ok(mut url) => {
                url.query_pairs_mut()
                    .clear()
                    .append_pair("establishmentId", establishment_id);
                Some(url.to_string())
            }
            Err(e) => {
                warn!(origin = %self.app_origin, error = %e, "Cannot build public link");
                None
            }
        }
    }

    pub async fn save_profile(&self, profile: EstablishmentProfile) -> Result<(), ApiError> {
        let (token, id) = self.establishment()?;
        self.perform(
            messages::PROFILE_SAVED,
            messages::PROFILE_SAVE_FAILED,
            self.service.update_establishment_profile(&token, &id, &profile),
        )
        .await?;
        info!(establishment_id = %id, "Profile updated");
        self.with_state(|s| s.profile.items = Some(profile));
        Ok(())
    }

    // =========================================================================
    // Employees
    // =========================================================================

    pub async fn refresh_employees(&self) -> Result<Vec<Employee>, ApiError> {
        let (token, id) = self.establishment()?;
        let employees = self
            .track(
                employees_slot,
                messages::LIST_LOAD_FAILED,
                self.service.employees(&token, &id),
            )
            .await?;

        // Keep the availability editor pointed at an existing employee.
        let selected = self.with_state(|s| s.availability_employee.clone());
        let still_there = selected
            .as_ref()
            .is_some_and(|sel| employees.iter().any(|e| &e.id == sel));
        if !still_there {
            let first = employees.first().map(|e| e.id.clone());
            let _ = self.select_availability_employee(first).await;
        }
        Ok(employees)
    }

    pub async fn add_employee(&self, name: &str, email: &str, phone: &str) -> Result<(), ApiError> {
        self.reported(
            validate_new_employee(name, email, phone)
                .map_err(|_| ApiError::validation(messages::FILL_ALL_FIELDS)),
        )?;
        let (token, id) = self.establishment()?;
        let employee = NewEmployee {
            name: name.trim().to_string(),
            email: email.trim().to_string(),
            phone: phone.trim().to_string(),
        };
        self.perform(
            messages::EMPLOYEE_ADDED,
            messages::EMPLOYEE_ADD_FAILED,
            self.service.add_employee(&token, &id, &employee),
        )
        .await?;
        let _ = self.refresh_employees().await;
        Ok(())
    }

    /// Removes an employee after the user confirms. Returns whether it was removed.
    pub async fn delete_employee(&self, employee_id: &str) -> Result<bool, ApiError> {
        let (token, _) = self.establishment()?;
        if !self.router.confirm(messages::EMPLOYEE_REMOVE_PROMPT).await? {
            debug!(employee_id, "Employee removal declined");
            return Ok(false);
        }
        self.perform(
            messages::EMPLOYEE_REMOVED,
            messages::EMPLOYEE_REMOVE_FAILED,
            self.service.delete_employee(&token, employee_id),
        )
        .await?;
        let _ = self.refresh_employees().await;
        Ok(true)
    }

    // =========================================================================
    // Weekly Availability
    // =========================================================================

    /// Switches the availability editor to `employee_id` and loads its hours.
    ///
    /// Returns the table shown afterwards. A fetch overtaken by a later
    /// switch leaves the newer employee's table in place.
    pub async fn select_availability_employee(
        &self,
        employee_id: Option<String>,
    ) -> Result<WeeklySchedule, ApiError> {
        let token = self.session()?.token;
        let generation = self.with_state(|s| {
            s.availability_generation += 1;
            s.availability_employee = employee_id.clone();
            s.availability = ListState {
                loading: employee_id.is_some(),
                ..ListState::default()
            };
            s.availability_generation
        });
        let Some(employee_id) = employee_id else {
            return Ok(WeeklySchedule::default());
        };

        let result = match self.service.employee_availability(&token, &employee_id).await {
            Ok(windows) => Ok(WeeklySchedule::from_windows(&windows)),
            // Non-2xx shows an empty table.
            Err(e) if !e.is_network() => {
                debug!(error = %e, "No weekly availability returned");
                Ok(WeeklySchedule::default())
            }
            Err(e) => Err(e),
        };

        let current = self.with_state(|s| s.availability_generation == generation);
        if !current {
            debug!(%employee_id, generation, "Discarding stale weekly availability");
            return Ok(self.with_state(|s| s.availability.items.clone()));
        }

        match result {
            Ok(schedule) => {
                self.with_state(|s| {
                    s.availability.items = schedule.clone();
                    s.availability.loading = false;
                });
                Ok(schedule)
            }
            Err(e) => {
                warn!(error = %e, %employee_id, "Weekly availability failed to load");
                let err = ApiError::from_client(e, messages::LIST_LOAD_FAILED);
                self.with_state(|s| {
                    s.availability.loading = false;
                    s.availability.error = Some(err.message.clone());
                });
                self.router.notify(err.message.clone(), MessageKind::Error);
                Err(err)
            }
        }
    }

    /// Edits one weekday. Empty strings clear that end of the window.
    pub fn set_availability_day(
        &self,
        day_of_week: u8,
        start: Option<String>,
        end: Option<String>,
    ) -> Result<(), ApiError> {
        let normalize = |value: Option<String>| -> Result<Option<String>, ApiError> {
            match value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
                Some(v) => {
                    validate_time_slot(&v)?;
                    Ok(Some(v))
                }
                None => Ok(None),
            }
        };
        let start = normalize(start)?;
        let end = normalize(end)?;

        self.with_state(|s| match s.availability.items.days.get_mut(usize::from(day_of_week)) {
            Some(day) => {
                day.start = start;
                day.end = end;
                Ok(())
            }
            None => Err(ApiError::validation(format!(
                "dayOfWeek must be 0-6, got {day_of_week}"
            ))),
        })
    }

    /// Saves the days that have both a start and an end.
    pub async fn save_availability(&self) -> Result<usize, ApiError> {
        let token = self.session()?.token;
        let (employee_id, loading, windows) = self.with_state(|s| {
            (
                s.availability_employee.clone(),
                s.availability.loading,
                s.availability.items.to_windows(),
            )
        });
        let employee_id = employee_id
            .ok_or_else(|| ApiError::validation("Choose an employee first."))?;
        if loading {
            return Err(ApiError::invalid_state(
                "Wait for this employee's hours to finish loading.",
            ));
        }

        self.perform(
            messages::AVAILABILITY_SAVED,
            messages::AVAILABILITY_SAVE_FAILED,
            self.service
                .update_employee_availability(&token, &employee_id, &windows),
        )
        .await?;
        info!(%employee_id, days = windows.len(), "Weekly availability saved");
        Ok(windows.len())
    }

    // =========================================================================
    // Services
    // =========================================================================

    pub async fn refresh_services(&self) -> Result<Vec<ServiceOffering>, ApiError> {
        let (token, id) = self.establishment()?;
        self.track(
            services_slot,
            messages::LIST_LOAD_FAILED,
            self.service.services(&token, &id),
        )
        .await
    }

    pub async fn add_service(&self, name: &str, price: &str, duration: &str) -> Result<(), ApiError> {
        let duration = self.reported(validate_new_service(name, price, duration).map_err(
            |e| match e {
                ValidationError::InvalidFormat { .. } => ApiError::from(e),
                _ => ApiError::validation(messages::FILL_ALL_FIELDS),
            },
        ))?;
        let (token, id) = self.establishment()?;
        let service = NewService {
            name: name.trim().to_string(),
            price: price.trim().to_string(),
            duration,
        };
        self.perform(
            messages::SERVICE_ADDED,
            messages::SERVICE_ADD_FAILED,
            self.service.add_service(&token, &id, &service),
        )
        .await?;
        let _ = self.refresh_services().await;
        Ok(())
    }

    /// Removes a service after the user confirms. Returns whether it was removed.
    pub async fn delete_service(&self, service_id: &str) -> Result<bool, ApiError> {
        let (token, _) = self.establishment()?;
        if !self.router.confirm(messages::SERVICE_REMOVE_PROMPT).await? {
            debug!(service_id, "Service removal declined");
            return Ok(false);
        }
        self.perform(
            messages::SERVICE_REMOVED,
            messages::SERVICE_REMOVE_FAILED,
            self.service.delete_service(&token, service_id),
        )
        .await?;
        let _ = self.refresh_services().await;
        Ok(true)
    }

    // =========================================================================
    // Appointments
    // =========================================================================

    fn appointment_scope(session: &Session) -> Result<AppointmentScope, ApiError> {
        match session.role {
            Role::Establishment => session
                .establishment_id
                .clone()
                .map(AppointmentScope::Establishment)
                .ok_or_else(|| ApiError::invalid_state(CoreError::NoEstablishment.to_string())),
            Role::Employee => session
                .subject_id()
                .map(AppointmentScope::Employee)
                .ok_or_else(|| ApiError::invalid_state("Your session does not name an employee.")),
        }
    }

    pub async fn refresh_appointments(&self) -> Result<Vec<Appointment>, ApiError> {
        let session = self.session()?;
        let scope = Self::appointment_scope(&session)?;
        self.track(
            appointments_slot,
            messages::LIST_LOAD_FAILED,
            self.service.appointments(&session.token, &scope),
        )
        .await
    }

    /// Changes an appointment's status. Establishment accounts only.
    pub async fn update_appointment_status(
        &self,
        appointment_id: &str,
        status: AppointmentStatus,
    ) -> Result<(), ApiError> {
        let session = self.session()?;
        if session.role != Role::Establishment {
            return Err(ApiError::invalid_state(
                "Only the establishment can change appointment status.",
            ));
        }
        self.perform(
            messages::STATUS_UPDATED,
            messages::STATUS_UPDATE_FAILED,
            self.service
                .update_appointment_status(&session.token, appointment_id, status),
        )
        .await?;
        info!(appointment_id, %status, "Appointment status changed");
        let _ = self.refresh_appointments().await;
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::state::{AppConfig, SessionStore};
    use crate::test_support::{make_token, FakeService, RecordingNavigator};
    use booking_client::ClientError;
    use std::time::Duration;
    use url::Url;

    fn owner() -> Session {
        Session {
            token: "owner-token".into(),
            role: Role::Establishment,
            establishment_id: Some("7".into()),
            email: "owner@shop.test".into(),
            plan_active: true,
            plan_expires_at: None,
        }
    }

    fn employee(id: &str) -> Employee {
        Employee {
            id: id.into(),
            name: format!("Employee {id}"),
            email: None,
            phone: None,
        }
    }

    fn setup(session: Session) -> (Dashboard, AppRouter, Arc<FakeService>) {
        let service = FakeService::new();
        let router = AppRouter::new(
            &AppConfig::default(),
            SessionStore::in_memory(),
            Arc::new(RecordingNavigator::default()),
        );
        router.bootstrap(&Url::parse("http://localhost:5173/").unwrap());
        router.handle_auth_success(session).unwrap();
        let dashboard = Dashboard::new(router.clone(), service.clone(), "http://localhost:5173");
        (dashboard, router, service)
    }

    /// Answers the next confirmation prompt with `answer`.
    fn answer_next(router: &AppRouter, answer: bool) {
        let bridge = router.confirmations().clone();
        let mut rx = bridge.subscribe();
        tokio::spawn(async move {
            let id = rx
                .wait_for(|p| p.is_some())
                .await
                .unwrap()
                .as_ref()
                .unwrap()
                .id;
            bridge.respond(id, answer);
        });
    }

    #[tokio::test]
    async fn test_mount_loads_four_lists_with_bearer_token() {
        let (dashboard, _, service) = setup(owner());
        service.with(|s| s.employees = vec![employee("1"), employee("2")]);

        dashboard.load_all().await.unwrap();

        let calls = service.calls();
        for expected in ["profile:7", "employees:7", "services:7", "appointments:establishment:7"] {
            assert!(calls.iter().any(|c| c == expected), "missing {expected}");
        }
        assert!(service.with(|s| s.tokens.iter().all(|t| t == "owner-token")));

        let snapshot = dashboard.snapshot();
        assert_eq!(
            snapshot.public_link.as_deref(),
            Some("http://localhost:5173/?establishmentId=7")
        );
        assert_eq!(snapshot.employees.items.len(), 2);
        assert_eq!(snapshot.availability_employee.as_deref(), Some("1"));
        assert!(calls.iter().any(|c| c == "weekly:1"));
    }

    #[tokio::test]
    async fn test_employee_without_establishment_loads_appointments_only() {
        let token = make_token(r#"{"id":"E5","role":"employee","email":"e@x.y","planActive":true}"#);
        let session = Session {
            token,
            role: Role::Employee,
            establishment_id: None,
            email: "e@x.y".into(),
            plan_active: true,
            plan_expires_at: None,
        };
        let (dashboard, _, service) = setup(session);

        dashboard.load_all().await.unwrap();
        assert_eq!(service.calls(), vec!["appointments:employee:E5"]);
    }

    #[tokio::test]
    async fn test_failing_list_does_not_blank_others() {
        let (dashboard, router, service) = setup(owner());
        service.with(|s| s.services = vec![]);
        dashboard.refresh_services().await.unwrap();

        service.with(|s| s.fail_lists = Some(ClientError::Network("down".into())));
        let err = dashboard.refresh_employees().await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NetworkError);

        let snapshot = dashboard.snapshot();
        assert_eq!(snapshot.employees.error.as_deref(), Some(messages::NETWORK_ERROR));
        assert!(!snapshot.employees.loading);
        assert_eq!(snapshot.services.error, None);
        assert_eq!(router.messages().current().unwrap().text, messages::NETWORK_ERROR);
    }

    #[tokio::test]
    async fn test_add_employee_validates_then_refreshes() {
        let (dashboard, _, service) = setup(owner());

        let err = dashboard.add_employee("Ana", "", "555").await.unwrap_err();
        assert_eq!(err.message, messages::FILL_ALL_FIELDS);
        assert!(service.calls().is_empty());

        dashboard.add_employee("Ana", "ana@shop.test", "555").await.unwrap();
        assert_eq!(service.calls()[0], "add_employee:7:Ana");
        assert!(service.calls().contains(&"employees:7".to_string()));
    }

    #[tokio::test]
    async fn test_delete_employee_requires_confirmation() {
        let (dashboard, router, service) = setup(owner());

        answer_next(&router, false);
        assert!(!dashboard.delete_employee("3").await.unwrap());
        assert_eq!(service.call_count("delete_employee"), 0);

        answer_next(&router, true);
        assert!(dashboard.delete_employee("3").await.unwrap());
        assert_eq!(service.call_count("delete_employee:3"), 1);
        assert_eq!(router.messages().current().unwrap().text, messages::EMPLOYEE_REMOVED);
    }

    #[tokio::test]
    async fn test_weekly_table_round_trip_sends_complete_days_only() {
        let (dashboard, _, service) = setup(owner());
        service.with(|s| {
            s.weekly = vec![WeeklyAvailability {
                day_of_week: 1,
                start_time: "09:00".into(),
                end_time: "18:00".into(),
            }]
        });

        let table = dashboard
            .select_availability_employee(Some("4".into()))
            .await
            .unwrap();
        assert_eq!(table.days[1].start.as_deref(), Some("09:00"));

        dashboard
            .set_availability_day(3, Some("10:00".into()), Some("14:00".into()))
            .unwrap();
        dashboard.set_availability_day(5, Some("10:00".into()), None).unwrap();
        assert!(dashboard.set_availability_day(7, None, None).is_err());
        assert!(dashboard.set_availability_day(2, Some("9am".into()), None).is_err());

        assert_eq!(dashboard.save_availability().await.unwrap(), 2);
        let saved = service.with(|s| s.saved_weekly[0].clone());
        assert_eq!(
            saved.iter().map(|w| w.day_of_week).collect::<Vec<_>>(),
            vec![1, 3]
        );
    }

    fn window(day_of_week: u8, start: &str, end: &str) -> WeeklyAvailability {
        WeeklyAvailability {
            day_of_week,
            start_time: start.into(),
            end_time: end.into(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_weekly_fetch_cannot_overwrite_newer_employee() {
        let (dashboard, _, service) = setup(owner());
        service.with(|s| {
            s.weekly_by_employee.insert("A".into(), vec![window(1, "09:00", "18:00")]);
            s.weekly_by_employee.insert("B".into(), vec![window(2, "10:00", "12:00")]);
            s.weekly_delay.insert("A".into(), Duration::from_secs(2));
        });

        let slow = {
            let dashboard = dashboard.clone();
            tokio::spawn(async move {
                dashboard
                    .select_availability_employee(Some("A".into()))
                    .await
            })
        };
        tokio::time::sleep(Duration::from_millis(100)).await;
        let table = dashboard
            .select_availability_employee(Some("B".into()))
            .await
            .unwrap();
        assert_eq!(table.days[2].start.as_deref(), Some("10:00"));

        let after_slow = slow.await.unwrap().unwrap();
        assert_eq!(after_slow, table);
        let snapshot = dashboard.snapshot();
        assert_eq!(snapshot.availability_employee.as_deref(), Some("B"));
        assert_eq!(snapshot.availability.items.days[1], DayWindow::default());
        assert!(!snapshot.availability.loading);

        assert_eq!(dashboard.save_availability().await.unwrap(), 1);
        assert_eq!(service.calls().last().unwrap(), "update_weekly:B");
        assert_eq!(
            service.with(|s| s.saved_weekly[0].clone()),
            vec![window(2, "10:00", "12:00")]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_save_refused_while_weekly_hours_load() {
        let (dashboard, _, service) = setup(owner());
        service.with(|s| {
            s.weekly_delay.insert("B".into(), Duration::from_secs(2));
        });

        let pending = {
            let dashboard = dashboard.clone();
            tokio::spawn(async move {
                dashboard
                    .select_availability_employee(Some("B".into()))
                    .await
            })
        };
        tokio::time::sleep(Duration::from_millis(100)).await;

        let err = dashboard.save_availability().await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidState);
        assert_eq!(service.call_count("update_weekly"), 0);

        pending.await.unwrap().unwrap();
        assert_eq!(dashboard.save_availability().await.unwrap(), 0);
        assert_eq!(service.call_count("update_weekly:B"), 1);
    }

    #[tokio::test]
    async fn test_add_service_checks_duration() {
        let (dashboard, _, service) = setup(owner());

        let err = dashboard.add_service("Cut", "30", "half hour").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_ne!(err.message, messages::FILL_ALL_FIELDS);

        dashboard.add_service("Cut", "30", "45").await.unwrap();
        assert_eq!(service.calls()[0], "add_service:7:Cut:45");
    }

    #[tokio::test]
    async fn test_delete_service_dismissed_is_noop() {
        let (dashboard, router, service) = setup(owner());
        let bridge = router.confirmations().clone();
        let mut rx = bridge.subscribe();
        tokio::spawn(async move {
            rx.wait_for(|p| p.is_some()).await.unwrap();
            bridge.dismiss();
        });

        assert!(!dashboard.delete_service("9").await.unwrap());
        assert_eq!(service.call_count("delete_service"), 0);
    }

    #[tokio::test]
    async fn test_status_update_refreshes_and_is_owner_only() {
        let (dashboard, _, service) = setup(owner());
        dashboard
            .update_appointment_status("11", AppointmentStatus::Confirmed)
            .await
            .unwrap();
        assert_eq!(
            service.calls(),
            vec!["status:11:confirmed", "appointments:establishment:7"]
        );

        let token = make_token(r#"{"id":"E5","role":"employee","email":"e@x.y","planActive":true}"#);
        let (dashboard, _, _) = setup(Session {
            token,
            role: Role::Employee,
            establishment_id: Some("7".into()),
            email: "e@x.y".into(),
            plan_active: true,
            plan_expires_at: None,
        });
        let err = dashboard
            .update_appointment_status("11", AppointmentStatus::Cancelled)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidState);
    }

    #[tokio::test]
    async fn test_write_rejection_uses_server_text() {
        let (dashboard, router, service) = setup(owner());
        service.with(|s| {
            s.fail_writes = Some(ClientError::Rejected {
                status: 400,
                message: Some("Name taken".into()),
            })
        });

        let err = dashboard
            .save_profile(EstablishmentProfile::default())
            .await
            .unwrap_err();
        assert_eq!(err.message, "Name taken");
        assert_eq!(router.messages().current().unwrap().text, "Name taken");
    }

    #[test]
    fn test_schedule_ignores_out_of_range_days() {
        let schedule = WeeklySchedule::from_windows(&[WeeklyAvailability {
            day_of_week: 9,
            start_time: "09:00".into(),
            end_time: "10:00".into(),
        }]);
        assert!(schedule.to_windows().is_empty());
    }
}
