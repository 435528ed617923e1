//! # Booking Wizard
//!
//! Public booking flow for one establishment.
//!
//! ## Flow
//! ```text
//! load() ── GET /establishment/public/:id ──┬─ ok ──► services + employees
//!                                           └─ err ─► message + router → Auth
//!
//! toggle_service / select_employee / select_date
//!         │
//!         ▼
//!   BookingSelection::invalidate   (generation += 1, slots = [], time = None)
//!         │
//!         ├─ triple incomplete ──► no request
//!         └─ triple complete   ──► POST /booking/availability  (tag = generation)
//!                                        │
//!                                        ▼
//!                          apply only if tag == current generation
//!
//! submit() ── validate ──► POST /booking ──┬─ ok  ──► reset + success message
//!                                          └─ err ──► message, fields kept
//! ```
//!
//! The selection lock is never held across a request.

use std::sync::{Arc, Mutex};

use booking_client::{ClientError, RemoteBookingService};
use booking_core::calendar::{self, CalendarDay, WEEKDAY_LABELS};
use booking_core::{AvailabilityQuery, BookingSelection, EstablishmentDetails, MessageKind};
use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::router::AppRouter;
use crate::error::{ApiError, ErrorCode};
use crate::messages;

/// Source of "today" for the calendar and date checks.
pub type Clock = Arc<dyn Fn() -> NaiveDate + Send + Sync>;

/// The local calendar date.
pub fn system_clock() -> Clock {
    Arc::new(|| chrono::Local::now().date_naive())
}

struct WizardState {
    selection: BookingSelection,
    details: Option<EstablishmentDetails>,
    details_generation: u64,
    details_loading: bool,
    submitting: bool,
}

/// Everything the host needs to render the wizard.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardSnapshot {
    pub establishment_id: String,
    pub details: Option<EstablishmentDetails>,
    pub details_loading: bool,
    pub client_name: String,
    pub client_phone: String,
    pub service_ids: Vec<String>,
    pub employee_id: Option<String>,
    pub date: Option<NaiveDate>,
    pub time: Option<String>,
    pub slots: Vec<String>,
    pub slots_loading: bool,
    pub calendar_visible: bool,
    pub month_title: String,
    pub weekday_labels: [&'static str; 7],
    pub calendar: Vec<CalendarDay>,
    pub submitting: bool,
}

/// Shared handle to the wizard of the active PublicBooking view.
#[derive(Clone)]
pub struct BookingWizard {
    router: AppRouter,
    service: Arc<dyn RemoteBookingService>,
    clock: Clock,
    state: Arc<Mutex<WizardState>>,
}

impl BookingWizard {
    pub fn new(
        establishment_id: impl Into<String>,
        router: AppRouter,
        service: Arc<dyn RemoteBookingService>,
        clock: Clock,
    ) -> Self {
        let selection = BookingSelection::new(establishment_id, clock());
        BookingWizard {
            router,
            service,
            clock,
            state: Arc::new(Mutex::new(WizardState {
                selection,
                details: None,
                details_generation: 0,
                details_loading: false,
                submitting: false,
            })),
        }
    }

    fn with_state<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut WizardState) -> R,
    {
        let mut state = self.state.lock().expect("Wizard mutex poisoned");
        f(&mut state)
    }

    fn today(&self) -> NaiveDate {
        (self.clock)()
    }

    pub fn establishment_id(&self) -> String {
        self.with_state(|s| s.selection.establishment_id().to_string())
    }

    // =========================================================================
    // Initial Load
    // =========================================================================

    /// Fetches the establishment's services and employees.
    ///
    /// On failure the user is told why and sent to the login view.
    pub async fn load(&self) -> Result<EstablishmentDetails, ApiError> {
        let (establishment_id, generation) = self.with_state(|s| {
            s.details_generation += 1;
            s.details_loading = true;
            (s.selection.establishment_id().to_string(), s.details_generation)
        });

        debug!(%establishment_id, "Loading establishment details");
        let result = self.service.establishment_details(&establishment_id).await;

        let current = self.with_state(|s| {
            let current = s.details_generation == generation;
            if current {
                s.details_loading = false;
                if let Ok(details) = &result {
                    s.details = Some(details.clone());
                }
            }
            current
        });
        if !current {
            debug!(generation, "Discarding superseded details response");
        }

        match result {
            Ok(details) => {
                info!(
                    %establishment_id,
                    services = details.services.len(),
                    employees = details.employees.len(),
                    "Establishment loaded"
                );
                Ok(details)
            }
            Err(e) => {
                warn!(%establishment_id, error = %e, "Establishment details unavailable");
                let err = if e.is_network() {
                    ApiError::from_client(e, messages::NETWORK_ERROR)
                } else {
                    ApiError::new(ErrorCode::NotFound, messages::ESTABLISHMENT_NOT_FOUND)
                };
                if current {
                    self.router.notify(err.message.clone(), MessageKind::Error);
                    self.router.redirect_to_auth();
                }
                Err(err)
            }
        }
    }

    // =========================================================================
    // Selection
    // =========================================================================

    pub fn set_client_name(&self, name: impl Into<String>) {
        self.with_state(|s| s.selection.set_client_name(name));
    }

    pub fn set_client_phone(&self, phone: impl Into<String>) {
        self.with_state(|s| s.selection.set_client_phone(phone));
    }

    /// Adds or removes a service, then refreshes the offered slots.
    pub async fn toggle_service(&self, service_id: &str) -> Vec<String> {
        let query = self.with_state(|s| s.selection.toggle_service(service_id));
        self.refresh(query).await
    }

    /// Replaces the chosen services, then refreshes the offered slots.
    pub async fn set_services(&self, service_ids: Vec<String>) -> Vec<String> {
        let query = self.with_state(|s| s.selection.set_services(service_ids));
        self.refresh(query).await
    }

    /// Picks (or clears) the employee, then refreshes the offered slots.
    pub async fn select_employee(&self, employee_id: Option<String>) -> Vec<String> {
        let query = self.with_state(|s| s.selection.select_employee(employee_id));
        self.refresh(query).await
    }

    /// Picks a date, then refreshes the offered slots.
    pub async fn select_date(&self, date: NaiveDate) -> Result<Vec<String>, ApiError> {
        let today = self.today();
        let query = self.with_state(|s| s.selection.select_date(date, today))?;
        Ok(self.refresh(query).await)
    }

    /// Unsets the date. The slot list empties and nothing is fetched.
    pub fn clear_date(&self) -> Vec<String> {
        self.with_state(|s| {
            s.selection.clear_date();
            s.selection.slots().to_vec()
        })
    }

    /// Picks one of the offered slots.
    pub fn select_time(&self, slot: &str) -> Result<(), ApiError> {
        self.with_state(|s| s.selection.select_time(slot))?;
        Ok(())
    }

    /// Runs `query` if one was produced. Returns the slots shown afterwards.
    async fn refresh(&self, query: Option<AvailabilityQuery>) -> Vec<String> {
        if let Some(query) = query {
            self.fetch_availability(query).await;
        }
        self.with_state(|s| s.selection.slots().to_vec())
    }

    async fn fetch_availability(&self, query: AvailabilityQuery) {
        debug!(
            generation = query.generation,
            employee_id = %query.employee_id,
            date = %query.date,
            services = query.service_ids.len(),
            "Fetching availability"
        );
        let result = self.service.availability(&query).await;

        match result {
            Ok(slots) => {
                let count = slots.len();
                let applied =
                    self.with_state(|s| s.selection.apply_availability(query.generation, slots));
                if applied {
                    debug!(generation = query.generation, count, "Availability applied");
                } else {
                    debug!(generation = query.generation, "Discarding stale availability");
                }
            }
            Err(e) => {
                let applied = self.with_state(|s| s.selection.fail_availability(query.generation));
                if !applied {
                    return;
                }
                match e {
                    ClientError::Rejected { status, .. } => {
                        debug!(status, "Availability rejected; no slots offered");
                    }
                    ClientError::NotFound { .. } => {
                        debug!("Availability not found; no slots offered");
                    }
                    other => {
                        warn!(error = %other, "Availability lookup failed");
                        self.router
                            .notify(messages::AVAILABILITY_FAILED, MessageKind::Error);
                    }
                }
            }
        }
    }

    // =========================================================================
    // Calendar
    // =========================================================================

    pub fn previous_month(&self) -> Result<NaiveDate, ApiError> {
        Ok(self.with_state(|s| s.selection.previous_month())?)
    }

    pub fn next_month(&self) -> Result<NaiveDate, ApiError> {
        Ok(self.with_state(|s| s.selection.next_month())?)
    }

    pub fn calendar(&self) -> Vec<CalendarDay> {
        let today = self.today();
        self.with_state(|s| s.selection.calendar(today))
    }

    // =========================================================================
    // Submission
    // =========================================================================

    /// Books the appointment.
    pub async fn submit(&self) -> Result<(), ApiError> {
        let request = self.with_state(|s| {
            if s.submitting {
                return Err(ApiError::invalid_state("A booking is already being submitted."));
            }
            match s.selection.submission() {
                Ok(request) => {
                    s.submitting = true;
                    Ok(request)
                }
                Err(e) => {
                    debug!(error = %e, "Booking incomplete");
                    Err(ApiError::validation(messages::FILL_ALL_FIELDS))
                }
            }
        });
        let request = match request {
            Ok(request) => request,
            Err(err) => {
                self.router.notify(err.message.clone(), MessageKind::Error);
                return Err(err);
            }
        };

        info!(
            establishment_id = %request.establishment_id,
            employee_id = %request.employee_id,
            at = %request.appointment_date_time,
            "Submitting booking"
        );
        let result = self.service.book(&request).await;

        self.with_state(|s| {
            s.submitting = false;
            if result.is_ok() {
                s.selection.reset();
            }
        });

        match result {
            Ok(()) => {
                info!("Booking confirmed");
                self.router
                    .notify(messages::BOOKING_SUCCESS, MessageKind::Success);
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Booking failed");
                let err = ApiError::from_client(e, messages::BOOKING_FAILED);
                self.router.notify(err.message.clone(), MessageKind::Error);
                Err(err)
            }
        }
    }

    // =========================================================================
    // Read Interface
    // =========================================================================

    pub fn snapshot(&self) -> WizardSnapshot {
        let today = self.today();
        self.with_state(|s| {
            let selection = &s.selection;
            WizardSnapshot {
                establishment_id: selection.establishment_id().to_string(),
                details: s.details.clone(),
                details_loading: s.details_loading,
                client_name: selection.client_name().to_string(),
                client_phone: selection.client_phone().to_string(),
                service_ids: selection.service_ids().to_vec(),
                employee_id: selection.employee_id().map(String::from),
                date: selection.date(),
                time: selection.time().map(String::from),
                slots: selection.slots().to_vec(),
                slots_loading: selection.slots_loading(),
                calendar_visible: selection.calendar_visible(),
                month_title: calendar::month_title(selection.displayed_month()),
                weekday_labels: WEEKDAY_LABELS,
                calendar: selection.calendar(today),
                submitting: s.submitting,
            }
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
