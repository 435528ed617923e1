//! # Booking Selection
//!
//! State of the public booking wizard and the cascade that keeps the
//! offered time slots consistent with what the client picked.
//!
//! ## Dependent Fields
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Availability Cascade                               │
//! │                                                                         │
//! │   services ──┐                                                          │
//! │              │   any change    ┌───────────────────┐                    │
//! │   employee ──┼───────────────► │ generation += 1   │                    │
//! │              │                 │ slots  = []       │                    │
//! │   date ──────┘                 │ time   = None     │                    │
//! │                                └─────────┬─────────┘                    │
//! │                                          │                              │
//! │                     all three set? ──────┤                              │
//! │                        │ yes             │ no                           │
//! │                        ▼                 ▼                              │
//! │           AvailabilityQuery{gen}     (nothing to fetch)                 │
//! │                        │                                                │
//! │                        ▼                                                │
//! │   apply_availability(gen, slots) ── gen == current? ── no ──► dropped   │
//! │                        │ yes                                            │
//! │                        ▼                                                │
//! │                  slots = response                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The selection itself performs no I/O. Each mutating call returns the
//! query the caller has to run, tagged with the generation it belongs to,
//! and a response is only applied while that generation is still current.

use chrono::NaiveDate;
use serde::Serialize;

use crate::calendar::{self, CalendarDay};
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::validation::{self, ValidationResult};

// =============================================================================
// Wire Requests
// =============================================================================

/// Availability lookup for one (employee, services, date) triple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityQuery {
    /// Tag used to discard stale responses; never sent.
    #[serde(skip)]
    pub generation: u64,
    pub establishment_id: String,
    pub employee_id: String,
    pub service_ids: Vec<String>,
    /// Serialized as `YYYY-MM-DD`.
    pub date: NaiveDate,
}

/// Body of the booking submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub establishment_id: String,
    pub client_name: String,
    pub client_phone: String,
    pub service_ids: Vec<String>,
    pub employee_id: String,
    /// `YYYY-MM-DD HH:mm`
    pub appointment_date_time: String,
}

// =============================================================================
// Selection
// =============================================================================

/// Everything the client has chosen so far in the wizard.
///
/// ## Invariants
/// - `slots` always belong to the current (employee, services, date)
/// - `time`, when set, is one of `slots`
/// - `displayed_month` is the first day of a month and survives resets
#[derive(Debug, Clone)]
pub struct BookingSelection {
    establishment_id: String,
    client_name: String,
    client_phone: String,
    service_ids: Vec<String>,
    employee_id: Option<String>,
    date: Option<NaiveDate>,
    time: Option<String>,
    slots: Vec<String>,
    slots_loading: bool,
    generation: u64,
    displayed_month: NaiveDate,
}

impl BookingSelection {
    /// Empty selection for `establishment_id`, calendar on `today`'s month.
    pub fn new(establishment_id: impl Into<String>, today: NaiveDate) -> Self {
        BookingSelection {
            establishment_id: establishment_id.into(),
            client_name: String::new(),
            client_phone: String::new(),
            service_ids: Vec::new(),
            employee_id: None,
            date: None,
            time: None,
            slots: Vec::new(),
            slots_loading: false,
            generation: 0,
            displayed_month: calendar::month_start(today),
        }
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn establishment_id(&self) -> &str {
        &self.establishment_id
    }

    pub fn client_name(&self) -> &str {
        &self.client_name
    }

    pub fn client_phone(&self) -> &str {
        &self.client_phone
    }

    pub fn service_ids(&self) -> &[String] {
        &self.service_ids
    }

    pub fn employee_id(&self) -> Option<&str> {
        self.employee_id.as_deref()
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn time(&self) -> Option<&str> {
        self.time.as_deref()
    }

    pub fn slots(&self) -> &[String] {
        &self.slots
    }

    /// True between issuing a query and its (current) response.
    pub fn slots_loading(&self) -> bool {
        self.slots_loading
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn displayed_month(&self) -> NaiveDate {
        self.displayed_month
    }

    /// The date picker is only offered once services and an employee are chosen.
    pub fn calendar_visible(&self) -> bool {
        !self.service_ids.is_empty() && self.employee_id.is_some()
    }

    // -------------------------------------------------------------------------
    // Independent Fields
    // -------------------------------------------------------------------------

    pub fn set_client_name(&mut self, name: impl Into<String>) {
        self.client_name = name.into();
    }

    pub fn set_client_phone(&mut self, phone: impl Into<String>) {
        self.client_phone = phone.into();
    }

    /// Picks one of the offered slots.
    pub fn select_time(&mut self, slot: &str) -> ValidationResult<()> {
        if !self.slots.iter().any(|s| s == slot) {
            return Err(ValidationError::NotAllowed {
                field: "time".to_string(),
                allowed: self.slots.clone(),
            });
        }
        self.time = Some(slot.to_string());
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Dependent Fields (each may yield a query)
    // -------------------------------------------------------------------------

    /// Adds the service if absent, removes it if present.
    pub fn toggle_service(&mut self, service_id: &str) -> Option<AvailabilityQuery> {
        if let Some(pos) = self.service_ids.iter().position(|id| id == service_id) {
            self.service_ids.remove(pos);
        } else {
            self.service_ids.push(service_id.to_string());
        }
        self.invalidate()
    }

    /// Replaces the service set, keeping first-seen order.
    pub fn set_services<I, S>(&mut self, service_ids: I) -> Option<AvailabilityQuery>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut ids: Vec<String> = Vec::new();
        for id in service_ids {
            let id = id.into();
            if !id.trim().is_empty() && !ids.contains(&id) {
                ids.push(id);
            }
        }
        self.service_ids = ids;
        self.invalidate()
    }

    /// `None` (or a blank id) clears the employee.
    pub fn select_employee(&mut self, employee_id: Option<String>) -> Option<AvailabilityQuery> {
        self.employee_id = employee_id.filter(|id| !id.trim().is_empty());
        self.invalidate()
    }

    /// Picks a date; past dates are refused.
    pub fn select_date(
        &mut self,
        date: NaiveDate,
        today: NaiveDate,
    ) -> ValidationResult<Option<AvailabilityQuery>> {
        if !calendar::is_selectable(date, today) {
            return Err(ValidationError::InvalidFormat {
                field: "date".to_string(),
                reason: "cannot book a date in the past".to_string(),
            });
        }
        self.date = Some(date);
        Ok(self.invalidate())
    }

    /// Unsets the date. Slots and the chosen time go with it and no query is
    /// issued; a lookup still in flight becomes stale.
    pub fn clear_date(&mut self) {
        self.date = None;
        self.invalidate();
    }

    /// Discards slots and the chosen time, then builds the next query if
    /// every input is present.
    fn invalidate(&mut self) -> Option<AvailabilityQuery> {
        self.generation += 1;
        self.slots.clear();
        self.time = None;

        let query = self.current_query();
        self.slots_loading = query.is_some();
        query
    }

    /// Query for the current inputs, tagged with the current generation.
    pub fn current_query(&self) -> Option<AvailabilityQuery> {
        let employee_id = self.employee_id.clone()?;
        let date = self.date?;
        if self.service_ids.is_empty() {
            return None;
        }
        Some(AvailabilityQuery {
            generation: self.generation,
            establishment_id: self.establishment_id.clone(),
            employee_id,
            service_ids: self.service_ids.clone(),
            date,
        })
    }

    // -------------------------------------------------------------------------
    // Responses
    // -------------------------------------------------------------------------

    /// Applies slots fetched for `generation`.
    ///
    /// Returns `false` (and changes nothing) when the response is stale.
    pub fn apply_availability(&mut self, generation: u64, slots: Vec<String>) -> bool {
        if generation != self.generation {
            return false;
        }
        self.slots = slots;
        self.slots_loading = false;
        true
    }

    /// Records a failed lookup for `generation`: the list stays empty.
    ///
    /// Returns `false` when the failure belongs to a superseded query.
    pub fn fail_availability(&mut self, generation: u64) -> bool {
        if generation != self.generation {
            return false;
        }
        self.slots.clear();
        self.slots_loading = false;
        true
    }

    // -------------------------------------------------------------------------
    // Calendar Navigation
    // -------------------------------------------------------------------------

    pub fn previous_month(&mut self) -> CoreResult<NaiveDate> {
        self.displayed_month = calendar::add_months(self.displayed_month, -1)?;
        Ok(self.displayed_month)
    }

    pub fn next_month(&mut self) -> CoreResult<NaiveDate> {
        self.displayed_month = calendar::add_months(self.displayed_month, 1)?;
        Ok(self.displayed_month)
    }

    /// Grid cells for the displayed month.
    pub fn calendar(&self, today: NaiveDate) -> Vec<CalendarDay> {
        calendar::month_view(self.displayed_month, today, self.date)
    }

    // -------------------------------------------------------------------------
    // Submission
    // -------------------------------------------------------------------------

    /// Builds the submission body, or the first missing field.
    pub fn submission(&self) -> CoreResult<BookingRequest> {
        if self.establishment_id.trim().is_empty() {
            return Err(CoreError::NoEstablishment);
        }
        let client_name = validation::require("clientName", &self.client_name)?;
        let client_phone = validation::require("clientPhone", &self.client_phone)?;
        if self.service_ids.is_empty() {
            return Err(ValidationError::required("serviceIds").into());
        }
        let employee_id = validation::require_some("employeeId", self.employee_id.as_deref())?;
        let date = self.date.ok_or_else(|| ValidationError::required("date"))?;
        let time = validation::require_some("time", self.time.as_deref())?;

        Ok(BookingRequest {
            establishment_id: self.establishment_id.clone(),
            client_name: client_name.to_string(),
            client_phone: client_phone.to_string(),
            service_ids: self.service_ids.clone(),
            employee_id: employee_id.to_string(),
            appointment_date_time: validation::appointment_timestamp(date, time)?,
        })
    }

    /// Clears every field after a successful booking.
    ///
    /// The displayed month is kept; in-flight lookups are invalidated.
    pub fn reset(&mut self) {
        self.client_name.clear();
        self.client_phone.clear();
        self.service_ids.clear();
        self.employee_id = None;
        self.date = None;
        self.time = None;
        self.slots.clear();
        self.slots_loading = false;
        self.generation += 1;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn today() -> NaiveDate {
        ymd(2024, 6, 1)
    }

    fn selection_with_services() -> BookingSelection {
        let mut sel = BookingSelection::new("est-1", today());
        assert!(sel.set_services(["A", "B"]).is_none());
        sel
    }

    #[test]
    fn test_no_query_until_all_inputs_present() {
        let mut sel = selection_with_services();
        assert!(sel.select_employee(Some("E1".into())).is_none());
        assert!(sel.calendar_visible());

        let query = sel.select_date(ymd(2024, 6, 10), today()).unwrap().unwrap();
        assert_eq!(query.employee_id, "E1");
        assert_eq!(query.service_ids, vec!["A", "B"]);
        assert_eq!(query.date, ymd(2024, 6, 10));
        assert!(sel.slots_loading());
    }

    #[test]
    fn test_each_dependent_change_issues_exactly_one_query() {
        let mut sel = selection_with_services();
        sel.select_employee(Some("E1".into()));
        let first = sel.select_date(ymd(2024, 6, 10), today()).unwrap().unwrap();
        assert!(sel.apply_availability(first.generation, vec!["09:00".into(), "09:30".into()]));
        assert_eq!(sel.slots(), ["09:00", "09:30"]);

        let second = sel.select_employee(Some("E2".into())).unwrap();
        assert!(second.generation > first.generation);
        assert_eq!(second.employee_id, "E2");
        assert!(sel.slots().is_empty());

        let third = sel.toggle_service("C").unwrap();
        assert_eq!(third.service_ids, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_missing_input_clears_slots_without_query() {
        let mut sel = selection_with_services();
        sel.select_employee(Some("E1".into()));
        let q = sel.select_date(ymd(2024, 6, 10), today()).unwrap().unwrap();
        sel.apply_availability(q.generation, vec!["09:00".into()]);
        sel.select_time("09:00").unwrap();

        assert!(sel.select_employee(None).is_none());
        assert!(sel.slots().is_empty());
        assert_eq!(sel.time(), None);
        assert!(!sel.slots_loading());
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let mut sel = selection_with_services();
        sel.select_employee(Some("E1".into()));
        let old = sel.select_date(ymd(2024, 6, 10), today()).unwrap().unwrap();
        let new = sel.select_employee(Some("E2".into())).unwrap();

        assert!(!sel.apply_availability(old.generation, vec!["08:00".into()]));
        assert!(sel.slots().is_empty());
        assert!(!sel.fail_availability(old.generation));
        assert!(sel.slots_loading());

        assert!(sel.apply_availability(new.generation, vec!["10:00".into()]));
        assert_eq!(sel.slots(), ["10:00"]);
    }

    #[test]
    fn test_date_change_clears_time() {
        let mut sel = selection_with_services();
        sel.select_employee(Some("E1".into()));
        let q = sel.select_date(ymd(2024, 6, 10), today()).unwrap().unwrap();
        sel.apply_availability(q.generation, vec!["10:00".into()]);
        sel.select_time("10:00").unwrap();

        sel.select_date(ymd(2024, 6, 11), today()).unwrap();
        assert_eq!(sel.time(), None);
    }

    #[test]
    fn test_clearing_date_drops_slots_and_pending_lookup() {
        let mut sel = selection_with_services();
        sel.select_employee(Some("E1".into()));
        let q = sel.select_date(ymd(2024, 6, 10), today()).unwrap().unwrap();
        sel.apply_availability(q.generation, vec!["10:00".into()]);
        sel.select_time("10:00").unwrap();

        let pending = sel.select_date(ymd(2024, 6, 11), today()).unwrap().unwrap();
        sel.clear_date();
        assert_eq!(sel.date(), None);
        assert_eq!(sel.time(), None);
        assert!(sel.slots().is_empty());
        assert!(!sel.slots_loading());
        assert!(sel.current_query().is_none());

        assert!(!sel.apply_availability(pending.generation, vec!["11:00".into()]));
        assert!(sel.slots().is_empty());
    }

    #[test]
    fn test_past_date_and_unknown_slot_rejected() {
        let mut sel = selection_with_services();
        assert!(sel.select_date(ymd(2024, 5, 31), today()).is_err());
        assert_eq!(sel.date(), None);
        assert!(sel.select_time("11:00").is_err());
    }

    #[test]
    fn test_toggle_service_removes_when_present() {
        let mut sel = selection_with_services();
        sel.toggle_service("A");
        assert_eq!(sel.service_ids(), ["B"]);
        assert!(!sel.calendar_visible());
    }

    #[test]
    fn test_submission_requires_every_field() {
        let mut sel = selection_with_services();
        sel.select_employee(Some("E1".into()));
        let q = sel.select_date(ymd(2024, 6, 10), today()).unwrap().unwrap();
        sel.apply_availability(q.generation, vec!["10:00".into()]);
        sel.select_time("10:00").unwrap();
        sel.set_client_name("Maria");

        let err = sel.submission().unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::Required { ref field }) if field == "clientPhone"
        ));

        sel.set_client_phone("555-0101");
        let request = sel.submission().unwrap();
        assert_eq!(request.appointment_date_time, "2024-06-10 10:00");
        assert_eq!(request.service_ids, vec!["A", "B"]);

        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["appointmentDateTime"], "2024-06-10 10:00");
        assert_eq!(body["establishmentId"], "est-1");
    }

    #[test]
    fn test_query_wire_shape() {
        let mut sel = selection_with_services();
        sel.select_employee(Some("E1".into()));
        let q = sel.select_date(ymd(2024, 6, 10), today()).unwrap().unwrap();
        let body = serde_json::to_value(&q).unwrap();
        assert_eq!(body["date"], "2024-06-10");
        assert_eq!(body["employeeId"], "E1");
        assert!(body.get("generation").is_none());
    }

    #[test]
    fn test_reset_keeps_month_and_invalidates() {
        let mut sel = selection_with_services();
        sel.next_month().unwrap();
        sel.select_employee(Some("E1".into()));
        let q = sel.select_date(ymd(2024, 7, 2), today()).unwrap().unwrap();

        sel.reset();
        assert_eq!(sel.displayed_month(), ymd(2024, 7, 1));
        assert!(sel.service_ids().is_empty());
        assert_eq!(sel.employee_id(), None);
        assert!(!sel.apply_availability(q.generation, vec!["10:00".into()]));
    }

    #[test]
    fn test_month_navigation() {
        let mut sel = BookingSelection::new("est-1", ymd(2024, 1, 15));
        assert_eq!(sel.previous_month().unwrap(), ymd(2023, 12, 1));
        assert_eq!(sel.next_month().unwrap(), ymd(2024, 1, 1));
        assert_eq!(sel.calendar(ymd(2024, 1, 15)).len() % 7, 0);
    }
}
