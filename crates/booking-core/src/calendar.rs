//! # Calendar Math
//!
//! Month display grid for the booking wizard's date picker.
//!
//! ## Grid Layout
//! ```text
//!   June 2024
//!   Sun  Mon  Tue  Wed  Thu  Fri  Sat
//!   ┌────┬────┬────┬────┬────┬────┬────┐
//!   │ 26 │ 27 │ 28 │ 29 │ 30 │ 31 │  1 │   ◄── starts on the Sunday on/before the 1st
//!   ├────┼────┼────┼────┼────┼────┼────┤
//!   │  2 │  3 │  … │    │    │    │  8 │
//!   ├────┼────┼────┼────┼────┼────┼────┤
//!   │ …  │    │    │    │    │    │    │
//!   ├────┼────┼────┼────┼────┼────┼────┤
//!   │ 30 │  1 │  2 │  3 │  4 │  5 │  6 │   ◄── ends on the Saturday on/after the last day
//!   └────┴────┴────┴────┴────┴────┴────┘
//! ```
//!
//! The grid length is always a multiple of 7. Cells outside the displayed
//! month are still returned; the view decides how to render them.

use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime};
use serde::Serialize;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};

/// Column headers, Sunday first.
pub const WEEKDAY_LABELS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

// =============================================================================
// Month Boundaries
// =============================================================================

/// First day of the month containing `date`.
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.day0()))
}

/// Last day of the month containing `date`.
pub fn month_end(date: NaiveDate) -> NaiveDate {
    let start = month_start(date);
    start + Duration::days(i64::from(days_in_month(start.year(), start.month())) - 1)
}

fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        4 | 6 | 9 | 11 => 30,
        2 if NaiveDate::from_ymd_opt(year, 2, 29).is_some() => 29,
        2 => 28,
        _ => 31,
    }
}

/// Steps `delta` months from the month containing `date`.
///
/// Returns the first day of the target month.
pub fn add_months(date: NaiveDate, delta: i32) -> CoreResult<NaiveDate> {
    let start = month_start(date);
    let months = Months::new(delta.unsigned_abs());
    let shifted = if delta >= 0 {
        start.checked_add_months(months)
    } else {
        start.checked_sub_months(months)
    };
    shifted.ok_or_else(|| CoreError::MonthOutOfRange(format!("{} {:+}", start, delta)))
}

/// Display title, e.g. `"June 2024"`.
pub fn month_title(date: NaiveDate) -> String {
    date.format("%B %Y").to_string()
}

// =============================================================================
// Grid
// =============================================================================

/// Every date shown for the month containing `month_reference`.
///
/// ## Guarantees
/// - `grid[0]` is a Sunday and `grid[0] <= 1st of month`
/// - `grid.last()` is a Saturday and `>= last day of month`
/// - consecutive days, ascending, `len() % 7 == 0`
pub fn grid_for(month_reference: NaiveDate) -> Vec<NaiveDate> {
    let first = month_start(month_reference);
    let last = month_end(month_reference);

    let start = first - Duration::days(i64::from(first.weekday().num_days_from_sunday()));
    let end = last + Duration::days(6 - i64::from(last.weekday().num_days_from_sunday()));

    start.iter_days().take_while(|d| *d <= end).collect()
}

/// A rendered grid cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CalendarDay {
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub day: u32,
    pub in_displayed_month: bool,
    pub is_today: bool,
    pub is_selected: bool,
    /// Days strictly before today cannot be booked.
    pub is_selectable: bool,
}

/// Grid cells with their display flags.
pub fn month_view(
    displayed_month: NaiveDate,
    today: NaiveDate,
    selected: Option<NaiveDate>,
) -> Vec<CalendarDay> {
    let month = displayed_month.month();
    let year = displayed_month.year();

    grid_for(displayed_month)
        .into_iter()
        .map(|date| CalendarDay {
            date,
            day: date.day(),
            in_displayed_month: date.month() == month && date.year() == year,
            is_today: date == today,
            is_selected: selected == Some(date),
            is_selectable: is_selectable(date, today),
        })
        .collect()
}

/// Whether `date` may be picked given `today`.
pub fn is_selectable(date: NaiveDate, today: NaiveDate) -> bool {
    date >= today
}

/// Same calendar day, time of day ignored.
pub fn same_day(a: NaiveDateTime, b: NaiveDateTime) -> bool {
    a.date() == b.date()
}

/// `a` falls on an earlier calendar day than `b`, time of day ignored.
pub fn is_before_day(a: NaiveDateTime, b: NaiveDateTime) -> bool {
    a.date() < b.date()
}

// =============================================================================
// Unit Tests
// =============================================================================
