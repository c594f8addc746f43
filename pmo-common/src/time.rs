//! Date calculations for tasks, projects and analysts
//!
//! Every calculation takes `today` explicitly so results are reproducible;
//! production callers pass [`today()`]. Comparisons are at day granularity.

use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, Utc};
use serde::Serialize;

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Current local calendar date (time-of-day dropped)
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// True iff `date` is strictly before `today`
pub fn is_overdue(date: NaiveDate, today: NaiveDate) -> bool {
    date < today
}

/// True iff `date` falls in the same month and year as `today`
pub fn is_current_month(date: NaiveDate, today: NaiveDate) -> bool {
    date.month() == today.month() && date.year() == today.year()
}

/// An analyst is available once their last scheduled task ends on or before today.
/// No scheduled task means available.
pub fn is_available(last_task: Option<NaiveDate>, today: NaiveDate) -> bool {
    last_task.map_or(true, |date| date <= today)
}

/// Whole days from `today` until `date`, never negative
pub fn days_until(date: NaiveDate, today: NaiveDate) -> i64 {
    (date - today).num_days().max(0)
}

/// Absolute number of days between two dates
pub fn duration_days(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days().abs()
}

/// Elapsed share of `start..end` at `today`, as a percentage in `[0, 100]`
///
/// A zero or negative span is all-or-nothing: 100 once `today >= end`.
pub fn project_progress(start: NaiveDate, end: NaiveDate, today: NaiveDate) -> f64 {
    let total = (end - start).num_days();
    if total <= 0 {
        return if today >= end { 100.0 } else { 0.0 };
    }

    let elapsed = (today - start).num_days();
    (elapsed as f64 / total as f64 * 100.0).clamp(0.0, 100.0)
}

/// Monday of the week containing `date`
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// Planning bucket of a task relative to today
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Period {
    Overdue,
    ThisWeek,
    ThisMonth,
    Later,
    Undated,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Overdue => "overdue",
            Period::ThisWeek => "thisWeek",
            Period::ThisMonth => "thisMonth",
            Period::Later => "later",
            Period::Undated => "undated",
        }
    }
}

/// Bucket a due date into overdue / this week / this month / later
pub fn classify_period(due: Option<NaiveDate>, today: NaiveDate) -> Period {
    let Some(due) = due else {
        return Period::Undated;
    };

    if is_overdue(due, today) {
        Period::Overdue
    } else if due < week_start(today) + Duration::days(7) {
        Period::ThisWeek
    } else if is_current_month(due, today) {
        Period::ThisMonth
    } else {
        Period::Later
    }
}
