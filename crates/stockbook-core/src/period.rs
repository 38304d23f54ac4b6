//! # Calendar Periods
//!
//! Period math for reporting: month/year/day bounds and trailing windows.
//!
//! ## Half-Open Ranges
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  Every range is [start, end): start inclusive, end EXCLUSIVE.       │
//! │                                                                     │
//! │  month_bounds(2024, 1) = [2024-01-01T00:00Z, 2024-02-01T00:00Z)     │
//! │                                                                     │
//! │  Why? "Inclusive end of month" implemented as last-day-23:59:59     │
//! │  silently drops events in the final second (or millisecond,         │
//! │  depending on precision). Comparing `date < next period start`      │
//! │  has no such edge.                                                  │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All bounds are UTC. The shop's ledger stores UTC timestamps; calendar
//! bucketing happens against those directly.

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};

// =============================================================================
// Date Range
// =============================================================================

/// A half-open time range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    /// Inclusive start.
    pub start: DateTime<Utc>,
    /// Exclusive end.
    pub end: DateTime<Utc>,
}

impl DateRange {
    /// Whether an instant falls inside the range.
    #[inline]
    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        t >= self.start && t < self.end
    }
}

// =============================================================================
// Bound Constructors
// =============================================================================

/// Start of a calendar day, UTC.
pub fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0).expect("midnight is always valid"))
}

/// Exclusive end of a calendar day (start of the next day), UTC.
///
/// Equivalent to the caller-facing contract "endDate 23:59:59 inclusive".
pub fn end_of_day_exclusive(date: NaiveDate) -> DateTime<Utc> {
    start_of_day(date.succ_opt().unwrap_or(date))
}

/// Bounds of one calendar day. `None` for an invalid date (e.g. Feb 30).
pub fn day_bounds(year: i32, month: u32, day: u32) -> Option<DateRange> {
    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    Some(DateRange {
        start: start_of_day(date),
        end: end_of_day_exclusive(date),
    })
}

/// Bounds of one calendar month. `None` for an invalid month number.
pub fn month_bounds(year: i32, month: u32) -> Option<DateRange> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)?;
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let end = NaiveDate::from_ymd_opt(next_year, next_month, 1)?;
    Some(DateRange {
        start: start_of_day(start),
        end: start_of_day(end),
    })
}

/// Bounds of the calendar month containing `reference`.
pub fn month_of(reference: DateTime<Utc>) -> DateRange {
    // A DateTime always carries a valid (year, month) pair.
    month_bounds(reference.year(), reference.month()).expect("valid month from DateTime")
}

/// Bounds of one calendar year.
pub fn year_bounds(year: i32) -> Option<DateRange> {
    let start = NaiveDate::from_ymd_opt(year, 1, 1)?;
    let end = NaiveDate::from_ymd_opt(year + 1, 1, 1)?;
    Some(DateRange {
        start: start_of_day(start),
        end: start_of_day(end),
    })
}

/// The trailing `months`-month window ending with the month containing
/// `reference` (inclusive of the current month).
///
/// `trailing_months(2024-03-15, 12)` = `[2023-04-01, 2024-04-01)`.
pub fn trailing_months(reference: DateTime<Utc>, months: u32) -> DateRange {
    let current = month_of(reference);
    let total = reference.year() * 12 + reference.month() as i32 - 1 - (months as i32 - 1);
    let start_year = total.div_euclid(12);
    let start_month = total.rem_euclid(12) as u32 + 1;

    DateRange {
        // Same infallibility argument as month_of.
        start: month_bounds(start_year, start_month)
            .expect("valid month from arithmetic")
            .start,
        end: current.end,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
