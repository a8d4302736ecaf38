//! Calendar and wall-clock arithmetic for relative time ranges
//!
//! These helpers back the `in_past` range predicates on temporal fields.
//! Each temporal domain has its own overflow policy:
//!
//! - **Dates** roll over through the calendar (`Jan 31 + 1 month` lands on
//!   the last valid day of February) and saturate at the representable
//!   date range.
//! - **Wall-clock times** never cross midnight: results clamp to
//!   `00:00:00.000` or `23:59:59.999`.
//! - **Datetimes** carry into adjacent days like ordinary timestamps.

use std::fmt;

use chrono::{DateTime, Duration, Months, NaiveDate, NaiveTime, Timelike, Utc};

/// Milliseconds in one calendar day
const MS_PER_DAY: i64 = 86_400_000;

/// Milliseconds from midnight to the last representable wall-clock instant
const END_OF_DAY_MS: i64 = 86_399_999;

// ============================================================================
// Granularities
// ============================================================================

/// Units valid for date-valued arithmetic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateGranularity {
    /// Calendar years
    Years,
    /// Calendar months
    Months,
    /// Seven-day weeks
    Weeks,
    /// Calendar days
    Days,
}

/// Units valid for wall-clock arithmetic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeGranularity {
    /// Hours
    Hours,
    /// Minutes
    Minutes,
    /// Seconds
    Seconds,
    /// Milliseconds
    Milliseconds,
}

impl TimeGranularity {
    /// Milliseconds in one unit of this granularity
    pub fn millis(self) -> i64 {
        match self {
            TimeGranularity::Hours => 3_600_000,
            TimeGranularity::Minutes => 60_000,
            TimeGranularity::Seconds => 1_000,
            TimeGranularity::Milliseconds => 1,
        }
    }
}

/// Units valid for datetime arithmetic: the union of date and time units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateTimeGranularity {
    /// Date-component unit (years through days)
    Date(DateGranularity),
    /// Time-component unit (hours through milliseconds)
    Time(TimeGranularity),
}

impl From<DateGranularity> for DateTimeGranularity {
    fn from(granularity: DateGranularity) -> Self {
        DateTimeGranularity::Date(granularity)
    }
}

impl From<TimeGranularity> for DateTimeGranularity {
    fn from(granularity: TimeGranularity) -> Self {
        DateTimeGranularity::Time(granularity)
    }
}

impl fmt::Display for DateGranularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = match self {
            DateGranularity::Years => "years",
            DateGranularity::Months => "months",
            DateGranularity::Weeks => "weeks",
            DateGranularity::Days => "days",
        };
        f.write_str(token)
    }
}

impl fmt::Display for TimeGranularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = match self {
            TimeGranularity::Hours => "hours",
            TimeGranularity::Minutes => "minutes",
            TimeGranularity::Seconds => "seconds",
            TimeGranularity::Milliseconds => "milliseconds",
        };
        f.write_str(token)
    }
}

impl fmt::Display for DateTimeGranularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateTimeGranularity::Date(granularity) => granularity.fmt(f),
            DateTimeGranularity::Time(granularity) => granularity.fmt(f),
        }
    }
}

// ============================================================================
// Date Arithmetic
// ============================================================================

/// Add `n` units to a calendar date
///
/// Month and year steps clamp to the last valid day of the target month.
/// Results outside the representable date range saturate at the bounds.
pub fn add_duration_date(base: NaiveDate, n: i64, granularity: DateGranularity) -> NaiveDate {
    match granularity {
        DateGranularity::Years => add_date_months(base, n.saturating_mul(12)),
        DateGranularity::Months => add_date_months(base, n),
        DateGranularity::Weeks => add_date_days(base, n.saturating_mul(7)),
        DateGranularity::Days => add_date_days(base, n),
    }
}

fn add_date_months(base: NaiveDate, n: i64) -> NaiveDate {
    let magnitude = n.unsigned_abs().min(u64::from(u32::MAX)) as u32;
    if n >= 0 {
        base.checked_add_months(Months::new(magnitude))
            .unwrap_or(NaiveDate::MAX)
    } else {
        base.checked_sub_months(Months::new(magnitude))
            .unwrap_or(NaiveDate::MIN)
    }
}

fn add_date_days(base: NaiveDate, n: i64) -> NaiveDate {
    let bound = if n >= 0 { NaiveDate::MAX } else { NaiveDate::MIN };
    base.checked_add_signed(Duration::milliseconds(n.saturating_mul(MS_PER_DAY)))
        .unwrap_or(bound)
}

// ============================================================================
// Wall-Clock Arithmetic
// ============================================================================

/// Add `n` units to a wall-clock time, clamping at the day boundaries
///
/// A bare time has no date to carry into, so anything below midnight comes
/// back as `00:00:00.000` and anything past the end of the day comes back
/// as `23:59:59.999`.
pub fn add_duration_time(base: NaiveTime, n: i64, granularity: TimeGranularity) -> NaiveTime {
    let base_ms = i64::from(base.num_seconds_from_midnight()) * 1_000
        + i64::from(base.nanosecond() / 1_000_000);
    let shifted = base_ms.saturating_add(n.saturating_mul(granularity.millis()));
    millis_to_time(shifted.clamp(0, END_OF_DAY_MS))
}

fn millis_to_time(ms: i64) -> NaiveTime {
    let secs = (ms / 1_000) as u32;
    let millis = (ms % 1_000) as u32;
    NaiveTime::from_num_seconds_from_midnight_opt(secs, millis * 1_000_000)
        .unwrap_or(NaiveTime::MIN)
}

// ============================================================================
// Datetime Arithmetic
// ============================================================================

/// Add `n` units to a UTC datetime
///
/// Time-unit steps carry across midnight into adjacent days. Month and year
/// steps clamp to the last valid day of the target month. Results outside
/// the representable range saturate at the bounds.
pub fn add_duration_datetime(
    base: DateTime<Utc>,
    n: i64,
    granularity: DateTimeGranularity,
) -> DateTime<Utc> {
    match granularity {
        DateTimeGranularity::Date(DateGranularity::Years) => {
            add_datetime_months(base, n.saturating_mul(12))
        }
        DateTimeGranularity::Date(DateGranularity::Months) => add_datetime_months(base, n),
        DateTimeGranularity::Date(DateGranularity::Weeks) => {
            shift_datetime(base, n, 7 * MS_PER_DAY)
        }
        DateTimeGranularity::Date(DateGranularity::Days) => shift_datetime(base, n, MS_PER_DAY),
        DateTimeGranularity::Time(unit) => shift_datetime(base, n, unit.millis()),
    }
}

fn add_datetime_months(base: DateTime<Utc>, n: i64) -> DateTime<Utc> {
    let magnitude = n.unsigned_abs().min(u64::from(u32::MAX)) as u32;
    if n >= 0 {
        base.checked_add_months(Months::new(magnitude))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    } else {
        base.checked_sub_months(Months::new(magnitude))
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

fn shift_datetime(base: DateTime<Utc>, n: i64, unit_ms: i64) -> DateTime<Utc> {
    let bound = if n >= 0 {
        DateTime::<Utc>::MAX_UTC
    } else {
        DateTime::<Utc>::MIN_UTC
    };
    base.checked_add_signed(Duration::milliseconds(n.saturating_mul(unit_ms)))
        .unwrap_or(bound)
}

// ============================================================================
// Tests
// ============================================================================
