//! Per-day compliance flag classification.
//!
//! Thin, mechanical layer: independent boolean predicates over a day's totals,
//! summed across date ranges by the reporting collaborator. No state machines,
//! no side effects.

use serde::{Deserialize, Serialize};

use crate::types::ClockTime;

/// Check-in later than this is a late mark.
pub const LATE_MARK: ClockTime = {
    // `ValidationError` has drop glue, so the `Result` must be forgotten
    // rather than dropped to stay const-evaluable on stable Rust.
    let r = ClockTime::from_hm(10, 30);
    let t = match &r {
        Ok(t) => *t,
        Err(_) => unreachable!(),
    };
    std::mem::forget(r);
    t
};

/// Check-in later than this is a super-late mark.
pub const SUPER_LATE_MARK: ClockTime = {
    let r = ClockTime::from_hm(10, 45);
    let t = match &r {
        Ok(t) => *t,
        Err(_) => unreachable!(),
    };
    std::mem::forget(r);
    t
};

/// A full working day in minutes (8h).
pub const FULL_DAY_MINUTES: i64 = 8 * 60;

/// Inputs for one day's classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayTotals {
    /// Minutes of paired attendance presence.
    pub attendance_minutes: i64,
    /// Minutes of self-reported logged work.
    pub logged_minutes: i64,
    /// Earliest raw IN punch, if any.
    pub first_in: Option<ClockTime>,
}

/// Independent per-day compliance flags, used purely for reporting counts.
///
/// Flags are not mutually exclusive except where arithmetically implied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ComplianceFlags {
    /// First-in after 10:30 but not after 10:45.
    pub late_check_in: bool,
    /// First-in after 10:45.
    pub super_late_check_in: bool,
    /// Both totals under 8h while at least one is above zero.
    pub insufficient_hours: bool,
    /// Attendance under 8h but logged work at or above 8h.
    pub outside_office_work: bool,
    /// Both totals are exactly zero.
    pub no_data_day: bool,
    /// Super-late check-in combined with under-8h presence.
    pub super_late_low_presence: bool,
    /// Super-late check-in combined with 8h+ of logged work.
    pub super_late_full_logs: bool,
}

/// Evaluates every flag for one day.
#[must_use]
pub fn classify(totals: &DayTotals) -> ComplianceFlags {
    let DayTotals {
        attendance_minutes,
        logged_minutes,
        first_in,
    } = *totals;

    let late_check_in =
        first_in.is_some_and(|t| t > LATE_MARK && t <= SUPER_LATE_MARK);
    let super_late_check_in = first_in.is_some_and(|t| t > SUPER_LATE_MARK);

    let no_data_day = attendance_minutes == 0 && logged_minutes == 0;
    let insufficient_hours = attendance_minutes < FULL_DAY_MINUTES
        && logged_minutes < FULL_DAY_MINUTES
        && !no_data_day;
    let outside_office_work =
        attendance_minutes < FULL_DAY_MINUTES && logged_minutes >= FULL_DAY_MINUTES;

    ComplianceFlags {
        late_check_in,
        super_late_check_in,
        insufficient_hours,
        outside_office_work,
        no_data_day,
        super_late_low_presence: super_late_check_in && attendance_minutes < FULL_DAY_MINUTES,
        super_late_full_logs: super_late_check_in && logged_minutes >= FULL_DAY_MINUTES,
    }
}
