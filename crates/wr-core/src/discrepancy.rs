//! Discrepancy detection between attendance and logged work.
//!
//! Four rules, each independently total: a day can trigger any subset of them
//! and no rule ever short-circuits another. The detector only produces `open`
//! records; resolution and upsert-by-`(person, date, rule)` belong to the
//! persistence collaborator.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::pairing::AttendanceDay;
use crate::timelog::TimeLogEntry;
use crate::types::{ClockTime, DayStatus, EmployeeCode, Severity};

/// Start of the workday window, inclusive.
pub const WORKDAY_START: ClockTime = {
    // `ValidationError` has drop glue, so the `Result` must be forgotten
    // rather than dropped to stay const-evaluable on stable Rust.
    let r = ClockTime::from_hm(10, 0);
    let t = match &r {
        Ok(t) => *t,
        Err(_) => unreachable!(),
    };
    std::mem::forget(r);
    t
};

/// End of the workday window, exclusive.
pub const WORKDAY_END: ClockTime = {
    let r = ClockTime::from_hm(20, 0);
    let t = match &r {
        Ok(t) => *t,
        Err(_) => unreachable!(),
    };
    std::mem::forget(r);
    t
};

/// Attendance minutes below which presence counts as effectively zero.
pub const PRESENCE_FLOOR_MINUTES: i64 = 30;

/// Logged minutes above which zero presence becomes a violation.
pub const LOGGED_FLOOR_MINUTES: i64 = 60;

/// Minute threshold separating medium from high `LOG_AFTER_EXIT` severity.
const LOG_AFTER_EXIT_MEDIUM_CAP: i64 = 30;

/// The fixed rule enumeration. String form is the persistence upsert key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscrepancyRule {
    /// Work logged from inside a gap between two attendance sessions.
    LogAfterExit,
    /// Work logged during office hours on a day with no attendance at all.
    NoAttendance,
    /// Work logged outside the workday window.
    OutsideHours,
    /// Substantial logged work against effectively zero presence.
    ZeroPresence,
}

impl DiscrepancyRule {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::LogAfterExit => "LOG_AFTER_EXIT",
            Self::NoAttendance => "NO_ATTENDANCE",
            Self::OutsideHours => "OUTSIDE_HOURS",
            Self::ZeroPresence => "ZERO_PRESENCE",
        }
    }
}

impl fmt::Display for DiscrepancyRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DiscrepancyRule {
    type Err = UnknownRule;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LOG_AFTER_EXIT" => Ok(Self::LogAfterExit),
            "NO_ATTENDANCE" => Ok(Self::NoAttendance),
            "OUTSIDE_HOURS" => Ok(Self::OutsideHours),
            "ZERO_PRESENCE" => Ok(Self::ZeroPresence),
            _ => Err(UnknownRule(s.to_string())),
        }
    }
}

/// Error type for unknown rule strings.
#[derive(Debug, Clone)]
pub struct UnknownRule(String);

impl fmt::Display for UnknownRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown discrepancy rule: {}", self.0)
    }
}

impl std::error::Error for UnknownRule {}

/// Rule-specific structured detail, one payload shape per rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscrepancyDetails {
    LogAfterExit {
        /// Label of the offending log entry.
        label: String,
        /// Clock time the log was recorded.
        logged_at: ClockTime,
        /// Out-time of the session the gap follows.
        gap_start: ClockTime,
        /// In-time of the session the gap precedes.
        gap_end: ClockTime,
    },
    NoAttendance {
        logged_minutes: i64,
        entry_count: usize,
    },
    OutsideHours {
        logged_minutes: i64,
        entry_count: usize,
    },
    ZeroPresence {
        attendance_minutes: i64,
        logged_minutes: i64,
    },
}

impl DiscrepancyDetails {
    /// The rule this detail payload belongs to.
    #[must_use]
    pub const fn rule(&self) -> DiscrepancyRule {
        match self {
            Self::LogAfterExit { .. } => DiscrepancyRule::LogAfterExit,
            Self::NoAttendance { .. } => DiscrepancyRule::NoAttendance,
            Self::OutsideHours { .. } => DiscrepancyRule::OutsideHours,
            Self::ZeroPresence { .. } => DiscrepancyRule::ZeroPresence,
        }
    }
}

/// Lifecycle status of a discrepancy. The detector only emits [`Self::Open`];
/// transitions are the persistence layer's concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DiscrepancyStatus {
    #[default]
    Open,
    Resolved,
}

/// One detected violation for a person-day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discrepancy {
    pub employee_code: EmployeeCode,
    pub date: NaiveDate,
    pub rule: DiscrepancyRule,
    pub severity: Severity,
    pub minutes_involved: i64,
    #[serde(default)]
    pub status: DiscrepancyStatus,
    pub details: DiscrepancyDetails,
}

impl Discrepancy {
    fn open(
        employee_code: EmployeeCode,
        date: NaiveDate,
        minutes_involved: i64,
        details: DiscrepancyDetails,
    ) -> Self {
        let rule = details.rule();
        Self {
            employee_code,
            date,
            rule,
            severity: severity_for(rule, minutes_involved),
            minutes_involved,
            status: DiscrepancyStatus::Open,
            details,
        }
    }
}

/// Severity is purely a function of `(rule, minutes)`.
#[must_use]
pub const fn severity_for(rule: DiscrepancyRule, minutes: i64) -> Severity {
    match rule {
        DiscrepancyRule::LogAfterExit => {
            if minutes <= LOG_AFTER_EXIT_MEDIUM_CAP {
                Severity::Medium
            } else {
                Severity::High
            }
        }
        DiscrepancyRule::NoAttendance => Severity::Medium,
        DiscrepancyRule::OutsideHours => Severity::Low,
        DiscrepancyRule::ZeroPresence => Severity::High,
    }
}

/// True when a clock time falls inside the `[10:00, 20:00)` workday window.
#[must_use]
pub fn within_workday(time: ClockTime) -> bool {
    time >= WORKDAY_START && time < WORKDAY_END
}

/// Runs every rule against one reconciled day and its independent work logs.
///
/// `marked_absent` is the external attendance-status collaborator's override;
/// `NO_ATTENDANCE` treats it the same as a day with no punches at all. Rules
/// are evaluated independently and their results concatenated; a day can fire
/// all four at once. The known overlap between `NO_ATTENDANCE` and
/// `OUTSIDE_HOURS` on absent days is preserved deliberately.
#[must_use]
pub fn detect(
    day: &AttendanceDay,
    logs: &[TimeLogEntry],
    marked_absent: bool,
) -> Vec<Discrepancy> {
    let mut found = Vec::new();

    detect_log_after_exit(day, logs, &mut found);
    detect_no_attendance(day, logs, marked_absent, &mut found);
    detect_outside_hours(day, logs, &mut found);
    detect_zero_presence(day, logs, marked_absent, &mut found);

    found
}

/// One discrepancy per log entry recorded strictly inside a gap between two
/// consecutive sessions. Needs at least two sessions for a gap to exist.
fn detect_log_after_exit(day: &AttendanceDay, logs: &[TimeLogEntry], found: &mut Vec<Discrepancy>) {
    if day.sessions.len() < 2 {
        return;
    }

    for pair in day.sessions.windows(2) {
        let gap_start = pair[0].out_time;
        let gap_end = pair[1].in_time;

        for log in logs {
            let logged_at = log.logged_time();
            if logged_at > gap_start && logged_at < gap_end {
                found.push(Discrepancy::open(
                    day.employee_code.clone(),
                    day.date,
                    log.duration_minutes,
                    DiscrepancyDetails::LogAfterExit {
                        label: log.label.clone(),
                        logged_at,
                        gap_start,
                        gap_end,
                    },
                ));
            }
        }
    }
}

/// One aggregate discrepancy when office-hours work was logged on a day with
/// no attendance (no punches, or explicitly marked absent).
fn detect_no_attendance(
    day: &AttendanceDay,
    logs: &[TimeLogEntry],
    marked_absent: bool,
    found: &mut Vec<Discrepancy>,
) {
    if day.status != DayStatus::Absent && !marked_absent {
        return;
    }

    let in_window: Vec<&TimeLogEntry> = logs
        .iter()
        .filter(|log| within_workday(log.logged_time()))
        .collect();
    if in_window.is_empty() {
        return;
    }

    let logged_minutes: i64 = in_window.iter().map(|log| log.duration_minutes).sum();
    found.push(Discrepancy::open(
        day.employee_code.clone(),
        day.date,
        logged_minutes,
        DiscrepancyDetails::NoAttendance {
            logged_minutes,
            entry_count: in_window.len(),
        },
    ));
}

/// One aggregate discrepancy for all work logged outside the workday window,
/// regardless of attendance status.
fn detect_outside_hours(day: &AttendanceDay, logs: &[TimeLogEntry], found: &mut Vec<Discrepancy>) {
    let outside: Vec<&TimeLogEntry> = logs
        .iter()
        .filter(|log| !within_workday(log.logged_time()))
        .collect();
    if outside.is_empty() {
        return;
    }

    let logged_minutes: i64 = outside.iter().map(|log| log.duration_minutes).sum();
    found.push(Discrepancy::open(
        day.employee_code.clone(),
        day.date,
        logged_minutes,
        DiscrepancyDetails::OutsideHours {
            logged_minutes,
            entry_count: outside.len(),
        },
    ));
}

/// Effectively-zero presence against substantial logged work. Only applies
/// when an attendance record exists for the day.
fn detect_zero_presence(
    day: &AttendanceDay,
    logs: &[TimeLogEntry],
    marked_absent: bool,
    found: &mut Vec<Discrepancy>,
) {
    if day.status == DayStatus::Absent || marked_absent {
        return;
    }

    let logged_minutes: i64 = logs.iter().map(|log| log.duration_minutes).sum();
    if day.total_minutes < PRESENCE_FLOOR_MINUTES && logged_minutes > LOGGED_FLOOR_MINUTES {
        found.push(Discrepancy::open(
            day.employee_code.clone(),
            day.date,
            logged_minutes,
            DiscrepancyDetails::ZeroPresence {
                attendance_minutes: day.total_minutes,
                logged_minutes,
            },
        ));
    }
}
