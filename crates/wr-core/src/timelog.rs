//! Self-reported work log entries.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::types::ClockTime;

/// One independently-logged work record from the time-tracking collaborator.
///
/// Read-only to this engine; ownership stays with the collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeLogEntry {
    /// When the log was recorded.
    pub logged_at: NaiveDateTime,
    /// The calendar day the entry claims to cover.
    pub work_date: NaiveDate,
    /// Claimed work duration in minutes.
    pub duration_minutes: i64,
    /// Free-form task label.
    pub label: String,
}

impl TimeLogEntry {
    /// Wall-clock minute-of-day at which the log was recorded.
    #[must_use]
    pub fn logged_time(&self) -> ClockTime {
        ClockTime::from_naive_time(self.logged_at.time())
    }

    /// True when the entry was recorded on a different calendar day than the
    /// work it claims to cover.
    #[must_use]
    pub fn is_backfilled(&self) -> bool {
        self.logged_at.date() != self.work_date
    }
}
