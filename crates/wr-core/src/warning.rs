//! Structured, non-fatal diagnostics.
//!
//! The engine never aborts a batch over one bad record. Anything dropped or
//! collapsed along the way is reported as a [`ReconWarning`] value returned
//! alongside the result, so hosts can route it to logs, metrics, or test
//! assertions without the engine owning an I/O channel.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::{ClockTime, Direction};

/// A single data-quality warning produced during reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReconWarning {
    /// A punch or log timestamp could not be parsed; the record was dropped.
    MalformedTimestamp {
        /// The raw timestamp string as received from the feed.
        raw: String,
        /// Identity of the offending record's source (e.g. employee code).
        source: String,
    },
    /// A paired session computed a negative duration and was discarded.
    InvalidSessionDuration {
        in_time: ClockTime,
        out_time: ClockTime,
    },
    /// A person-day referenced a person unknown to the lookup collaborator.
    UnknownPerson {
        employee_code: String,
        date: NaiveDate,
    },
    /// A punch was collapsed as a double-tap duplicate of a kept punch.
    DuplicatePunch {
        direction: Direction,
        kept: ClockTime,
        discarded: ClockTime,
    },
}

impl ReconWarning {
    /// Stable kind string, matching the serialized `kind` tag.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::MalformedTimestamp { .. } => "MALFORMED_TIMESTAMP",
            Self::InvalidSessionDuration { .. } => "INVALID_SESSION_DURATION",
            Self::UnknownPerson { .. } => "UNKNOWN_PERSON",
            Self::DuplicatePunch { .. } => "DUPLICATE_PUNCH",
        }
    }
}

impl fmt::Display for ReconWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedTimestamp { raw, source } => {
                write!(f, "malformed timestamp {raw:?} from {source}")
            }
            Self::InvalidSessionDuration { in_time, out_time } => {
                write!(f, "session {in_time}-{out_time} has negative duration")
            }
            Self::UnknownPerson {
                employee_code,
                date,
            } => {
                write!(f, "unknown person {employee_code} for {date}")
            }
            Self::DuplicatePunch {
                direction,
                kept,
                discarded,
            } => {
                write!(f, "duplicate {direction} punch {discarded} collapsed into {kept}")
            }
        }
    }
}
