//! Core domain logic for workday reconciliation.
//!
//! This crate contains the fundamental types and logic for:
//! - Punch pairing: reducing raw IN/OUT punches to valid work sessions
//! - Discrepancy detection: typed violations between attendance and work logs
//! - Compliance classification: per-day reporting flags
//!
//! Everything here is pure and synchronous; persistence, HTTP, and feed I/O
//! live with external collaborators behind the [`DaySource`] seam.

pub mod batch;
pub mod compliance;
pub mod discrepancy;
pub mod pairing;
pub mod punch;
pub mod timelog;
pub mod types;
pub mod warning;

pub use batch::{BatchOutcome, DayRecord, DaySource, reconcile_batch};
pub use compliance::{ComplianceFlags, DayTotals, classify};
pub use discrepancy::{
    Discrepancy, DiscrepancyDetails, DiscrepancyRule, DiscrepancyStatus, detect,
};
pub use pairing::{AttendanceDay, WorkSession, pair};
pub use punch::{DeviceRow, FeedError, PunchEvent, normalize_device_rows, parse_device_timestamp};
pub use timelog::TimeLogEntry;
pub use types::{ClockTime, DayStatus, Direction, EmployeeCode, Severity, ValidationError};
pub use warning::ReconWarning;
