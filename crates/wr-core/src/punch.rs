//! Raw punch events and feed normalization.
//!
//! Upstream device feeds deliver `dd/MM/yyyy HH:mm:ss` timestamps;
//! spreadsheet-upload feeds deliver bare `HH:mm` cells against a known date.
//! Both are normalized to whole-minute wall-clock time before pairing.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{ClockTime, Direction, EmployeeCode};
use crate::warning::ReconWarning;

/// Device feed timestamp format.
const DEVICE_TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("malformed timestamp: {raw}")]
    MalformedTimestamp { raw: String },
}

/// One raw biometric/device swipe, already normalized to whole minutes.
///
/// Immutable; created by the feed collaborator and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PunchEvent {
    pub employee_code: EmployeeCode,
    pub employee_name: String,
    /// Calendar day the punch belongs to.
    pub date: NaiveDate,
    /// Wall-clock minute of the swipe.
    pub time: ClockTime,
    pub direction: Direction,
}

impl PunchEvent {
    /// Builds a punch from a device feed row (`dd/MM/yyyy HH:mm:ss`).
    pub fn from_device_row(
        employee_code: EmployeeCode,
        employee_name: impl Into<String>,
        raw_timestamp: &str,
        direction: Direction,
    ) -> Result<Self, FeedError> {
        let (date, time) = parse_device_timestamp(raw_timestamp)?;
        Ok(Self {
            employee_code,
            employee_name: employee_name.into(),
            date,
            time,
            direction,
        })
    }

    /// Builds a punch from a spreadsheet cell (`HH:mm`) on a known date.
    pub fn from_clock_cell(
        employee_code: EmployeeCode,
        employee_name: impl Into<String>,
        date: NaiveDate,
        raw_time: &str,
        direction: Direction,
    ) -> Result<Self, FeedError> {
        let time: ClockTime = raw_time
            .trim()
            .parse()
            .map_err(|_| FeedError::MalformedTimestamp {
                raw: raw_time.to_string(),
            })?;
        Ok(Self {
            employee_code,
            employee_name: employee_name.into(),
            date,
            time,
            direction,
        })
    }
}

/// Parses a device feed timestamp, truncating seconds to whole minutes.
pub fn parse_device_timestamp(raw: &str) -> Result<(NaiveDate, ClockTime), FeedError> {
    let parsed = NaiveDateTime::parse_from_str(raw.trim(), DEVICE_TIMESTAMP_FORMAT).map_err(
        |_| FeedError::MalformedTimestamp {
            raw: raw.to_string(),
        },
    )?;
    Ok((parsed.date(), ClockTime::from_naive_time(parsed.time())))
}

/// An unparsed device feed row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceRow {
    pub employee_code: EmployeeCode,
    pub employee_name: String,
    pub raw_timestamp: String,
    pub direction: Direction,
}

/// Normalizes a batch of device rows.
///
/// Rows with malformed timestamps are dropped with a
/// [`ReconWarning::MalformedTimestamp`] and processing continues; a bad row
/// is never fatal.
pub fn normalize_device_rows(rows: &[DeviceRow]) -> (Vec<PunchEvent>, Vec<ReconWarning>) {
    let mut events = Vec::with_capacity(rows.len());
    let mut warnings = Vec::new();

    for row in rows {
        match PunchEvent::from_device_row(
            row.employee_code.clone(),
            row.employee_name.clone(),
            &row.raw_timestamp,
            row.direction,
        ) {
            Ok(event) => events.push(event),
            Err(FeedError::MalformedTimestamp { raw }) => {
                tracing::warn!(
                    employee = %row.employee_code,
                    raw = %raw,
                    "dropping punch with malformed timestamp"
                );
                warnings.push(ReconWarning::MalformedTimestamp {
                    raw,
                    source: row.employee_code.to_string(),
                });
            }
        }
    }

    (events, warnings)
}
