//! Batch reconciliation across person-days.
//!
//! Each `(employee_code, date)` unit is independent, so the batch walk is
//! embarrassingly parallel. All inputs arrive through the [`DaySource`] seam
//! so that feeds, lookups, and status overrides stay injectable — no module
//! globals, no shared mutable state.

use chrono::NaiveDate;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::discrepancy::{Discrepancy, detect};
use crate::pairing::{AttendanceDay, pair};
use crate::punch::PunchEvent;
use crate::timelog::TimeLogEntry;
use crate::types::EmployeeCode;
use crate::warning::ReconWarning;

/// Collaborator-supplied inputs for one person-day.
///
/// Implementations wrap the punch feed, the time-log feed, the person lookup,
/// and the attendance-status override of the host system. Must be `Sync`; the
/// batch walk calls it from worker threads.
pub trait DaySource: Sync {
    /// Whether the person is known to the lookup collaborator.
    fn known_person(&self, employee_code: &EmployeeCode) -> bool;

    /// Raw punches for the person-day, in any order.
    fn punches(&self, employee_code: &EmployeeCode, date: NaiveDate) -> Vec<PunchEvent>;

    /// Work log entries for the person-day.
    fn logs(&self, employee_code: &EmployeeCode, date: NaiveDate) -> Vec<TimeLogEntry>;

    /// External explicit-absent override for the person-day.
    fn marked_absent(&self, employee_code: &EmployeeCode, date: NaiveDate) -> bool;
}

/// Reconciled output for one person-day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayRecord {
    pub employee_code: EmployeeCode,
    pub date: NaiveDate,
    pub attendance: AttendanceDay,
    pub discrepancies: Vec<Discrepancy>,
}

/// Result of one batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchOutcome {
    /// One record per processed person-day, sorted by `(employee_code, date)`.
    pub days: Vec<DayRecord>,
    /// Warnings gathered across the whole run, for operator visibility.
    pub warnings: Vec<ReconWarning>,
}

/// Reconciles a batch of person-day units against a [`DaySource`].
///
/// Unknown persons are skipped with an [`ReconWarning::UnknownPerson`] and the
/// run continues; one bad record never aborts the batch. Per-day pairing
/// diagnostics are copied into the batch warning list as well as staying on
/// their [`AttendanceDay`].
pub fn reconcile_batch<S: DaySource>(
    source: &S,
    units: &[(EmployeeCode, NaiveDate)],
) -> BatchOutcome {
    let results: Vec<Result<DayRecord, ReconWarning>> = units
        .par_iter()
        .map(|(employee_code, date)| {
            if !source.known_person(employee_code) {
                tracing::warn!(employee = %employee_code, %date, "skipping unknown person");
                return Err(ReconWarning::UnknownPerson {
                    employee_code: employee_code.to_string(),
                    date: *date,
                });
            }

            let punches = source.punches(employee_code, *date);
            let attendance = pair(employee_code.clone(), *date, &punches);

            let logs = source.logs(employee_code, *date);
            let marked_absent = source.marked_absent(employee_code, *date);
            let discrepancies = detect(&attendance, &logs, marked_absent);

            Ok(DayRecord {
                employee_code: employee_code.clone(),
                date: *date,
                attendance,
                discrepancies,
            })
        })
        .collect();

    let mut days = Vec::with_capacity(results.len());
    let mut warnings = Vec::new();
    for result in results {
        match result {
            Ok(record) => {
                warnings.extend(record.attendance.diagnostics.iter().cloned());
                days.push(record);
            }
            Err(warning) => warnings.push(warning),
        }
    }

    days.sort_by(|a, b| {
        (&a.employee_code, a.date).cmp(&(&b.employee_code, b.date))
    });

    BatchOutcome { days, warnings }
}
