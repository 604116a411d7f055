//! Punch pairing engine.
//!
//! Turns the unordered raw IN/OUT punches of one person-day into valid work
//! sessions, collapsing biometric double-taps deterministically. The rules are
//! anchored to the surrounding IN/OUT sequence rather than a time-window
//! heuristic:
//!
//! - duplicate INs before the first following OUT collapse to the earliest,
//! - duplicate OUTs before the next IN collapse to the latest,
//! - the final IN takes the latest OUT still available.
//!
//! The result is a pure function of the punch multiset: scrambling the input
//! order never changes the output.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::punch::PunchEvent;
use crate::types::{ClockTime, DayStatus, Direction, EmployeeCode};
use crate::warning::ReconWarning;

/// A matched IN→OUT work interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkSession {
    pub in_time: ClockTime,
    pub out_time: ClockTime,
}

impl WorkSession {
    /// Signed duration in minutes. Negative means the pair is a data error
    /// (cross-midnight shifts are out of scope), and callers must discard it.
    #[must_use]
    pub const fn duration_minutes(&self) -> i32 {
        self.in_time.minutes_until(self.out_time)
    }
}

/// The reconciled attendance record for one person-day.
///
/// Computed fresh from the raw punch set on every run; never incrementally
/// mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceDay {
    pub employee_code: EmployeeCode,
    pub date: NaiveDate,
    /// Valid sessions in chronological order.
    pub sessions: Vec<WorkSession>,
    /// Leftover IN punch times, chronological.
    pub unpaired_ins: Vec<ClockTime>,
    /// Leftover OUT punch times, chronological.
    pub unpaired_outs: Vec<ClockTime>,
    /// Earliest raw IN time, whether or not it paired.
    pub first_in: Option<ClockTime>,
    /// Latest raw OUT time, whether or not it paired.
    pub last_out: Option<ClockTime>,
    /// Sum of valid session durations only.
    pub total_minutes: i64,
    pub status: DayStatus,
    /// Data-quality notes gathered while pairing (duplicate collapses,
    /// discarded sessions).
    #[serde(default)]
    pub diagnostics: Vec<ReconWarning>,
}

/// What became of one raw punch during the walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fate {
    Pending,
    Session,
    Duplicate,
}

/// Pairs the raw punches of one person-day into an [`AttendanceDay`].
///
/// The caller is responsible for grouping punches by
/// `(employee_code, calendar_date)`; events passed here are assumed to belong
/// to that one person-day already.
#[must_use]
pub fn pair(employee_code: EmployeeCode, date: NaiveDate, events: &[PunchEvent]) -> AttendanceDay {
    let mut ins: Vec<ClockTime> = Vec::new();
    let mut outs: Vec<ClockTime> = Vec::new();
    for event in events {
        match event.direction {
            Direction::In => ins.push(event.time),
            Direction::Out => outs.push(event.time),
        }
    }
    ins.sort_unstable();
    outs.sort_unstable();

    // First/last are taken from all raw punches, independent of pairing.
    let first_in = ins.first().copied();
    let last_out = outs.last().copied();

    let mut in_fate = vec![Fate::Pending; ins.len()];
    let mut out_fate = vec![Fate::Pending; outs.len()];
    let mut sessions: Vec<WorkSession> = Vec::new();
    let mut diagnostics: Vec<ReconWarning> = Vec::new();

    for i in 0..ins.len() {
        if in_fate[i] != Fate::Pending {
            continue;
        }

        // First available OUT strictly after this IN. Without one the IN is
        // left for the unpaired list; a later IN may still claim these OUTs.
        let Some(first_out) = (0..outs.len())
            .find(|&j| out_fate[j] == Fate::Pending && outs[j] > ins[i])
        else {
            continue;
        };

        // Any surviving IN strictly between this IN and that OUT is a
        // double-tap; the earliest IN stays canonical.
        for k in i + 1..ins.len() {
            if in_fate[k] == Fate::Pending && ins[k] > ins[i] && ins[k] < outs[first_out] {
                in_fate[k] = Fate::Duplicate;
                diagnostics.push(ReconWarning::DuplicatePunch {
                    direction: Direction::In,
                    kept: ins[i],
                    discarded: ins[k],
                });
            }
        }

        let next_in = (i + 1..ins.len())
            .find(|&k| in_fate[k] == Fate::Pending)
            .map(|k| ins[k]);

        // Latest available OUT after this IN, bounded by the next IN when one
        // exists. No match means this IN stays unpaired and the walk moves on.
        let matched = match next_in {
            Some(bound) => (0..outs.len())
                .rev()
                .find(|&j| out_fate[j] == Fate::Pending && outs[j] > ins[i] && outs[j] < bound),
            None => (0..outs.len())
                .rev()
                .find(|&j| out_fate[j] == Fate::Pending && outs[j] > ins[i]),
        };
        let Some(m) = matched else {
            continue;
        };

        // Earlier OUTs inside the same run are double-taps of the kept one.
        for j in 0..m {
            if out_fate[j] == Fate::Pending && outs[j] > ins[i] {
                out_fate[j] = Fate::Duplicate;
                diagnostics.push(ReconWarning::DuplicatePunch {
                    direction: Direction::Out,
                    kept: outs[m],
                    discarded: outs[j],
                });
            }
        }

        in_fate[i] = Fate::Session;
        out_fate[m] = Fate::Session;
        tracing::debug!(in_time = %ins[i], out_time = %outs[m], "paired session");
        sessions.push(WorkSession {
            in_time: ins[i],
            out_time: outs[m],
        });
    }

    // A negative duration is a data inconsistency, not an overnight shift:
    // the session is dropped entirely, never retained at zero.
    let mut total_minutes: i64 = 0;
    let mut valid_sessions = Vec::with_capacity(sessions.len());
    for session in sessions {
        let duration = session.duration_minutes();
        if duration < 0 {
            diagnostics.push(ReconWarning::InvalidSessionDuration {
                in_time: session.in_time,
                out_time: session.out_time,
            });
        } else {
            total_minutes += i64::from(duration);
            valid_sessions.push(session);
        }
    }

    let unpaired_ins: Vec<ClockTime> = ins
        .iter()
        .zip(&in_fate)
        .filter(|&(_, fate)| *fate == Fate::Pending)
        .map(|(&time, _)| time)
        .collect();
    let unpaired_outs: Vec<ClockTime> = outs
        .iter()
        .zip(&out_fate)
        .filter(|&(_, fate)| *fate == Fate::Pending)
        .map(|(&time, _)| time)
        .collect();

    let status = if valid_sessions.is_empty() {
        if ins.is_empty() && outs.is_empty() {
            DayStatus::Absent
        } else {
            DayStatus::Partial
        }
    } else {
        DayStatus::Present
    };

    AttendanceDay {
        employee_code,
        date,
        sessions: valid_sessions,
        unpaired_ins,
        unpaired_outs,
        first_in,
        last_out,
        total_minutes,
        status,
        diagnostics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code() -> EmployeeCode {
        EmployeeCode::new("EMP-1").unwrap()
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
    }

    fn punch(direction: Direction, time: &str) -> PunchEvent {
        PunchEvent {
            employee_code: code(),
            employee_name: "Asha".to_string(),
            date: day(),
            time: time.parse().unwrap(),
            direction,
        }
    }

    fn punch_in(time: &str) -> PunchEvent {
        punch(Direction::In, time)
    }

    fn punch_out(time: &str) -> PunchEvent {
        punch(Direction::Out, time)
    }

    fn session(in_time: &str, out_time: &str) -> WorkSession {
        WorkSession {
            in_time: in_time.parse().unwrap(),
            out_time: out_time.parse().unwrap(),
        }
    }

    fn t(s: &str) -> ClockTime {
        s.parse().unwrap()
    }

    // Scenario 1: clean two-session day.
    #[test]
    fn pairs_clean_alternating_day() {
        let events = vec![
            punch_in("09:00"),
            punch_out("12:00"),
            punch_in("13:00"),
            punch_out("18:00"),
        ];

        let result = pair(code(), day(), &events);

        assert_eq!(
            result.sessions,
            vec![session("09:00", "12:00"), session("13:00", "18:00")]
        );
        assert_eq!(result.total_minutes, 540);
        assert_eq!(result.status, DayStatus::Present);
        assert!(result.unpaired_ins.is_empty());
        assert!(result.unpaired_outs.is_empty());
        assert_eq!(result.first_in, Some(t("09:00")));
        assert_eq!(result.last_out, Some(t("18:00")));
    }

    // Scenario 2: double-tap IN collapses to the earliest.
    #[test]
    fn duplicate_in_keeps_earliest() {
        let events = vec![punch_in("09:00"), punch_in("09:05"), punch_out("12:00")];

        let result = pair(code(), day(), &events);

        assert_eq!(result.sessions, vec![session("09:00", "12:00")]);
        assert_eq!(result.total_minutes, 180);
        assert_eq!(result.status, DayStatus::Present);
        assert!(result.unpaired_ins.is_empty());
        assert_eq!(
            result.diagnostics,
            vec![ReconWarning::DuplicatePunch {
                direction: Direction::In,
                kept: t("09:00"),
                discarded: t("09:05"),
            }]
        );
    }

    // Scenario 3: double-tap OUT collapses to the latest.
    #[test]
    fn duplicate_out_keeps_latest() {
        let events = vec![punch_in("09:00"), punch_out("17:00"), punch_out("17:30")];

        let result = pair(code(), day(), &events);

        assert_eq!(result.sessions, vec![session("09:00", "17:30")]);
        assert_eq!(result.total_minutes, 510);
        assert!(result.unpaired_outs.is_empty());
        assert_eq!(
            result.diagnostics,
            vec![ReconWarning::DuplicatePunch {
                direction: Direction::Out,
                kept: t("17:30"),
                discarded: t("17:00"),
            }]
        );
    }

    // Scenario 4: two INs, no OUT at all.
    #[test]
    fn ins_without_outs_are_partial() {
        let events = vec![punch_in("09:00"), punch_in("10:00")];

        let result = pair(code(), day(), &events);

        assert!(result.sessions.is_empty());
        assert_eq!(result.total_minutes, 0);
        assert_eq!(result.status, DayStatus::Partial);
        assert_eq!(result.unpaired_ins, vec![t("09:00"), t("10:00")]);
        assert_eq!(result.first_in, Some(t("09:00")));
        assert_eq!(result.last_out, None);
    }

    // Scenario 5: orphan OUTs.
    #[test]
    fn outs_without_ins_are_partial() {
        let events = vec![punch_out("17:00"), punch_out("18:00")];

        let result = pair(code(), day(), &events);

        assert!(result.sessions.is_empty());
        assert_eq!(result.total_minutes, 0);
        assert_eq!(result.status, DayStatus::Partial);
        assert_eq!(result.unpaired_outs, vec![t("17:00"), t("18:00")]);
        assert_eq!(result.first_in, None);
        assert_eq!(result.last_out, Some(t("18:00")));
    }

    // Scenario 6: duplicates on both sides of a two-session day. The trailing
    // OUT run collapses to the latest OUT, like every other OUT run.
    #[test]
    fn duplicates_on_both_sides() {
        let events = vec![
            punch_in("09:00"),
            punch_in("09:10"),
            punch_out("12:00"),
            punch_in("13:00"),
            punch_out("17:30"),
            punch_out("18:00"),
        ];

        let result = pair(code(), day(), &events);

        assert_eq!(
            result.sessions,
            vec![session("09:00", "12:00"), session("13:00", "18:00")]
        );
        assert_eq!(result.total_minutes, 480);
        assert_eq!(result.status, DayStatus::Present);
        assert!(result.unpaired_ins.is_empty());
        assert!(result.unpaired_outs.is_empty());
        // One duplicate collapse per side.
        assert_eq!(result.diagnostics.len(), 2);
    }

    #[test]
    fn empty_input_is_absent() {
        let result = pair(code(), day(), &[]);

        assert_eq!(result.status, DayStatus::Absent);
        assert!(result.sessions.is_empty());
        assert_eq!(result.total_minutes, 0);
        assert_eq!(result.first_in, None);
        assert_eq!(result.last_out, None);
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn single_in_is_partial_with_first_in_set() {
        let result = pair(code(), day(), &[punch_in("09:00")]);

        assert_eq!(result.status, DayStatus::Partial);
        assert_eq!(result.first_in, Some(t("09:00")));
        assert_eq!(result.last_out, None);
        assert_eq!(result.unpaired_ins, vec![t("09:00")]);
    }

    #[test]
    fn single_out_is_partial_with_last_out_set() {
        let result = pair(code(), day(), &[punch_out("17:00")]);

        assert_eq!(result.status, DayStatus::Partial);
        assert_eq!(result.first_in, None);
        assert_eq!(result.last_out, Some(t("17:00")));
        assert_eq!(result.unpaired_outs, vec![t("17:00")]);
    }

    #[test]
    fn orphan_out_before_first_in_stays_unpaired() {
        // The early OUT precedes every IN; it must not pair backwards.
        let events = vec![punch_out("08:00"), punch_in("09:00"), punch_out("12:00")];

        let result = pair(code(), day(), &events);

        assert_eq!(result.sessions, vec![session("09:00", "12:00")]);
        assert_eq!(result.unpaired_outs, vec![t("08:00")]);
        assert_eq!(result.last_out, Some(t("12:00")));
    }

    #[test]
    fn matching_out_is_bounded_by_next_in() {
        // The OUT at 09:30 belongs to the 09:00 IN; 10:00 comes after it and
        // is left without a partner.
        let events = vec![punch_in("09:00"), punch_in("10:00"), punch_out("09:30")];

        let result = pair(code(), day(), &events);

        assert_eq!(result.sessions, vec![session("09:00", "09:30")]);
        assert_eq!(result.unpaired_ins, vec![t("10:00")]);
    }

    #[test]
    fn in_without_out_before_next_in_stays_unpaired() {
        // No OUT lies strictly before the second IN at 12:00, so 09:00 is
        // passed over and 12:00 claims the later OUT.
        let events = vec![punch_in("09:00"), punch_in("12:00"), punch_out("12:00"),
            punch_out("18:00")];

        let result = pair(code(), day(), &events);

        assert_eq!(result.sessions, vec![session("12:00", "18:00")]);
        assert_eq!(result.unpaired_ins, vec![t("09:00")]);
        assert_eq!(result.unpaired_outs, vec![t("12:00")]);
    }

    #[test]
    fn output_is_invariant_under_input_reordering() {
        let events = vec![
            punch_in("09:00"),
            punch_in("09:10"),
            punch_out("12:00"),
            punch_in("13:00"),
            punch_out("17:30"),
            punch_out("18:00"),
        ];
        let expected = pair(code(), day(), &events);

        // A handful of deterministic shuffles, including full reversal.
        let mut reversed = events.clone();
        reversed.reverse();
        let mut rotated = events.clone();
        rotated.rotate_left(3);
        let interleaved = vec![
            events[4].clone(),
            events[0].clone(),
            events[5].clone(),
            events[2].clone(),
            events[1].clone(),
            events[3].clone(),
        ];

        for scrambled in [&reversed, &rotated, &interleaved] {
            let result = pair(code(), day(), scrambled);
            assert_eq!(result.sessions, expected.sessions);
            assert_eq!(result.unpaired_ins, expected.unpaired_ins);
            assert_eq!(result.unpaired_outs, expected.unpaired_outs);
            assert_eq!(result.total_minutes, expected.total_minutes);
            assert_eq!(result.status, expected.status);
        }
    }

    // Every raw punch ends up in exactly one of: a session, the duplicate
    // diagnostics, or the unpaired list.
    #[test]
    fn raw_punches_partition_exactly() {
        let events = vec![
            punch_in("08:55"),
            punch_in("09:00"),
            punch_in("09:10"),
            punch_out("12:00"),
            punch_out("12:05"),
            punch_in("13:00"),
            punch_out("17:30"),
            punch_out("18:00"),
            punch_in("19:00"),
        ];

        let result = pair(code(), day(), &events);

        let dup_ins = result
            .diagnostics
            .iter()
            .filter(|w| matches!(w, ReconWarning::DuplicatePunch { direction: Direction::In, .. }))
            .count();
        let dup_outs = result
            .diagnostics
            .iter()
            .filter(
                |w| matches!(w, ReconWarning::DuplicatePunch { direction: Direction::Out, .. }),
            )
            .count();

        let total_ins = events
            .iter()
            .filter(|e| e.direction == Direction::In)
            .count();
        let total_outs = events
            .iter()
            .filter(|e| e.direction == Direction::Out)
            .count();

        assert_eq!(
            result.sessions.len() + dup_ins + result.unpaired_ins.len(),
            total_ins
        );
        assert_eq!(
            result.sessions.len() + dup_outs + result.unpaired_outs.len(),
            total_outs
        );
    }

    #[test]
    fn long_alternating_sequence_with_duplicates_reduces_cleanly() {
        let events = vec![
            punch_in("08:00"),
            punch_in("08:01"),
            punch_in("08:02"),
            punch_out("10:00"),
            punch_out("10:01"),
            punch_in("11:00"),
            punch_out("12:30"),
            punch_in("13:00"),
            punch_in("13:05"),
            punch_out("15:00"),
            punch_out("15:01"),
            punch_out("15:02"),
        ];

        let result = pair(code(), day(), &events);

        assert_eq!(
            result.sessions,
            vec![
                session("08:00", "10:01"),
                session("11:00", "12:30"),
                session("13:00", "15:02"),
            ]
        );
        assert!(result.unpaired_ins.is_empty());
        assert!(result.unpaired_outs.is_empty());
        assert_eq!(result.status, DayStatus::Present);
    }

    #[test]
    fn total_minutes_matches_session_sum() {
        let events = vec![
            punch_in("09:00"),
            punch_out("12:00"),
            punch_in("13:00"),
            punch_out("17:45"),
        ];

        let result = pair(code(), day(), &events);

        let sum: i64 = result
            .sessions
            .iter()
            .map(|s| i64::from(s.duration_minutes()))
            .sum();
        assert_eq!(result.total_minutes, sum);
        assert!(result.sessions.iter().all(|s| s.duration_minutes() >= 0));
    }

    #[test]
    fn negative_duration_is_signed_in_helper() {
        let backwards = WorkSession {
            in_time: t("12:00"),
            out_time: t("09:00"),
        };
        assert_eq!(backwards.duration_minutes(), -180);
    }

    #[test]
    fn attendance_day_serde_roundtrip() {
        let result = pair(
            code(),
            day(),
            &[punch_in("09:00"), punch_in("09:05"), punch_out("12:00")],
        );

        let json = serde_json::to_string(&result).unwrap();
        let parsed: AttendanceDay = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, result);
    }
}
