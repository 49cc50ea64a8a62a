//! Pure punch arithmetic: day bucketing, work-minute pairing and the
//! policy-gated clock-in/clock-out transitions.
//!
//! Nothing in here touches the database. Handlers load the day's
//! [`AttendanceRecord`], resolve the active [`PunchPolicy`] once, apply a
//! transition and persist whatever came back.

use chrono::{DateTime, NaiveDate, Utc};

use crate::model::attendance::{AttendanceRecord, Punch, PunchType};
use crate::model::settings::PunchPolicy;

/// Calendar day a timestamp belongs to. Every path that turns a timestamp
/// into a record date goes through here, so the whole service agrees on one
/// day boundary (UTC).
pub fn day_key(time: DateTime<Utc>) -> NaiveDate {
    time.date_naive()
}

/// Total worked minutes for a punch list.
///
/// Punches are sorted by time and walked two at a time; a pair counts only
/// when it is (IN, OUT) in that order. Anything else, including an unpaired
/// trailing IN, contributes nothing. Rounding to whole minutes happens once,
/// on the accumulated total.
pub fn work_minutes(punches: &[Punch]) -> i32 {
    let mut sorted: Vec<&Punch> = punches.iter().collect();
    sorted.sort_by_key(|p| p.time);

    let mut total_ms: i64 = 0;
    for pair in sorted.chunks(2) {
        if let [clock_in, clock_out] = pair {
            if clock_in.punch_type == PunchType::In && clock_out.punch_type == PunchType::Out {
                total_ms += (clock_out.time - clock_in.time).num_milliseconds();
            }
        }
    }

    (total_ms as f64 / 60_000.0).round() as i32
}

/// True when the record holds at least one punch and the time-sorted last
/// punch is an IN with no matching OUT. Drives the missed-punch sweep.
pub fn has_unmatched_clock_in(punches: &[Punch]) -> bool {
    punches
        .iter()
        .max_by_key(|p| p.time)
        .is_some_and(|p| p.punch_type == PunchType::In)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockIn {
    Recorded,
    AlreadyClockedIn,
}

impl ClockIn {
    pub fn message(&self) -> &'static str {
        match self {
            ClockIn::Recorded => "Clock-in successful",
            ClockIn::AlreadyClockedIn => "Already clocked in for today (FIRST_LAST policy)",
        }
    }
}

/// Applies a clock-in to the day's record.
///
/// Under FIRST_LAST the first clock-in wins: if the record already holds an
/// IN punch the call leaves it untouched and reports
/// [`ClockIn::AlreadyClockedIn`].
pub fn apply_clock_in(
    record: &mut AttendanceRecord,
    policy: PunchPolicy,
    time: DateTime<Utc>,
    location: Option<String>,
) -> ClockIn {
    if policy == PunchPolicy::FirstLast
        && record.punches.iter().any(|p| p.punch_type == PunchType::In)
    {
        return ClockIn::AlreadyClockedIn;
    }

    record.punches.push(Punch {
        punch_type: PunchType::In,
        time,
        location,
    });

    ClockIn::Recorded
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockOut {
    Recorded,
    Amended,
}

impl ClockOut {
    pub fn message(&self) -> &'static str {
        match self {
            ClockOut::Recorded => "Clock-out successful",
            ClockOut::Amended => "Clock-out updated (FIRST_LAST policy)",
        }
    }
}

/// Applies a clock-out to the day's record.
///
/// Under FIRST_LAST a repeated clock-out amends the terminal OUT punch in
/// place (time always, location only when given) instead of appending a
/// second one. Every other case appends. Both paths recompute
/// `total_work_minutes` and clear the missed-punch flag.
///
/// Callers are responsible for the no-record-today precondition; this
/// function assumes the day's record exists.
pub fn apply_clock_out(
    record: &mut AttendanceRecord,
    policy: PunchPolicy,
    time: DateTime<Utc>,
    location: Option<String>,
) -> ClockOut {
    if policy == PunchPolicy::FirstLast {
        if let Some(last) = record
            .punches
            .last_mut()
            .filter(|p| p.punch_type == PunchType::Out)
        {
            last.time = time;
            if location.is_some() {
                last.location = location;
            }
            record.total_work_minutes = work_minutes(&record.punches);
            record.has_missed_punch = false;
            return ClockOut::Amended;
        }
    }

    record.punches.push(Punch {
        punch_type: PunchType::Out,
        time,
        location,
    });
    record.total_work_minutes = work_minutes(&record.punches);
    record.has_missed_punch = false;

    ClockOut::Recorded
}

/// Replaces the record's punches wholesale and finalises it for payroll.
/// Shared by manual correction and correction-request approval; the two
/// differ only in how `reason` is worded.
pub fn apply_correction(
    record: &mut AttendanceRecord,
    punches: Vec<Punch>,
    corrected_by: u64,
    reason: String,
) {
    record.punches = sqlx::types::Json(punches);
    record.total_work_minutes = work_minutes(&record.punches);
    record.has_missed_punch = false;
    record.finalised_for_payroll = true;
    record.corrected_by = Some(corrected_by);
    record.correction_reason = Some(reason);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 2, hour, min, 0).unwrap()
    }

    fn punch(punch_type: PunchType, time: DateTime<Utc>) -> Punch {
        Punch {
            punch_type,
            time,
            location: None,
        }
    }

    fn blank_record() -> AttendanceRecord {
        AttendanceRecord {
            id: 1,
            employee_id: 42,
            date: NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
            punches: sqlx::types::Json(Vec::new()),
            total_work_minutes: 0,
            has_missed_punch: false,
            finalised_for_payroll: false,
            corrected_by: None,
            correction_reason: None,
        }
    }

    #[test]
    fn day_key_truncates_to_calendar_day() {
        let late = Utc.with_ymd_and_hms(2025, 6, 2, 23, 59, 59).unwrap();
        assert_eq!(day_key(late), NaiveDate::from_ymd_opt(2025, 6, 2).unwrap());
    }

    #[test]
    fn standard_day_is_510_minutes() {
        let punches = vec![
            punch(PunchType::In, at(9, 0)),
            punch(PunchType::Out, at(17, 30)),
        ];
        assert_eq!(work_minutes(&punches), 510);
    }

    #[test]
    fn pairing_sorts_by_time_before_walking() {
        // Stored out of order; the sorted sequence is IN 09:00, OUT 17:30.
        let punches = vec![
            punch(PunchType::Out, at(17, 30)),
            punch(PunchType::In, at(9, 0)),
        ];
        assert_eq!(work_minutes(&punches), 510);
    }

    #[test]
    fn mismatched_pairs_contribute_nothing() {
        // (IN, IN) then a lone OUT: neither chunk is (IN, OUT).
        let punches = vec![
            punch(PunchType::In, at(9, 0)),
            punch(PunchType::In, at(10, 0)),
            punch(PunchType::Out, at(17, 0)),
        ];
        assert_eq!(work_minutes(&punches), 0);

        let punches = vec![
            punch(PunchType::Out, at(9, 0)),
            punch(PunchType::In, at(17, 0)),
        ];
        assert_eq!(work_minutes(&punches), 0);
    }

    #[test]
    fn trailing_unpaired_in_adds_nothing() {
        let punches = vec![
            punch(PunchType::In, at(9, 0)),
            punch(PunchType::Out, at(12, 0)),
            punch(PunchType::In, at(13, 0)),
        ];
        assert_eq!(work_minutes(&punches), 180);
        assert!(has_unmatched_clock_in(&punches));
    }

    #[test]
    fn rounding_happens_once_on_the_total() {
        // Two intervals of 90 seconds each: 1.5 + 1.5 = 3.0 minutes exactly.
        // Per-pair rounding would give 2 + 2 = 4.
        let punches = vec![
            punch(PunchType::In, Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap()),
            punch(PunchType::Out, Utc.with_ymd_and_hms(2025, 6, 2, 9, 1, 30).unwrap()),
            punch(PunchType::In, Utc.with_ymd_and_hms(2025, 6, 2, 10, 0, 0).unwrap()),
            punch(PunchType::Out, Utc.with_ymd_and_hms(2025, 6, 2, 10, 1, 30).unwrap()),
        ];
        assert_eq!(work_minutes(&punches), 3);
    }

    #[test]
    fn empty_punch_list_is_never_a_missed_punch() {
        assert!(!has_unmatched_clock_in(&[]));
    }

    #[test]
    fn missed_punch_follows_time_order_not_storage_order() {
        // Stored with the OUT last, but the time-sorted last punch is the IN.
        let punches = vec![
            punch(PunchType::In, at(9, 0)),
            punch(PunchType::Out, at(8, 0)),
        ];
        assert!(has_unmatched_clock_in(&punches));

        let punches = vec![
            punch(PunchType::Out, at(17, 30)),
            punch(PunchType::In, at(9, 0)),
        ];
        assert!(!has_unmatched_clock_in(&punches));
    }

    #[test]
    fn multiple_policy_keeps_every_clock_in() {
        let mut record = blank_record();
        assert_eq!(
            apply_clock_in(&mut record, PunchPolicy::Multiple, at(9, 0), None),
            ClockIn::Recorded
        );
        assert_eq!(
            apply_clock_in(&mut record, PunchPolicy::Multiple, at(13, 0), None),
            ClockIn::Recorded
        );
        assert_eq!(record.punches.len(), 2);
    }

    #[test]
    fn first_last_clock_in_is_idempotent() {
        let mut record = blank_record();
        assert_eq!(
            apply_clock_in(&mut record, PunchPolicy::FirstLast, at(9, 0), None),
            ClockIn::Recorded
        );
        assert_eq!(
            apply_clock_in(&mut record, PunchPolicy::FirstLast, at(9, 5), None),
            ClockIn::AlreadyClockedIn
        );
        assert_eq!(record.punches.len(), 1);
        assert_eq!(record.punches[0].time, at(9, 0));
    }

    #[test]
    fn first_last_clock_out_amends_the_terminal_out() {
        let mut record = blank_record();
        apply_clock_in(&mut record, PunchPolicy::FirstLast, at(9, 0), None);
        assert_eq!(
            apply_clock_out(&mut record, PunchPolicy::FirstLast, at(17, 0), None),
            ClockOut::Recorded
        );
        assert_eq!(
            apply_clock_out(
                &mut record,
                PunchPolicy::FirstLast,
                at(17, 30),
                Some("gate B".to_string())
            ),
            ClockOut::Amended
        );

        assert_eq!(record.punches.len(), 2);
        assert_eq!(record.punches[1].time, at(17, 30));
        assert_eq!(record.punches[1].location.as_deref(), Some("gate B"));
        assert_eq!(record.total_work_minutes, 510);
        assert!(!record.has_missed_punch);
    }

    #[test]
    fn amend_without_location_keeps_the_old_one() {
        let mut record = blank_record();
        apply_clock_in(&mut record, PunchPolicy::FirstLast, at(9, 0), None);
        apply_clock_out(
            &mut record,
            PunchPolicy::FirstLast,
            at(17, 0),
            Some("gate A".to_string()),
        );
        apply_clock_out(&mut record, PunchPolicy::FirstLast, at(17, 30), None);

        assert_eq!(record.punches[1].location.as_deref(), Some("gate A"));
    }

    #[test]
    fn multiple_policy_appends_repeated_clock_outs() {
        let mut record = blank_record();
        apply_clock_in(&mut record, PunchPolicy::Multiple, at(9, 0), None);
        apply_clock_out(&mut record, PunchPolicy::Multiple, at(12, 0), None);
        assert_eq!(
            apply_clock_out(&mut record, PunchPolicy::Multiple, at(12, 5), None),
            ClockOut::Recorded
        );
        assert_eq!(record.punches.len(), 3);
    }

    #[test]
    fn n_sessions_under_multiple_policy_sum_their_intervals() {
        let mut record = blank_record();
        let sessions = [(9, 11), (12, 14), (15, 17)];
        for (start, end) in sessions {
            apply_clock_in(&mut record, PunchPolicy::Multiple, at(start, 0), None);
            apply_clock_out(&mut record, PunchPolicy::Multiple, at(end, 0), None);
        }
        assert_eq!(record.punches.len(), 6);
        assert_eq!(record.total_work_minutes, 3 * 120);
        assert!(!record.has_missed_punch);
    }

    #[test]
    fn clock_out_clears_missed_punch_flag() {
        let mut record = blank_record();
        apply_clock_in(&mut record, PunchPolicy::Multiple, at(9, 0), None);
        record.has_missed_punch = true;
        apply_clock_out(&mut record, PunchPolicy::Multiple, at(17, 30), None);
        assert!(!record.has_missed_punch);
        assert_eq!(record.total_work_minutes, 510);
    }

    #[test]
    fn correction_overwrites_punches_and_finalises() {
        let mut record = blank_record();
        apply_clock_in(&mut record, PunchPolicy::Multiple, at(8, 0), None);
        apply_clock_in(&mut record, PunchPolicy::Multiple, at(8, 30), None);

        apply_correction(
            &mut record,
            vec![
                punch(PunchType::In, at(9, 5)),
                punch(PunchType::Out, at(17, 35)),
            ],
            7,
            "Approved correction request: forgot badge".to_string(),
        );

        assert_eq!(record.punches.len(), 2);
        assert_eq!(record.total_work_minutes, 510);
        assert!(record.finalised_for_payroll);
        assert!(!record.has_missed_punch);
        assert_eq!(record.corrected_by, Some(7));
        assert_eq!(
            record.correction_reason.as_deref(),
            Some("Approved correction request: forgot badge")
        );
    }
}
