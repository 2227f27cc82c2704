use std::ops::AddAssign;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::{
    models::{Interval, WorkDay, WorkSegment, WorkSession},
    utils::time::diff_seconds,
};

/// Whole seconds covered by `interval`, with running intervals measured up to
/// `now`. Zero when either endpoint is malformed or the end precedes the start.
pub fn elapsed_seconds<I: Interval + ?Sized>(interval: &I, now: DateTime<Utc>) -> i64 {
    let Some(start) = interval.start().instant() else {
        return 0;
    };
    let end = match interval.end() {
        Some(stamp) => match stamp.instant() {
            Some(end) => end,
            None => return 0,
        },
        None => now,
    };
    diff_seconds(start, end)
}

pub fn sum_segments(segments: &[WorkSegment], now: DateTime<Utc>) -> i64 {
    segments.iter().map(|seg| elapsed_seconds(seg, now)).sum()
}

/// Session time not covered by any segment. Never negative, even when
/// segments overrun the session through clock skew.
pub fn unallocated(session: &WorkSession, now: DateTime<Utc>) -> i64 {
    (elapsed_seconds(session, now) - sum_segments(&session.items, now)).max(0)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionTotals {
    pub total_seconds: i64,
    pub segment_seconds: i64,
    pub unallocated_seconds: i64,
}

impl AddAssign for SessionTotals {
    fn add_assign(&mut self, rhs: Self) {
        self.total_seconds += rhs.total_seconds;
        self.segment_seconds += rhs.segment_seconds;
        self.unallocated_seconds += rhs.unallocated_seconds;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionAggregate {
    pub session_id: i64,
    pub running: bool,
    pub totals: SessionTotals,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayAggregate {
    pub day_utc: NaiveDate,
    pub sessions: Vec<SessionAggregate>,
    /// Per-quantity sums over `sessions`.
    pub totals: SessionTotals,
}

pub fn aggregate_session(session: &WorkSession, now: DateTime<Utc>) -> SessionAggregate {
    let total_seconds = elapsed_seconds(session, now);
    let segment_seconds = sum_segments(&session.items, now);

    SessionAggregate {
        session_id: session.id,
        running: session.is_running(),
        totals: SessionTotals {
            total_seconds,
            segment_seconds,
            unallocated_seconds: (total_seconds - segment_seconds).max(0),
        },
    }
}

pub fn aggregate_day(day: &WorkDay, now: DateTime<Utc>) -> DayAggregate {
    let sessions: Vec<SessionAggregate> = day
        .sessions
        .iter()
        .map(|session| aggregate_session(session, now))
        .collect();

    let mut totals = SessionTotals::default();
    for session in &sessions {
        totals += session.totals;
    }

    DayAggregate {
        day_utc: day.day_utc,
        sessions,
        totals,
    }
}

pub fn aggregate_days(days: &[WorkDay], now: DateTime<Utc>) -> Vec<DayAggregate> {
    days.iter().map(|day| aggregate_day(day, now)).collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;
    use crate::models::UtcStamp;

    pub(crate) fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 6, h, m, s).unwrap()
    }

    pub(crate) fn segment(id: i64, start: DateTime<Utc>, end: Option<DateTime<Utc>>) -> WorkSegment {
        WorkSegment {
            id,
            work_session_id: None,
            category_id: Some(1),
            category_name: Some("Admin".into()),
            activity_id: Some(2),
            activity_name: Some("Mail".into()),
            start_time: start.into(),
            end_time: end.map(UtcStamp::from),
            comment: None,
            created_at: None,
            updated_at: None,
        }
    }

    pub(crate) fn session(
        id: i64,
        start: DateTime<Utc>,
        end: Option<DateTime<Utc>>,
        items: Vec<WorkSegment>,
    ) -> WorkSession {
        WorkSession {
            id,
            start_time: start.into(),
            end_time: end.map(UtcStamp::from),
            items,
        }
    }

    fn day(sessions: Vec<WorkSession>) -> WorkDay {
        WorkDay {
            day_utc: NaiveDate::from_ymd_opt(2025, 1, 6).unwrap(),
            sessions,
        }
    }

    #[test]
    fn finished_interval_is_exact_whole_seconds() {
        let seg = segment(1, at(8, 0, 0), Some(at(8, 1, 30)));
        assert_eq!(elapsed_seconds(&seg, at(23, 0, 0)), 90);

        // Sub-second remainders are floored.
        let mut seg = seg;
        seg.end_time = Some(UtcStamp::from("2025-01-06T08:01:30.999Z"));
        assert_eq!(elapsed_seconds(&seg, at(23, 0, 0)), 90);
    }

    #[test]
    fn reversed_or_malformed_intervals_count_as_zero() {
        let reversed = segment(1, at(9, 0, 0), Some(at(8, 0, 0)));
        assert_eq!(elapsed_seconds(&reversed, at(10, 0, 0)), 0);

        let mut bad_start = segment(2, at(8, 0, 0), None);
        bad_start.start_time = UtcStamp::from("yesterday-ish");
        assert_eq!(elapsed_seconds(&bad_start, at(10, 0, 0)), 0);

        let mut bad_end = segment(3, at(8, 0, 0), None);
        bad_end.end_time = Some(UtcStamp::from("soon"));
        assert_eq!(elapsed_seconds(&bad_end, at(10, 0, 0)), 0);
    }

    #[test]
    fn finished_session_with_two_segments() {
        let s = session(
            1,
            at(8, 0, 0),
            Some(at(12, 0, 0)),
            vec![
                segment(1, at(8, 0, 0), Some(at(9, 0, 0))),
                segment(2, at(9, 30, 0), Some(at(11, 30, 0))),
            ],
        );

        let agg = aggregate_day(&day(vec![s]), at(18, 0, 0));

        let expected = SessionTotals {
            total_seconds: 4 * 3600,
            segment_seconds: 3 * 3600,
            unallocated_seconds: 3600,
        };
        assert_eq!(agg.sessions[0].totals, expected);
        assert!(!agg.sessions[0].running);
        assert_eq!(agg.totals, expected);
    }

    #[test]
    fn running_session_measures_up_to_now() {
        let now = at(10, 0, 0);
        let s = session(1, now - Duration::seconds(90), None, vec![]);

        let agg = aggregate_session(&s, now);

        assert!(agg.running);
        assert_eq!(agg.totals.total_seconds, 90);
        assert_eq!(agg.totals.unallocated_seconds, 90);
        assert_eq!(unallocated(&s, now), 90);
    }

    #[test]
    fn overlapping_segments_never_go_negative() {
        let s = session(
            1,
            at(8, 0, 0),
            Some(at(9, 0, 0)),
            vec![
                segment(1, at(8, 0, 0), Some(at(9, 0, 0))),
                segment(2, at(8, 30, 0), Some(at(9, 0, 0))),
            ],
        );
        assert_eq!(sum_segments(&s.items, at(12, 0, 0)), 5400);
        assert_eq!(unallocated(&s, at(12, 0, 0)), 0);
    }

    #[test]
    fn day_totals_sum_each_quantity_per_session() {
        let over = session(
            1,
            at(8, 0, 0),
            Some(at(9, 0, 0)),
            vec![segment(1, at(7, 0, 0), Some(at(9, 0, 0)))],
        );
        let under = session(2, at(10, 0, 0), Some(at(11, 0, 0)), vec![]);

        let agg = aggregate_day(&day(vec![over, under]), at(12, 0, 0));

        assert_eq!(
            agg.totals,
            SessionTotals {
                total_seconds: 7200,
                segment_seconds: 7200,
                unallocated_seconds: 3600,
            }
        );
        assert_eq!(aggregate_days(&[], at(12, 0, 0)), vec![]);
    }
}
