//! Display-ready report rows built on top of the aggregates.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use super::aggregate::{aggregate_session, elapsed_seconds, SessionTotals};
use crate::{
    models::{Interval, UtcStamp, WorkDay, WorkSegment, WorkSession},
    utils::time::{format_day_label, format_duration, format_local},
};

/// Alternating shade of consecutive session groups, counted across days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupParity {
    Even,
    Odd,
}

impl GroupParity {
    fn of(index: usize) -> Self {
        if index % 2 == 0 {
            GroupParity::Even
        } else {
            GroupParity::Odd
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalsLabels {
    pub total: String,
    pub segments: String,
    pub unallocated: String,
}

impl From<SessionTotals> for TotalsLabels {
    fn from(totals: SessionTotals) -> Self {
        Self {
            total: format_duration(totals.total_seconds),
            segments: format_duration(totals.segment_seconds),
            unallocated: format_duration(totals.unallocated_seconds),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentRow {
    pub id: i64,
    pub running: bool,
    pub start_label: String,
    /// Empty while running.
    pub end_label: String,
    pub duration_label: String,
    pub category_name: String,
    pub activity_name: String,
    pub comment: String,
    /// Non-empty parts of category, activity and comment joined by ` · `.
    pub meta_label: String,
    pub is_last: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRow {
    pub id: i64,
    pub running: bool,
    pub start_label: String,
    pub end_label: String,
    pub duration_label: String,
    pub segment_count: usize,
    pub segments_summary: String,
    pub unallocated_summary: String,
    pub parity: GroupParity,
    /// True when no segment rows follow this row.
    pub group_end: bool,
    pub segments: Vec<SegmentRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayView {
    pub day_utc: NaiveDate,
    pub day_label: String,
    pub totals: TotalsLabels,
    pub sessions: Vec<SessionRow>,
}

fn stamp_label(stamp: &UtcStamp) -> String {
    stamp.instant().map(format_local).unwrap_or_default()
}

fn end_label<I: Interval>(interval: &I) -> String {
    interval.end().map(stamp_label).unwrap_or_default()
}

fn segment_row(seg: &WorkSegment, is_last: bool, now: DateTime<Utc>) -> SegmentRow {
    let category_name = seg.category_name.clone().unwrap_or_default();
    let activity_name = seg.activity_name.clone().unwrap_or_default();
    let comment = seg.comment.as_deref().unwrap_or_default().trim().to_string();

    let meta_label = [&category_name, &activity_name, &comment]
        .into_iter()
        .filter(|part| !part.is_empty())
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" · ");

    SegmentRow {
        id: seg.id,
        running: seg.is_running(),
        start_label: stamp_label(&seg.start_time),
        end_label: end_label(seg),
        duration_label: format_duration(elapsed_seconds(seg, now)),
        category_name,
        activity_name,
        comment,
        meta_label,
        is_last,
    }
}

fn session_row(
    session: &WorkSession,
    parity: GroupParity,
    show_segments: bool,
    now: DateTime<Utc>,
) -> (SessionRow, SessionTotals) {
    let agg = aggregate_session(session, now);
    let render_segments = show_segments && !session.items.is_empty();

    let segments = if render_segments {
        let last = session.items.len() - 1;
        session
            .items
            .iter()
            .enumerate()
            .map(|(idx, seg)| segment_row(seg, idx == last, now))
            .collect()
    } else {
        Vec::new()
    };

    let row = SessionRow {
        id: session.id,
        running: agg.running,
        start_label: stamp_label(&session.start_time),
        end_label: end_label(session),
        duration_label: format_duration(agg.totals.total_seconds),
        segment_count: session.items.len(),
        segments_summary: format_duration(agg.totals.segment_seconds),
        unallocated_summary: format_duration(agg.totals.unallocated_seconds),
        parity,
        group_end: !render_segments,
        segments,
    };
    (row, agg.totals)
}

/// Build the report rows for `days` as of `now`.
///
/// Session parity keeps alternating across day boundaries so adjacent groups
/// stay distinguishable.
pub fn build_day_views(days: &[WorkDay], show_segments: bool, now: DateTime<Utc>) -> Vec<DayView> {
    let mut group_index = 0;

    days.iter()
        .map(|day| {
            let mut totals = SessionTotals::default();
            let sessions = day
                .sessions
                .iter()
                .map(|session| {
                    let parity = GroupParity::of(group_index);
                    group_index += 1;
                    let (row, session_totals) = session_row(session, parity, show_segments, now);
                    totals += session_totals;
                    row
                })
                .collect();

            DayView {
                day_utc: day.day_utc,
                day_label: format_day_label(day.day_utc),
                totals: totals.into(),
                sessions,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::durations::aggregate::tests::{at, segment, session};

    fn report() -> Vec<WorkDay> {
        let mut commented = segment(11, at(8, 0, 0), Some(at(9, 0, 0)));
        commented.comment = Some("  inbox zero ".into());
        let mut bare = segment(12, at(9, 0, 0), None);
        bare.category_name = None;

        vec![
            WorkDay {
                day_utc: NaiveDate::from_ymd_opt(2025, 1, 6).unwrap(),
                sessions: vec![
                    session(1, at(8, 0, 0), Some(at(12, 0, 0)), vec![commented]),
                    session(2, at(13, 0, 0), None, vec![bare]),
                ],
            },
            WorkDay {
                day_utc: NaiveDate::from_ymd_opt(2025, 1, 7).unwrap(),
                sessions: vec![session(3, at(8, 0, 0), Some(at(8, 30, 0)), vec![])],
            },
        ]
    }

    #[test]
    fn rows_carry_durations_and_meta_labels() {
        let views = build_day_views(&report(), true, at(14, 0, 0));

        let first = &views[0].sessions[0];
        assert_eq!(first.duration_label, "4h 00m 00s");
        assert_eq!(first.segments_summary, "1h 00m 00s");
        assert_eq!(first.unallocated_summary, "3h 00m 00s");
        assert!(!first.group_end);
        assert_eq!(first.segments[0].meta_label, "Admin · Mail · inbox zero");
        assert!(first.segments[0].is_last);

        let running = &views[0].sessions[1];
        assert!(running.running);
        assert_eq!(running.end_label, "");
        assert_eq!(running.duration_label, "1h 00m 00s");
        assert_eq!(running.segments[0].meta_label, "Mail");
        assert!(running.segments[0].running);
        assert_eq!(running.segments[0].duration_label, "5h 00m 00s");
    }

    #[test]
    fn day_totals_and_parity_span_days() {
        let views = build_day_views(&report(), false, at(14, 0, 0));

        assert_eq!(views[0].totals.total, "5h 00m 00s");
        let parities: Vec<_> = views
            .iter()
            .flat_map(|d| d.sessions.iter().map(|s| s.parity))
            .collect();
        assert_eq!(parities, vec![GroupParity::Even, GroupParity::Odd, GroupParity::Even]);
        assert!(views[0].sessions.iter().all(|s| s.segments.is_empty() && s.group_end));
        assert!(!views[1].day_label.is_empty());
    }
}
