use chrono::{DateTime, Utc};

use crate::{
    durations::elapsed_seconds,
    models::{Interval, TaxonomyItem, WorkSegment, WorkSession},
    utils::time::format_duration,
};

pub const DEFAULT_DAYS_COUNT: usize = 10;

/// Category, activity and comment for the next segment start or stop.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SegmentForm {
    pub category_id: Option<i64>,
    pub activity_id: Option<i64>,
    pub comment: String,
}

impl SegmentForm {
    /// Fill untouched fields from the running segment.
    pub fn adopt(&mut self, segment: &WorkSegment) {
        if self.category_id.is_none() {
            self.category_id = segment.category_id;
        }
        if self.activity_id.is_none() {
            self.activity_id = segment.activity_id;
        }
        if self.comment.trim().is_empty() {
            if let Some(comment) = segment.comment.as_deref().filter(|c| !c.is_empty()) {
                self.comment = comment.to_string();
            }
        }
    }

    /// Trimmed comment, `None` when blank.
    pub fn comment(&self) -> Option<String> {
        let comment = self.comment.trim();
        (!comment.is_empty()).then(|| comment.to_string())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardState {
    pub loading: bool,
    pub error: Option<String>,
    /// Sessions of the dashboard range, flattened across days in report order.
    pub sessions: Vec<WorkSession>,
    pub current_session: Option<WorkSession>,
    pub current_segment: Option<WorkSegment>,
    /// Active categories for the segment form.
    pub categories: Vec<TaxonomyItem>,
    pub activities: Vec<TaxonomyItem>,
    pub form: SegmentForm,
    /// Rows in the recent-sessions table.
    pub days_count: usize,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self {
            loading: false,
            error: None,
            sessions: Vec::new(),
            current_session: None,
            current_segment: None,
            categories: Vec::new(),
            activities: Vec::new(),
            form: SegmentForm::default(),
            days_count: DEFAULT_DAYS_COUNT,
        }
    }
}

impl DashboardState {
    pub fn is_session_running(&self) -> bool {
        self.current_session.as_ref().is_some_and(|s| s.is_running())
    }

    pub fn is_segment_running(&self) -> bool {
        self.current_segment.as_ref().is_some_and(|s| s.is_running())
    }

    /// Finished sessions for the table. A running session takes one of the
    /// `days_count` rows.
    pub fn recent_sessions(&self) -> Vec<WorkSession> {
        let n = self.days_count.max(1);
        let limit = if self.is_session_running() { n - 1 } else { n };
        self.sessions
            .iter()
            .filter(|s| !s.is_running())
            .take(limit)
            .cloned()
            .collect()
    }

    /// Empty when no session is running.
    pub fn session_running_duration(&self, now: DateTime<Utc>) -> String {
        match &self.current_session {
            Some(session) if session.is_running() => format_duration(elapsed_seconds(session, now)),
            _ => String::new(),
        }
    }

    pub fn segment_running_duration(&self, now: DateTime<Utc>) -> String {
        match &self.current_segment {
            Some(segment) if segment.is_running() => format_duration(elapsed_seconds(segment, now)),
            _ => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::durations::aggregate::tests::{at, segment, session};

    #[test]
    fn running_session_takes_a_row() {
        let mut state = DashboardState {
            days_count: 2,
            sessions: vec![
                session(3, at(13, 0, 0), None, vec![]),
                session(2, at(10, 0, 0), Some(at(11, 0, 0)), vec![]),
                session(1, at(8, 0, 0), Some(at(9, 0, 0)), vec![]),
            ],
            ..Default::default()
        };
        assert_eq!(state.recent_sessions().len(), 2);

        state.current_session = Some(state.sessions[0].clone());
        let recent = state.recent_sessions();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].id, 2);
        assert_eq!(state.session_running_duration(at(14, 30, 0)), "1h 30m 00s");
        assert_eq!(state.segment_running_duration(at(14, 30, 0)), "");
    }

    #[test]
    fn form_adopts_only_untouched_fields() {
        let mut running = segment(9, at(8, 0, 0), None);
        running.comment = Some("standup".into());

        let mut form = SegmentForm {
            activity_id: Some(7),
            ..Default::default()
        };
        form.adopt(&running);

        assert_eq!(form.category_id, Some(1));
        assert_eq!(form.activity_id, Some(7));
        assert_eq!(form.comment, "standup");
        assert_eq!(SegmentForm::default().comment(), None);
    }
}
