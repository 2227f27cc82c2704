//! Work sessions, their segments, and the per-day report grouping.
//!
//! These are read-only snapshots of server responses; edits go through the
//! transport and are followed by a reload.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::UtcStamp;

/// Anything with a start and an optional end. No end means still running.
pub trait Interval {
    fn start(&self) -> &UtcStamp;
    fn end(&self) -> Option<&UtcStamp>;

    fn is_running(&self) -> bool {
        self.end().is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkSegment {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_session_id: Option<i64>,
    #[serde(default)]
    pub category_id: Option<i64>,
    #[serde(default)]
    pub category_name: Option<String>,
    #[serde(default)]
    pub activity_id: Option<i64>,
    #[serde(default)]
    pub activity_name: Option<String>,
    pub start_time: UtcStamp,
    #[serde(default)]
    pub end_time: Option<UtcStamp>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<UtcStamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<UtcStamp>,
}

impl Interval for WorkSegment {
    fn start(&self) -> &UtcStamp {
        &self.start_time
    }

    fn end(&self) -> Option<&UtcStamp> {
        self.end_time.as_ref()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkSession {
    pub id: i64,
    pub start_time: UtcStamp,
    #[serde(default)]
    pub end_time: Option<UtcStamp>,
    #[serde(default)]
    pub items: Vec<WorkSegment>,
}

impl Interval for WorkSession {
    fn start(&self) -> &UtcStamp {
        &self.start_time
    }

    fn end(&self) -> Option<&UtcStamp> {
        self.end_time.as_ref()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkDay {
    pub day_utc: NaiveDate,
    #[serde(default)]
    pub sessions: Vec<WorkSession>,
}

/// PATCH body for a work session; only present fields are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkSessionPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<UtcStamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<UtcStamp>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkSegmentPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<UtcStamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<UtcStamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Body of `POST work-segments/start`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkSegmentStart {
    pub category_id: i64,
    pub activity_id: i64,
    pub comment: Option<String>,
}

/// Body of `POST work-segments/stop`. Present fields overwrite the running
/// segment's values as it closes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkSegmentStop {
    pub category_id: Option<i64>,
    pub activity_id: Option<i64>,
    pub comment: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_day_deserializes_with_defaults() {
        let raw = r#"[{
            "dayUtc": "2025-01-06",
            "sessions": [{
                "id": 7,
                "startTime": "2025-01-06T08:00:00Z",
                "endTime": null,
                "items": [{
                    "id": 70,
                    "categoryId": 1,
                    "categoryName": "Client",
                    "activityId": 2,
                    "activityName": "Dev",
                    "startTime": "2025-01-06T08:05:00Z",
                    "comment": "review"
                }]
            }, {
                "id": 8,
                "startTime": "2025-01-06T13:00:00Z",
                "endTime": "2025-01-06T14:00:00Z"
            }]
        }]"#;

        let days: Vec<WorkDay> = serde_json::from_str(raw).unwrap();
        assert_eq!(days.len(), 1);
        let sessions = &days[0].sessions;
        assert!(sessions[0].is_running());
        assert!(sessions[0].items[0].is_running());
        assert_eq!(sessions[0].items[0].category_name.as_deref(), Some("Client"));
        assert!(!sessions[1].is_running());
        assert!(sessions[1].items.is_empty());
    }

    #[test]
    fn patches_only_carry_present_fields() {
        let patch = WorkSessionPatch {
            end_time: Some(UtcStamp::from("2025-01-06T12:00:00Z")),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_string(&patch).unwrap(),
            r#"{"endTime":"2025-01-06T12:00:00.000Z"}"#
        );
    }

    #[test]
    fn segment_start_sends_null_comment() {
        let start = WorkSegmentStart {
            category_id: 1,
            activity_id: 2,
            comment: None,
        };
        assert_eq!(
            serde_json::to_string(&start).unwrap(),
            r#"{"categoryId":1,"activityId":2,"comment":null}"#
        );
    }
}
