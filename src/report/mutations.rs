use std::sync::Arc;

use super::loader::ReportLoader;
use crate::{
    api::{TransportResult, WorkApi},
    error::TransportError,
    models::{UtcStamp, WorkSegmentPatch, WorkSessionPatch},
    modals::{DialogValue, ModalArbiter},
    toast::ToastQueue,
};

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_error, log_warn};

/// Which timestamp a report edit adjusts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeField {
    SessionStart,
    SessionEnd,
    SegmentStart,
    SegmentEnd,
}

impl TimeField {
    pub fn dialog_title(self) -> &'static str {
        match self {
            TimeField::SessionStart => "Adjust START time",
            TimeField::SessionEnd => "Adjust END time",
            TimeField::SegmentStart => "Adjust SEGMENT start time",
            TimeField::SegmentEnd => "Adjust SEGMENT end time",
        }
    }

    fn success_message(self) -> &'static str {
        match self {
            TimeField::SessionStart => "Start time updated",
            TimeField::SessionEnd => "End time updated",
            TimeField::SegmentStart => "Segment start updated",
            TimeField::SegmentEnd => "Segment end updated",
        }
    }

    fn failure_message(self) -> &'static str {
        match self {
            TimeField::SessionStart => "Failed to update start time",
            TimeField::SessionEnd => "Failed to update end time",
            TimeField::SegmentStart => "Failed to update segment start",
            TimeField::SegmentEnd => "Failed to update segment end",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MutationOutcome {
    /// Dialog dismissed, or the entered value was unusable.
    Cancelled,
    Applied,
    Failed(TransportError),
}

/// Session and segment edits from the report page. Every successful change is
/// followed by a report reload; nothing is patched locally.
#[derive(Clone)]
pub struct ReportMutations {
    work: Arc<dyn WorkApi>,
    loader: ReportLoader,
    toasts: ToastQueue,
    modals: ModalArbiter,
}

impl ReportMutations {
    pub fn new(
        work: Arc<dyn WorkApi>,
        loader: ReportLoader,
        toasts: ToastQueue,
        modals: ModalArbiter,
    ) -> Self {
        Self {
            work,
            loader,
            toasts,
            modals,
        }
    }

    pub async fn edit_session_start(&self, id: i64, current: Option<UtcStamp>) -> MutationOutcome {
        self.edit_time(TimeField::SessionStart, id, current).await
    }

    pub async fn edit_session_end(&self, id: i64, current: Option<UtcStamp>) -> MutationOutcome {
        self.edit_time(TimeField::SessionEnd, id, current).await
    }

    pub async fn edit_segment_start(&self, id: i64, current: Option<UtcStamp>) -> MutationOutcome {
        self.edit_time(TimeField::SegmentStart, id, current).await
    }

    pub async fn edit_segment_end(&self, id: i64, current: Option<UtcStamp>) -> MutationOutcome {
        self.edit_time(TimeField::SegmentEnd, id, current).await
    }

    /// Ask for a new instant, send it, then reload.
    pub async fn edit_time(
        &self,
        field: TimeField,
        id: i64,
        current: Option<UtcStamp>,
    ) -> MutationOutcome {
        let answer = self.modals.open_datetime(field.dialog_title(), current).await;
        let Some(stamp) = answer.and_then(DialogValue::into_instant) else {
            log_debug!("{:?} edit of {} cancelled", field, id);
            return MutationOutcome::Cancelled;
        };
        if !stamp.is_valid() {
            log_warn!("{:?} edit of {} got unparsable value '{}'", field, id, stamp);
            self.toasts.warning("Invalid date/time");
            return MutationOutcome::Cancelled;
        }

        let result = self.send_time(field, id, stamp).await;
        self.settle(result, field.success_message(), field.failure_message())
            .await
    }

    async fn send_time(&self, field: TimeField, id: i64, stamp: UtcStamp) -> TransportResult<()> {
        match field {
            TimeField::SessionStart => {
                let patch = WorkSessionPatch {
                    start_time: Some(stamp),
                    ..Default::default()
                };
                self.work.patch_session(id, patch).await
            }
            TimeField::SessionEnd => {
                let patch = WorkSessionPatch {
                    end_time: Some(stamp),
                    ..Default::default()
                };
                self.work.patch_session(id, patch).await
            }
            TimeField::SegmentStart => {
                let patch = WorkSegmentPatch {
                    start_time: Some(stamp),
                    ..Default::default()
                };
                self.work.patch_segment(id, patch).await
            }
            TimeField::SegmentEnd => {
                let patch = WorkSegmentPatch {
                    end_time: Some(stamp),
                    ..Default::default()
                };
                self.work.patch_segment(id, patch).await
            }
        }
    }

    /// Delete a session. Confirmation is the caller's job.
    pub async fn delete_session(&self, id: i64) -> MutationOutcome {
        let result = self.work.delete_session(id).await;
        self.settle(result, "Work session deleted", "Failed to delete work session")
            .await
    }

    /// Delete a segment. Confirmation is the caller's job.
    pub async fn delete_segment(&self, id: i64) -> MutationOutcome {
        let result = self.work.delete_segment(id).await;
        self.settle(result, "Work segment deleted", "Failed to delete work segment")
            .await
    }

    async fn settle(&self, result: TransportResult<()>, success: &str, failure: &str) -> MutationOutcome {
        match result {
            Ok(()) => {
                self.toasts.success(success);
                // Load failures are reported by the loader itself.
                let _ = self.loader.reload().await;
                MutationOutcome::Applied
            }
            Err(err) => {
                log_error!("{}: {err:?}", failure);
                self.toasts.danger(failure);
                MutationOutcome::Failed(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::{
        api::{memory::WorkCall, MemoryReportApi, MemoryWorkApi},
        modals::DialogRequest,
        report::loader::tests::{sample_days, week},
        toast::ToastLevel,
    };

    struct Fixture {
        mutations: ReportMutations,
        work: Arc<MemoryWorkApi>,
        report: Arc<MemoryReportApi>,
        toasts: ToastQueue,
        modals: ModalArbiter,
    }

    async fn fixture() -> Fixture {
        let work = Arc::new(MemoryWorkApi::new());
        let report = Arc::new(MemoryReportApi::new(sample_days()));
        let toasts = ToastQueue::default();
        let modals = ModalArbiter::new();
        let loader = ReportLoader::new(report.clone(), toasts.clone());
        let (from, to) = week();
        loader.load(from, to).await.unwrap();

        let mutations = ReportMutations::new(work.clone(), loader, toasts.clone(), modals.clone());
        Fixture {
            mutations,
            work,
            report,
            toasts,
            modals,
        }
    }

    async fn answer(modals: &ModalArbiter, value: Option<DialogValue>) -> DialogRequest {
        let mut rx = modals.subscribe();
        let active = rx
            .wait_for(Option::is_some)
            .await
            .unwrap()
            .clone()
            .unwrap();
        modals.close(value);
        active.request
    }

    #[tokio::test]
    async fn session_start_edit_patches_toasts_and_reloads() {
        let f = fixture().await;
        let new_start = Utc.with_ymd_and_hms(2025, 1, 6, 7, 30, 0).unwrap();
        let current = Some(UtcStamp::from("2025-01-06T08:00:00.000Z"));

        let (outcome, request) = tokio::join!(
            f.mutations.edit_session_start(1, current.clone()),
            answer(&f.modals, Some(DialogValue::Instant(new_start.into())))
        );

        assert_eq!(outcome, MutationOutcome::Applied);
        assert_eq!(
            request,
            DialogRequest::DateTime {
                title: "Adjust START time".into(),
                current,
            }
        );
        assert_eq!(
            f.work.calls(),
            vec![WorkCall::PatchSession(
                1,
                WorkSessionPatch {
                    start_time: Some(new_start.into()),
                    end_time: None,
                }
            )]
        );
        assert_eq!(f.toasts.items().pop().unwrap().message, "Start time updated");
        assert_eq!(f.report.calls(), 2);
    }

    #[tokio::test]
    async fn cancelled_dialog_sends_nothing() {
        let f = fixture().await;

        let (outcome, _) = tokio::join!(
            f.mutations.edit_segment_end(10, None),
            answer(&f.modals, None)
        );

        assert_eq!(outcome, MutationOutcome::Cancelled);
        assert!(f.work.calls().is_empty());
        assert_eq!(f.report.calls(), 1);
    }

    #[tokio::test]
    async fn failed_segment_edit_reports_without_reload() {
        let f = fixture().await;
        f.work.fail_next(TransportError::new("endTime: must be after startTime", 400));

        let (outcome, request) = tokio::join!(
            f.mutations.edit_segment_end(10, None),
            answer(&f.modals, Some(DialogValue::Text("2025-01-06T07:00:00Z".into())))
        );

        assert!(matches!(outcome, MutationOutcome::Failed(ref e) if e.status == 400));
        assert_eq!(request.title(), "Adjust SEGMENT end time");
        let toast = f.toasts.items().pop().unwrap();
        assert_eq!(toast.level, ToastLevel::Danger);
        assert_eq!(toast.message, "Failed to update segment end");
        assert_eq!(f.report.calls(), 1);
    }

    #[tokio::test]
    async fn unparsable_value_is_not_sent() {
        let f = fixture().await;

        let (outcome, _) = tokio::join!(
            f.mutations.edit_session_end(1, None),
            answer(&f.modals, Some(DialogValue::Text("tomorrow".into())))
        );

        assert_eq!(outcome, MutationOutcome::Cancelled);
        assert!(f.work.calls().is_empty());
        assert_eq!(f.toasts.items().pop().unwrap().level, ToastLevel::Warning);
    }

    #[tokio::test]
    async fn deletes_reload_on_success() {
        let f = fixture().await;

        assert_eq!(f.mutations.delete_segment(11).await, MutationOutcome::Applied);
        assert_eq!(f.mutations.delete_session(1).await, MutationOutcome::Applied);

        assert_eq!(
            f.work.calls(),
            vec![WorkCall::DeleteSegment(11), WorkCall::DeleteSession(1)]
        );
        let messages: Vec<_> = f.toasts.items().into_iter().map(|t| t.message).collect();
        assert_eq!(messages, vec!["Work segment deleted", "Work session deleted"]);
        assert_eq!(f.report.calls(), 3);
    }
}
