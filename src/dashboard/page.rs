use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use super::state::{DashboardState, SegmentForm};
use crate::{
    api::{ReportApi, TaxonomyApi, TransportResult, WorkApi},
    error::TransportError,
    models::{Interval, StatusFilter, WorkSegmentStart, WorkSegmentStop},
    settings::RangeDays,
    ticker::LiveTicker,
    toast::ToastQueue,
};

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_error, log_info};

pub const LOAD_FAILED_MESSAGE: &str = "Failed to load dashboard";

#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    Applied,
    /// A precondition failed; the warning toast carries the text.
    Refused(&'static str),
    Failed(TransportError),
    /// Nothing to act on.
    Skipped,
}

/// Transports the dashboard talks to.
#[derive(Clone)]
pub struct DashboardApis {
    pub categories: Arc<dyn TaxonomyApi>,
    pub activities: Arc<dyn TaxonomyApi>,
    pub work: Arc<dyn WorkApi>,
    pub reports: Arc<dyn ReportApi>,
}

/// Start and stop the workday and its segments, with live running durations.
#[derive(Clone)]
pub struct DashboardPage {
    apis: DashboardApis,
    toasts: ToastQueue,
    range: RangeDays,
    state: Arc<watch::Sender<DashboardState>>,
    header_clock: LiveTicker<String>,
    now: LiveTicker<DateTime<Utc>>,
}

impl DashboardPage {
    pub fn new(
        apis: DashboardApis,
        toasts: ToastQueue,
        range: RangeDays,
        header_clock: LiveTicker<String>,
        now: LiveTicker<DateTime<Utc>>,
    ) -> Self {
        let (state, _) = watch::channel(DashboardState::default());
        Self {
            apis,
            toasts,
            range,
            state: Arc::new(state),
            header_clock,
            now,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<DashboardState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> DashboardState {
        self.state.borrow().clone()
    }

    pub fn header_clock(&self) -> String {
        self.header_clock.value()
    }

    pub fn session_running_duration(&self) -> String {
        self.state.borrow().session_running_duration(self.now.value())
    }

    pub fn segment_running_duration(&self) -> String {
        self.state.borrow().segment_running_duration(self.now.value())
    }

    pub fn set_category(&self, id: Option<i64>) {
        self.state.send_modify(|s| s.form.category_id = id);
    }

    pub fn set_activity(&self, id: Option<i64>) {
        self.state.send_modify(|s| s.form.activity_id = id);
    }

    pub fn set_comment(&self, comment: impl Into<String>) {
        let comment = comment.into();
        self.state.send_modify(|s| s.form.comment = comment);
    }

    pub fn set_days_count(&self, count: usize) {
        self.state.send_modify(|s| s.days_count = count.max(1));
    }

    pub async fn mount(&self) {
        self.header_clock.mount();
        self.now.mount();
        self.load().await;
    }

    /// Back from the background: refresh quietly.
    pub async fn activate(&self) {
        self.header_clock.activate();
        self.now.activate();
        self.refresh(true).await;
    }

    pub fn deactivate(&self) {
        self.header_clock.deactivate();
        self.now.deactivate();
    }

    pub fn unmount(&self) {
        self.header_clock.unmount();
        self.now.unmount();
    }

    pub async fn load(&self) {
        self.state.send_modify(|s| {
            s.loading = true;
            s.error = None;
        });
        self.refresh(false).await;
        self.state.send_modify(|s| s.loading = false);
    }

    /// Reload sessions, select options and the running segment together.
    /// Returns whether everything loaded.
    pub async fn refresh(&self, swallow_errors: bool) -> bool {
        let result = tokio::try_join!(
            self.load_sessions(),
            self.load_select_data(),
            self.load_current_segment(),
        );

        match result {
            Ok(_) => true,
            Err(err) => {
                log_error!("dashboard refresh failed: {err:?}");
                if !swallow_errors {
                    let message = err.message_or(LOAD_FAILED_MESSAGE);
                    self.state.send_modify(|s| s.error = Some(message));
                }
                false
            }
        }
    }

    async fn load_sessions(&self) -> TransportResult<()> {
        let (from, to) = self.range.resolve();
        let days = self.apis.reports.days(from, to).await?;
        let sessions: Vec<_> = days.into_iter().flat_map(|day| day.sessions).collect();
        let current = sessions.iter().find(|s| s.is_running()).cloned();

        log_debug!("dashboard has {} sessions, running: {}", sessions.len(), current.is_some());
        self.state.send_modify(|s| {
            s.sessions = sessions;
            s.current_session = current;
        });
        Ok(())
    }

    async fn load_select_data(&self) -> TransportResult<()> {
        let (categories, activities) = tokio::try_join!(
            self.apis.categories.list(StatusFilter::Active),
            self.apis.activities.list(StatusFilter::Active),
        )?;
        self.state.send_modify(|s| {
            s.categories = categories;
            s.activities = activities;
        });
        Ok(())
    }

    async fn load_current_segment(&self) -> TransportResult<()> {
        let segment = self.apis.work.current_segment().await?;
        self.state.send_modify(|s| {
            match &segment {
                Some(seg) if seg.is_running() => s.form.adopt(seg),
                Some(_) => {}
                None => s.form = SegmentForm::default(),
            }
            s.current_segment = segment;
        });
        Ok(())
    }

    pub async fn start_day(&self) -> ActionOutcome {
        let result = self.apis.work.start_session().await;
        self.settle(result, "Workday started", "Failed to start workday")
            .await
    }

    pub async fn stop_day(&self) -> ActionOutcome {
        if self.state.borrow().is_segment_running() {
            return self.refuse("Stop the active segment first");
        }
        let result = self.apis.work.stop_session().await;
        self.settle(result, "Workday stopped", "Failed to stop workday")
            .await
    }

    pub async fn start_segment(&self) -> ActionOutcome {
        let dto = {
            let state = self.state.borrow();
            if !state.is_session_running() {
                return self.refuse("Start a work session first");
            }
            if state.is_segment_running() {
                return self.refuse("A segment is already running. Stop it first.");
            }
            let Some(category_id) = state.form.category_id else {
                return self.refuse("Category is required");
            };
            let Some(activity_id) = state.form.activity_id else {
                return self.refuse("Activity is required");
            };
            WorkSegmentStart {
                category_id,
                activity_id,
                comment: state.form.comment(),
            }
        };

        let result = self.apis.work.start_segment(dto).await;
        self.settle_segment(result, "Segment started", "Failed to start segment")
            .await
    }

    pub async fn stop_segment(&self) -> ActionOutcome {
        let dto = {
            let state = self.state.borrow();
            if state.current_segment.is_none() {
                return ActionOutcome::Skipped;
            }
            WorkSegmentStop {
                category_id: state.form.category_id,
                activity_id: state.form.activity_id,
                comment: state.form.comment(),
            }
        };

        let result = self.apis.work.stop_segment(dto).await;
        self.settle_segment(result, "Segment stopped", "Failed to stop segment")
            .await
    }

    fn refuse(&self, reason: &'static str) -> ActionOutcome {
        self.toasts.warning(reason);
        ActionOutcome::Refused(reason)
    }

    async fn settle(&self, result: TransportResult<()>, success: &str, fallback: &str) -> ActionOutcome {
        match result {
            Ok(()) => {
                log_info!("{}", success);
                self.toasts.success(success);
                self.load().await;
                ActionOutcome::Applied
            }
            Err(err) => self.fail(err, fallback),
        }
    }

    /// Segment changes only touch the segment and the session list.
    async fn settle_segment(
        &self,
        result: TransportResult<()>,
        success: &str,
        fallback: &str,
    ) -> ActionOutcome {
        match result {
            Ok(()) => {
                log_info!("{}", success);
                self.toasts.success(success);
                if let Err(err) = self.load_current_segment().await {
                    log_error!("reloading current segment failed: {err:?}");
                }
                if let Err(err) = self.load_sessions().await {
                    log_error!("reloading sessions failed: {err:?}");
                }
                ActionOutcome::Applied
            }
            Err(err) => self.fail(err, fallback),
        }
    }

    fn fail(&self, err: TransportError, fallback: &str) -> ActionOutcome {
        log_error!("{}: {err:?}", fallback);
        self.toasts
            .danger(format!("Error: {}", err.message_or(fallback)));
        ActionOutcome::Failed(err)
    }
}
