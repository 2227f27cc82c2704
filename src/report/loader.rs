use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use crate::{
    api::{ReportApi, TransportResult},
    durations::{aggregate_days, build_day_views, DayAggregate, DayView},
    models::WorkDay,
    toast::ToastQueue,
};

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_error, log_info};

pub const LOAD_FAILED_MESSAGE: &str = "Failed to load work sessions";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportState {
    pub days: Vec<WorkDay>,
    pub loading: bool,
    pub error: Option<String>,
    /// Range of the most recent load request.
    pub range: Option<(DateTime<Utc>, DateTime<Utc>)>,
}

/// Fetches report days for a range and keeps the raw result observable.
///
/// When loads overlap, only the most recently issued one publishes.
#[derive(Clone)]
pub struct ReportLoader {
    api: Arc<dyn ReportApi>,
    toasts: ToastQueue,
    state: Arc<watch::Sender<ReportState>>,
    generation: Arc<AtomicU64>,
}

impl ReportLoader {
    pub fn new(api: Arc<dyn ReportApi>, toasts: ToastQueue) -> Self {
        let (state, _) = watch::channel(ReportState::default());
        Self {
            api,
            toasts,
            state: Arc::new(state),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<ReportState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> ReportState {
        self.state.borrow().clone()
    }

    pub fn days(&self) -> Vec<WorkDay> {
        self.state.borrow().days.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    pub fn error(&self) -> Option<String> {
        self.state.borrow().error.clone()
    }

    pub async fn load(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> TransportResult<usize> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_modify(|s| {
            s.loading = true;
            s.error = None;
            s.range = Some((from, to));
        });

        let result = self.api.days(from, to).await;

        if self.generation.load(Ordering::SeqCst) != generation {
            log_debug!("report load {} superseded, dropping its result", generation);
            return result.map(|days| days.len());
        }

        match result {
            Ok(days) => {
                let count = days.len();
                log_info!("loaded {} report days", count);
                self.state.send_modify(|s| {
                    s.days = days;
                    s.loading = false;
                });
                Ok(count)
            }
            Err(err) => {
                log_error!("failed to load report {} .. {}: {err:?}", from, to);
                self.state.send_modify(|s| {
                    s.days.clear();
                    s.error = Some(LOAD_FAILED_MESSAGE.to_string());
                    s.loading = false;
                });
                self.toasts.danger(LOAD_FAILED_MESSAGE);
                Err(err)
            }
        }
    }

    /// Load the last requested range again. `Ok(0)` if nothing was loaded yet.
    pub async fn reload(&self) -> TransportResult<usize> {
        let range = self.state.borrow().range;
        match range {
            Some((from, to)) => self.load(from, to).await,
            None => {
                log_debug!("report reload requested before any load");
                Ok(0)
            }
        }
    }

    pub fn aggregate(&self, now: DateTime<Utc>) -> Vec<DayAggregate> {
        aggregate_days(&self.state.borrow().days, now)
    }

    pub fn views(&self, show_segments: bool, now: DateTime<Utc>) -> Vec<DayView> {
        build_day_views(&self.state.borrow().days, show_segments, now)
    }
}
