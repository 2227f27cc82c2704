//! Client-side core of the worktime tracker: live clocks, the sorted
//! category and activity lists with optimistic edits, duration totals for
//! reports, and a single-dialog arbiter.
//!
//! Everything talks to the backend through the traits in [`api`]; the
//! in-memory implementations there back the tests.

pub mod api;
pub mod collection;
pub mod config;
pub mod dashboard;
pub mod durations;
pub mod error;
pub mod modals;
pub mod models;
pub mod report;
pub mod settings;
pub mod taxonomy;
pub mod ticker;
pub mod toast;
pub mod utils;

use std::{path::Path, sync::Arc};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use api::{ReportApi, TaxonomyApi, WorkApi};
use config::CoreConfig;
use dashboard::{DashboardApis, DashboardPage};
use modals::ModalArbiter;
use models::TaxonomyKind;
use report::{ReportLoader, ReportMutations, ReportPage};
use settings::ReportSettingsStore;
use taxonomy::{TaxonomyConfig, TaxonomyStore};
use ticker::{Clock, LiveTicker, SystemClock, Visibility};
use toast::ToastQueue;
use utils::time::format_local;

pub use utils::init_logging;

const ENABLE_LOGS: bool = true;

/// Backend seams the core is built on.
#[derive(Clone)]
pub struct CoreApis {
    pub categories: Arc<dyn TaxonomyApi>,
    pub activities: Arc<dyn TaxonomyApi>,
    pub work: Arc<dyn WorkApi>,
    pub reports: Arc<dyn ReportApi>,
}

/// Every store and page, sharing one toast queue, one dialog arbiter and
/// one visibility signal.
#[derive(Clone)]
pub struct WorktimeCore {
    pub config: CoreConfig,
    pub toasts: ToastQueue,
    pub modals: ModalArbiter,
    pub visibility: Visibility,
    pub clock: Arc<dyn Clock>,
    pub categories: TaxonomyStore,
    pub activities: TaxonomyStore,
    pub report: ReportPage,
    pub dashboard: DashboardPage,
}

impl WorktimeCore {
    /// Build on the system clock, keeping report preferences at `settings_path`.
    pub fn new(config: CoreConfig, apis: CoreApis, settings_path: &Path) -> Result<Self> {
        Self::with_clock(config, apis, settings_path, Arc::new(SystemClock))
    }

    pub fn with_clock(
        config: CoreConfig,
        apis: CoreApis,
        settings_path: &Path,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let toasts = ToastQueue::new(config.toast_delay_ms);
        let modals = ModalArbiter::new();
        let visibility = Visibility::new();

        let taxonomy = |kind| TaxonomyConfig {
            rules: config.taxonomy,
            legacy_active_default: config.legacy_active_default,
            ..TaxonomyConfig::new(kind)
        };
        let categories = TaxonomyStore::new(
            apis.categories.clone(),
            taxonomy(TaxonomyKind::Categories),
            toasts.clone(),
            modals.clone(),
        );
        let activities = TaxonomyStore::new(
            apis.activities.clone(),
            taxonomy(TaxonomyKind::Activities),
            toasts.clone(),
            modals.clone(),
        );

        let settings = ReportSettingsStore::new(settings_path, config.report_range)
            .with_context(|| format!("Failed to open report settings at {}", settings_path.display()))?;
        let loader = ReportLoader::new(apis.reports.clone(), toasts.clone());
        let mutations =
            ReportMutations::new(apis.work.clone(), loader.clone(), toasts.clone(), modals.clone());
        let report = ReportPage::new(
            Arc::new(settings),
            loader,
            mutations,
            now_ticker(&clock, &visibility, &config),
            modals.clone(),
        );

        let header_clock = {
            let clock = clock.clone();
            LiveTicker::new(move || format_local(clock.now()), visibility.clone(), config.ticker)
        };
        let dashboard = DashboardPage::new(
            DashboardApis {
                categories: apis.categories,
                activities: apis.activities,
                work: apis.work,
                reports: apis.reports,
            },
            toasts.clone(),
            config.dashboard_range,
            header_clock,
            now_ticker(&clock, &visibility, &config),
        );

        log_info!(
            "worktime core ready (tick {} ms, report range -{}/+{} days)",
            config.ticker.interval_ms,
            config.report_range.days_back,
            config.report_range.days_forward
        );

        Ok(Self {
            config,
            toasts,
            modals,
            visibility,
            clock,
            categories,
            activities,
            report,
            dashboard,
        })
    }

    /// Host went to the background or came back.
    pub fn set_hidden(&self, hidden: bool) -> bool {
        self.visibility.set_hidden(hidden)
    }
}

fn now_ticker(
    clock: &Arc<dyn Clock>,
    visibility: &Visibility,
    config: &CoreConfig,
) -> LiveTicker<DateTime<Utc>> {
    LiveTicker::clock(clock.clone(), visibility.clone(), config.ticker)
}
