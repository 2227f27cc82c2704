use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::{loader::ReportLoader, mutations::ReportMutations};
use crate::{
    durations::DayView,
    error::CoreResult,
    modals::{DialogValue, ModalArbiter},
    models::UtcStamp,
    settings::ReportSettingsStore,
    ticker::LiveTicker,
};

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_warn};

pub const RANGE_DIALOG_TITLE: &str = "Filter by time range";

/// The report screen: persisted range and toggle, the loader, the edit flows
/// and the live "now" that keeps running sessions current.
#[derive(Clone)]
pub struct ReportPage {
    settings: Arc<ReportSettingsStore>,
    loader: ReportLoader,
    mutations: ReportMutations,
    now: LiveTicker<DateTime<Utc>>,
    modals: ModalArbiter,
}

impl ReportPage {
    pub fn new(
        settings: Arc<ReportSettingsStore>,
        loader: ReportLoader,
        mutations: ReportMutations,
        now: LiveTicker<DateTime<Utc>>,
        modals: ModalArbiter,
    ) -> Self {
        Self {
            settings,
            loader,
            mutations,
            now,
            modals,
        }
    }

    pub fn settings(&self) -> &ReportSettingsStore {
        &self.settings
    }

    pub fn loader(&self) -> &ReportLoader {
        &self.loader
    }

    pub fn mutations(&self) -> &ReportMutations {
        &self.mutations
    }

    /// Settle the range, start the live clock, load.
    pub async fn mount(&self) -> CoreResult<()> {
        self.settings.ensure_range_initialized()?;
        self.now.mount();
        self.load().await
    }

    pub async fn activate(&self) -> CoreResult<()> {
        self.now.activate();
        self.load().await
    }

    pub fn deactivate(&self) {
        self.now.deactivate();
    }

    pub fn unmount(&self) {
        self.now.unmount();
    }

    pub async fn load(&self) -> CoreResult<()> {
        let (from, to) = match self.settings.range() {
            Some(range) => range,
            None => {
                log_warn!("report range unset or unparsable, resetting it");
                self.settings.apply_standard_range()?
            }
        };
        self.loader.load(from, to).await?;
        Ok(())
    }

    pub async fn set_show_segments(&self, show: bool) -> CoreResult<()> {
        self.settings.set_show_segments(show)?;
        self.load().await
    }

    /// Ask for a new range. Returns whether one was applied.
    pub async fn open_date_range(&self) -> CoreResult<bool> {
        let current = self.settings.settings();
        let stamp = |raw: &str| (!raw.trim().is_empty()).then(|| UtcStamp::from(raw));

        let picked = self
            .modals
            .open_date_range(RANGE_DIALOG_TITLE, stamp(&current.from_utc), stamp(&current.to_utc))
            .await
            .and_then(DialogValue::into_range);
        let Some((from, to)) = picked else {
            return Ok(false);
        };

        self.settings.set_range(&from.to_string(), &to.to_string())?;
        log_debug!("report range set to {} .. {}", from, to);
        self.load().await?;
        Ok(true)
    }

    /// Back to the standard range. No-op unless the range was customized.
    pub async fn clear_date_range(&self) -> CoreResult<bool> {
        if self.settings.reset_disabled() {
            return Ok(false);
        }
        self.settings.apply_standard_range()?;
        self.load().await?;
        Ok(true)
    }

    /// Rows as of the latest ticker sample.
    pub fn views(&self) -> Vec<DayView> {
        self.loader.views(self.settings.show_segments(), self.now.value())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::{
        api::{MemoryReportApi, MemoryWorkApi},
        report::loader::tests::sample_days,
        settings::RangeDays,
        ticker::{ManualClock, TickerOptions, Visibility},
        toast::ToastQueue,
    };

    struct Fixture {
        page: ReportPage,
        report: Arc<MemoryReportApi>,
        modals: ModalArbiter,
        _dir: tempfile::TempDir,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let settings = Arc::new(
            ReportSettingsStore::new(dir.path().join("report.json"), RangeDays::default()).unwrap(),
        );
        let report = Arc::new(MemoryReportApi::new(sample_days()));
        let toasts = ToastQueue::default();
        let modals = ModalArbiter::new();
        let loader = ReportLoader::new(report.clone(), toasts.clone());
        let mutations = ReportMutations::new(
            Arc::new(MemoryWorkApi::new()),
            loader.clone(),
            toasts,
            modals.clone(),
        );
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2025, 1, 6, 18, 0, 0).unwrap(),
        ));
        let now = LiveTicker::clock(clock, Visibility::new(), TickerOptions::default());

        Fixture {
            page: ReportPage::new(settings, loader, mutations, now, modals.clone()),
            report,
            modals,
            _dir: dir,
        }
    }

    #[tokio::test]
    async fn picked_range_is_persisted_and_loaded() {
        let f = fixture();
        f.page.mount().await.unwrap();
        assert_eq!(f.report.calls(), 1);
        assert!(f.page.views().is_empty());

        let answer = async {
            let mut rx = f.modals.subscribe();
            let title = rx
                .wait_for(Option::is_some)
                .await
                .unwrap()
                .as_ref()
                .map(|d| d.request.title().to_string());
            f.modals.close(Some(DialogValue::Range {
                from: UtcStamp::from("2025-01-01T00:00:00.000Z"),
                to: UtcStamp::from("2025-01-07T23:59:59.999Z"),
            }));
            title
        };
        let (applied, title) = tokio::join!(f.page.open_date_range(), answer);

        assert!(applied.unwrap());
        assert_eq!(title.as_deref(), Some(RANGE_DIALOG_TITLE));
        assert!(!f.page.settings().reset_disabled());
        assert_eq!(f.report.calls(), 2);

        let views = f.page.views();
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].totals.total, "4h 00m 00s");

        assert!(f.page.clear_date_range().await.unwrap());
        assert!(!f.page.clear_date_range().await.unwrap());
        assert_eq!(f.report.calls(), 3);
        f.page.unmount();
    }

    #[tokio::test]
    async fn toggling_segments_persists_and_reloads() {
        let f = fixture();
        f.page.mount().await.unwrap();

        f.page.set_show_segments(true).await.unwrap();

        assert!(f.page.settings().show_segments());
        assert_eq!(f.report.calls(), 2);
        f.page.unmount();
    }
}
