//! Persisted report preferences: the segment toggle and the selected range.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use crate::utils::time::{compute_local_day_range_utc, is_same_instant, parse_utc, to_utc_iso};

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_warn};

/// A range of whole local days around today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RangeDays {
    pub days_back: u32,
    pub days_forward: u32,
}

impl Default for RangeDays {
    fn default() -> Self {
        Self {
            days_back: 7,
            days_forward: 0,
        }
    }
}

impl RangeDays {
    pub fn resolve(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        compute_local_day_range_utc(self.days_back, self.days_forward)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReportSettings {
    pub show_segments: bool,
    /// ISO-8601 UTC; empty when unset.
    pub from_utc: String,
    pub to_utc: String,
    /// The range was picked by the user rather than derived from today.
    pub range_customized: bool,
}

impl ReportSettings {
    pub fn range(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        Some((parse_utc(&self.from_utc)?, parse_utc(&self.to_utc)?))
    }
}

/// JSON-file backed [`ReportSettings`]. Every mutation is written through.
pub struct ReportSettingsStore {
    path: PathBuf,
    standard: RangeDays,
    data: RwLock<ReportSettings>,
}

impl ReportSettingsStore {
    /// Open `path`. A missing or unreadable-as-JSON file yields defaults.
    pub fn new(path: impl Into<PathBuf>, standard: RangeDays) -> Result<Self> {
        let path = path.into();
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read report settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_else(|err| {
                log_warn!("ignoring malformed report settings {}: {err}", path.display());
                ReportSettings::default()
            })
        } else {
            ReportSettings::default()
        };

        Ok(Self {
            path,
            standard,
            data: RwLock::new(data),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> RwLockReadGuard<'_, ReportSettings> {
        match self.data.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, ReportSettings> {
        match self.data.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn settings(&self) -> ReportSettings {
        self.read().clone()
    }

    pub fn show_segments(&self) -> bool {
        self.read().show_segments
    }

    pub fn range(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        self.read().range()
    }

    /// Reset is only meaningful for a user-picked range.
    pub fn reset_disabled(&self) -> bool {
        !self.read().range_customized
    }

    pub fn is_standard_range(&self, from_utc: &str, to_utc: &str) -> bool {
        let (from, to) = self.standard.resolve();
        is_same_instant(Some(from_utc), Some(&to_utc_iso(from)))
            && is_same_instant(Some(to_utc), Some(&to_utc_iso(to)))
    }

    /// Follow today unless the user picked a complete range.
    pub fn ensure_range_initialized(&self) -> Result<()> {
        let keep = {
            let data = self.read();
            data.range_customized && !data.from_utc.is_empty() && !data.to_utc.is_empty()
        };
        if keep {
            return Ok(());
        }
        self.apply_standard_range().map(|_| ())
    }

    /// Returns the range that was applied.
    pub fn apply_standard_range(&self) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
        let (from, to) = self.standard.resolve();
        let mut guard = self.write();
        guard.from_utc = to_utc_iso(from);
        guard.to_utc = to_utc_iso(to);
        guard.range_customized = false;
        log_debug!("report range reset to {} .. {}", guard.from_utc, guard.to_utc);
        self.persist(&guard)?;
        Ok((from, to))
    }

    /// Store a picked range; it counts as customized unless it equals the
    /// standard one.
    pub fn set_range(&self, from_utc: &str, to_utc: &str) -> Result<()> {
        let customized = !self.is_standard_range(from_utc, to_utc);
        let mut guard = self.write();
        guard.from_utc = from_utc.to_string();
        guard.to_utc = to_utc.to_string();
        guard.range_customized = customized;
        self.persist(&guard)
    }

    pub fn set_show_segments(&self, show: bool) -> Result<()> {
        let mut guard = self.write();
        guard.show_segments = show;
        self.persist(&guard)
    }

    pub fn reload(&self) -> Result<()> {
        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read report settings from {}", self.path.display()))?;
        let data: ReportSettings = serde_json::from_str(&contents)
            .with_context(|| format!("Malformed report settings in {}", self.path.display()))?;
        *self.write() = data;
        Ok(())
    }

    fn persist(&self, data: &ReportSettings) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write report settings to {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> ReportSettingsStore {
        ReportSettingsStore::new(dir.path().join("report.json"), RangeDays::default()).unwrap()
    }

    #[test]
    fn missing_file_starts_with_the_standard_range() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        store.ensure_range_initialized().unwrap();

        let settings = store.settings();
        assert!(!settings.range_customized);
        assert!(store.reset_disabled());
        assert!(store.is_standard_range(&settings.from_utc, &settings.to_utc));
        assert!(store.path().exists());
    }

    #[test]
    fn custom_range_survives_a_restart() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store
            .set_range("2024-12-01T00:00:00.000Z", "2024-12-31T23:59:59.999Z")
            .unwrap();
        store.set_show_segments(true).unwrap();

        let reopened = store_in(&dir);
        reopened.ensure_range_initialized().unwrap();

        let settings = reopened.settings();
        assert!(settings.range_customized);
        assert!(settings.show_segments);
        assert_eq!(settings.from_utc, "2024-12-01T00:00:00.000Z");
        assert!(!reopened.reset_disabled());

        reopened.apply_standard_range().unwrap();
        assert!(reopened.reset_disabled());
    }

    #[test]
    fn picking_the_standard_range_is_not_a_customization() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let (from, to) = RangeDays::default().resolve();

        store.set_range(&to_utc_iso(from), &to_utc_iso(to)).unwrap();

        assert!(!store.settings().range_customized);
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("report.json"), "{ not json").unwrap();

        let store = store_in(&dir);

        assert_eq!(store.settings(), ReportSettings::default());
        assert!(store.reload().is_err());
    }
}
