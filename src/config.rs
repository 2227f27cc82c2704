use std::{env, fs, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::{
    settings::RangeDays, taxonomy::TaxonomyRules, ticker::TickerOptions,
    toast::DEFAULT_TOAST_DELAY_MS,
};

const ENABLE_LOGS: bool = true;

use crate::{log_info, log_warn};

pub const TICK_MS_ENV: &str = "WORKTIME_TICK_MS";
pub const DEBUG_ENV: &str = "WORKTIME_DEBUG";

/// Knobs for the whole core. Every field has a default, so a partial JSON
/// file is fine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CoreConfig {
    pub ticker: TickerOptions,
    pub taxonomy: TaxonomyRules,
    /// `active` assumed for taxonomy records that lack the flag.
    pub legacy_active_default: bool,
    pub report_range: RangeDays,
    pub dashboard_range: RangeDays,
    pub toast_delay_ms: u64,
    pub debug: bool,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            ticker: TickerOptions::default(),
            taxonomy: TaxonomyRules::default(),
            legacy_active_default: true,
            report_range: RangeDays::default(),
            dashboard_range: RangeDays {
                days_back: 90,
                days_forward: 0,
            },
            toast_delay_ms: DEFAULT_TOAST_DELAY_MS,
            debug: false,
        }
    }
}

impl CoreConfig {
    /// Read `path`, falling back to defaults when the file is absent or not
    /// valid JSON, then apply environment overrides.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            match serde_json::from_str(&contents) {
                Ok(config) => config,
                Err(err) => {
                    log_warn!("config {} is malformed, using defaults: {err}", path.display());
                    CoreConfig::default()
                }
            }
        } else {
            log_info!("no config at {}, using defaults", path.display());
            CoreConfig::default()
        };

        config.apply_env_overrides(|key| env::var(key).ok());
        Ok(config)
    }

    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(raw) = lookup(TICK_MS_ENV) {
            match raw.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => self.ticker.interval_ms = ms,
                _ => log_warn!("ignoring {}={:?}: expected a positive integer", TICK_MS_ENV, raw),
            }
        }

        if let Some(raw) = lookup(DEBUG_ENV) {
            self.debug = raw == "1" || raw.eq_ignore_ascii_case("true");
        }
    }

    pub fn log_level(&self) -> log::LevelFilter {
        if self.debug {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        }
    }
}
