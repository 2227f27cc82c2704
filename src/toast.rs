//! User-facing notifications. Rendering and expiry belong to the UI; this is
//! the queue it observes.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

const ENABLE_LOGS: bool = true;

use crate::log_debug;

pub const DEFAULT_TOAST_DELAY_MS: u64 = 4000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastLevel {
    Success,
    Danger,
    Warning,
    Info,
    Primary,
    Secondary,
    Dark,
    Light,
}

impl ToastLevel {
    /// Unknown level names fall back to `Secondary`.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "success" => ToastLevel::Success,
            "danger" => ToastLevel::Danger,
            "warning" => ToastLevel::Warning,
            "info" => ToastLevel::Info,
            "primary" => ToastLevel::Primary,
            "dark" => ToastLevel::Dark,
            "light" => ToastLevel::Light,
            _ => ToastLevel::Secondary,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Toast {
    pub id: u64,
    pub message: String,
    pub level: ToastLevel,
    pub delay_ms: u64,
}

#[derive(Clone)]
pub struct ToastQueue {
    items: Arc<watch::Sender<Vec<Toast>>>,
    next_id: Arc<AtomicU64>,
    default_delay_ms: u64,
}

impl Default for ToastQueue {
    fn default() -> Self {
        Self::new(DEFAULT_TOAST_DELAY_MS)
    }
}

impl ToastQueue {
    pub fn new(default_delay_ms: u64) -> Self {
        let (items, _) = watch::channel(Vec::new());
        Self {
            items: Arc::new(items),
            next_id: Arc::new(AtomicU64::new(1)),
            default_delay_ms: if default_delay_ms == 0 {
                DEFAULT_TOAST_DELAY_MS
            } else {
                default_delay_ms
            },
        }
    }

    /// Queue a toast and return its id. A zero delay means the default.
    pub fn show(&self, message: impl Into<String>, level: ToastLevel, delay_ms: Option<u64>) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let toast = Toast {
            id,
            message: message.into(),
            level,
            delay_ms: delay_ms.filter(|d| *d > 0).unwrap_or(self.default_delay_ms),
        };
        log_debug!("toast #{} [{:?}] {}", toast.id, toast.level, toast.message);
        self.items.send_modify(|items| items.push(toast));
        id
    }

    pub fn success(&self, message: impl Into<String>) -> u64 {
        self.show(message, ToastLevel::Success, None)
    }

    pub fn danger(&self, message: impl Into<String>) -> u64 {
        self.show(message, ToastLevel::Danger, None)
    }

    pub fn warning(&self, message: impl Into<String>) -> u64 {
        self.show(message, ToastLevel::Warning, None)
    }

    pub fn info(&self, message: impl Into<String>) -> u64 {
        self.show(message, ToastLevel::Info, None)
    }

    pub fn remove(&self, id: u64) -> bool {
        self.items.send_if_modified(|items| {
            let before = items.len();
            items.retain(|t| t.id != id);
            items.len() != before
        })
    }

    pub fn items(&self) -> Vec<Toast> {
        self.items.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<Toast>> {
        self.items.subscribe()
    }
}
