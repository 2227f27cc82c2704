use std::{
    sync::{Arc, Mutex, MutexGuard, Weak},
    time::Duration,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::{
    sync::watch,
    time::{self, Instant, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;

use super::{clock::Clock, visibility::Visibility};

const ENABLE_LOGS: bool = false;

use crate::log_debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TickerOptions {
    pub interval_ms: u64,
    /// Skip scheduled samples while the UI is hidden.
    pub pause_when_hidden: bool,
    /// Sample once right away on `start()`.
    pub tick_on_start: bool,
}

impl Default for TickerOptions {
    fn default() -> Self {
        Self {
            interval_ms: 1000,
            pause_when_hidden: true,
            tick_on_start: true,
        }
    }
}

impl TickerOptions {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.max(1))
    }
}

struct Inner<V> {
    sample: Box<dyn Fn() -> V + Send + Sync>,
    value: watch::Sender<V>,
    visibility: Visibility,
    options: TickerOptions,
    timer: Mutex<Option<CancellationToken>>,
    /// Reveal hook id while mounted.
    reveal_hook: Mutex<Option<u64>>,
}

impl<V> Inner<V> {
    fn tick(&self) {
        self.value.send_replace((self.sample)());
    }
}

impl<V> Drop for Inner<V> {
    fn drop(&mut self) {
        if let Some(token) = lock(&self.timer).take() {
            token.cancel();
        }
        if let Some(id) = lock(&self.reveal_hook).take() {
            self.visibility.remove_reveal(id);
        }
    }
}

fn lock<T>(slot: &Mutex<T>) -> MutexGuard<'_, T> {
    match slot.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Periodically re-samples a value (usually "now") for live displays.
///
/// `start`/`stop` are idempotent. While mounted, a hidden→visible transition
/// samples inside the `set_hidden` call, whether or not the periodic timer
/// is running. The timer task and the reveal hook only hold a weak
/// reference; dropping the last handle ends them.
pub struct LiveTicker<V> {
    inner: Arc<Inner<V>>,
}

impl<V> Clone for LiveTicker<V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl LiveTicker<DateTime<Utc>> {
    /// Ticker over `clock.now()`.
    pub fn clock(clock: Arc<dyn Clock>, visibility: Visibility, options: TickerOptions) -> Self {
        Self::new(move || clock.now(), visibility, options)
    }
}

impl<V> LiveTicker<V>
where
    V: Send + Sync + 'static,
{
    /// The first sample is taken immediately so `value()` is never empty.
    pub fn new(
        sample: impl Fn() -> V + Send + Sync + 'static,
        visibility: Visibility,
        options: TickerOptions,
    ) -> Self {
        let (value, _) = watch::channel(sample());
        Self {
            inner: Arc::new(Inner {
                sample: Box::new(sample),
                value,
                visibility,
                options,
                timer: Mutex::new(None),
                reveal_hook: Mutex::new(None),
            }),
        }
    }

    pub fn options(&self) -> TickerOptions {
        self.inner.options
    }

    pub fn subscribe(&self) -> watch::Receiver<V> {
        self.inner.value.subscribe()
    }

    pub fn tick(&self) {
        self.inner.tick();
    }

    pub fn is_running(&self) -> bool {
        lock(&self.inner.timer).is_some()
    }

    pub fn is_mounted(&self) -> bool {
        lock(&self.inner.reveal_hook).is_some()
    }

    /// Must be called from within a tokio runtime.
    pub fn start(&self) {
        let mut timer = lock(&self.inner.timer);
        if timer.is_some() {
            return;
        }

        if self.inner.options.tick_on_start {
            self.inner.tick();
        }

        let token = CancellationToken::new();
        tokio::spawn(run_timer(
            Arc::downgrade(&self.inner),
            self.inner.options,
            token.clone(),
        ));
        *timer = Some(token);
        log_debug!("ticker started ({} ms)", self.inner.options.interval_ms);
    }

    pub fn stop(&self) {
        if let Some(token) = lock(&self.inner.timer).take() {
            token.cancel();
            log_debug!("ticker stopped");
        }
    }

    /// Hook into visibility reveals, then start.
    pub fn mount(&self) {
        {
            let mut hook = lock(&self.inner.reveal_hook);
            if hook.is_none() {
                let weak = Arc::downgrade(&self.inner);
                *hook = Some(self.inner.visibility.on_reveal(move || {
                    if let Some(inner) = weak.upgrade() {
                        inner.tick();
                    }
                }));
            }
        }
        self.start();
    }

    pub fn activate(&self) {
        self.start();
    }

    pub fn deactivate(&self) {
        self.stop();
    }

    /// Stop and drop the reveal hook.
    pub fn unmount(&self) {
        self.stop();
        if let Some(id) = lock(&self.inner.reveal_hook).take() {
            self.inner.visibility.remove_reveal(id);
        }
    }
}

impl<V> LiveTicker<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub fn value(&self) -> V {
        self.inner.value.borrow().clone()
    }
}

async fn run_timer<V>(inner: Weak<Inner<V>>, options: TickerOptions, token: CancellationToken) {
    let period = options.interval();
    let mut interval = time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            _ = interval.tick() => {
                let Some(inner) = inner.upgrade() else {
                    break;
                };
                if options.pause_when_hidden && inner.visibility.is_hidden() {
                    continue;
                }
                inner.tick();
            }
        }
    }
}
