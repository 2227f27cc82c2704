use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, Mutex, MutexGuard,
};

use tokio::sync::watch;

const ENABLE_LOGS: bool = false;

use crate::log_debug;

type RevealHook = Arc<dyn Fn() + Send + Sync>;

struct Shared {
    hidden: watch::Sender<bool>,
    hooks: Mutex<Vec<(u64, RevealHook)>>,
    next_hook: AtomicU64,
}

/// Whether the UI is currently hidden (minimized window, background tab).
///
/// The embedder flips it. Reveal hooks run inside `set_hidden` on every
/// hidden→visible edge, so no edge is lost to a later flip.
#[derive(Clone)]
pub struct Visibility {
    shared: Arc<Shared>,
}

impl Default for Visibility {
    fn default() -> Self {
        Self::new()
    }
}

impl Visibility {
    pub fn new() -> Self {
        let (hidden, _) = watch::channel(false);
        Self {
            shared: Arc::new(Shared {
                hidden,
                hooks: Mutex::new(Vec::new()),
                next_hook: AtomicU64::new(1),
            }),
        }
    }

    fn hooks(&self) -> MutexGuard<'_, Vec<(u64, RevealHook)>> {
        match self.shared.hooks.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Returns true when the state actually changed.
    pub fn set_hidden(&self, hidden: bool) -> bool {
        let changed = self.shared.hidden.send_if_modified(|current| {
            let changed = *current != hidden;
            *current = hidden;
            changed
        });
        if !changed {
            return false;
        }

        log_debug!("visibility changed: hidden={}", hidden);
        if !hidden {
            // Run outside the lock: a hook may register or remove hooks.
            let hooks: Vec<RevealHook> = self.hooks().iter().map(|(_, h)| h.clone()).collect();
            for hook in hooks {
                hook();
            }
        }
        true
    }

    pub fn is_hidden(&self) -> bool {
        *self.shared.hidden.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.shared.hidden.subscribe()
    }

    /// Call `hook` on every hidden→visible transition until removed.
    pub fn on_reveal(&self, hook: impl Fn() + Send + Sync + 'static) -> u64 {
        let id = self.shared.next_hook.fetch_add(1, Ordering::SeqCst);
        self.hooks().push((id, Arc::new(hook)));
        id
    }

    pub fn remove_reveal(&self, id: u64) -> bool {
        let mut hooks = self.hooks();
        let before = hooks.len();
        hooks.retain(|(hook_id, _)| *hook_id != id);
        hooks.len() != before
    }
}
