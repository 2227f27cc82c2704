use std::{
    future::Future,
    pin::Pin,
    sync::{Arc, Mutex, MutexGuard},
    task::{Context, Poll},
};

use tokio::sync::{oneshot, watch};
use uuid::Uuid;

use super::request::{DialogRequest, DialogValue, InfoLine, TextPrompt};
use crate::models::UtcStamp;

const ENABLE_LOGS: bool = true;

use crate::log_debug;

/// The dialog currently on screen, as observers see it.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveDialog {
    pub id: Uuid,
    pub request: DialogRequest,
}

struct Pending {
    id: Uuid,
    responder: oneshot::Sender<Option<DialogValue>>,
}

/// Resolves to the submitted value, or `None` when the dialog was dismissed,
/// superseded by another dialog, or the arbiter went away.
#[derive(Debug)]
pub struct DialogHandle {
    id: Uuid,
    rx: oneshot::Receiver<Option<DialogValue>>,
}

impl DialogHandle {
    pub fn id(&self) -> Uuid {
        self.id
    }
}

impl Future for DialogHandle {
    type Output = Option<DialogValue>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|result| result.unwrap_or(None))
    }
}

/// Keeps at most one input dialog open.
///
/// Opening a dialog while another is open resolves the older handle with
/// `None` first, then publishes the new one.
#[derive(Clone)]
pub struct ModalArbiter {
    pending: Arc<Mutex<Option<Pending>>>,
    active: Arc<watch::Sender<Option<ActiveDialog>>>,
}

impl Default for ModalArbiter {
    fn default() -> Self {
        Self::new()
    }
}

impl ModalArbiter {
    pub fn new() -> Self {
        let (active, _) = watch::channel(None);
        Self {
            pending: Arc::new(Mutex::new(None)),
            active: Arc::new(active),
        }
    }

    fn lock_pending(&self) -> MutexGuard<'_, Option<Pending>> {
        match self.pending.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn open(&self, request: DialogRequest) -> DialogHandle {
        let mut pending = self.lock_pending();

        if let Some(prior) = pending.take() {
            log_debug!("dialog {} superseded by {:?}", prior.id, request.kind());
            let _ = prior.responder.send(None);
        }

        let id = Uuid::new_v4();
        let (responder, rx) = oneshot::channel();
        *pending = Some(Pending { id, responder });

        log_debug!("dialog {} opened: {:?} '{}'", id, request.kind(), request.title());
        self.active.send_replace(Some(ActiveDialog { id, request }));

        DialogHandle { id, rx }
    }

    /// Close whatever is open and resolve it with `value`. No-op when idle.
    pub fn close(&self, value: Option<DialogValue>) -> bool {
        let mut pending = self.lock_pending();
        let Some(current) = pending.take() else {
            return false;
        };

        self.active.send_replace(None);
        log_debug!("dialog {} closed (submitted: {})", current.id, value.is_some());
        let _ = current.responder.send(value);
        true
    }

    /// Like [`close`](Self::close), but only if dialog `id` is still the open one.
    pub fn close_dialog(&self, id: Uuid, value: Option<DialogValue>) -> bool {
        let is_current = self
            .lock_pending()
            .as_ref()
            .map_or(false, |pending| pending.id == id);
        is_current && self.close(value)
    }

    pub fn is_open(&self) -> bool {
        self.lock_pending().is_some()
    }

    pub fn active(&self) -> Option<ActiveDialog> {
        self.active.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<ActiveDialog>> {
        self.active.subscribe()
    }

    pub fn open_datetime(&self, title: impl Into<String>, current: Option<UtcStamp>) -> DialogHandle {
        self.open(DialogRequest::DateTime {
            title: title.into(),
            current,
        })
    }

    pub fn open_date_range(
        &self,
        title: impl Into<String>,
        from: Option<UtcStamp>,
        to: Option<UtcStamp>,
    ) -> DialogHandle {
        self.open(DialogRequest::DateRange {
            title: title.into(),
            from,
            to,
        })
    }

    pub fn open_text(&self, prompt: TextPrompt) -> DialogHandle {
        self.open(DialogRequest::Text(prompt))
    }

    pub fn open_textarea(&self, prompt: TextPrompt) -> DialogHandle {
        self.open(DialogRequest::Textarea(prompt))
    }

    pub fn open_info(&self, title: impl Into<String>, lines: Vec<InfoLine>) -> DialogHandle {
        self.open(DialogRequest::Info {
            title: title.into(),
            lines,
        })
    }
}
