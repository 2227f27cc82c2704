use std::{
    future::Future,
    sync::{Arc, Mutex, MutexGuard},
};

use tokio::sync::watch;

use super::config::TaxonomyConfig;
use crate::{
    api::{TaxonomyApi, TransportResult},
    collection::{EntryDefaults, SortedCollection},
    error::{CoreError, CoreResult, TransportError, ValidationError},
    models::{StatusFilter, TaxonomyCreate, TaxonomyItem, TaxonomyPatch},
    modals::ModalArbiter,
    toast::ToastQueue,
};

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_error, log_info, log_warn};

/// Everything a taxonomy page renders, published as one value.
#[derive(Debug, Clone, PartialEq)]
pub struct TaxonomyState {
    pub items: SortedCollection<TaxonomyItem>,
    pub filter: StatusFilter,
    pub loading: bool,
    pub error: Option<String>,
}

impl TaxonomyState {
    /// Items admitted by the current status filter, in name order.
    pub fn visible(&self) -> Vec<TaxonomyItem> {
        let filter = self.filter;
        self.items
            .filter(|item| filter.admits(item.active.unwrap_or(true)))
    }
}

/// Shared result of one (possibly coalesced) full reload.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    Loaded { count: usize },
    Failed { message: String },
    /// The call that owned the reload was dropped before it finished.
    Cancelled,
}

impl LoadOutcome {
    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadOutcome::Loaded { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PatchOutcome {
    Committed,
    RolledBack(TransportError),
    /// No local entry with that id.
    Skipped,
}

#[derive(Debug, Clone, Default)]
pub struct PatchOptions {
    pub resort: bool,
    pub success_msg: Option<String>,
}

type OutcomeSlot = watch::Receiver<Option<LoadOutcome>>;

enum LoadRole {
    Leader(watch::Sender<Option<LoadOutcome>>),
    Follower(OutcomeSlot),
}

/// Sorted local mirror of one taxonomy with single-flight reloads and
/// optimistic edits.
///
/// Overlapping optimistic edits of the same entry are not serialized: the
/// last commit or rollback to land wins.
#[derive(Clone)]
pub struct TaxonomyStore {
    api: Arc<dyn TaxonomyApi>,
    config: TaxonomyConfig,
    state: Arc<watch::Sender<TaxonomyState>>,
    load_in_flight: Arc<Mutex<Option<OutcomeSlot>>>,
    pub(super) toasts: ToastQueue,
    pub(super) modals: ModalArbiter,
}

/// Clears the in-flight marker and the loading flag however the leading
/// reload ends, including when its future is dropped.
struct LoadGuard<'a> {
    store: &'a TaxonomyStore,
}

impl Drop for LoadGuard<'_> {
    fn drop(&mut self) {
        self.store.lock_in_flight().take();
        self.store.state.send_modify(|s| s.loading = false);
    }
}

impl TaxonomyStore {
    pub fn new(
        api: Arc<dyn TaxonomyApi>,
        config: TaxonomyConfig,
        toasts: ToastQueue,
        modals: ModalArbiter,
    ) -> Self {
        let defaults = EntryDefaults {
            active: config.legacy_active_default,
        };
        let (state, _) = watch::channel(TaxonomyState {
            items: SortedCollection::new(defaults),
            filter: config.initial_filter,
            loading: false,
            error: None,
        });

        Self {
            api,
            config,
            state: Arc::new(state),
            load_in_flight: Arc::new(Mutex::new(None)),
            toasts,
            modals,
        }
    }

    pub fn config(&self) -> &TaxonomyConfig {
        &self.config
    }

    pub fn subscribe(&self) -> watch::Receiver<TaxonomyState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> TaxonomyState {
        self.state.borrow().clone()
    }

    pub fn items(&self) -> Vec<TaxonomyItem> {
        self.state.borrow().items.items().to_vec()
    }

    pub fn visible_items(&self) -> Vec<TaxonomyItem> {
        self.state.borrow().visible()
    }

    pub fn get(&self, id: i64) -> Option<TaxonomyItem> {
        self.state.borrow().items.get(id).cloned()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    pub fn error(&self) -> Option<String> {
        self.state.borrow().error.clone()
    }

    pub fn set_filter(&self, filter: StatusFilter) {
        self.state.send_if_modified(|s| {
            let changed = s.filter != filter;
            s.filter = filter;
            changed
        });
    }

    pub(super) fn remote_patch(
        &self,
        id: i64,
        patch: TaxonomyPatch,
    ) -> impl Future<Output = TransportResult<Option<TaxonomyItem>>> + Send + '_ {
        self.api.patch(id, patch)
    }

    fn lock_in_flight(&self) -> MutexGuard<'_, Option<OutcomeSlot>> {
        match self.load_in_flight.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn claim_load(&self) -> LoadRole {
        let mut in_flight = self.lock_in_flight();
        if let Some(slot) = in_flight.as_ref() {
            return LoadRole::Follower(slot.clone());
        }

        let (tx, rx) = watch::channel(None);
        *in_flight = Some(rx);
        LoadRole::Leader(tx)
    }

    /// Reload the whole collection.
    ///
    /// Calls made while a reload is running share it: one transport call, one
    /// outcome for everybody.
    pub async fn load_all(&self) -> LoadOutcome {
        let tx = match self.claim_load() {
            LoadRole::Leader(tx) => tx,
            LoadRole::Follower(mut slot) => {
                log_debug!("{} reload already in flight, joining it", self.config.kind);
                return match slot.wait_for(Option::is_some).await {
                    Ok(outcome) => outcome.clone().unwrap_or(LoadOutcome::Cancelled),
                    Err(_) => LoadOutcome::Cancelled,
                };
            }
        };

        let guard = LoadGuard { store: self };
        self.state.send_modify(|s| {
            s.loading = true;
            s.error = None;
        });

        let outcome = match self.api.list(StatusFilter::All).await {
            Ok(items) => {
                let mut count = 0;
                self.state.send_modify(|s| {
                    s.items.replace_all(items);
                    count = s.items.len();
                });
                log_info!("loaded {} {}", count, self.config.kind);
                LoadOutcome::Loaded { count }
            }
            Err(err) => {
                log_error!("failed to load {}: {err:?}", self.config.kind);
                let message =
                    err.message_or(&format!("Failed to load {}", self.config.plural().to_lowercase()));
                self.state.send_modify(|s| {
                    s.items.clear();
                    s.error = Some(message.clone());
                });
                LoadOutcome::Failed { message }
            }
        };

        drop(guard);
        tx.send_replace(Some(outcome.clone()));
        outcome
    }

    /// Apply `patch` locally right away, then run `remote`. On failure the
    /// entry is put back exactly as it was before the patch.
    pub async fn optimistic_patch<Fut, T>(
        &self,
        id: i64,
        patch: TaxonomyPatch,
        remote: Fut,
        opts: PatchOptions,
    ) -> PatchOutcome
    where
        Fut: Future<Output = TransportResult<T>>,
    {
        let mut before = None;
        self.state.send_if_modified(|s| match s.items.get(id).cloned() {
            Some(snapshot) => {
                s.items.patch_by_id(id, &patch, opts.resort);
                before = Some(snapshot);
                true
            }
            None => false,
        });

        let Some(before) = before else {
            log_debug!("{} patch skipped: id {} not loaded", self.config.kind, id);
            return PatchOutcome::Skipped;
        };

        match remote.await {
            Ok(_) => {
                if let Some(msg) = opts.success_msg {
                    self.toasts.success(msg);
                }
                PatchOutcome::Committed
            }
            Err(err) => {
                log_error!("{} patch of id {} failed, rolling back: {err:?}", self.config.kind, id);
                self.state.send_modify(|s| {
                    if !s.items.restore(id, before) {
                        log_warn!("{} id {} vanished before rollback", self.config.kind, id);
                    }
                });
                self.toasts
                    .danger(format!("Error: {}", err.message_or("Request failed")));
                PatchOutcome::RolledBack(err)
            }
        }
    }

    /// Validate and optimistically apply a field patch through the transport.
    pub async fn patch_field(
        &self,
        id: i64,
        patch: TaxonomyPatch,
    ) -> Result<PatchOutcome, ValidationError> {
        let patch = match self.validated_patch(patch) {
            Ok(patch) => patch,
            Err(err) => {
                self.toasts.warning(err.to_string());
                return Err(err);
            }
        };

        if patch.is_empty() {
            return Ok(PatchOutcome::Skipped);
        }

        let success_msg = if patch.name.is_some() {
            "Name updated"
        } else if patch.description.is_some() {
            "Description updated"
        } else {
            "Status updated"
        };

        let opts = PatchOptions {
            resort: patch.touches_sort_key(),
            success_msg: Some(success_msg.to_string()),
        };
        let remote = self.remote_patch(id, patch.clone());
        Ok(self.optimistic_patch(id, patch, remote, opts).await)
    }

    fn validated_patch(&self, mut patch: TaxonomyPatch) -> Result<TaxonomyPatch, ValidationError> {
        let rules = &self.config.rules;
        if let Some(name) = patch.name.take() {
            patch.name = Some(rules.check_name(self.config.singular(), &name)?);
        }
        if let Some(description) = patch.description.take() {
            patch.description = Some(rules.check_description(&description)?);
        }
        Ok(patch)
    }

    pub async fn toggle_active(&self, id: i64) -> PatchOutcome {
        let Some(current) = self.get(id) else {
            return PatchOutcome::Skipped;
        };

        let next = !current.is_active(self.config.legacy_active_default);
        let patch = TaxonomyPatch::active(next);
        let remote = self.remote_patch(id, patch.clone());
        let opts = PatchOptions {
            resort: false,
            success_msg: Some("Status updated".to_string()),
        };
        self.optimistic_patch(id, patch, remote, opts).await
    }

    /// Create a new active entry.
    ///
    /// When the server echoes the record it is merged in place; otherwise the
    /// collection is reloaded.
    pub async fn create(&self, name: &str, description: &str) -> CoreResult<Option<TaxonomyItem>> {
        let rules = &self.config.rules;
        let checked = rules
            .check_name(self.config.singular(), name)
            .and_then(|name| Ok((name, rules.check_description(description)?)));
        let (name, description) = match checked {
            Ok(values) => values,
            Err(err) => {
                self.toasts.warning(err.to_string());
                return Err(err.into());
            }
        };

        let dto = TaxonomyCreate {
            name,
            description: (!description.is_empty()).then_some(description),
            active: true,
        };

        match self.api.create(dto).await {
            Ok(created) => {
                self.toasts.success(format!("{} created", self.config.singular()));
                match created {
                    Some(item) => {
                        self.state.send_modify(|s| {
                            s.items.upsert(item.clone());
                        });
                        Ok(Some(item))
                    }
                    None => {
                        self.load_all().await;
                        Ok(None)
                    }
                }
            }
            Err(err) => {
                log_error!("failed to create {}: {err:?}", self.config.singular());
                let fallback = format!("Failed to create {}", self.config.singular().to_lowercase());
                self.toasts
                    .danger(format!("Error: {}", err.message_or(&fallback)));
                Err(CoreError::Transport(err))
            }
        }
    }
}
