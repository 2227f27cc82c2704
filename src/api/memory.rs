//! In-process transports. Tests drive the stores with these; embedders can use
//! them for offline demos.

use std::sync::{
    atomic::{AtomicI64, AtomicUsize, Ordering},
    Mutex,
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::watch;

use super::{ReportApi, TaxonomyApi, TransportResult, WorkApi};
use crate::{
    error::TransportError,
    models::{
        StatusFilter, TaxonomyCreate, TaxonomyItem, TaxonomyPatch, UtcStamp, WorkDay, WorkSegment,
        WorkSegmentPatch, WorkSegmentStart, WorkSegmentStop, WorkSessionPatch,
    },
};

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Lets a test hold a call open until it decides to release it.
struct Gate {
    open: watch::Sender<bool>,
}

impl Gate {
    fn new() -> Self {
        let (open, _) = watch::channel(true);
        Self { open }
    }

    async fn pass(&self) {
        let mut rx = self.open.subscribe();
        let _ = rx.wait_for(|open| *open).await;
    }
}

pub struct MemoryTaxonomyApi {
    items: Mutex<Vec<TaxonomyItem>>,
    next_id: AtomicI64,
    list_calls: AtomicUsize,
    create_calls: AtomicUsize,
    patch_calls: AtomicUsize,
    fail_list: Mutex<Option<TransportError>>,
    fail_create: Mutex<Option<TransportError>>,
    fail_patch: Mutex<Option<TransportError>>,
    return_created: Mutex<bool>,
    list_gate: Gate,
    patch_gate: Gate,
}

impl MemoryTaxonomyApi {
    pub fn new(items: Vec<TaxonomyItem>) -> Self {
        let next_id = items.iter().filter_map(|i| i.id).max().unwrap_or(0) + 1;
        Self {
            items: Mutex::new(items),
            next_id: AtomicI64::new(next_id),
            list_calls: AtomicUsize::new(0),
            create_calls: AtomicUsize::new(0),
            patch_calls: AtomicUsize::new(0),
            fail_list: Mutex::new(None),
            fail_create: Mutex::new(None),
            fail_patch: Mutex::new(None),
            return_created: Mutex::new(true),
            list_gate: Gate::new(),
            patch_gate: Gate::new(),
        }
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn patch_calls(&self) -> usize {
        self.patch_calls.load(Ordering::SeqCst)
    }

    pub fn items(&self) -> Vec<TaxonomyItem> {
        lock(&self.items).clone()
    }

    pub fn fail_next_list(&self, err: TransportError) {
        *lock(&self.fail_list) = Some(err);
    }

    pub fn fail_next_create(&self, err: TransportError) {
        *lock(&self.fail_create) = Some(err);
    }

    pub fn fail_next_patch(&self, err: TransportError) {
        *lock(&self.fail_patch) = Some(err);
    }

    /// Answer creates with an empty body, forcing callers to reload.
    pub fn set_return_created(&self, enabled: bool) {
        *lock(&self.return_created) = enabled;
    }

    pub fn hold_list(&self) {
        self.list_gate.open.send_replace(false);
    }

    pub fn release_list(&self) {
        self.list_gate.open.send_replace(true);
    }

    pub fn hold_patch(&self) {
        self.patch_gate.open.send_replace(false);
    }

    pub fn release_patch(&self) {
        self.patch_gate.open.send_replace(true);
    }
}

#[async_trait]
impl TaxonomyApi for MemoryTaxonomyApi {
    async fn list(&self, filter: StatusFilter) -> TransportResult<Vec<TaxonomyItem>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.list_gate.pass().await;

        if let Some(err) = lock(&self.fail_list).take() {
            return Err(err);
        }

        Ok(lock(&self.items)
            .iter()
            .filter(|item| filter.admits(item.is_active(true)))
            .cloned()
            .collect())
    }

    async fn create(&self, dto: TaxonomyCreate) -> TransportResult<Option<TaxonomyItem>> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(err) = lock(&self.fail_create).take() {
            return Err(err);
        }

        let now = UtcStamp::from(Utc::now());
        let item = TaxonomyItem {
            id: Some(self.next_id.fetch_add(1, Ordering::SeqCst)),
            name: dto.name,
            description: dto.description,
            active: Some(dto.active),
            created_at: Some(now.clone()),
            updated_at: Some(now),
        };
        lock(&self.items).push(item.clone());

        if *lock(&self.return_created) {
            Ok(Some(item))
        } else {
            Ok(None)
        }
    }

    async fn patch(&self, id: i64, patch: TaxonomyPatch) -> TransportResult<Option<TaxonomyItem>> {
        self.patch_calls.fetch_add(1, Ordering::SeqCst);
        self.patch_gate.pass().await;

        if let Some(err) = lock(&self.fail_patch).take() {
            return Err(err);
        }

        let mut items = lock(&self.items);
        let item = items
            .iter_mut()
            .find(|item| item.id == Some(id))
            .ok_or_else(|| TransportError::new(format!("No item with id {id}"), 404))?;

        if let Some(name) = patch.name {
            item.name = name;
        }
        if let Some(description) = patch.description {
            item.description = Some(description);
        }
        if let Some(active) = patch.active {
            item.active = Some(active);
        }
        item.updated_at = Some(UtcStamp::from(Utc::now()));

        Ok(Some(item.clone()))
    }
}

pub struct MemoryReportApi {
    days: Mutex<Vec<WorkDay>>,
    calls: AtomicUsize,
    fail_next: Mutex<Option<TransportError>>,
}

impl MemoryReportApi {
    pub fn new(days: Vec<WorkDay>) -> Self {
        Self {
            days: Mutex::new(days),
            calls: AtomicUsize::new(0),
            fail_next: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn set_days(&self, days: Vec<WorkDay>) {
        *lock(&self.days) = days;
    }

    pub fn fail_next(&self, err: TransportError) {
        *lock(&self.fail_next) = Some(err);
    }
}

#[async_trait]
impl ReportApi for MemoryReportApi {
    async fn days(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> TransportResult<Vec<WorkDay>> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(err) = lock(&self.fail_next).take() {
            return Err(err);
        }

        let (first, last) = (from.date_naive(), to.date_naive());
        Ok(lock(&self.days)
            .iter()
            .filter(|day| day.day_utc >= first && day.day_utc <= last)
            .cloned()
            .collect())
    }
}

/// Every call a `MemoryWorkApi` received, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkCall {
    StartSession,
    StopSession,
    CurrentSegment,
    StartSegment(WorkSegmentStart),
    StopSegment(WorkSegmentStop),
    PatchSession(i64, WorkSessionPatch),
    DeleteSession(i64),
    PatchSegment(i64, WorkSegmentPatch),
    DeleteSegment(i64),
}

#[derive(Default)]
pub struct MemoryWorkApi {
    calls: Mutex<Vec<WorkCall>>,
    fail_next: Mutex<Option<TransportError>>,
    current_segment: Mutex<Option<WorkSegment>>,
}

impl MemoryWorkApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<WorkCall> {
        lock(&self.calls).clone()
    }

    pub fn fail_next(&self, err: TransportError) {
        *lock(&self.fail_next) = Some(err);
    }

    /// What `current_segment` answers from now on.
    pub fn set_current_segment(&self, segment: Option<WorkSegment>) {
        *lock(&self.current_segment) = segment;
    }

    fn record(&self, call: WorkCall) -> TransportResult<()> {
        lock(&self.calls).push(call);
        match lock(&self.fail_next).take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl WorkApi for MemoryWorkApi {
    async fn start_session(&self) -> TransportResult<()> {
        self.record(WorkCall::StartSession)
    }

    async fn stop_session(&self) -> TransportResult<()> {
        self.record(WorkCall::StopSession)
    }

    async fn current_segment(&self) -> TransportResult<Option<WorkSegment>> {
        self.record(WorkCall::CurrentSegment)?;
        Ok(lock(&self.current_segment).clone())
    }

    async fn start_segment(&self, dto: WorkSegmentStart) -> TransportResult<()> {
        self.record(WorkCall::StartSegment(dto))
    }

    async fn stop_segment(&self, dto: WorkSegmentStop) -> TransportResult<()> {
        self.record(WorkCall::StopSegment(dto))
    }

    async fn patch_session(&self, id: i64, patch: WorkSessionPatch) -> TransportResult<()> {
        self.record(WorkCall::PatchSession(id, patch))
    }

    async fn delete_session(&self, id: i64) -> TransportResult<()> {
        self.record(WorkCall::DeleteSession(id))
    }

    async fn patch_segment(&self, id: i64, patch: WorkSegmentPatch) -> TransportResult<()> {
        self.record(WorkCall::PatchSegment(id, patch))
    }

    async fn delete_segment(&self, id: i64) -> TransportResult<()> {
        self.record(WorkCall::DeleteSegment(id))
    }
}
