//! Transport seams. Implementations speak JSON over HTTP to the worktime
//! backend; the core only sees these traits.

pub mod memory;
pub mod response;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{
    error::TransportError,
    models::{
        StatusFilter, TaxonomyCreate, TaxonomyItem, TaxonomyPatch, WorkDay, WorkSegment,
        WorkSegmentPatch, WorkSegmentStart, WorkSegmentStop, WorkSessionPatch,
    },
};

pub use memory::{MemoryReportApi, MemoryTaxonomyApi, MemoryWorkApi};
pub use response::{decode, extract_message, RawResponse};

pub type TransportResult<T> = Result<T, TransportError>;

/// CRUD for a taxonomy-like collection (categories, activities).
#[async_trait]
pub trait TaxonomyApi: Send + Sync + 'static {
    async fn list(&self, filter: StatusFilter) -> TransportResult<Vec<TaxonomyItem>>;

    /// `None` when the server answers without a body.
    async fn create(&self, dto: TaxonomyCreate) -> TransportResult<Option<TaxonomyItem>>;

    async fn patch(&self, id: i64, patch: TaxonomyPatch) -> TransportResult<Option<TaxonomyItem>>;
}

#[async_trait]
pub trait ReportApi: Send + Sync + 'static {
    async fn days(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> TransportResult<Vec<WorkDay>>;
}

/// Work session and segment lifecycle plus report-page edits.
#[async_trait]
pub trait WorkApi: Send + Sync + 'static {
    async fn start_session(&self) -> TransportResult<()>;

    async fn stop_session(&self) -> TransportResult<()>;

    /// The running segment, if any.
    async fn current_segment(&self) -> TransportResult<Option<WorkSegment>>;

    async fn start_segment(&self, dto: WorkSegmentStart) -> TransportResult<()>;

    async fn stop_segment(&self, dto: WorkSegmentStop) -> TransportResult<()>;

    async fn patch_session(&self, id: i64, patch: WorkSessionPatch) -> TransportResult<()>;

    async fn delete_session(&self, id: i64) -> TransportResult<()>;

    async fn patch_segment(&self, id: i64, patch: WorkSegmentPatch) -> TransportResult<()>;

    async fn delete_segment(&self, id: i64) -> TransportResult<()>;
}
