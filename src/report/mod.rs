//! Report page flows: loading a date range, editing what it shows, and the
//! persisted range and segment toggle.

pub mod loader;
pub mod mutations;
pub mod page;

pub use loader::{ReportLoader, ReportState, LOAD_FAILED_MESSAGE};
pub use mutations::{MutationOutcome, ReportMutations, TimeField};
pub use page::{ReportPage, RANGE_DIALOG_TITLE};
