//! The start page: workday and segment controls.

pub mod page;
pub mod state;

pub use page::{ActionOutcome, DashboardApis, DashboardPage, LOAD_FAILED_MESSAGE};
pub use state::{DashboardState, SegmentForm, DEFAULT_DAYS_COUNT};
