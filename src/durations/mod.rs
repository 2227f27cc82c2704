//! Duration math for work reports.
//!
//! Everything here is a pure function of the report data and a caller-supplied
//! `now`; live displays re-run it whenever the ticker emits.

pub mod aggregate;
pub mod view;

pub use aggregate::{
    aggregate_day, aggregate_days, aggregate_session, elapsed_seconds, sum_segments, unallocated,
    DayAggregate, SessionAggregate, SessionTotals,
};
pub use view::{build_day_views, DayView, GroupParity, SegmentRow, SessionRow, TotalsLabels};
