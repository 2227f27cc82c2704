pub mod stamp;
pub mod taxonomy;
pub mod work;

pub use stamp::UtcStamp;
pub use taxonomy::{StatusFilter, TaxonomyCreate, TaxonomyItem, TaxonomyKind, TaxonomyPatch};
pub use work::{
    Interval, WorkDay, WorkSegment, WorkSegmentPatch, WorkSegmentStart, WorkSegmentStop, WorkSession,
    WorkSessionPatch,
};
