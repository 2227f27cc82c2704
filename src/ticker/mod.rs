pub mod clock;
pub mod live;
pub mod visibility;

pub use clock::{Clock, ManualClock, SystemClock};
pub use live::{LiveTicker, TickerOptions};
pub use visibility::Visibility;
