pub mod actions;
pub mod config;
pub mod store;

pub use actions::EditOutcome;
pub use config::{TaxonomyConfig, TaxonomyRules};
pub use store::{LoadOutcome, PatchOptions, PatchOutcome, TaxonomyState, TaxonomyStore};
