pub mod sorted;

pub use sorted::{collate, Entry, EntryDefaults, SortedCollection};
