pub mod day;
pub mod entry;

pub use day::*;
pub use entry::*;

/// Group key used when a class header row is itself a dash sentinel.
pub const GENERAL_GROUP: &str = "general";
