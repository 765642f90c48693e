//! Boolean query evaluation over a loaded index segment.

pub mod engine;

pub use engine::{BooleanSearchEngine, find_latest_merged};
