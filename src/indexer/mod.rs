//! Single-pass in-memory (SPIMI) indexing.
//!
//! Bounded-memory indexing in three stages: the [`builder::SegmentBuilder`]
//! accumulates one in-memory segment at a time and rotates it out when the
//! flush strategy trips; flushed segments land in storage; after ingestion
//! ends, the [`merger::SegmentMerger`] combines all of them into one globally
//! sorted index. The [`spimi::SinglePassIndexer`] drives the whole pipeline,
//! fanning ingestion out over parallel lanes.

pub mod builder;
pub mod merger;
pub mod spimi;

pub use builder::{SegmentBuilder, SegmentIdAllocator};
pub use merger::{MergeOutcome, SegmentMerger};
pub use spimi::{IndexingStats, SinglePassIndexer};
