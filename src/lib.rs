//! # Pilum
//!
//! A single-pass in-memory (SPIMI) indexer and boolean search library.
//!
//! ## Features
//!
//! - Bounded-memory indexing: segments flush at a byte-size or document-count
//!   threshold and never require the whole corpus in memory
//! - Parallel ingestion lanes with a single sequential merge phase
//! - Structural k-way merge of flushed segments into one sorted index
//! - Boolean AND queries with smallest-list-first intersection
//! - Pluggable storage, serializer, and tokenizer capabilities

pub mod analysis;
pub mod config;
pub mod corpus;
pub mod error;
pub mod indexer;
pub mod search;
pub mod segment;
pub mod serializer;
pub mod storage;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
