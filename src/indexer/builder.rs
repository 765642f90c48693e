//! Bounded-memory segment builder.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::config::FlushStrategy;
use crate::segment::IndexSegment;

/// Hands out sequential segment ids, starting at 1.
///
/// Shared between the builders of parallel ingestion lanes so that every
/// segment id is unique within one build run.
#[derive(Debug, Clone)]
pub struct SegmentIdAllocator {
    next: Arc<AtomicU64>,
}

impl SegmentIdAllocator {
    /// Create an allocator whose first id is 1.
    pub fn new() -> Self {
        SegmentIdAllocator {
            next: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Take the next sequential id.
    pub fn next_id(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }
}

impl Default for SegmentIdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds index segments from a stream of (document id, tokens) pairs.
///
/// The builder holds exactly one open segment. After every added document it
/// consults the flush strategy; when the threshold is reached the completed
/// segment is returned to the caller and a fresh one is started. The caller
/// owns writing the returned segment; a failed write therefore propagates
/// instead of being swallowed inside the builder.
///
/// Document ids are supplied by the caller and must be globally monotonic
/// across the build run. They are never reset at segment boundaries, so one
/// segment may hold arbitrarily large, non-contiguous id ranges.
#[derive(Debug)]
pub struct SegmentBuilder {
    strategy: FlushStrategy,
    ids: SegmentIdAllocator,
    current: IndexSegment,
}

impl SegmentBuilder {
    /// Create a builder with its own id sequence starting at 1.
    pub fn new(strategy: FlushStrategy) -> Self {
        Self::with_allocator(strategy, SegmentIdAllocator::new())
    }

    /// Create a builder drawing segment ids from a shared allocator.
    pub fn with_allocator(strategy: FlushStrategy, ids: SegmentIdAllocator) -> Self {
        let current = IndexSegment::new(ids.next_id());
        SegmentBuilder {
            strategy,
            ids,
            current,
        }
    }

    /// Add one tokenized document to the open segment.
    ///
    /// Each token is lowercase-normalized and appended to its term's posting
    /// list; duplicate tokens within the document collapse to one posting.
    /// The document count grows by one per call, even for an empty token
    /// sequence, and an empty document can itself trip a posting-count
    /// threshold.
    ///
    /// Returns the completed segment when the flush strategy tripped, in
    /// which case the builder has already moved on to a fresh segment.
    #[must_use = "a returned segment must be written out or its documents are lost"]
    pub fn add_document<S: AsRef<str>>(&mut self, doc_id: u64, tokens: &[S]) -> Option<IndexSegment> {
        for token in tokens {
            let term = token.as_ref().to_lowercase();
            self.current.append_posting(&term, doc_id);
        }

        self.current.record_document();

        if self.strategy.should_flush(&self.current) {
            Some(self.rotate())
        } else {
            None
        }
    }

    /// Finalize at end of input, returning the last partial segment.
    ///
    /// Must be called once ingestion ends: the final segment almost never
    /// reaches its threshold on its own, and skipping this call silently
    /// drops every document in it. Returns `None` when the open segment is
    /// empty.
    #[must_use = "the final partial segment must be written out or its documents are lost"]
    pub fn finish(&mut self) -> Option<IndexSegment> {
        if self.current.is_empty() {
            return None;
        }

        Some(self.rotate())
    }

    /// Number of documents in the open (not yet flushed) segment.
    pub fn pending_docs(&self) -> u64 {
        self.current.doc_count()
    }

    fn rotate(&mut self) -> IndexSegment {
        let next = IndexSegment::new(self.ids.next_id());
        std::mem::replace(&mut self.current, next)
    }
}
