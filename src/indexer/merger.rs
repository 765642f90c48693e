//! Structural k-way merge of flushed segments.
//!
//! Merging decodes every input segment and walks their sorted term sequences
//! with a k-way heap, unioning the posting lists of any term that appears in
//! more than one input. Concatenating the serialized bytes of segment files
//! cannot recombine overlapping terms and does not produce a valid index.
//!
//! Input segments are retired (deleted) only after the merged output has been
//! durably written, so an interruption anywhere before that point leaves all
//! inputs in place and the merge repeatable.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::Arc;

use log::{info, warn};

use crate::config::IndexerConfig;
use crate::error::{PilumError, Result};
use crate::segment::{IndexSegment, PostingList};
use crate::serializer::SegmentSerializer;
use crate::storage::Storage;

/// Entry in the k-way merge heap: the current term of one input segment.
///
/// Ordering is reversed on (term, source) so that `BinaryHeap`, a max-heap,
/// pops the lexicographically smallest term first.
struct HeapEntry<'a> {
    term: &'a str,
    postings: &'a PostingList,
    source: usize,
}

impl PartialEq for HeapEntry<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.term == other.term && self.source == other.source
    }
}

impl Eq for HeapEntry<'_> {}

impl PartialOrd for HeapEntry<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .term
            .cmp(self.term)
            .then_with(|| other.source.cmp(&self.source))
    }
}

/// Summary of one completed on-disk merge.
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    /// Id of the merged output (sequential across merge runs).
    pub merge_id: u64,

    /// File name the merged segment was written under.
    pub file_name: String,

    /// Number of input segments consumed.
    pub inputs_merged: usize,

    /// Total documents in the merged index.
    pub doc_count: u64,

    /// Distinct terms in the merged index.
    pub term_count: u64,
}

/// Merges flushed segments on disk into one consolidated index.
#[derive(Debug)]
pub struct SegmentMerger {
    storage: Arc<dyn Storage>,
    serializer: Arc<dyn SegmentSerializer>,
    segment_prefix: String,
    merged_prefix: String,
}

impl SegmentMerger {
    /// Create a merger over the given storage.
    pub fn new(
        storage: Arc<dyn Storage>,
        serializer: Arc<dyn SegmentSerializer>,
        config: &IndexerConfig,
    ) -> Self {
        SegmentMerger {
            storage,
            serializer,
            segment_prefix: config.segment_prefix.clone(),
            merged_prefix: config.merged_prefix.clone(),
        }
    }

    /// Merge in-memory segments into one, preserving the posting invariants.
    ///
    /// For every term in any input the output holds the sorted, deduplicated
    /// union of that term's postings; term keys stay in lexicographic order.
    /// The document count is the sum over the inputs. Merging a single
    /// segment reproduces it up to metadata.
    pub fn merge_segments(inputs: &[IndexSegment], merge_id: u64) -> IndexSegment {
        let mut merged = IndexSegment::new(merge_id);

        let mut cursors: Vec<_> = inputs.iter().map(|s| s.iter()).collect();
        let mut heap = BinaryHeap::new();

        for (source, cursor) in cursors.iter_mut().enumerate() {
            if let Some((term, postings)) = cursor.next() {
                heap.push(HeapEntry {
                    term,
                    postings,
                    source,
                });
            }
        }

        while let Some(entry) = heap.pop() {
            let mut union: Vec<u64> = entry.postings.as_slice().to_vec();
            let term = entry.term;
            Self::advance(&mut cursors, &mut heap, entry.source);

            // Pull every other input currently sitting on the same term.
            while heap.peek().is_some_and(|e| e.term == term) {
                let dup = heap.pop().expect("peeked entry exists");
                union.extend_from_slice(dup.postings.as_slice());
                Self::advance(&mut cursors, &mut heap, dup.source);
            }

            union.sort_unstable();
            union.dedup();
            merged.insert_posting_list(term.to_string(), PostingList::from_sorted(union));
        }

        merged.set_doc_count(inputs.iter().map(|s| s.doc_count()).sum());
        merged
    }

    /// Discover, merge, and retire all flushed segment files.
    ///
    /// Reads every file under the segment prefix, merges them, writes the
    /// output under the merged prefix with the next sequential merge id, and
    /// deletes the inputs. Deletion happens strictly after the output write
    /// has been reported durable; an abort mid-merge deletes nothing.
    ///
    /// An unreadable input segment fails the whole merge, since silently
    /// dropping one would corrupt the index.
    pub fn merge_on_disk(&self) -> Result<MergeOutcome> {
        self.merge_on_disk_inner(false)
    }

    /// Like [`merge_on_disk`](Self::merge_on_disk), but logs and skips input
    /// segments that cannot be read instead of failing. The skipped files are
    /// left in place for inspection.
    pub fn merge_on_disk_lossy(&self) -> Result<MergeOutcome> {
        self.merge_on_disk_inner(true)
    }

    fn merge_on_disk_inner(&self, lossy: bool) -> Result<MergeOutcome> {
        let names = self.discover_segment_files()?;
        if names.is_empty() {
            return Err(PilumError::index("no segments to merge"));
        }

        let mut inputs = Vec::with_capacity(names.len());
        let mut readable_names = Vec::with_capacity(names.len());

        for name in &names {
            match self.serializer.read_segment(self.storage.as_ref(), name) {
                Ok(segment) => {
                    inputs.push(segment);
                    readable_names.push(name.clone());
                }
                Err(e) if lossy => {
                    warn!("skipping unreadable segment '{name}': {e}");
                }
                Err(e) => return Err(e),
            }
        }

        if inputs.is_empty() {
            return Err(PilumError::index("no readable segments to merge"));
        }

        let merge_id = self.next_merge_id()?;
        let merged = Self::merge_segments(&inputs, merge_id);
        let file_name = format!("{}{}", self.merged_prefix, merge_id);

        let outcome = MergeOutcome {
            merge_id,
            file_name: file_name.clone(),
            inputs_merged: inputs.len(),
            doc_count: merged.doc_count(),
            term_count: merged.vocabulary_size(),
        };

        // Durable write first; only then retire the inputs.
        self.serializer
            .write_segment(self.storage.as_ref(), &file_name, &merged)?;

        for name in &readable_names {
            self.storage.delete_file(name)?;
        }

        info!(
            "merged {} segments into '{}' ({} docs, {} terms)",
            outcome.inputs_merged, outcome.file_name, outcome.doc_count, outcome.term_count
        );

        Ok(outcome)
    }

    /// All flushed segment files, ordered by segment id.
    fn discover_segment_files(&self) -> Result<Vec<String>> {
        let mut found: Vec<(u64, String)> = Vec::new();

        for name in self.storage.list_files()? {
            if let Some(suffix) = name.strip_prefix(&self.segment_prefix) {
                if let Ok(id) = suffix.parse::<u64>() {
                    found.push((id, name));
                }
            }
        }

        found.sort_by_key(|(id, _)| *id);
        Ok(found.into_iter().map(|(_, name)| name).collect())
    }

    /// Next merge id: one past the highest existing merged output, or 1.
    fn next_merge_id(&self) -> Result<u64> {
        let mut highest = 0;

        for name in self.storage.list_files()? {
            if let Some(suffix) = name.strip_prefix(&self.merged_prefix) {
                if let Ok(id) = suffix.parse::<u64>() {
                    highest = highest.max(id);
                }
            }
        }

        Ok(highest + 1)
    }

    fn advance<'a>(
        cursors: &mut [impl Iterator<Item = (&'a String, &'a PostingList)>],
        heap: &mut BinaryHeap<HeapEntry<'a>>,
        source: usize,
    ) {
        if let Some((term, postings)) = cursors[source].next() {
            heap.push(HeapEntry {
                term,
                postings,
                source,
            });
        }
    }
}
