//! In-memory index segment and posting list types.
//!
//! A segment is one bounded unit of the inverted index: a sorted mapping from
//! term to posting list, plus bookkeeping metadata. Segments are built in
//! memory, flushed to storage once a threshold is reached, and later combined
//! by the merger. Term keys are kept in lexicographic order because the merge
//! algorithm walks the sorted key sequences of its inputs; the ordering is a
//! structural requirement, not a presentation choice.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Estimated serialized bytes per posting entry (one u64 document id).
const POSTING_ENTRY_BYTES: u64 = 8;

/// A sorted, deduplicated list of document ids containing one term.
///
/// Invariant: strictly increasing, no duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostingList {
    postings: Vec<u64>,
}

impl PostingList {
    /// Create an empty posting list.
    pub fn new() -> Self {
        PostingList {
            postings: Vec::new(),
        }
    }

    /// Append a document id, skipping it when it equals the last entry.
    ///
    /// Duplicate tokens within one document collapse to a single posting this
    /// way. Returns `true` if the id was actually appended.
    ///
    /// Callers must supply ids in ascending order; within a build run this
    /// holds because ingestion order equals document-id order.
    pub fn push_doc(&mut self, doc_id: u64) -> bool {
        match self.postings.last() {
            Some(&last) if last == doc_id => false,
            Some(&last) => {
                debug_assert!(last < doc_id, "document ids must arrive in order");
                self.postings.push(doc_id);
                true
            }
            None => {
                self.postings.push(doc_id);
                true
            }
        }
    }

    /// The document ids in this list, sorted ascending.
    pub fn as_slice(&self) -> &[u64] {
        &self.postings
    }

    /// Number of postings in this list.
    pub fn len(&self) -> usize {
        self.postings.len()
    }

    /// Whether this list is empty.
    pub fn is_empty(&self) -> bool {
        self.postings.is_empty()
    }

    /// Build a posting list from an already sorted, deduplicated vector.
    pub(crate) fn from_sorted(postings: Vec<u64>) -> Self {
        debug_assert!(postings.windows(2).all(|w| w[0] < w[1]));
        PostingList { postings }
    }
}

/// One bounded, sorted unit of an inverted index.
///
/// Created empty by the segment builder, mutated only while open, immutable
/// once flushed. The merger consumes flushed segments exactly once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexSegment {
    /// Segment identifier, unique within a build run, assigned from 1.
    segment_id: u64,

    /// Sorted term -> postings mapping. Terms are stored lowercase.
    index: BTreeMap<String, PostingList>,

    /// Number of documents ingested into this segment.
    doc_count: u64,

    /// Incrementally maintained estimate of the serialized size.
    size_bytes: u64,
}

impl IndexSegment {
    /// Create a new, empty segment with the given id.
    pub fn new(segment_id: u64) -> Self {
        IndexSegment {
            segment_id,
            index: BTreeMap::new(),
            doc_count: 0,
            size_bytes: 0,
        }
    }

    /// The segment identifier.
    pub fn segment_id(&self) -> u64 {
        self.segment_id
    }

    /// Number of documents ingested into this segment.
    pub fn doc_count(&self) -> u64 {
        self.doc_count
    }

    /// Estimated serialized size in bytes.
    ///
    /// Maintained incrementally as postings are appended, so consulting it
    /// after every document is O(1). Re-serializing the whole segment to
    /// measure it would be unacceptably slow on large corpora.
    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    /// Number of distinct terms in this segment's lexicon.
    pub fn vocabulary_size(&self) -> u64 {
        self.index.len() as u64
    }

    /// Whether no document has been ingested into this segment.
    pub fn is_empty(&self) -> bool {
        self.doc_count == 0
    }

    /// Append `doc_id` to the posting list for `term`, creating the list if
    /// the term is new. The term must already be lowercase-normalized.
    pub fn append_posting(&mut self, term: &str, doc_id: u64) {
        match self.index.get_mut(term) {
            Some(postings) => {
                if postings.push_doc(doc_id) {
                    self.size_bytes += POSTING_ENTRY_BYTES;
                }
            }
            None => {
                let mut postings = PostingList::new();
                postings.push_doc(doc_id);
                self.size_bytes += term.len() as u64 + POSTING_ENTRY_BYTES;
                self.index.insert(term.to_string(), postings);
            }
        }
    }

    /// Record that one document was ingested (called once per document, not
    /// once per token; a document with zero tokens still counts).
    pub fn record_document(&mut self) {
        self.doc_count += 1;
    }

    /// Look up the posting list for a term.
    pub fn get(&self, term: &str) -> Option<&PostingList> {
        self.index.get(term)
    }

    /// Iterate terms in lexicographic order.
    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.index.keys().map(|k| k.as_str())
    }

    /// Iterate (term, postings) pairs in lexicographic term order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &PostingList)> {
        self.index.iter()
    }

    /// Insert a fully built posting list under `term`, updating the size
    /// estimate. Used by the merger when assembling its output.
    pub(crate) fn insert_posting_list(&mut self, term: String, postings: PostingList) {
        self.size_bytes += term.len() as u64 + postings.len() as u64 * POSTING_ENTRY_BYTES;
        self.index.insert(term, postings);
    }

    /// Overwrite the document count. Used by the merger, which sums the
    /// counts of its inputs.
    pub(crate) fn set_doc_count(&mut self, doc_count: u64) {
        self.doc_count = doc_count;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_posting_list_dedup() {
        let mut list = PostingList::new();
        assert!(list.push_doc(1));
        assert!(!list.push_doc(1));
        assert!(list.push_doc(2));
        assert!(list.push_doc(7));
        assert!(!list.push_doc(7));

        assert_eq!(list.as_slice(), &[1, 2, 7]);
    }

    #[test]
    fn test_posting_list_strictly_increasing() {
        let mut list = PostingList::new();
        for doc_id in [3, 3, 4, 4, 4, 9] {
            list.push_doc(doc_id);
        }

        let postings = list.as_slice();
        assert!(postings.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_segment_append_posting() {
        let mut segment = IndexSegment::new(1);
        segment.append_posting("red", 1);
        segment.append_posting("blue", 1);
        segment.record_document();
        segment.append_posting("red", 2);
        segment.record_document();

        assert_eq!(segment.segment_id(), 1);
        assert_eq!(segment.doc_count(), 2);
        assert_eq!(segment.vocabulary_size(), 2);
        assert_eq!(segment.get("red").unwrap().as_slice(), &[1, 2]);
        assert_eq!(segment.get("blue").unwrap().as_slice(), &[1]);
        assert!(segment.get("green").is_none());
    }

    #[test]
    fn test_segment_terms_lexicographic() {
        let mut segment = IndexSegment::new(1);
        for term in ["zebra", "apple", "mango", "apple"] {
            segment.append_posting(term, 1);
        }

        let terms: Vec<&str> = segment.terms().collect();
        assert_eq!(terms, vec!["apple", "mango", "zebra"]);
    }

    #[test]
    fn test_segment_size_estimate_grows() {
        let mut segment = IndexSegment::new(1);
        assert_eq!(segment.size_bytes(), 0);

        segment.append_posting("term", 1);
        let after_new_term = segment.size_bytes();
        assert_eq!(after_new_term, 4 + 8);

        segment.append_posting("term", 2);
        assert_eq!(segment.size_bytes(), after_new_term + 8);

        // A duplicate posting adds nothing.
        segment.append_posting("term", 2);
        assert_eq!(segment.size_bytes(), after_new_term + 8);
    }

    #[test]
    fn test_empty_document_counts() {
        let mut segment = IndexSegment::new(1);
        segment.record_document();

        assert_eq!(segment.doc_count(), 1);
        assert_eq!(segment.vocabulary_size(), 0);
    }
}
