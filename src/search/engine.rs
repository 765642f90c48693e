//! Boolean AND search over one loaded index segment.

use std::sync::Arc;

use crate::error::{PilumError, Result};
use crate::segment::IndexSegment;
use crate::serializer::SegmentSerializer;
use crate::storage::Storage;

const EMPTY_POSTINGS: &[u64] = &[];

/// Locate the most recent merged output under `merged_prefix`, by merge id.
///
/// Returns `None` when the storage holds no merged output with that prefix.
pub fn find_latest_merged(storage: &dyn Storage, merged_prefix: &str) -> Result<Option<String>> {
    let mut newest: Option<(u64, String)> = None;

    for name in storage.list_files()? {
        if let Some(suffix) = name.strip_prefix(merged_prefix) {
            if let Ok(id) = suffix.parse::<u64>() {
                if newest.as_ref().is_none_or(|(best, _)| id > *best) {
                    newest = Some((id, name));
                }
            }
        }
    }

    Ok(newest.map(|(_, name)| name))
}

/// A minimal search engine answering term lookups and AND-conjunctions
/// against one fully loaded segment (merged or raw).
///
/// Starts unloaded; queries before a successful load fail fast. Once loaded,
/// the segment is immutable and queries only read, so an engine behind a
/// shared reference is safe for any number of concurrent readers.
#[derive(Debug)]
pub struct BooleanSearchEngine {
    serializer: Arc<dyn SegmentSerializer>,
    index: Option<IndexSegment>,
}

impl BooleanSearchEngine {
    /// Create an engine with no index loaded.
    pub fn new(serializer: Arc<dyn SegmentSerializer>) -> Self {
        BooleanSearchEngine {
            serializer,
            index: None,
        }
    }

    /// Load an index segment from storage.
    ///
    /// On failure the error is returned and any previously loaded index
    /// stays in place untouched.
    pub fn load_from_storage(&mut self, storage: &dyn Storage, name: &str) -> Result<()> {
        let segment = self.serializer.read_segment(storage, name)?;
        self.index = Some(segment);
        Ok(())
    }

    /// Adopt an already built segment directly.
    pub fn load_segment(&mut self, segment: IndexSegment) {
        self.index = Some(segment);
    }

    /// Whether an index is loaded.
    pub fn is_loaded(&self) -> bool {
        self.index.is_some()
    }

    /// The posting list for `term`, empty for unknown terms.
    ///
    /// Unknown terms are an expected outcome, never an error. Terms are
    /// matched case-insensitively via the same lowercase normalization the
    /// index was built with.
    pub fn lookup(&self, term: &str) -> Result<&[u64]> {
        let index = self.loaded_index()?;
        let term = term.to_lowercase();

        Ok(index
            .get(&term)
            .map(|postings| postings.as_slice())
            .unwrap_or(EMPTY_POSTINGS))
    }

    /// Document ids containing all of the given terms, sorted ascending.
    ///
    /// An empty term list yields an empty result; there is no "all
    /// documents" default. Any term with no postings empties the whole
    /// intersection. Term order does not affect the result; internally the
    /// smallest posting list is intersected first.
    pub fn intersection<S: AsRef<str>>(&self, terms: &[S]) -> Result<Vec<u64>> {
        self.loaded_index()?;

        if terms.is_empty() {
            return Ok(Vec::new());
        }

        let mut lists = Vec::with_capacity(terms.len());
        for term in terms {
            let postings = self.lookup(term.as_ref())?;
            if postings.is_empty() {
                return Ok(Vec::new());
            }
            lists.push(postings);
        }

        lists.sort_by_key(|postings| postings.len());

        let mut result: Vec<u64> = lists[0].to_vec();
        for postings in &lists[1..] {
            result.retain(|doc_id| postings.binary_search(doc_id).is_ok());
            if result.is_empty() {
                break;
            }
        }

        Ok(result)
    }

    /// Vocabulary size of the loaded index.
    pub fn vocabulary_size(&self) -> Result<u64> {
        Ok(self.loaded_index()?.vocabulary_size())
    }

    /// Document count of the loaded index.
    pub fn doc_count(&self) -> Result<u64> {
        Ok(self.loaded_index()?.doc_count())
    }

    fn loaded_index(&self) -> Result<&IndexSegment> {
        self.index
            .as_ref()
            .ok_or_else(|| PilumError::search("no index loaded"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serializer::BincodeSerializer;
    use crate::storage::MemoryStorage;

    fn engine_with(entries: &[(&str, &[u64])], doc_count: u64) -> BooleanSearchEngine {
        let mut segment = IndexSegment::new(1);
        for (term, postings) in entries {
            for &doc_id in *postings {
                segment.append_posting(term, doc_id);
            }
        }
        for _ in 0..doc_count {
            segment.record_document();
        }

        let mut engine = BooleanSearchEngine::new(Arc::new(BincodeSerializer::new()));
        engine.load_segment(segment);
        engine
    }

    #[test]
    fn test_query_before_load_fails() {
        let engine = BooleanSearchEngine::new(Arc::new(BincodeSerializer::new()));

        assert!(!engine.is_loaded());
        assert!(matches!(
            engine.lookup("red").unwrap_err(),
            PilumError::Search(_)
        ));
        assert!(engine.intersection(&["red"]).is_err());
    }

    #[test]
    fn test_lookup_known_and_unknown_terms() {
        let engine = engine_with(&[("red", &[1, 2, 3])], 3);

        assert_eq!(engine.lookup("red").unwrap(), &[1, 2, 3]);
        // Unknown terms resolve to an empty list, not an error.
        assert_eq!(engine.lookup("purple").unwrap(), EMPTY_POSTINGS);
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let engine = engine_with(&[("red", &[4])], 1);

        assert_eq!(engine.lookup("RED").unwrap(), &[4]);
        assert_eq!(engine.lookup("Red").unwrap(), &[4]);
    }

    #[test]
    fn test_intersection_basics() {
        let engine = engine_with(
            &[
                ("red", &[1, 2, 3, 4, 5]),
                ("blue", &[2, 3, 7]),
                ("green", &[6, 7]),
            ],
            7,
        );

        assert_eq!(engine.intersection(&["red", "blue"]).unwrap(), vec![2, 3]);
        assert_eq!(engine.intersection(&["blue", "green"]).unwrap(), vec![7]);
        assert!(engine.intersection(&["red", "green"]).unwrap().is_empty());
    }

    #[test]
    fn test_intersection_empty_terms_is_empty() {
        let engine = engine_with(&[("red", &[1])], 1);
        let no_terms: [&str; 0] = [];

        assert!(engine.intersection(&no_terms).unwrap().is_empty());
    }

    #[test]
    fn test_intersection_single_term_equals_lookup() {
        let engine = engine_with(&[("red", &[1, 5, 9])], 9);

        assert_eq!(
            engine.intersection(&["red"]).unwrap(),
            engine.lookup("red").unwrap()
        );
    }

    #[test]
    fn test_intersection_is_commutative() {
        let engine = engine_with(
            &[("a", &[1, 2, 3, 4]), ("b", &[2, 4, 6]), ("c", &[2, 3, 4])],
            6,
        );

        let abc = engine.intersection(&["a", "b", "c"]).unwrap();
        let cba = engine.intersection(&["c", "b", "a"]).unwrap();
        let bac = engine.intersection(&["b", "a", "c"]).unwrap();

        assert_eq!(abc, vec![2, 4]);
        assert_eq!(abc, cba);
        assert_eq!(abc, bac);
    }

    #[test]
    fn test_intersection_with_unknown_term_is_empty() {
        let engine = engine_with(&[("red", &[1, 2])], 2);

        assert!(engine.intersection(&["red", "missing"]).unwrap().is_empty());
    }

    #[test]
    fn test_failed_load_keeps_previous_index() {
        let storage = MemoryStorage::new();
        storage.write_file("merged-2", b"corrupt").unwrap();

        let mut engine = engine_with(&[("red", &[1])], 1);
        assert!(engine.load_from_storage(&storage, "merged-2").is_err());

        // The earlier index still answers queries.
        assert!(engine.is_loaded());
        assert_eq!(engine.lookup("red").unwrap(), &[1]);
    }

    #[test]
    fn test_find_latest_merged_picks_highest_id() {
        let storage = MemoryStorage::new();
        storage.write_file("merged-1", b"").unwrap();
        storage.write_file("merged-3", b"").unwrap();
        storage.write_file("merged-2", b"").unwrap();
        storage.write_file("segment-9", b"").unwrap();

        let latest = find_latest_merged(&storage, "merged-").unwrap();
        assert_eq!(latest.as_deref(), Some("merged-3"));
    }

    #[test]
    fn test_find_latest_merged_honors_custom_prefix() {
        let storage = MemoryStorage::new();
        storage.write_file("out-4", b"").unwrap();
        storage.write_file("merged-7", b"").unwrap();

        // Discovery follows the configured prefix, not the default one.
        let latest = find_latest_merged(&storage, "out-").unwrap();
        assert_eq!(latest.as_deref(), Some("out-4"));

        assert!(find_latest_merged(&storage, "idx-").unwrap().is_none());
    }

    #[test]
    fn test_load_from_storage_round_trip() {
        let storage = MemoryStorage::new();
        let serializer = BincodeSerializer::new();

        let mut segment = IndexSegment::new(1);
        segment.append_posting("fox", 3);
        segment.record_document();
        serializer
            .write_segment(&storage, "merged-1", &segment)
            .unwrap();

        let mut engine = BooleanSearchEngine::new(Arc::new(serializer));
        engine.load_from_storage(&storage, "merged-1").unwrap();

        assert_eq!(engine.lookup("fox").unwrap(), &[3]);
        assert_eq!(engine.doc_count().unwrap(), 1);
        assert_eq!(engine.vocabulary_size().unwrap(), 1);
    }
}
