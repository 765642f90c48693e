//! Single-pass in-memory indexing driver.
//!
//! Pulls documents from a source, assigns globally monotonic document ids,
//! and fans tokenization and segment building out over parallel lanes. Each
//! lane owns its builder exclusively (single-writer discipline per open
//! segment) and writes its own flushed segments; segment ids come from one
//! shared allocator so they stay unique across lanes. The merge phase starts
//! only after every lane has finished and force-flushed its final partial
//! segment.

use std::sync::Arc;

use crossbeam_channel::{Receiver, bounded};
use log::{debug, info};
use parking_lot::Mutex;
use rayon::ThreadPoolBuilder;

use crate::analysis::{EnglishAnalyzer, Tokenizer};
use crate::config::IndexerConfig;
use crate::corpus::DocumentSource;
use crate::error::{PilumError, Result};
use crate::indexer::builder::{SegmentBuilder, SegmentIdAllocator};
use crate::indexer::merger::{MergeOutcome, SegmentMerger};
use crate::segment::IndexSegment;
use crate::serializer::{BincodeSerializer, SegmentSerializer};
use crate::storage::{FileStorage, Storage};

/// Summary of one completed indexing run.
#[derive(Debug, Clone)]
pub struct IndexingStats {
    /// Documents ingested.
    pub documents: u64,

    /// Segments flushed across all lanes, including final partial ones.
    pub segments_flushed: u64,

    /// Outcome of the merge phase; `None` when the corpus was empty.
    pub merge: Option<MergeOutcome>,
}

/// Per-lane bookkeeping, reported back at the ingestion barrier.
struct LaneOutcome {
    lane: usize,
    documents: u64,
    segments_flushed: u64,
}

/// Indexes a document stream using the SPIMI strategy.
pub struct SinglePassIndexer {
    config: IndexerConfig,
    tokenizer: Arc<dyn Tokenizer>,
    serializer: Arc<dyn SegmentSerializer>,
}

impl SinglePassIndexer {
    /// Create an indexer with the default analyzer and serializer.
    pub fn new(config: IndexerConfig) -> Result<Self> {
        Self::with_components(
            config,
            Arc::new(EnglishAnalyzer::new()?),
            Arc::new(BincodeSerializer::new()),
        )
    }

    /// Create an indexer with explicit tokenizer and serializer capabilities.
    pub fn with_components(
        config: IndexerConfig,
        tokenizer: Arc<dyn Tokenizer>,
        serializer: Arc<dyn SegmentSerializer>,
    ) -> Result<Self> {
        config.validate()?;

        Ok(SinglePassIndexer {
            config,
            tokenizer,
            serializer,
        })
    }

    /// The indexer's configuration.
    pub fn config(&self) -> &IndexerConfig {
        &self.config
    }

    /// Index the whole source into the configured segment directory, then
    /// merge all flushed segments into one consolidated index file.
    pub fn build_index(&self, source: &mut dyn DocumentSource) -> Result<IndexingStats> {
        let storage: Arc<dyn Storage> = Arc::new(FileStorage::new(&self.config.segment_dir)?);
        self.build_index_with_storage(source, storage)
    }

    /// Like [`build_index`](Self::build_index), against an explicit storage
    /// backend.
    pub fn build_index_with_storage(
        &self,
        source: &mut dyn DocumentSource,
        storage: Arc<dyn Storage>,
    ) -> Result<IndexingStats> {
        let lanes = self.config.lane_count();

        // One extra thread so the producer never starves the lanes.
        let pool = ThreadPoolBuilder::new()
            .num_threads(lanes + 1)
            .thread_name(|i| format!("pilum-lane-{i}"))
            .build()
            .map_err(|e| PilumError::index(format!("failed to create thread pool: {e}")))?;

        let ids = SegmentIdAllocator::new();
        let (tx, rx) = bounded::<(u64, String)>(lanes * 2);
        let lane_outcomes: Mutex<Vec<Result<LaneOutcome>>> = Mutex::new(Vec::new());
        let mut source_err: Option<PilumError> = None;
        let mut documents = 0u64;

        pool.scope(|scope| {
            for lane in 0..lanes {
                let rx = rx.clone();
                let ids = ids.clone();
                let storage = Arc::clone(&storage);
                let lane_outcomes = &lane_outcomes;
                scope.spawn(move |_| {
                    let outcome = self.run_lane(lane, rx, ids, storage);
                    lane_outcomes.lock().push(outcome);
                });
            }
            drop(rx);

            // The driver owns the document-id counter: ids are assigned in
            // ingestion order and never reset, so every lane sees a strictly
            // increasing subsequence.
            let mut next_doc_id = 0u64;
            loop {
                match source.next_document() {
                    Ok(Some(doc)) => {
                        // Send fails only when every lane is gone.
                        if tx.send((next_doc_id, doc.text)).is_err() {
                            break;
                        }
                        next_doc_id += 1;
                    }
                    Ok(None) => break,
                    Err(e) => {
                        source_err = Some(e);
                        break;
                    }
                }
            }
            documents = next_doc_id;
            drop(tx);

            // Leaving the scope is the barrier: every lane has finished and
            // flushed its final partial segment before the merge below runs.
        });

        if let Some(e) = source_err {
            return Err(e);
        }

        let mut segments_flushed = 0;
        for outcome in lane_outcomes.into_inner() {
            let outcome = outcome?;
            debug!(
                "lane {} ingested {} documents in {} segments",
                outcome.lane, outcome.documents, outcome.segments_flushed
            );
            segments_flushed += outcome.segments_flushed;
        }

        if segments_flushed == 0 {
            info!("source produced no documents; nothing to merge");
            return Ok(IndexingStats {
                documents,
                segments_flushed,
                merge: None,
            });
        }

        let merger = SegmentMerger::new(
            Arc::clone(&storage),
            Arc::clone(&self.serializer),
            &self.config,
        );
        let merge = merger.merge_on_disk()?;

        info!(
            "indexed {documents} documents into '{}' via {segments_flushed} segments",
            merge.file_name
        );

        Ok(IndexingStats {
            documents,
            segments_flushed,
            merge: Some(merge),
        })
    }

    /// Consume documents from the channel until the producer closes it.
    fn run_lane(
        &self,
        lane: usize,
        rx: Receiver<(u64, String)>,
        ids: SegmentIdAllocator,
        storage: Arc<dyn Storage>,
    ) -> Result<LaneOutcome> {
        let mut builder = SegmentBuilder::with_allocator(self.config.flush_strategy, ids);
        let mut outcome = LaneOutcome {
            lane,
            documents: 0,
            segments_flushed: 0,
        };

        for (doc_id, text) in rx.iter() {
            let tokens = self.tokenizer.tokenize(&text)?;
            if let Some(segment) = builder.add_document(doc_id, &tokens) {
                self.flush_segment(storage.as_ref(), &segment)?;
                outcome.segments_flushed += 1;
            }
            outcome.documents += 1;
        }

        // End of input: the last partial segment still holds documents.
        if let Some(segment) = builder.finish() {
            self.flush_segment(storage.as_ref(), &segment)?;
            outcome.segments_flushed += 1;
        }

        Ok(outcome)
    }

    /// Write one completed segment. A write failure here propagates: the
    /// segment holds real documents and reporting success anyway would lose
    /// them.
    fn flush_segment(&self, storage: &dyn Storage, segment: &IndexSegment) -> Result<()> {
        let name = self.config.segment_file_name(segment.segment_id());
        self.serializer.write_segment(storage, &name, segment)?;

        info!(
            "flushed segment '{name}' ({} docs, {} terms, ~{} bytes)",
            segment.doc_count(),
            segment.vocabulary_size(),
            segment.size_bytes()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FlushStrategy;
    use crate::corpus::VecSource;
    use crate::search::BooleanSearchEngine;
    use crate::storage::MemoryStorage;

    fn test_config(strategy: FlushStrategy, lanes: usize) -> IndexerConfig {
        IndexerConfig {
            flush_strategy: strategy,
            lanes: Some(lanes),
            ..Default::default()
        }
    }

    #[test]
    fn test_single_lane_end_to_end() {
        let config = test_config(FlushStrategy::PostingCount { max_postings: 2 }, 1);
        let indexer = SinglePassIndexer::new(config).unwrap();
        let storage = MemoryStorage::new();

        let mut source = VecSource::new([
            ("a", "the red fox"),
            ("b", "red and blue"),
            ("c", "blue sky"),
        ]);

        let stats = indexer
            .build_index_with_storage(&mut source, Arc::new(storage.clone()))
            .unwrap();

        assert_eq!(stats.documents, 3);
        assert_eq!(stats.segments_flushed, 2);

        let merge = stats.merge.unwrap();
        assert_eq!(merge.doc_count, 3);

        // All raw segments were retired; only the merged output remains.
        assert_eq!(storage.list_files().unwrap(), vec![merge.file_name.clone()]);

        let mut engine = BooleanSearchEngine::new(Arc::new(BincodeSerializer::new()));
        engine
            .load_from_storage(&storage, &merge.file_name)
            .unwrap();

        assert_eq!(engine.lookup("red").unwrap(), &[0, 1]);
        assert_eq!(engine.lookup("blue").unwrap(), &[1, 2]);
        assert_eq!(engine.intersection(&["red", "blue"]).unwrap(), vec![1]);
        // "the" and "and" are stopwords and never reach the index.
        assert_eq!(engine.lookup("the").unwrap(), &[] as &[u64]);
    }

    #[test]
    fn test_parallel_lanes_index_everything() {
        let config = test_config(FlushStrategy::PostingCount { max_postings: 3 }, 4);
        let indexer = SinglePassIndexer::new(config).unwrap();
        let storage = MemoryStorage::new();

        let docs: Vec<(String, String)> = (0..40)
            .map(|i| (format!("doc{i}"), format!("common word{i}")))
            .collect();
        let mut source = VecSource::new(docs);

        let stats = indexer
            .build_index_with_storage(&mut source, Arc::new(storage.clone()))
            .unwrap();

        assert_eq!(stats.documents, 40);
        let merge = stats.merge.unwrap();
        assert_eq!(merge.doc_count, 40);

        let mut engine = BooleanSearchEngine::new(Arc::new(BincodeSerializer::new()));
        engine
            .load_from_storage(&storage, &merge.file_name)
            .unwrap();

        // Every document contains "common", regardless of which lane built
        // its segment, and the union is globally sorted.
        let common = engine.lookup("common").unwrap();
        assert_eq!(common, (0..40).collect::<Vec<u64>>());
        assert_eq!(engine.lookup("word7").unwrap(), &[7]);
    }

    #[test]
    fn test_empty_source_produces_no_merge() {
        let config = test_config(FlushStrategy::PostingCount { max_postings: 2 }, 2);
        let indexer = SinglePassIndexer::new(config).unwrap();
        let storage = MemoryStorage::new();

        let mut source = VecSource::new(Vec::<(String, String)>::new());
        let stats = indexer
            .build_index_with_storage(&mut source, Arc::new(storage.clone()))
            .unwrap();

        assert_eq!(stats.documents, 0);
        assert_eq!(stats.segments_flushed, 0);
        assert!(stats.merge.is_none());
        assert_eq!(storage.file_count(), 0);
    }

    #[test]
    fn test_invalid_config_rejected_before_io() {
        let config = test_config(FlushStrategy::ByteSize { max_bytes: 0 }, 1);
        assert!(SinglePassIndexer::new(config).is_err());
    }
}
