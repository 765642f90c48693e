//! Indexer configuration and segment flush strategies.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PilumError, Result};
use crate::segment::IndexSegment;

/// Determines when an in-progress segment is flushed to storage.
///
/// Exactly two strategies exist, so this is a tagged enum rather than an
/// extension point. Evaluation is a pure function of segment state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum FlushStrategy {
    /// Flush once the segment's estimated serialized size reaches `max_bytes`.
    ByteSize {
        /// Size threshold in bytes.
        max_bytes: u64,
    },

    /// Flush once the segment's document count reaches `max_postings`.
    PostingCount {
        /// Document count threshold.
        max_postings: u64,
    },
}

impl FlushStrategy {
    /// Whether the given open segment has reached its flush threshold.
    ///
    /// Consulted after every added document; relies on the segment's
    /// incrementally maintained size estimate, never on re-serialization.
    pub fn should_flush(&self, segment: &IndexSegment) -> bool {
        match *self {
            FlushStrategy::ByteSize { max_bytes } => segment.size_bytes() >= max_bytes,
            FlushStrategy::PostingCount { max_postings } => segment.doc_count() >= max_postings,
        }
    }

    /// Validate the strategy's threshold.
    fn validate(&self) -> Result<()> {
        let threshold = match *self {
            FlushStrategy::ByteSize { max_bytes } => max_bytes,
            FlushStrategy::PostingCount { max_postings } => max_postings,
        };

        if threshold == 0 {
            return Err(PilumError::config(
                "flush threshold must be greater than zero",
            ));
        }

        Ok(())
    }
}

/// Configuration for a single-pass indexing run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexerConfig {
    /// Directory holding flushed segment files and merged outputs.
    pub segment_dir: PathBuf,

    /// File name prefix for flushed segment files.
    pub segment_prefix: String,

    /// File name prefix for merged output files.
    pub merged_prefix: String,

    /// When to flush the open segment.
    pub flush_strategy: FlushStrategy,

    /// Number of parallel ingestion lanes; `None` means one per CPU.
    pub lanes: Option<usize>,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        IndexerConfig {
            segment_dir: PathBuf::from("index"),
            segment_prefix: "segment-".to_string(),
            merged_prefix: "merged-".to_string(),
            flush_strategy: FlushStrategy::ByteSize {
                max_bytes: 60 * 1024 * 1024,
            },
            lanes: None,
        }
    }
}

impl IndexerConfig {
    /// Load a configuration from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        let config: IndexerConfig = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// Fatal configuration problems are reported here, at startup, before any
    /// I/O happens.
    pub fn validate(&self) -> Result<()> {
        self.flush_strategy.validate()?;

        if self.segment_prefix.is_empty() || self.merged_prefix.is_empty() {
            return Err(PilumError::config("file name prefixes must not be empty"));
        }

        // Both kinds of file share one directory and are discovered by
        // prefix, so the prefixes must not shadow each other.
        if self.segment_prefix.starts_with(&self.merged_prefix)
            || self.merged_prefix.starts_with(&self.segment_prefix)
        {
            return Err(PilumError::config(format!(
                "segment prefix '{}' and merged prefix '{}' must not overlap",
                self.segment_prefix, self.merged_prefix
            )));
        }

        if let Some(lanes) = self.lanes {
            if lanes == 0 {
                return Err(PilumError::config("lane count must be greater than zero"));
            }
        }

        Ok(())
    }

    /// Effective number of parallel ingestion lanes.
    pub fn lane_count(&self) -> usize {
        self.lanes.unwrap_or_else(num_cpus::get)
    }

    /// File name for a flushed segment.
    pub fn segment_file_name(&self, segment_id: u64) -> String {
        format!("{}{}", self.segment_prefix, segment_id)
    }

    /// File name for a merged output.
    pub fn merged_file_name(&self, merge_id: u64) -> String {
        format!("{}{}", self.merged_prefix, merge_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = IndexerConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_threshold_rejected() {
        let config = IndexerConfig {
            flush_strategy: FlushStrategy::PostingCount { max_postings: 0 },
            ..Default::default()
        };

        let err = config.validate().unwrap_err();
        assert!(matches!(err, PilumError::Config(_)));
    }

    #[test]
    fn test_overlapping_prefixes_rejected() {
        let config = IndexerConfig {
            segment_prefix: "seg-".to_string(),
            merged_prefix: "seg-merged-".to_string(),
            ..Default::default()
        };

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_byte_size_strategy_trips_on_estimate() {
        let strategy = FlushStrategy::ByteSize { max_bytes: 20 };
        let mut segment = IndexSegment::new(1);

        segment.append_posting("alpha", 1);
        segment.record_document();
        assert!(!strategy.should_flush(&segment));

        segment.append_posting("beta", 2);
        segment.record_document();
        assert!(strategy.should_flush(&segment));
    }

    #[test]
    fn test_posting_count_strategy_counts_documents() {
        let strategy = FlushStrategy::PostingCount { max_postings: 2 };
        let mut segment = IndexSegment::new(1);

        segment.record_document();
        assert!(!strategy.should_flush(&segment));

        segment.record_document();
        assert!(strategy.should_flush(&segment));
    }

    #[test]
    fn test_strategy_round_trips_through_json() {
        let strategy = FlushStrategy::PostingCount { max_postings: 10_000 };
        let json = serde_json::to_string(&strategy).unwrap();
        let restored: FlushStrategy = serde_json::from_str(&json).unwrap();

        assert_eq!(strategy, restored);
    }

    #[test]
    fn test_file_names_use_prefixes() {
        let config = IndexerConfig::default();
        assert_eq!(config.segment_file_name(3), "segment-3");
        assert_eq!(config.merged_file_name(1), "merged-1");
    }
}
