//! Segment persistence: encode/decode of segments through a storage backend.
//!
//! The indexing core only requires that a serializer round-trips a segment
//! exactly (term order, posting order, metadata); the concrete encoding is an
//! external concern. The default implementation uses bincode.

use crate::error::{PilumError, Result};
use crate::segment::IndexSegment;
use crate::storage::Storage;

/// Writes and reads whole segments to and from a storage backend.
pub trait SegmentSerializer: Send + Sync + std::fmt::Debug {
    /// Encode `segment` and durably write it under `name`.
    fn write_segment(&self, storage: &dyn Storage, name: &str, segment: &IndexSegment)
    -> Result<()>;

    /// Read and decode the segment stored under `name`.
    fn read_segment(&self, storage: &dyn Storage, name: &str) -> Result<IndexSegment>;
}

/// Bincode-backed segment serializer.
#[derive(Debug, Clone, Default)]
pub struct BincodeSerializer;

impl BincodeSerializer {
    /// Create a new bincode serializer.
    pub fn new() -> Self {
        BincodeSerializer
    }
}

impl SegmentSerializer for BincodeSerializer {
    fn write_segment(
        &self,
        storage: &dyn Storage,
        name: &str,
        segment: &IndexSegment,
    ) -> Result<()> {
        let data = bincode::serialize(segment)
            .map_err(|e| PilumError::serialization(format!("failed to encode segment: {e}")))?;
        storage.write_file(name, &data)
    }

    fn read_segment(&self, storage: &dyn Storage, name: &str) -> Result<IndexSegment> {
        let data = storage.read_file(name)?;
        bincode::deserialize(&data).map_err(|e| {
            PilumError::serialization(format!("failed to decode segment '{name}': {e}"))
        })
    }
}
