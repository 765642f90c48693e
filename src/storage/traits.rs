//! Storage trait definition.

use crate::error::Result;

/// A pluggable backend that stores and retrieves named files.
///
/// Segments are always written and read as whole files, so the interface
/// works on byte buffers rather than streams.
pub trait Storage: Send + Sync + std::fmt::Debug {
    /// Read the full contents of a file.
    fn read_file(&self, name: &str) -> Result<Vec<u8>>;

    /// Write a file, replacing any existing file of the same name.
    ///
    /// The write must be durable before this returns: once `write_file`
    /// reports success, the merger is allowed to delete the inputs that
    /// produced the data.
    fn write_file(&self, name: &str, data: &[u8]) -> Result<()>;

    /// Check if a file exists.
    fn file_exists(&self, name: &str) -> bool;

    /// Delete a file.
    fn delete_file(&self, name: &str) -> Result<()>;

    /// List all files in the storage.
    fn list_files(&self) -> Result<Vec<String>>;

    /// Get the size of a file in bytes.
    fn file_size(&self, name: &str) -> Result<u64>;
}
