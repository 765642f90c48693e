//! In-memory storage implementation for testing.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::{PilumError, Result};
use crate::storage::traits::Storage;

/// An in-memory storage implementation.
///
/// Useful for tests and for building throwaway indexes without touching the
/// file system. Cloning shares the underlying file map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    files: Arc<RwLock<HashMap<String, Box<[u8]>>>>,
}

impl MemoryStorage {
    /// Create a new, empty memory storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of files currently stored.
    pub fn file_count(&self) -> usize {
        self.files.read().len()
    }

    /// Total size of all stored files.
    pub fn total_size(&self) -> u64 {
        self.files.read().values().map(|d| d.len() as u64).sum()
    }
}

impl Storage for MemoryStorage {
    fn read_file(&self, name: &str) -> Result<Vec<u8>> {
        let files = self.files.read();
        files
            .get(name)
            .map(|data| data.to_vec())
            .ok_or_else(|| PilumError::storage(format!("file not found: {name}")))
    }

    fn write_file(&self, name: &str, data: &[u8]) -> Result<()> {
        let mut files = self.files.write();
        files.insert(name.to_string(), data.to_vec().into_boxed_slice());
        Ok(())
    }

    fn file_exists(&self, name: &str) -> bool {
        self.files.read().contains_key(name)
    }

    fn delete_file(&self, name: &str) -> Result<()> {
        let mut files = self.files.write();
        files
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| PilumError::storage(format!("file not found: {name}")))
    }

    fn list_files(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self.files.read().keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    fn file_size(&self, name: &str) -> Result<u64> {
        let files = self.files.read();
        files
            .get(name)
            .map(|data| data.len() as u64)
            .ok_or_else(|| PilumError::storage(format!("file not found: {name}")))
    }
}
