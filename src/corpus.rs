//! Document acquisition: sources that hand raw text to the indexing driver.
//!
//! The indexing core never enumerates a corpus itself; it pulls documents
//! from a [`DocumentSource`] one at a time, which keeps memory bounded no
//! matter how large the collection is.

use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{PilumError, Result};

/// One raw document pulled from a corpus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    /// Name of the corpus entry (file name, archive entry, ...).
    pub name: String,

    /// The document's raw text.
    pub text: String,
}

/// A stream of raw documents.
///
/// Sources cross thread boundaries inside the ingestion driver, hence the
/// `Send` bound.
pub trait DocumentSource: Send {
    /// Pull the next document, or `None` once the corpus is exhausted.
    ///
    /// Exhaustion is not an error; it is the signal for the driver to
    /// force-flush the final partial segment.
    fn next_document(&mut self) -> Result<Option<SourceDocument>>;
}

/// A source that walks the regular files of a directory in sorted name order.
#[derive(Debug)]
pub struct DirectorySource {
    pending: VecDeque<PathBuf>,
}

impl DirectorySource {
    /// Create a source over all regular files directly under `dir`.
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        let mut files = Vec::new();

        for entry in fs::read_dir(dir).map_err(|e| {
            PilumError::storage(format!("failed to read corpus dir {}: {e}", dir.display()))
        })? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                files.push(entry.path());
            }
        }

        files.sort();

        Ok(DirectorySource {
            pending: files.into(),
        })
    }

    /// Number of documents not yet pulled.
    pub fn remaining(&self) -> usize {
        self.pending.len()
    }
}

impl DocumentSource for DirectorySource {
    fn next_document(&mut self) -> Result<Option<SourceDocument>> {
        let Some(path) = self.pending.pop_front() else {
            return Ok(None);
        };

        let text = fs::read_to_string(&path).map_err(|e| {
            PilumError::storage(format!("failed to read {}: {e}", path.display()))
        })?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(Some(SourceDocument { name, text }))
    }
}

/// A source over in-memory (name, text) pairs, for tests and small corpora.
#[derive(Debug, Default)]
pub struct VecSource {
    pending: VecDeque<SourceDocument>,
}

impl VecSource {
    /// Create a source from (name, text) pairs, yielded in order.
    pub fn new<I, S>(documents: I) -> Self
    where
        I: IntoIterator<Item = (S, S)>,
        S: Into<String>,
    {
        VecSource {
            pending: documents
                .into_iter()
                .map(|(name, text)| SourceDocument {
                    name: name.into(),
                    text: text.into(),
                })
                .collect(),
        }
    }
}

impl DocumentSource for VecSource {
    fn next_document(&mut self) -> Result<Option<SourceDocument>> {
        Ok(self.pending.pop_front())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_directory_source_sorted_order() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("b.txt"), "second").unwrap();
        fs::write(temp_dir.path().join("a.txt"), "first").unwrap();

        let mut source = DirectorySource::new(temp_dir.path()).unwrap();
        assert_eq!(source.remaining(), 2);

        let first = source.next_document().unwrap().unwrap();
        assert_eq!(first.name, "a.txt");
        assert_eq!(first.text, "first");

        let second = source.next_document().unwrap().unwrap();
        assert_eq!(second.name, "b.txt");

        assert!(source.next_document().unwrap().is_none());
    }

    #[test]
    fn test_directory_source_missing_dir_fails() {
        assert!(DirectorySource::new("/nonexistent/corpus").is_err());
    }

    #[test]
    fn test_vec_source_yields_in_order() {
        let mut source = VecSource::new([("one", "red blue"), ("two", "green")]);

        assert_eq!(source.next_document().unwrap().unwrap().name, "one");
        assert_eq!(source.next_document().unwrap().unwrap().name, "two");
        assert!(source.next_document().unwrap().is_none());
    }
}
