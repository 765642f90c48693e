//! Error types for the Pilum library.
//!
//! All fallible operations in Pilum return [`Result`], whose error type is the
//! [`PilumError`] enum. Constructor helpers (`PilumError::config`,
//! `PilumError::storage`, ...) keep call sites short.

use std::io;

use thiserror::Error;

/// The main error type for Pilum operations.
#[derive(Error, Debug)]
pub enum PilumError {
    /// I/O errors (file operations, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Configuration errors (invalid flush strategy, thresholds, prefixes).
    /// These are fatal and reported at startup, before any I/O happens.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Storage-related errors (missing files, failed syncs).
    #[error("Storage error: {0}")]
    Storage(String),

    /// Segment encode/decode errors.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Index construction and merge errors.
    #[error("Index error: {0}")]
    Index(String),

    /// Analysis-related errors (tokenization).
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// Query-time errors (e.g. querying before an index is loaded).
    #[error("Search error: {0}")]
    Search(String),

    /// JSON serialization/deserialization errors (configuration files).
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic anyhow error.
    #[error("Error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with [`PilumError`].
pub type Result<T> = std::result::Result<T, PilumError>;

impl PilumError {
    /// Create a new configuration error.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        PilumError::Config(msg.into())
    }

    /// Create a new storage error.
    pub fn storage<S: Into<String>>(msg: S) -> Self {
        PilumError::Storage(msg.into())
    }

    /// Create a new serialization error.
    pub fn serialization<S: Into<String>>(msg: S) -> Self {
        PilumError::Serialization(msg.into())
    }

    /// Create a new index error.
    pub fn index<S: Into<String>>(msg: S) -> Self {
        PilumError::Index(msg.into())
    }

    /// Create a new analysis error.
    pub fn analysis<S: Into<String>>(msg: S) -> Self {
        PilumError::Analysis(msg.into())
    }

    /// Create a new search error.
    pub fn search<S: Into<String>>(msg: S) -> Self {
        PilumError::Search(msg.into())
    }
}
