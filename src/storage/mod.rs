//! Storage abstraction for persisting index segments.
//!
//! The indexer and merger only need whole-file reads and durable whole-file
//! writes, so the [`Storage`] trait stays deliberately small. Implementations:
//! file system ([`file::FileStorage`]) and in-memory ([`memory::MemoryStorage`],
//! mostly for tests).

pub mod file;
pub mod memory;
pub mod traits;

pub use file::FileStorage;
pub use memory::MemoryStorage;
pub use traits::Storage;
