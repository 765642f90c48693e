//! File system storage implementation.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use crate::error::{PilumError, Result};
use crate::storage::traits::Storage;

/// Directory-backed storage.
///
/// Writes go through a temporary file followed by an atomic rename, and both
/// the file and the directory are synced before success is reported. A crash
/// mid-write therefore never leaves a half-written segment under its final
/// name.
#[derive(Debug)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Open (creating if necessary) storage rooted at `dir`.
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(FileStorage { dir })
    }

    /// The directory this storage is rooted at.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn resolve(&self, name: &str) -> Result<PathBuf> {
        if name.is_empty() || name.contains(['/', '\\']) {
            return Err(PilumError::storage(format!("invalid file name: {name:?}")));
        }
        Ok(self.dir.join(name))
    }

    fn sync_dir(&self) -> Result<()> {
        // Directory sync makes the rename itself durable. Not every platform
        // supports opening a directory for sync; ignore that case.
        if let Ok(dir) = File::open(&self.dir) {
            dir.sync_all()?;
        }
        Ok(())
    }
}

impl Storage for FileStorage {
    fn read_file(&self, name: &str) -> Result<Vec<u8>> {
        let path = self.resolve(name)?;
        fs::read(&path)
            .map_err(|e| PilumError::storage(format!("failed to read {}: {e}", path.display())))
    }

    fn write_file(&self, name: &str, data: &[u8]) -> Result<()> {
        let path = self.resolve(name)?;
        let tmp_path = self.dir.join(format!("{name}.tmp"));

        {
            let mut file = File::create(&tmp_path)?;
            std::io::Write::write_all(&mut file, data)?;
            file.sync_all()?;
        }

        fs::rename(&tmp_path, &path)?;
        self.sync_dir()
    }

    fn file_exists(&self, name: &str) -> bool {
        match self.resolve(name) {
            Ok(path) => path.is_file(),
            Err(_) => false,
        }
    }

    fn delete_file(&self, name: &str) -> Result<()> {
        let path = self.resolve(name)?;
        fs::remove_file(&path)
            .map_err(|e| PilumError::storage(format!("failed to delete {}: {e}", path.display())))
    }

    fn list_files(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();

        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                if let Some(name) = entry.file_name().to_str() {
                    names.push(name.to_string());
                }
            }
        }

        names.sort();
        Ok(names)
    }

    fn file_size(&self, name: &str) -> Result<u64> {
        let path = self.resolve(name)?;
        Ok(fs::metadata(&path)?.len())
    }
}
