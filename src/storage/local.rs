//! # Local Filesystem Document Store

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use super::backend::DocumentStore;
use super::errors::{StorageError, StorageResult};

/// Stores each document as a file below a root directory.
///
/// Keys are relative paths, e.g. `db_meta.json` or `data/users.json`.
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn full_path(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

impl DocumentStore for LocalStore {
    fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        match fs::read(self.full_path(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::io(key, e)),
        }
    }

    fn put(&mut self, key: &str, data: &[u8]) -> StorageResult<()> {
        let full_path = self.full_path(key);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).map_err(|e| StorageError::io(key, e))?;
        }

        fs::write(&full_path, data).map_err(|e| StorageError::io(key, e))
    }

    fn delete(&mut self, key: &str) -> StorageResult<()> {
        match fs::remove_file(self.full_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::io(key, e)),
        }
    }

    fn exists(&self, key: &str) -> StorageResult<bool> {
        Ok(self.full_path(key).is_file())
    }
}
