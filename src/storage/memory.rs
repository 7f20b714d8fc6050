//! # In-Memory Document Store

use std::collections::HashMap;

use super::backend::DocumentStore;
use super::errors::StorageResult;

/// Document store kept entirely in memory.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    documents: HashMap<String, Vec<u8>>,
    writes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful `put` calls so far.
    pub fn write_count(&self) -> usize {
        self.writes
    }

    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.documents.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }
}

impl DocumentStore for MemoryStore {
    fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        Ok(self.documents.get(key).cloned())
    }

    fn put(&mut self, key: &str, data: &[u8]) -> StorageResult<()> {
        self.documents.insert(key.to_string(), data.to_vec());
        self.writes += 1;
        Ok(())
    }

    fn delete(&mut self, key: &str) -> StorageResult<()> {
        self.documents.remove(key);
        Ok(())
    }
}
