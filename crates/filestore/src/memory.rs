// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::error::Result;
use crate::store::{FileStore, StoredFile, sort_by_upload, validate_id};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// In-memory file store for testing
///
/// Clones share the same underlying map, so a test can keep a handle while
/// the code under test owns another.
#[derive(Clone, Default)]
pub struct MemoryFileStore(Arc<Mutex<HashMap<String, StoredFile>>>);

impl MemoryFileStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records currently held
    pub async fn len(&self) -> usize {
        self.0.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.0.lock().await.is_empty()
    }
}

#[async_trait]
impl FileStore for MemoryFileStore {
    async fn put(&self, id: &str, file_name: &str, declared_name: &str, data: &[u8]) -> Result<()> {
        validate_id(id)?;
        let record = StoredFile::new(id, file_name, declared_name, data);
        let _ = self.0.lock().await.insert(id.to_string(), record);
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<StoredFile>> {
        Ok(self.0.lock().await.get(id).cloned())
    }

    async fn get_all(&self) -> Result<Vec<StoredFile>> {
        let mut files: Vec<StoredFile> = self.0.lock().await.values().cloned().collect();
        sort_by_upload(&mut files);
        Ok(files)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let _ = self.0.lock().await.remove(id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_get_delete() {
        let store = MemoryFileStore::new();
        store.put("ds_1", "a.csv", "a", b"x,y\n1,2\n").await.unwrap();

        let got = store.get("ds_1").await.unwrap().unwrap();
        assert_eq!(got.file_name, "a.csv");
        assert_eq!(got.declared_name, "a");
        assert_eq!(got.data, b"x,y\n1,2\n");

        store.delete("ds_1").await.unwrap();
        assert!(store.get("ds_1").await.unwrap().is_none());

        // Deleting twice is fine
        store.delete("ds_1").await.unwrap();
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let store = MemoryFileStore::new();
        let handle = store.clone();
        store.put("ds_1", "a.csv", "a", b"1").await.unwrap();
        assert_eq!(handle.len().await, 1);
    }

    #[tokio::test]
    async fn test_rejects_bad_id() {
        let store = MemoryFileStore::new();
        assert!(store.put("../x", "a.csv", "a", b"1").await.is_err());
        assert!(store.is_empty().await);
    }
}
