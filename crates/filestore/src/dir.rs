// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::error::{FileStoreError, Result};
use crate::store::{FileStore, StoredFile, sort_by_upload, validate_id};
use async_trait::async_trait;
use log::{debug, warn};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const RECORD_FILE: &str = "record.json";
const DATA_FILE: &str = "data";
const PARTIAL_SUFFIX: &str = ".partial";

/// Host directory file store.
///
/// Layout: `<root>/<id>/data` holds the raw bytes and `<root>/<id>/record.json`
/// the remaining `StoredFile` fields. The record file is written last, through
/// a rename, so a directory without one is an interrupted `put` and is ignored.
pub struct DirFileStore {
    root: PathBuf,
}

impl DirFileStore {
    /// Open (creating if needed) a store rooted at `root`
    pub async fn open<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&root).await?;
        debug!("Opened file store at {}", root.display());
        Ok(Self { root })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn record_dir(&self, id: &str) -> PathBuf {
        self.root.join(id)
    }

    async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
        let mut partial = path.as_os_str().to_owned();
        partial.push(PARTIAL_SUFFIX);
        let partial = PathBuf::from(partial);
        tokio::fs::write(&partial, bytes).await?;
        tokio::fs::rename(&partial, path).await?;
        Ok(())
    }

    async fn load(&self, id: &str) -> Result<Option<StoredFile>> {
        let dir = self.record_dir(id);
        let record_path = dir.join(RECORD_FILE);

        let record_bytes = match tokio::fs::read(&record_path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let mut record: StoredFile = serde_json::from_slice(&record_bytes)
            .map_err(|e| FileStoreError::corrupt(id, &record_path, e.to_string()))?;
        if record.id != id {
            return Err(FileStoreError::corrupt(
                id,
                &record_path,
                format!("record claims id {}", record.id),
            ));
        }

        let data_path = dir.join(DATA_FILE);
        record.data = match tokio::fs::read(&data_path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(FileStoreError::corrupt(
                    id,
                    &data_path,
                    "data file is missing".to_string(),
                ));
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Some(record))
    }
}

#[async_trait]
impl FileStore for DirFileStore {
    async fn put(&self, id: &str, file_name: &str, declared_name: &str, data: &[u8]) -> Result<()> {
        validate_id(id)?;
        let dir = self.record_dir(id);
        tokio::fs::create_dir_all(&dir).await?;

        let record = StoredFile::new(id, file_name, declared_name, &[]);
        let record_json = serde_json::to_vec_pretty(&record)?;

        Self::write_atomic(&dir.join(DATA_FILE), data).await?;
        Self::write_atomic(&dir.join(RECORD_FILE), &record_json).await?;

        debug!("Stored {} bytes for {id} ({file_name})", data.len());
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<StoredFile>> {
        validate_id(id)?;
        self.load(id).await
    }

    async fn get_all(&self) -> Result<Vec<StoredFile>> {
        let mut files = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.root).await?;

        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_dir() {
                continue;
            }
            let Some(id) = entry.file_name().to_str().map(str::to_string) else {
                warn!("Skipping non UTF-8 entry in file store: {:?}", entry.path());
                continue;
            };
            if validate_id(&id).is_err() {
                continue;
            }

            match self.load(&id).await {
                Ok(Some(file)) => files.push(file),
                Ok(None) => debug!("Skipping incomplete record {id}"),
                // A damaged record stays on disk for manual inspection
                Err(e) => warn!("Skipping unreadable record {id}: {e}"),
            }
        }

        sort_by_upload(&mut files);
        Ok(files)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        validate_id(id)?;
        match tokio::fs::remove_dir_all(self.record_dir(id)).await {
            Ok(()) => {
                debug!("Deleted stored file {id}");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
