// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::config::LensConfig;
use crate::delete::remove_data_source;
use crate::duck::{DuckEngine, DuckEngineOptions};
use crate::engine::{Engine, close_quietly};
use crate::error::{LensError, Result};
use crate::format::{FileFormat, detect_text};
use crate::ingest::ingest;
use crate::naming::suggested_name;
use crate::rehydrate::{RehydrateReport, rehydrate};
use crate::source::DataSource;
use arrow_array::RecordBatch;
use filestore::{DirFileStore, FileStore, FileStoreError, validate_id};
use log::{debug, error, info, warn};
use pager::QueryPager;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

/// A file handed to [`Lens::upload_data_source`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub file_name: String,
    pub data: Vec<u8>,
}

impl UploadedFile {
    pub fn new<S: Into<String>>(file_name: S, data: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            data,
        }
    }

    pub async fn from_path(path: &Path) -> Result<Self> {
        let data = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| LensError::InvalidName {
                name: path.display().to_string(),
            })?;
        Ok(Self { file_name, data })
    }

    /// Declared name proposed for this file
    #[must_use]
    pub fn suggested_name(&self) -> String {
        suggested_name(&self.file_name)
    }
}

/// Build an upload from pasted text. `format` defaults to the detected
/// one. Blank text gives nothing to upload.
#[must_use]
pub fn paste_file(text: &str, base_name: &str, format: Option<FileFormat>) -> Option<UploadedFile> {
    if text.trim().is_empty() {
        return None;
    }
    let format = match format {
        Some(FileFormat::Unknown | FileFormat::Parquet | FileFormat::Sqlite) | None => {
            detect_text(text)
        }
        Some(format) => format,
    };
    let file_name = format!("{base_name}.{}", format.extension());
    Some(UploadedFile::new(file_name, text.as_bytes().to_vec()))
}

/// Data source lifecycle over one engine and one file store
#[derive(Clone)]
pub struct Lens {
    engine: Arc<dyn Engine>,
    store: Arc<dyn FileStore>,
}

impl Lens {
    pub fn new(engine: Arc<dyn Engine>, store: Arc<dyn FileStore>) -> Self {
        Self { engine, store }
    }

    /// DuckDB in memory over the directory store under `config.home`
    pub async fn open(config: &LensConfig) -> Result<Self> {
        let store = DirFileStore::open(config.files_dir()).await?;
        let engine = DuckEngine::open_in_memory_with(DuckEngineOptions {
            load_sqlite_extension: config.load_sqlite_extension,
        })
        .await?;
        Ok(Self::new(Arc::new(engine), Arc::new(store)))
    }

    #[must_use]
    pub fn store(&self) -> &Arc<dyn FileStore> {
        &self.store
    }

    /// Store `file` under `id`, then ingest it as `name`. If ingestion
    /// fails the stored bytes are removed again.
    pub async fn upload_data_source(
        &self,
        file: &UploadedFile,
        name: &str,
        id: &str,
    ) -> Result<DataSource> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LensError::InvalidName {
                name: name.to_string(),
            });
        }
        validate_id(id)?;
        if self.store.get(id).await?.is_some() {
            return Err(LensError::DuplicateId { id: id.to_string() });
        }

        self.store
            .put(id, &file.file_name, name, &file.data)
            .await?;

        match ingest(self.engine.as_ref(), &file.data, &file.file_name, name).await {
            Ok(source) => {
                info!("Added data source {id} as {}", source.name());
                Ok(source)
            }
            Err(e) => {
                warn!("Upload of {} failed, removing stored bytes: {e}", file.file_name);
                if let Err(rollback) = self.store.delete(id).await {
                    error!("Failed to roll back stored file {id}: {rollback}");
                }
                Err(e)
            }
        }
    }

    pub async fn delete_data_source(&self, id: &str, source: &DataSource) -> Result<()> {
        remove_data_source(self.engine.as_ref(), self.store.as_ref(), id, source).await
    }

    /// Delete by id alone, using the stored file to find the engine object
    pub async fn delete_by_id(&self, id: &str) -> Result<()> {
        let file = match self.store.get(id).await {
            Ok(Some(file)) => file,
            Ok(None) => return Err(LensError::UnknownDataSource { id: id.to_string() }),
            // Rehydration skips damaged records, so nothing of it is in the engine
            Err(e @ FileStoreError::Corrupt { .. }) => {
                warn!("Removing damaged stored file {id}: {e}");
                self.store.delete(id).await?;
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };
        let source = DataSource::Regular {
            name: file.declared_name,
        };
        self.delete_data_source(id, &source).await
    }

    /// Rebuild engine state from the store. Call once, before queries.
    pub async fn rehydrate_all(&self) -> RehydrateReport {
        rehydrate(self.engine.as_ref(), self.store.as_ref()).await
    }

    /// Run `sql` on a fresh connection and return the whole result
    pub async fn query(&self, sql: &str) -> Result<RecordBatch> {
        let mut conn = self.engine.connect().await?;
        let result = conn.query(sql).await;
        close_quietly(conn).await;
        Ok(result?)
    }

    /// Run `sql` for `pager`. Returns false when the pager moved on while
    /// the query ran, in which case the result was dropped.
    pub async fn run_query(&self, sql: &str, pager: &Mutex<QueryPager>) -> Result<bool> {
        let ticket = pager
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .begin_run();
        let batch = self.query(sql).await?;
        let applied = pager
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .finish_run(ticket, batch);
        if !applied {
            debug!("Discarding stale result for {sql}");
        }
        Ok(applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paste_file() {
        assert_eq!(paste_file("  \n", "x", None), None);

        let pasted = paste_file("a\tb\n1\t2\n", "clip", None).unwrap();
        assert_eq!(pasted.file_name, "clip.tsv");

        let pasted = paste_file("{\"a\":1}\n{\"a\":2}\n", "clip", None).unwrap();
        assert_eq!(pasted.file_name, "clip.jsonl");

        let forced = paste_file("a,b\n", "clip", Some(FileFormat::Tsv)).unwrap();
        assert_eq!(forced.file_name, "clip.tsv");
        assert_eq!(forced.data, b"a,b\n");
    }

    #[test]
    fn test_suggested_name() {
        let file = UploadedFile::new("Q3 Sales-Report.csv", Vec::new());
        assert_eq!(file.suggested_name(), "q3_sales_report");
    }
}
