// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::engine::Engine;
use crate::error::Result;
use crate::format::detect_file;
use crate::ingest::run_statement;
use crate::naming::schema_name_for;
use crate::source::DataSource;
use crate::sql;
use filestore::{FileStore, FileStoreError, StoredFile};
use log::{debug, info, warn};

/// Engine object backing a data source
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineObject {
    Table(String),
    Schema(String),
}

impl EngineObject {
    /// Derived from the stored bytes, which outlive any in-memory record
    #[must_use]
    pub fn for_stored(file: &StoredFile) -> Self {
        if detect_file(&file.file_name, &file.data).is_relational() {
            EngineObject::Schema(schema_name_for(&file.declared_name))
        } else {
            EngineObject::Table(file.declared_name.clone())
        }
    }

    #[must_use]
    pub fn for_source(source: &DataSource) -> Self {
        match source {
            DataSource::Regular { name } => EngineObject::Table(name.clone()),
            DataSource::RelationalAttachment { schema_name, .. } => {
                EngineObject::Schema(schema_name.clone())
            }
        }
    }

    fn removal(&self) -> String {
        match self {
            EngineObject::Table(name) => sql::drop_table_if_exists(name),
            EngineObject::Schema(schema) => sql::detach_if_exists(schema),
        }
    }
}

/// Remove the engine object for `id`, then its stored bytes. If the engine
/// step fails the bytes are kept.
pub async fn remove_data_source(
    engine: &dyn Engine,
    store: &dyn FileStore,
    id: &str,
    source: &DataSource,
) -> Result<()> {
    let target = match store.get(id).await {
        Ok(Some(file)) => EngineObject::for_stored(&file),
        Ok(None) => {
            debug!("No stored file for {id}, removing by record");
            EngineObject::for_source(source)
        }
        Err(e @ FileStoreError::Corrupt { .. }) => {
            warn!("Stored file {id} is damaged, removing by record: {e}");
            EngineObject::for_source(source)
        }
        Err(e) => return Err(e.into()),
    };

    run_statement(engine, &target.removal()).await?;
    store.delete(id).await?;
    info!("Removed data source {id} ({target:?})");
    Ok(())
}
