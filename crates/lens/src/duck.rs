// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! DuckDB implementation of the engine boundary.

use crate::engine::{Connection, Engine, close_quietly};
use crate::error::EngineError;
use crate::sql;
use arrow_array::RecordBatch;
use arrow_select::concat::concat_batches;
use async_trait::async_trait;
use log::{debug, warn};
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use tempfile::TempDir;

impl From<duckdb::Error> for EngineError {
    fn from(err: duckdb::Error) -> Self {
        EngineError::classify(err.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct DuckEngineOptions {
    /// Install and load the sqlite extension at startup. Without it
    /// relational database files cannot be attached.
    pub load_sqlite_extension: bool,
}

impl Default for DuckEngineOptions {
    fn default() -> Self {
        Self {
            load_sqlite_extension: true,
        }
    }
}

/// In-memory DuckDB database.
///
/// Registered bytes are written to a private scratch directory that lives
/// as long as the engine; each registration gets its own subdirectory so
/// two uploads with the same file name never overwrite each other.
pub struct DuckEngine {
    root: Mutex<duckdb::Connection>,
    scratch: TempDir,
    registrations: AtomicU64,
}

impl DuckEngine {
    pub async fn open_in_memory() -> Result<Self, EngineError> {
        Self::open_in_memory_with(DuckEngineOptions::default()).await
    }

    pub async fn open_in_memory_with(options: DuckEngineOptions) -> Result<Self, EngineError> {
        let root = duckdb::Connection::open_in_memory()?;
        let scratch = tempfile::Builder::new()
            .prefix("lens-engine-")
            .tempdir()
            .map_err(|e| EngineError::io(format!("cannot create scratch directory: {e}")))?;

        let engine = Self {
            root: Mutex::new(root),
            scratch,
            registrations: AtomicU64::new(0),
        };
        engine.prepare(&options).await?;
        Ok(engine)
    }

    async fn prepare(&self, options: &DuckEngineOptions) -> Result<(), EngineError> {
        let mut conn = self.connect().await?;

        if options.load_sqlite_extension {
            for statement in [sql::INSTALL_SQLITE, sql::LOAD_SQLITE] {
                if let Err(e) = conn.execute(statement).await {
                    // Keep going: everything but attachments still works
                    warn!("Failed to install/load SQLite extension: {e}");
                    break;
                }
            }
        }

        let result = conn.execute(&sql::markdown_macro()).await;
        close_quietly(conn).await;
        result
    }
}

#[async_trait]
impl Engine for DuckEngine {
    async fn register_bytes(&self, name: &str, bytes: &[u8]) -> Result<String, EngineError> {
        let slot = self.registrations.fetch_add(1, Ordering::Relaxed);
        let dir = self.scratch.path().join(slot.to_string());

        // Only the final component of the name is used
        let file_name = Path::new(name)
            .file_name()
            .map_or_else(|| "upload".into(), |n| n.to_os_string());
        let path = dir.join(file_name);

        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| EngineError::io(format!("cannot register {name}: {e}")))?;
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| EngineError::io(format!("cannot register {name}: {e}")))?;

        debug!("Registered {} bytes for {name} at {}", bytes.len(), path.display());
        Ok(path.to_string_lossy().into_owned())
    }

    async fn connect(&self) -> Result<Box<dyn Connection>, EngineError> {
        let root = self.root.lock().map_err(|_| EngineError::Task {
            message: "engine lock poisoned".to_string(),
        })?;
        let conn = root.try_clone()?;
        Ok(Box::new(DuckConnection { conn: Some(conn) }))
    }
}

/// One cloned DuckDB connection. Calls are moved onto the blocking pool
/// and the connection is handed back afterwards.
struct DuckConnection {
    conn: Option<duckdb::Connection>,
}

impl DuckConnection {
    async fn run<T, F>(&mut self, f: F) -> Result<T, EngineError>
    where
        T: Send + 'static,
        F: FnOnce(&duckdb::Connection) -> Result<T, EngineError> + Send + 'static,
    {
        let conn = self.conn.take().ok_or(EngineError::Closed)?;
        let (conn, result) = tokio::task::spawn_blocking(move || {
            let result = f(&conn);
            (conn, result)
        })
        .await
        .map_err(|e| EngineError::Task {
            message: e.to_string(),
        })?;
        self.conn = Some(conn);
        result
    }
}

#[async_trait]
impl Connection for DuckConnection {
    async fn execute(&mut self, statement: &str) -> Result<(), EngineError> {
        debug!("SQL: {statement}");
        let statement = statement.to_string();
        self.run(move |conn| Ok(conn.execute_batch(&statement)?)).await
    }

    async fn query(&mut self, query: &str) -> Result<RecordBatch, EngineError> {
        debug!("SQL: {query}");
        let query = query.to_string();
        self.run(move |conn| {
            let mut stmt = conn.prepare(&query)?;
            let arrow = stmt.query_arrow([])?;
            let schema = arrow.get_schema();
            let batches: Vec<RecordBatch> = arrow.collect();
            concat_batches(&schema, &batches).map_err(|e| EngineError::io(e.to_string()))
        })
        .await
    }

    async fn close(&mut self) -> Result<(), EngineError> {
        match self.conn.take() {
            Some(conn) => conn.close().map_err(|(_, e)| EngineError::from(e)),
            None => Ok(()),
        }
    }
}
