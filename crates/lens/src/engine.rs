// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::error::EngineError;
use arrow_array::RecordBatch;
use async_trait::async_trait;
use log::debug;

/// The embedded analytical engine, as seen by the data source lifecycle
///
/// Passed around as `Arc<dyn Engine>` so tests can substitute a fake.
#[async_trait]
pub trait Engine: Send + Sync {
    /// Make `bytes` readable by statements under the returned location.
    /// `name` is the original file name.
    async fn register_bytes(&self, name: &str, bytes: &[u8]) -> Result<String, EngineError>;

    /// Open a connection for the duration of one operation
    async fn connect(&self) -> Result<Box<dyn Connection>, EngineError>;
}

#[async_trait]
pub trait Connection: Send {
    /// Run statements that produce no rows of interest
    async fn execute(&mut self, sql: &str) -> Result<(), EngineError>;

    /// Run a query and materialize its full result as one batch
    async fn query(&mut self, sql: &str) -> Result<RecordBatch, EngineError>;

    async fn close(&mut self) -> Result<(), EngineError>;
}

/// Close a connection whose operation already has its own outcome
pub(crate) async fn close_quietly(mut conn: Box<dyn Connection>) {
    if let Err(e) = conn.close().await {
        debug!("Ignoring error closing engine connection: {e}");
    }
}
