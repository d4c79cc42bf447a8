// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::engine::Engine;
use crate::error::LensError;
use crate::ingest::ingest;
use crate::source::DataSource;
use filestore::FileStore;
use log::{info, warn};

/// A stored file that could not be ingested at startup. Its bytes stay in
/// the store.
#[derive(Debug)]
pub struct RehydrateFailure {
    pub id: String,
    pub file_name: String,
    pub error: LensError,
}

#[derive(Debug, Default)]
pub struct RehydrateReport {
    /// Restored sources by id, in upload order
    pub restored: Vec<(String, DataSource)>,
    pub failed: Vec<RehydrateFailure>,
}

impl RehydrateReport {
    #[must_use]
    pub fn restored_source(&self, id: &str) -> Option<&DataSource> {
        self.restored
            .iter()
            .find(|(restored_id, _)| restored_id == id)
            .map(|(_, source)| source)
    }

    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Replay every stored file into the engine. Failures are logged and
/// collected; this never fails as a whole.
pub async fn rehydrate(engine: &dyn Engine, store: &dyn FileStore) -> RehydrateReport {
    let mut report = RehydrateReport::default();

    let files = match store.get_all().await {
        Ok(files) => files,
        Err(e) => {
            warn!("Cannot read stored files, starting with no data sources: {e}");
            return report;
        }
    };

    for file in files {
        match ingest(engine, &file.data, &file.file_name, &file.declared_name).await {
            Ok(source) => report.restored.push((file.id, source)),
            Err(error) => {
                warn!(
                    "Failed to restore data source {} from {}: {error}",
                    file.id, file.file_name
                );
                report.failed.push(RehydrateFailure {
                    id: file.id,
                    file_name: file.file_name,
                    error,
                });
            }
        }
    }

    info!(
        "Rehydrated {} data sources ({} failed)",
        report.restored.len(),
        report.failed.len()
    );
    report
}
