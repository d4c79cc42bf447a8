// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Application state: the data sources the user has registered.

use crate::error::Result;
use crate::rehydrate::RehydrateReport;
use crate::source::DataSource;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    #[serde(default)]
    pub data_sources: BTreeMap<String, DataSource>,
}

/// A fresh data source id
#[must_use]
pub fn new_data_source_id() -> String {
    format!("ds_{}", uuid7::uuid7())
}

impl AppState {
    /// Read state from `path`. A missing or unreadable file gives the empty
    /// state; the stored files are the source of truth.
    pub async fn load(path: &Path) -> Self {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Self::default(),
            Err(e) => {
                warn!("Cannot read state {}: {e}", path.display());
                return Self::default();
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(state) => state,
            Err(e) => {
                warn!("Ignoring unreadable state {}: {e}", path.display());
                Self::default()
            }
        }
    }

    pub async fn save(&self, path: &Path) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(self)?;
        let mut partial = path.as_os_str().to_owned();
        partial.push(".partial");
        tokio::fs::write(&partial, bytes).await?;
        tokio::fs::rename(&partial, path).await?;
        debug!("Saved state to {}", path.display());
        Ok(())
    }

    pub fn add(&mut self, id: &str, source: DataSource) {
        let _ = self.data_sources.insert(id.to_string(), source);
    }

    pub fn remove(&mut self, id: &str) -> Option<DataSource> {
        self.data_sources.remove(id)
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&DataSource> {
        self.data_sources.get(id)
    }

    /// Id of the source named `name`, if any
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<&str> {
        self.data_sources
            .iter()
            .find(|(_, source)| source.name() == name)
            .map(|(id, _)| id.as_str())
    }

    /// Bring the state in line with what was actually restored: restored
    /// sources replace their records (attachments get freshly discovered
    /// tables) and restored ids missing from the state are added.
    pub fn reconcile(&mut self, report: &RehydrateReport) {
        for (id, source) in &report.restored {
            self.add(id, source.clone());
        }
        for (id, source) in &self.data_sources {
            let restored = report.restored_source(id).is_some();
            let failed = report.failed.iter().any(|f| &f.id == id);
            if !restored && !failed {
                warn!(
                    "Data source {id} ({}) has no stored file; delete it to clean up",
                    source.name()
                );
            }
        }
    }
}
