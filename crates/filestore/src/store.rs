// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::error::{FileStoreError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One uploaded file, exactly as the user provided it.
///
/// `id` joins the record to a live data source. `declared_name` is the
/// sanitized identifier used as the table or schema name in the engine.
/// Records are written once and never updated in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredFile {
    pub id: String,
    pub file_name: String,
    pub declared_name: String,
    #[serde(skip)]
    pub data: Vec<u8>,
    /// Milliseconds since the Unix epoch
    pub uploaded_at: i64,
}

impl StoredFile {
    pub fn new(id: &str, file_name: &str, declared_name: &str, data: &[u8]) -> Self {
        Self {
            id: id.to_string(),
            file_name: file_name.to_string(),
            declared_name: declared_name.to_string(),
            data: data.to_vec(),
            uploaded_at: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// Key/value store of raw uploaded bytes, keyed by data source id
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Insert or replace the record for `id`
    async fn put(&self, id: &str, file_name: &str, declared_name: &str, data: &[u8]) -> Result<()>;

    async fn get(&self, id: &str) -> Result<Option<StoredFile>>;

    /// All records, oldest upload first
    async fn get_all(&self) -> Result<Vec<StoredFile>>;

    /// Remove the record for `id`; removing an absent id is not an error
    async fn delete(&self, id: &str) -> Result<()>;
}

/// Ids double as directory names in [`crate::DirFileStore`], so they are
/// restricted to a conservative character set.
pub fn validate_id(id: &str) -> Result<()> {
    let well_formed = !id.is_empty()
        && !id.starts_with('.')
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if well_formed {
        Ok(())
    } else {
        Err(FileStoreError::invalid_id(id))
    }
}

pub(crate) fn sort_by_upload(files: &mut [StoredFile]) {
    files.sort_by(|a, b| a.uploaded_at.cmp(&b.uploaded_at).then_with(|| a.id.cmp(&b.id)));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_id() {
        assert!(validate_id("ds_0190f5a1-7e2b-7c3d-9f00-1234").is_ok());
        assert!(validate_id("").is_err());
        assert!(validate_id("../escape").is_err());
        assert!(validate_id("a/b").is_err());
        assert!(validate_id(".tmp").is_err());
    }
}
