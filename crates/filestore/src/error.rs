// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

// Error types for file store operations
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, FileStoreError>;

#[derive(Debug, thiserror::Error)]
pub enum FileStoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Record encoding error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid data source id: {id:?}")]
    InvalidId { id: String },

    #[error("Corrupt record {id} at {path}: {message}")]
    Corrupt {
        id: String,
        path: PathBuf,
        message: String,
    },
}

impl FileStoreError {
    pub fn invalid_id<S: AsRef<str>>(id: S) -> Self {
        FileStoreError::InvalidId {
            id: id.as_ref().to_string(),
        }
    }

    pub fn corrupt<S: AsRef<str>, P: Into<PathBuf>>(id: S, path: P, message: String) -> Self {
        FileStoreError::Corrupt {
            id: id.as_ref().to_string(),
            path: path.into(),
            message,
        }
    }
}
