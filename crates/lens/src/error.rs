// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

// Error types for data source lifecycle operations
use crate::format::FileFormat;
use filestore::FileStoreError;

pub type Result<T> = std::result::Result<T, LensError>;

/// Failure reported by the analytical engine binding
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("{message}")]
    AlreadyExists { message: String },

    #[error("{message}")]
    InvalidInput { message: String },

    #[error("Engine I/O error: {message}")]
    Io { message: String },

    #[error("Connection already closed")]
    Closed,

    #[error("Engine worker failed: {message}")]
    Task { message: String },
}

impl EngineError {
    /// Sort an engine message into a variant. Engines report most failures
    /// as text, prefixed with an error class (`Catalog Error: ...`).
    pub fn classify<S: Into<String>>(message: S) -> Self {
        let message = message.into();
        if message.contains("already exists") {
            EngineError::AlreadyExists { message }
        } else if [
            "Invalid Input Error",
            "Conversion Error",
            "Parser Error",
            "Malformed",
            "Invalid Error",
        ]
        .iter()
        .any(|class| message.contains(class))
        {
            EngineError::InvalidInput { message }
        } else {
            EngineError::Io { message }
        }
    }

    pub fn io<S: Into<String>>(message: S) -> Self {
        EngineError::Io {
            message: message.into(),
        }
    }
}

/// Failure listing the tables of a freshly attached database
#[derive(Debug, thiserror::Error)]
pub enum IntrospectError {
    #[error("No tables found in attached database \"{schema}\"")]
    EmptyAttachment { schema: String },

    #[error("Could not extract table names from attached database \"{schema}\"")]
    UnrecognizedSchema { schema: String },

    #[error(transparent)]
    Engine(#[from] EngineError),
}

#[derive(Debug, thiserror::Error)]
pub enum LensError {
    #[error("Could not read {file_name} as {format}: {message}")]
    ParseFailure {
        file_name: String,
        format: FileFormat,
        message: String,
    },

    #[error("Attached database \"{schema}\" is empty or invalid: {source}")]
    EmptyOrInvalidAttachment {
        schema: String,
        source: IntrospectError,
    },

    #[error("A table or schema named \"{name}\" already exists")]
    NameCollision { name: String },

    #[error("Invalid data source name {name:?}")]
    InvalidName { name: String },

    #[error("Unknown data source {id}")]
    UnknownDataSource { id: String },

    #[error("Data source id {id} is already in use")]
    DuplicateId { id: String },

    #[error("File store error: {0}")]
    Store(#[from] FileStoreError),

    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("State encoding error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Coarse classification, enough for a front end to decide where to show
/// an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ParseFailure,
    EmptyOrInvalidAttachment,
    NameCollision,
    InvalidName,
    UnknownDataSource,
    DuplicateId,
    StoreIo,
    EngineIo,
    Config,
}

/// Which upload field an error should be reported against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadField {
    File,
    Name,
}

impl LensError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            LensError::ParseFailure { .. } => ErrorKind::ParseFailure,
            LensError::EmptyOrInvalidAttachment { .. } => ErrorKind::EmptyOrInvalidAttachment,
            LensError::NameCollision { .. } => ErrorKind::NameCollision,
            LensError::InvalidName { .. } => ErrorKind::InvalidName,
            LensError::UnknownDataSource { .. } => ErrorKind::UnknownDataSource,
            LensError::DuplicateId { .. } => ErrorKind::DuplicateId,
            LensError::Store(_) | LensError::Io(_) | LensError::Json(_) => ErrorKind::StoreIo,
            LensError::Engine(_) => ErrorKind::EngineIo,
            LensError::Config(_) => ErrorKind::Config,
        }
    }

    #[must_use]
    pub fn upload_field(&self) -> UploadField {
        match self.kind() {
            ErrorKind::ParseFailure | ErrorKind::EmptyOrInvalidAttachment => UploadField::File,
            _ => UploadField::Name,
        }
    }
}
