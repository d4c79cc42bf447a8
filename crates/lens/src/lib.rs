// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Data source lifecycle for ad-hoc analysis of uploaded files
//!
//! Uploaded bytes are kept in a [`filestore::FileStore`] and loaded into an
//! embedded analytical [`Engine`]: delimited text, JSON and Parquet become
//! one table each, SQLite files are attached as a schema whose tables are
//! discovered on the spot. On startup the engine is rebuilt from the store
//! ([`Lens::rehydrate_all`]); deleting a source removes the engine object
//! first and the stored bytes after.

mod config;
mod delete;
mod duck;
mod engine;
mod error;
mod facade;
mod format;
mod ingest;
mod introspect;
mod naming;
mod rehydrate;
mod source;
pub mod sql;
mod state;
pub mod testing;

pub use config::{HOME_ENV, LensConfig};
pub use delete::{EngineObject, remove_data_source};
pub use duck::{DuckEngine, DuckEngineOptions};
pub use engine::{Connection, Engine};
pub use error::{EngineError, ErrorKind, IntrospectError, LensError, Result, UploadField};
pub use facade::{Lens, UploadedFile, paste_file};
pub use format::{FileFormat, detect_file, detect_text, file_extension, sniff_bytes};
pub use ingest::ingest;
pub use introspect::{list_tables, table_names};
pub use naming::{sanitize_table_name, schema_name_for, suggested_name};
pub use rehydrate::{RehydrateFailure, RehydrateReport, rehydrate};
pub use source::DataSource;
pub use state::{AppState, new_data_source_id};
