// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Persistent store for uploaded data source bytes
//!
//! Every uploaded file is kept verbatim, keyed by the data source id, so the
//! engine can be rebuilt from scratch on the next start. Two backends are
//! provided: [`MemoryFileStore`] for tests and [`DirFileStore`], which keeps
//! one directory per record under a host root.

mod dir;
mod error;
mod memory;
mod store;

pub use dir::DirFileStore;
pub use error::{FileStoreError, Result};
pub use memory::MemoryFileStore;
pub use store::{FileStore, StoredFile, validate_id};
