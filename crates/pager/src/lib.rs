// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Random-access pages over one materialized query result
//!
//! A query runs once and produces a single Arrow `RecordBatch`. The
//! [`ResultPager`] keeps that batch and hands out fixed-size pages as
//! zero-copy slices, converting only the rows on the requested page into
//! plain key/value rows. [`QueryPager`] adds the bookkeeping needed when the
//! query text is being edited: a debounced reset and run tickets that let a
//! caller drop results that arrive after they stopped being relevant.

mod cell;
mod debounce;
mod error;
mod pager;
mod rows;

pub use cell::{Cell, MARKDOWN_MAGIC, TEXT_PREVIEW_CHARS, render_cell};
pub use debounce::{DEFAULT_RESET_DELAY, QueryPager, ResetDebouncer};
pub use error::{PagerError, Result};
pub use pager::{DEFAULT_PAGE_SIZE, PAGE_SIZES, PaginationState, ResultPager, RunTicket};
pub use rows::{MAX_SAFE_INTEGER, Row, batch_to_rows};
