// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

pub type Result<T> = std::result::Result<T, PagerError>;

#[derive(Debug, thiserror::Error)]
pub enum PagerError {
    #[error("Unsupported page size {0}; expected one of {allowed:?}", allowed = crate::PAGE_SIZES)]
    UnsupportedPageSize(usize),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow_schema::ArrowError),
}
