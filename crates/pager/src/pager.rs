// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::error::{PagerError, Result};
use crate::rows::{Row, batch_to_rows};
use arrow_array::RecordBatch;
use arrow_schema::SchemaRef;
use log::debug;
use std::sync::Arc;

/// Page sizes a caller may choose from
pub const PAGE_SIZES: [usize; 5] = [10, 25, 50, 100, 250];

pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Identifies one query run. A result is only applied if its ticket is
/// still the pager's current epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunTicket(u64);

/// Snapshot of the pager's position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationState {
    pub page_index: usize,
    pub page_size: usize,
    pub total_rows: usize,
}

/// Serves fixed-size pages from one immutable result batch.
///
/// The page index is kept within `[0, page_count - 1]` (or 0 when there are
/// no rows) whenever it is set through the pager.
#[derive(Debug)]
pub struct ResultPager {
    batch: Option<Arc<RecordBatch>>,
    page_index: usize,
    page_size: usize,
    total_rows: usize,
    epoch: u64,
}

impl Default for ResultPager {
    fn default() -> Self {
        Self {
            batch: None,
            page_index: 0,
            page_size: DEFAULT_PAGE_SIZE,
            total_rows: 0,
            epoch: 0,
        }
    }
}

fn check_page_size(page_size: usize) -> Result<()> {
    if PAGE_SIZES.contains(&page_size) {
        Ok(())
    } else {
        Err(PagerError::UnsupportedPageSize(page_size))
    }
}

impl ResultPager {
    pub fn new(page_size: usize) -> Result<Self> {
        check_page_size(page_size)?;
        Ok(Self {
            page_size,
            ..Self::default()
        })
    }

    /// Install a freshly computed result and go back to the first page
    pub fn set_batch(&mut self, batch: RecordBatch) {
        self.total_rows = batch.num_rows();
        self.batch = Some(Arc::new(batch));
        self.page_index = 0;
        self.epoch += 1;
        debug!("Pager holds {} rows (epoch {})", self.total_rows, self.epoch);
    }

    /// Clear the current result and start a new run
    pub fn begin_run(&mut self) -> RunTicket {
        self.reset();
        RunTicket(self.epoch)
    }

    /// Apply the result of the run identified by `ticket`. Returns false, and
    /// drops the batch, when a later run or a reset has superseded it.
    pub fn finish_run(&mut self, ticket: RunTicket, batch: RecordBatch) -> bool {
        if ticket.0 != self.epoch {
            debug!(
                "Discarding stale result ({} rows) for epoch {}, current {}",
                batch.num_rows(),
                ticket.0,
                self.epoch
            );
            return false;
        }
        self.set_batch(batch);
        true
    }

    /// Make every outstanding run ticket stale without touching the
    /// displayed result
    pub fn invalidate_runs(&mut self) {
        self.epoch += 1;
    }

    pub fn reset(&mut self) {
        self.batch = None;
        self.total_rows = 0;
        self.page_index = 0;
        self.epoch += 1;
    }

    /// Rows `[index * size, min((index + 1) * size, total))` of the current
    /// result. Out-of-range pages are empty.
    pub fn page(&self, page_index: usize, page_size: usize) -> Result<Vec<Row>> {
        check_page_size(page_size)?;
        let Some(batch) = &self.batch else {
            return Ok(Vec::new());
        };

        let offset = page_index.saturating_mul(page_size);
        if offset >= self.total_rows {
            return Ok(Vec::new());
        }
        let end = offset.saturating_add(page_size).min(self.total_rows);

        // slice shares the underlying buffers
        let view = batch.slice(offset, end - offset);
        Ok(batch_to_rows(&view)?)
    }

    pub fn current_page(&self) -> Result<Vec<Row>> {
        self.page(self.page_index, self.page_size)
    }

    /// Number of pages at the current page size
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.total_rows.div_ceil(self.page_size)
    }

    #[must_use]
    pub fn last_page_index(&self) -> usize {
        self.page_count().saturating_sub(1)
    }

    /// Move to `page_index`, clamped to the valid range. Returns the index
    /// actually selected.
    pub fn set_page_index(&mut self, page_index: usize) -> usize {
        self.page_index = page_index.min(self.last_page_index());
        self.page_index
    }

    /// Change the page size, re-clamping the page index for the new size
    pub fn set_page_size(&mut self, page_size: usize) -> Result<usize> {
        check_page_size(page_size)?;
        self.page_size = page_size;
        Ok(self.set_page_index(self.page_index))
    }

    #[must_use]
    pub fn state(&self) -> PaginationState {
        PaginationState {
            page_index: self.page_index,
            page_size: self.page_size,
            total_rows: self.total_rows,
        }
    }

    #[must_use]
    pub fn page_index(&self) -> usize {
        self.page_index
    }

    #[must_use]
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    #[must_use]
    pub fn total_rows(&self) -> usize {
        self.total_rows
    }

    #[must_use]
    pub fn has_batch(&self) -> bool {
        self.batch.is_some()
    }

    /// Schema of the current result, if any
    #[must_use]
    pub fn schema(&self) -> Option<SchemaRef> {
        self.batch.as_ref().map(|b| b.schema())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow_array::{ArrayRef, Int32Array};

    fn batch(n: i32) -> RecordBatch {
        RecordBatch::try_from_iter(vec![(
            "n",
            Arc::new(Int32Array::from((0..n).collect::<Vec<_>>())) as ArrayRef,
        )])
        .unwrap()
    }

    #[test]
    fn test_empty_pager() {
        let pager = ResultPager::default();
        assert_eq!(pager.page_count(), 0);
        assert_eq!(pager.last_page_index(), 0);
        assert!(pager.current_page().unwrap().is_empty());
    }

    #[test]
    fn test_rejects_unknown_page_size() {
        assert!(matches!(
            ResultPager::new(7),
            Err(PagerError::UnsupportedPageSize(7))
        ));
        let mut pager = ResultPager::default();
        assert!(pager.set_page_size(33).is_err());
        assert_eq!(pager.page_size(), DEFAULT_PAGE_SIZE);
        assert!(pager.page(0, 33).is_err());
    }

    #[test]
    fn test_set_page_index_clamps() {
        let mut pager = ResultPager::new(10).unwrap();
        pager.set_batch(batch(25));
        assert_eq!(pager.set_page_index(99), 2);
        assert_eq!(pager.current_page().unwrap().len(), 5);

        pager.set_batch(batch(0));
        assert_eq!(pager.page_index(), 0);
        assert_eq!(pager.set_page_index(3), 0);
    }

    #[test]
    fn test_stale_run_is_discarded() {
        let mut pager = ResultPager::default();
        let first = pager.begin_run();
        let second = pager.begin_run();

        assert!(!pager.finish_run(first, batch(3)));
        assert!(!pager.has_batch());

        assert!(pager.finish_run(second, batch(4)));
        assert_eq!(pager.total_rows(), 4);

        // A ticket is only good once
        assert!(!pager.finish_run(second, batch(5)));
        assert_eq!(pager.total_rows(), 4);
    }

    #[test]
    fn test_reset_keeps_page_size() {
        let mut pager = ResultPager::new(100).unwrap();
        pager.set_batch(batch(500));
        let _ = pager.set_page_index(3);
        pager.reset();
        assert_eq!(
            pager.state(),
            PaginationState {
                page_index: 0,
                page_size: 100,
                total_rows: 0
            }
        );
        assert!(pager.schema().is_none());
    }
}
