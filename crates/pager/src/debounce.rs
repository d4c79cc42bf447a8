// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::error::Result;
use crate::pager::{ResultPager, RunTicket};
use arrow_array::RecordBatch;
use log::debug;
use std::time::{Duration, Instant};

pub const DEFAULT_RESET_DELAY: Duration = Duration::from_millis(150);

/// Deadline-based debounce. Time is passed in by the caller so the
/// behavior does not depend on any scheduler.
#[derive(Debug, Clone)]
pub struct ResetDebouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl ResetDebouncer {
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// Arm the debouncer, pushing any pending deadline out
    pub fn text_changed(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    /// True exactly once, on the first poll at or after the deadline
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }
}

/// A [`ResultPager`] tied to the text of the query that produced it.
///
/// Editing the text immediately invalidates in-flight runs; the displayed
/// result is cleared once the text has been stable for the reset delay.
#[derive(Debug)]
pub struct QueryPager {
    pager: ResultPager,
    debouncer: ResetDebouncer,
    query_text: Option<String>,
}

impl QueryPager {
    pub fn new(page_size: usize, reset_delay: Duration) -> Result<Self> {
        Ok(Self {
            pager: ResultPager::new(page_size)?,
            debouncer: ResetDebouncer::new(reset_delay),
            query_text: None,
        })
    }

    /// Record the current query text. Returns true when it differs from the
    /// last text seen.
    pub fn on_query_text(&mut self, text: &str, now: Instant) -> bool {
        if self.query_text.as_deref() == Some(text) {
            return false;
        }
        self.query_text = Some(text.to_string());
        self.pager.invalidate_runs();
        self.debouncer.text_changed(now);
        true
    }

    /// Perform a due reset. Returns true if the pager was cleared.
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.debouncer.poll(now) {
            debug!("Query text settled, resetting pager");
            self.pager.reset();
            true
        } else {
            false
        }
    }

    /// Start a run for the current text. A pending reset is dropped since
    /// the run clears the pager itself.
    pub fn begin_run(&mut self) -> RunTicket {
        self.debouncer.cancel();
        self.pager.begin_run()
    }

    pub fn finish_run(&mut self, ticket: RunTicket, batch: RecordBatch) -> bool {
        self.pager.finish_run(ticket, batch)
    }

    #[must_use]
    pub fn query_text(&self) -> Option<&str> {
        self.query_text.as_deref()
    }

    #[must_use]
    pub fn pager(&self) -> &ResultPager {
        &self.pager
    }

    pub fn pager_mut(&mut self) -> &mut ResultPager {
        &mut self.pager
    }

    #[must_use]
    pub fn reset_pending(&self) -> bool {
        self.debouncer.is_pending()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow_array::{ArrayRef, Int32Array};
    use std::sync::Arc;

    fn batch(n: i32) -> RecordBatch {
        RecordBatch::try_from_iter(vec![(
            "n",
            Arc::new(Int32Array::from((0..n).collect::<Vec<_>>())) as ArrayRef,
        )])
        .unwrap()
    }

    #[test]
    fn test_debouncer_fires_once_after_quiet_period() {
        let start = Instant::now();
        let mut d = ResetDebouncer::new(Duration::from_millis(100));
        assert!(!d.poll(start));

        d.text_changed(start);
        d.text_changed(start + Duration::from_millis(60));
        assert!(!d.poll(start + Duration::from_millis(120)));
        assert!(d.poll(start + Duration::from_millis(160)));
        assert!(!d.poll(start + Duration::from_millis(500)));
    }

    #[test]
    fn test_rapid_edits_reset_once() {
        let start = Instant::now();
        let mut qp = QueryPager::new(50, Duration::from_millis(100)).unwrap();
        let ticket = qp.begin_run();
        assert!(qp.finish_run(ticket, batch(10)));

        for (i, text) in ["s", "se", "sel", "sele"].iter().enumerate() {
            assert!(qp.on_query_text(text, start + Duration::from_millis(20 * i as u64)));
            assert!(!qp.tick(start + Duration::from_millis(20 * i as u64 + 10)));
            // Result stays visible while typing
            assert_eq!(qp.pager().total_rows(), 10);
        }

        assert!(qp.tick(start + Duration::from_millis(200)));
        assert!(!qp.pager().has_batch());
        assert!(!qp.tick(start + Duration::from_millis(400)));
    }

    #[test]
    fn test_same_text_does_not_arm() {
        let now = Instant::now();
        let mut qp = QueryPager::new(50, Duration::from_millis(10)).unwrap();
        assert!(qp.on_query_text("select 1", now));
        assert!(qp.tick(now + Duration::from_millis(10)));
        assert!(!qp.on_query_text("select 1", now + Duration::from_millis(20)));
        assert!(!qp.reset_pending());
    }

    #[test]
    fn test_edit_during_run_discards_result() {
        let now = Instant::now();
        let mut qp = QueryPager::new(50, Duration::from_millis(10)).unwrap();
        let _ = qp.on_query_text("select 1", now);
        let ticket = qp.begin_run();

        let _ = qp.on_query_text("select 2", now + Duration::from_millis(1));
        assert!(!qp.finish_run(ticket, batch(1)));
        assert!(!qp.pager().has_batch());
    }

    #[test]
    fn test_run_cancels_pending_reset() {
        let now = Instant::now();
        let mut qp = QueryPager::new(50, Duration::from_millis(50)).unwrap();
        let _ = qp.on_query_text("select 3", now);
        let ticket = qp.begin_run();
        assert!(qp.finish_run(ticket, batch(3)));

        assert!(!qp.tick(now + Duration::from_millis(100)));
        assert_eq!(qp.pager().total_rows(), 3);
    }
}
