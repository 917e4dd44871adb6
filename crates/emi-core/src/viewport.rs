//! Paged view over a computed amortization schedule.
//!
//! The viewport only tracks page position; it slices the caller's schedule
//! and never recomputes anything. Navigation past either end is a silent
//! no-op.

use serde::{Deserialize, Serialize};
use std::ops::Range;

use crate::amortization::ScheduleEntry;
use crate::error::EmiError;
use crate::EmiResult;

/// Rows per page in the schedule table (one year of monthly payments).
pub const PAGE_SIZE: usize = 12;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleViewport {
    page_size: usize,
    current_page: usize,
    schedule_len: usize,
}

impl ScheduleViewport {
    /// Viewport on page 1 with the standard page size.
    pub fn new(schedule_len: usize) -> Self {
        Self {
            page_size: PAGE_SIZE,
            current_page: 1,
            schedule_len,
        }
    }

    pub fn with_page_size(schedule_len: usize, page_size: usize) -> EmiResult<Self> {
        if page_size == 0 {
            return Err(EmiError::InvalidInput {
                field: "page_size".into(),
                reason: "Page size must be greater than zero".into(),
            });
        }
        Ok(Self {
            page_size,
            current_page: 1,
            schedule_len,
        })
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn schedule_len(&self) -> usize {
        self.schedule_len
    }

    /// `ceil(schedule_len / page_size)`; zero for an empty schedule.
    pub fn total_pages(&self) -> usize {
        self.schedule_len.div_ceil(self.page_size)
    }

    /// Index range of page `n` (1-based), clamped to the schedule.
    /// Page 0 and pages past the end are empty.
    pub fn page_bounds(&self, n: usize) -> Range<usize> {
        if n == 0 {
            return 0..0;
        }
        let start = (n - 1).saturating_mul(self.page_size).min(self.schedule_len);
        let end = n.saturating_mul(self.page_size).min(self.schedule_len);
        start..end
    }

    pub fn page<'a, T>(&self, items: &'a [T], n: usize) -> &'a [T] {
        let bounds = self.page_bounds(n);
        let end = bounds.end.min(items.len());
        let start = bounds.start.min(end);
        &items[start..end]
    }

    /// Rows on the current page.
    pub fn current<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        self.page(items, self.current_page)
    }

    pub fn next(&mut self) {
        if self.current_page < self.total_pages() {
            self.current_page += 1;
        }
    }

    pub fn prev(&mut self) {
        if self.current_page > 1 {
            self.current_page -= 1;
        }
    }

    /// Point the viewport at a freshly computed schedule and go back to page 1.
    pub fn reset(&mut self, schedule_len: usize) {
        self.schedule_len = schedule_len;
        self.current_page = 1;
    }

    /// Owned snapshot of page `n` for serialization.
    pub fn snapshot(&self, schedule: &[ScheduleEntry], n: usize) -> SchedulePage {
        SchedulePage {
            page: n,
            total_pages: self.total_pages(),
            page_size: self.page_size,
            entries: self.page(schedule, n).to_vec(),
        }
    }
}

/// One page of the schedule as handed to a front end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulePage {
    pub page: usize,
    pub total_pages: usize,
    pub page_size: usize,
    pub entries: Vec<ScheduleEntry>,
}

impl SchedulePage {
    pub fn rounded(&self, dp: u32) -> Self {
        Self {
            page: self.page,
            total_pages: self.total_pages,
            page_size: self.page_size,
            entries: self.entries.iter().map(|e| e.rounded(dp)).collect(),
        }
    }
}
