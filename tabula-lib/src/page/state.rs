//! Page index/size bookkeeping.

use std::ops::Range;

use serde::Serialize;

use crate::error::GridError;

/// Current page position.
///
/// `page_size` is never zero; constructors and setters reject it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PaginationState {
    page_index: usize,
    page_size: usize,
}

/// A clamp applied after the row count shrank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageClamp {
    /// Page index before the clamp.
    pub from: usize,
    /// Page index after the clamp.
    pub to: usize,
}

impl PaginationState {
    /// First page with the given size.
    pub fn new(page_size: usize) -> Result<Self, GridError> {
        if page_size == 0 {
            return Err(GridError::ZeroPageSize);
        }
        Ok(Self {
            page_index: 0,
            page_size,
        })
    }

    /// Zero-based page index.
    pub fn page_index(&self) -> usize {
        self.page_index
    }

    /// Rows per page.
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Offset of the first row of the page.
    pub fn offset(&self) -> usize {
        self.page_index.saturating_mul(self.page_size)
    }

    /// Number of pages needed for `total` rows: `ceil(total / page_size)`.
    pub fn page_count(&self, total: usize) -> usize {
        total.div_ceil(self.page_size)
    }

    /// Highest valid page index for `total` rows (0 when empty).
    pub fn last_page_index(&self, total: usize) -> usize {
        self.page_count(total).saturating_sub(1)
    }

    /// Row range of the current page within `total` rows.
    pub fn range(&self, total: usize) -> Range<usize> {
        let start = self.offset().min(total);
        let end = start.saturating_add(self.page_size).min(total);
        start..end
    }

    /// Returns `true` if a page after the current one exists.
    pub fn has_next(&self, total: usize) -> bool {
        self.page_index < self.last_page_index(total)
    }

    /// Returns `true` if a page before the current one exists.
    pub fn has_previous(&self) -> bool {
        self.page_index > 0
    }

    /// Move to a page without bounds checking. Returns `true` if it changed.
    pub fn set_page_index(&mut self, page_index: usize) -> bool {
        let changed = self.page_index != page_index;
        self.page_index = page_index;
        changed
    }

    /// Change the page size, always returning to the first page.
    pub fn set_page_size(&mut self, page_size: usize) -> Result<(), GridError> {
        if page_size == 0 {
            return Err(GridError::ZeroPageSize);
        }
        self.page_size = page_size;
        self.page_index = 0;
        Ok(())
    }

    /// Pull the page index back to the last valid page for `total` rows.
    ///
    /// Returns the clamp when one was applied.
    pub fn clamp(&mut self, total: usize) -> Option<PageClamp> {
        let last = self.last_page_index(total);
        if self.page_index <= last {
            return None;
        }
        let clamp = PageClamp {
            from: self.page_index,
            to: last,
        };
        self.page_index = last;
        Some(clamp)
    }
}

impl Default for PaginationState {
    fn default() -> Self {
        Self {
            page_index: 0,
            page_size: crate::config::DEFAULT_PAGE_SIZE,
        }
    }
}
