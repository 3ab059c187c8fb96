//! Windowed rendering.
//!
//! The virtualizer turns a scroll offset into the index range of rows worth
//! rendering plus the padding needed above and below them, so the scroll
//! container keeps the geometry of the full list.

use std::ops::Range;

use log::trace;

use crate::model::Row;

/// Scroll position reported by the host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrollMetrics {
    /// Distance scrolled from the top, in the host's height units.
    pub scroll_offset: u64,
    /// Height of the visible viewport.
    pub viewport_height: u64,
}

impl ScrollMetrics {
    /// Creates scroll metrics.
    pub fn new(scroll_offset: u64, viewport_height: u64) -> Self {
        Self {
            scroll_offset,
            viewport_height,
        }
    }
}

/// The computed render window.
///
/// `padding_top + (range.len() * row_height) + padding_bottom == total_height`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Window {
    /// Indices of rows to render, overscan included.
    pub range: Range<usize>,
    /// Height of the rows above the window.
    pub padding_top: u64,
    /// Height of the rows below the window.
    pub padding_bottom: u64,
    /// Height of every row together.
    pub total_height: u64,
}

impl Window {
    fn empty(total_height: u64) -> Self {
        Self {
            range: 0..0,
            padding_top: 0,
            padding_bottom: total_height,
            total_height,
        }
    }
}

/// A rendered row with its explicit virtual index.
///
/// `index` is the row's position in the list that was windowed. It is only
/// valid for the frame it was computed in; selection always goes through
/// `row.key()`.
#[derive(Debug, Clone, Copy)]
pub struct VirtualRow<'a, T> {
    /// Position in the windowed list.
    pub index: usize,
    /// The logical row.
    pub row: &'a Row<T>,
}

/// Fixed-height row virtualizer with overscan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Virtualizer {
    row_height: u64,
    overscan: usize,
}

impl Virtualizer {
    /// Create a virtualizer. A zero row height is treated as one.
    pub fn new(row_height: u64, overscan: usize) -> Self {
        Self {
            row_height: row_height.max(1),
            overscan,
        }
    }

    /// Estimated row height.
    pub fn row_height(&self) -> u64 {
        self.row_height
    }

    /// Rows rendered beyond each edge of the viewport.
    pub fn overscan(&self) -> usize {
        self.overscan
    }

    /// Height of `count` rows.
    pub fn total_height(&self, count: usize) -> u64 {
        (count as u64).saturating_mul(self.row_height)
    }

    /// Largest meaningful scroll offset for `count` rows.
    pub fn max_scroll_offset(&self, count: usize, viewport_height: u64) -> u64 {
        self.total_height(count).saturating_sub(viewport_height)
    }

    /// Compute the render window for `count` rows.
    ///
    /// Offsets past the end are clamped, so a window computed right after the
    /// row count shrank still covers real rows.
    pub fn window(&self, count: usize, metrics: ScrollMetrics) -> Window {
        let total_height = self.total_height(count);
        if count == 0 || metrics.viewport_height == 0 {
            return Window::empty(total_height);
        }

        let offset = metrics
            .scroll_offset
            .min(self.max_scroll_offset(count, metrics.viewport_height));
        let first_visible = (offset / self.row_height) as usize;
        let visible_end = (offset + metrics.viewport_height).div_ceil(self.row_height) as usize;

        let start = first_visible.saturating_sub(self.overscan).min(count);
        let end = visible_end.saturating_add(self.overscan).min(count);

        let window = Window {
            range: start..end,
            padding_top: self.total_height(start),
            padding_bottom: self.total_height(count - end),
            total_height,
        };
        trace!(
            "Window {:?} of {} rows (offset {}, viewport {})",
            window.range, count, offset, metrics.viewport_height
        );
        window
    }

    /// Window over `rows` with each rendered row paired to its virtual index.
    pub fn visible_rows<'a, T>(&self, rows: &[&'a Row<T>], metrics: ScrollMetrics) -> (Window, Vec<VirtualRow<'a, T>>) {
        let window = self.window(rows.len(), metrics);
        let visible = window
            .range
            .clone()
            .map(|index| VirtualRow {
                index,
                row: rows[index],
            })
            .collect();
        (window, visible)
    }

    /// Smallest scroll change that brings row `index` fully into view.
    pub fn scroll_to_index(&self, count: usize, metrics: ScrollMetrics, index: usize) -> u64 {
        if index >= count || metrics.viewport_height == 0 {
            return metrics.scroll_offset;
        }
        let top = self.total_height(index);
        let bottom = top.saturating_add(self.row_height);
        if top < metrics.scroll_offset {
            top
        } else if bottom > metrics.scroll_offset.saturating_add(metrics.viewport_height) {
            bottom.saturating_sub(metrics.viewport_height)
        } else {
            metrics.scroll_offset
        }
    }

    /// Returns `true` if the last visible row is within `threshold` rows of
    /// the end. Hosts use it to load more rows ahead of the user.
    pub fn is_near_end(&self, count: usize, metrics: ScrollMetrics, threshold: usize) -> bool {
        if count == 0 {
            return true;
        }
        let offset = metrics
            .scroll_offset
            .min(self.max_scroll_offset(count, metrics.viewport_height));
        let last_visible = ((offset + metrics.viewport_height).div_ceil(self.row_height) as usize).min(count);
        count - last_visible <= threshold
    }
}
