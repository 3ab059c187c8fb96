//! Pagination in client and server mode.
//!
//! In client mode the [`Paginator`] slices the filtered, sorted collection
//! locally. In server mode it only describes the request; the page source
//! owns the real result set and answers with a [`PageResponse`].

mod query;
mod state;

pub use query::{PageQuery, PageResponse};
pub use state::{PageClamp, PaginationState};

use crate::filter::FilterState;
use crate::sort::SortState;

/// Client-side slicing and server-side request shaping.
#[derive(Debug, Clone, Copy, Default)]
pub struct Paginator;

impl Paginator {
    /// The rows of the current page.
    ///
    /// Callers clamp the state first; an out-of-range page yields an empty
    /// slice rather than panicking.
    pub fn slice<'a, R>(rows: &'a [R], state: &PaginationState) -> &'a [R] {
        &rows[state.range(rows.len())]
    }

    /// The outbound request for the current page, sort and committed filter.
    pub fn describe(pagination: &PaginationState, sort: &SortState, filter: &FilterState) -> PageQuery {
        let mut query = PageQuery::new(pagination.page_index(), pagination.page_size());
        for key in sort.keys() {
            query = query.with_sort(key.column_id.clone(), key.direction);
        }
        if let Some(global) = filter.active_global() {
            query = query.with_global(global);
        }
        for (column, text) in filter.active_columns() {
            query = query.with_filter(column, text);
        }
        query
    }
}
