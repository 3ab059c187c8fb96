//! In-memory page source

use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::time::Duration;

use async_trait::async_trait;
use log::debug;

use super::PageSource;
use crate::error::FetchError;
use crate::filter::{FilterEngine, FilterMode, FilterState};
use crate::model::{Column, Row};
use crate::page::{PageQuery, PageResponse};
use crate::sort::{Direction, SortEngine, SortState};

/// A page source that answers queries from rows held in memory.
///
/// It filters, sorts and slices exactly as a remote backend would, so it
/// stands in for one in hosts and tests. Out-of-range pages come back empty
/// with the real total; clamping is the grid's job.
///
/// # Example
///
/// ```
/// use tabula_lib::model::{Column, Row};
/// use tabula_lib::page::PageQuery;
/// use tabula_lib::source::MemorySource;
///
/// let rows: Vec<Row<u32>> = (0..45u32).map(|n| Row::new(n, n)).collect();
/// let columns = vec![Column::new("n", "N", |n: &u32| *n).sortable()];
/// let source = MemorySource::new(rows, columns);
///
/// let page = source.answer(&PageQuery::new(2, 20));
/// assert_eq!(page.total, 45);
/// assert_eq!(page.items.len(), 5);
/// ```
pub struct MemorySource<T> {
    rows: Vec<Row<T>>,
    columns: Vec<Column<T>>,
    filter_mode: FilterMode,
    latency: Option<Duration>,
    calls: AtomicUsize,
}

impl<T: Clone> MemorySource<T> {
    /// Creates a source over `rows`, filtered and sorted through `columns`.
    pub fn new(rows: Vec<Row<T>>, columns: Vec<Column<T>>) -> Self {
        Self {
            rows,
            columns,
            filter_mode: FilterMode::Substring,
            latency: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Sets how the global query is matched.
    pub fn with_filter_mode(mut self, filter_mode: FilterMode) -> Self {
        self.filter_mode = filter_mode;
        self
    }

    /// Delay every answer by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Number of rows held.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if the source holds no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of fetches received so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }

    /// Answer a query synchronously.
    pub fn answer(&self, query: &PageQuery) -> PageResponse<T> {
        let mut filter = FilterState::new();
        if let Some(global) = &query.global {
            filter.set_global(global.clone());
        }
        for (column, text) in &query.filters {
            filter.set_column(column.clone(), text.clone());
        }

        let mut sort = SortState::new();
        for key in &query.sort {
            sort.set(key.column_id.clone(), key.direction);
        }
        if sort.is_empty()
            && let Some(column) = &query.sort_by
        {
            sort.set(column.clone(), query.sort_dir.unwrap_or(Direction::Asc));
        }

        let mut engine = FilterEngine::new(self.filter_mode);
        let mut indices = engine.matching_indices(&self.rows, &self.columns, &filter);
        SortEngine::sort_indices(&self.rows, &mut indices, &self.columns, &sort);

        let total = indices.len();
        let start = query.offset().min(total);
        let end = start.saturating_add(query.page_size).min(total);
        let items = indices[start..end].iter().map(|&i| self.rows[i].clone()).collect();

        debug!(
            "Memory source answered page {} ({} of {} rows)",
            query.page,
            end - start,
            total
        );
        PageResponse::new(items, total)
    }
}

impl<T> std::fmt::Debug for MemorySource<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemorySource")
            .field("rows", &self.rows.len())
            .field("columns", &self.columns.len())
            .field("filter_mode", &self.filter_mode)
            .field("latency", &self.latency)
            .finish()
    }
}

#[async_trait]
impl<T> PageSource<T> for MemorySource<T>
where
    T: Clone + Send + Sync + 'static,
{
    async fn fetch_page(&self, query: PageQuery) -> Result<PageResponse<T>, FetchError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        Ok(self.answer(&query))
    }
}
