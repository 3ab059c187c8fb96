//! Grid state and local operations

use std::collections::HashSet;
use std::sync::Arc;

use log::debug;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::config::GridConfig;
use crate::error::GridError;
use crate::export::{ExportTable, Exporter};
use crate::filter::{Debouncer, FilterEngine, FilterMode, FilterState};
use crate::model::{Column, Row, RowKey, find_column};
use crate::page::{PaginationState, Paginator};
use crate::selection::{Selection, SelectionDelta, SelectionMode};
use crate::sort::{Direction, SortEngine, SortState};
use crate::source::{PageSource, RequestTracker};
use crate::viewport::{ScrollMetrics, VirtualRow, Virtualizer, Window};

use super::Mode;
use super::backend::{Backend, ClientData, ServerData};
use super::events::{EventBus, GridEvent};

/// A data grid over rows of `T`.
///
/// The grid is single-owner: every operation takes `&mut self`, runs to
/// completion without blocking and reports what it committed as
/// [`GridEvent`]s. Only server fetches are asynchronous, and they come back
/// through [`complete_fetch`](Self::complete_fetch) or the spawned-fetch
/// helpers.
///
/// # Example
///
/// ```
/// use tabula_lib::config::GridConfig;
/// use tabula_lib::grid::DataGrid;
/// use tabula_lib::model::{Column, Row};
///
/// #[derive(Clone)]
/// struct Port {
///     name: String,
///     speed: u32,
/// }
///
/// let rows = vec![
///     Row::new("p1", Port { name: "north-uplink".into(), speed: 10 }),
///     Row::new("p2", Port { name: "south-uplink".into(), speed: 40 }),
///     Row::new("p3", Port { name: "north-mgmt".into(), speed: 1 }),
/// ];
/// let columns = vec![
///     Column::new("name", "Name", |p: &Port| p.name.clone()),
///     Column::new("speed", "Speed", |p: &Port| p.speed).sortable(),
/// ];
///
/// let mut grid = DataGrid::client(columns, rows, GridConfig::default()).unwrap();
/// grid.set_global_filter("north").unwrap();
/// grid.toggle_sort("speed").unwrap();
///
/// let names: Vec<&str> = grid.page_rows().iter().map(|r| r.data().name.as_str()).collect();
/// assert_eq!(names, vec!["north-mgmt", "north-uplink"]);
/// ```
pub struct DataGrid<T> {
    pub(super) columns: Vec<Column<T>>,
    pub(super) config: GridConfig,
    /// Committed filter.
    pub(super) filter: FilterState,
    /// What has been typed, committed or not.
    pub(super) draft: FilterState,
    pub(super) debouncer: Debouncer<FilterState>,
    pub(super) filter_engine: FilterEngine,
    pub(super) sort: SortState,
    pub(super) pagination: PaginationState,
    pub(super) selection: Selection,
    pub(super) virtualizer: Virtualizer,
    pub(super) backend: Backend<T>,
    pub(super) cancel: CancellationToken,
    pub(super) torn_down: bool,
    pub(super) events: EventBus,
}

impl<T> DataGrid<T> {
    /// Client-mode grid over every row.
    pub fn client(columns: Vec<Column<T>>, rows: Vec<Row<T>>, config: GridConfig) -> Result<Self, GridError> {
        let data = ClientData::new(rows)?;
        let mut grid = Self::build(columns, Backend::Client(data), config)?;
        grid.refresh_filter();
        Ok(grid)
    }

    /// Server-mode grid fed by `source`.
    ///
    /// Nothing is fetched until the host asks for it.
    pub fn server(
        columns: Vec<Column<T>>,
        source: impl PageSource<T> + 'static,
        config: GridConfig,
    ) -> Result<Self, GridError> {
        Self::server_shared(columns, Arc::new(source), config)
    }

    /// Server-mode grid over a shared source.
    pub fn server_shared(
        columns: Vec<Column<T>>,
        source: Arc<dyn PageSource<T>>,
        config: GridConfig,
    ) -> Result<Self, GridError> {
        let backend = Backend::Server(ServerData::new(source, RequestTracker::new()));
        Self::build(columns, backend, config)
    }

    fn build(columns: Vec<Column<T>>, backend: Backend<T>, config: GridConfig) -> Result<Self, GridError> {
        config.validate()?;
        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.id()) {
                return Err(GridError::DuplicateColumn(column.id().to_string()));
            }
        }

        debug!(
            "Creating {} grid with {} columns, page size {}",
            backend.mode(),
            columns.len(),
            config.page_size
        );

        Ok(Self {
            columns,
            filter: FilterState::new(),
            draft: FilterState::new(),
            debouncer: Debouncer::new(config.debounce),
            filter_engine: FilterEngine::new(config.filter_mode),
            sort: SortState::new(),
            pagination: PaginationState::new(config.page_size)?,
            selection: Selection::new(),
            virtualizer: Virtualizer::new(config.row_height, config.overscan),
            backend,
            cancel: CancellationToken::new(),
            torn_down: false,
            events: EventBus::default(),
            config,
        })
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Data-sourcing mode.
    pub fn mode(&self) -> Mode {
        self.backend.mode()
    }

    /// Declared columns.
    pub fn columns(&self) -> &[Column<T>] {
        &self.columns
    }

    /// Active configuration.
    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    /// Committed filter.
    pub fn filter_state(&self) -> &FilterState {
        &self.filter
    }

    /// Filter as typed, including input still waiting out the debounce window.
    pub fn draft_filter(&self) -> &FilterState {
        &self.draft
    }

    /// Returns `true` if typed input has not been committed yet.
    pub fn has_pending_filter(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Sort keys.
    pub fn sort_state(&self) -> &SortState {
        &self.sort
    }

    /// Page index and size.
    pub fn pagination(&self) -> &PaginationState {
        &self.pagination
    }

    /// Zero-based page index.
    pub fn page_index(&self) -> usize {
        self.pagination.page_index()
    }

    /// Rows per page.
    pub fn page_size(&self) -> usize {
        self.pagination.page_size()
    }

    /// Rows matching the committed filter. In server mode this is the
    /// source's total, 0 until the first page commits.
    pub fn total(&self) -> usize {
        self.known_total().unwrap_or(0)
    }

    /// Number of pages for [`total`](Self::total).
    pub fn page_count(&self) -> usize {
        self.pagination.page_count(self.total())
    }

    pub(super) fn known_total(&self) -> Option<usize> {
        match &self.backend {
            Backend::Client(data) => Some(data.view.len()),
            Backend::Server(server) => server.total,
        }
    }

    /// Filtered rows in display order.
    ///
    /// In server mode only the current page is held, so this is the page.
    pub fn filtered_rows(&self) -> Vec<&Row<T>> {
        match &self.backend {
            Backend::Client(data) => data.view_rows().collect(),
            Backend::Server(server) => server.page.iter().collect(),
        }
    }

    /// Rows of the current page.
    pub fn page_rows(&self) -> Vec<&Row<T>> {
        match &self.backend {
            Backend::Client(data) => Paginator::slice(&data.view, &self.pagination)
                .iter()
                .map(|&i| &data.rows[i])
                .collect(),
            Backend::Server(server) => server.page.iter().collect(),
        }
    }

    /// Keys of the filtered rows in display order.
    pub fn filtered_keys(&self) -> Vec<RowKey> {
        self.filtered_rows().into_iter().map(|r| r.key().clone()).collect()
    }

    /// Look up a loaded row by key.
    pub fn row(&self, key: &str) -> Option<&Row<T>> {
        match &self.backend {
            Backend::Client(data) => data.get(key),
            Backend::Server(server) => server.page.iter().find(|r| r.key().as_str() == key),
        }
    }

    /// Render window over the current page for a scroll position.
    ///
    /// Recomputed from the live row count on every call.
    pub fn window(&self, metrics: ScrollMetrics) -> Window {
        self.virtualizer.window(self.page_rows().len(), metrics)
    }

    /// Rows of the current page inside the render window.
    pub fn visible_rows(&self, metrics: ScrollMetrics) -> Vec<VirtualRow<'_, T>> {
        let rows = self.page_rows();
        self.virtualizer.visible_rows(&rows, metrics).1
    }

    /// Scroll offset that brings the row with `key` into view, if it is on
    /// the current page.
    pub fn scroll_to_row(&self, key: &str, metrics: ScrollMetrics) -> Option<u64> {
        let rows = self.page_rows();
        let index = rows.iter().position(|r| r.key().as_str() == key)?;
        Some(self.virtualizer.scroll_to_index(rows.len(), metrics, index))
    }

    /// Display text for one cell, falling back to the placeholder for
    /// missing values.
    pub fn cell_text(&self, row: &Row<T>, column_id: &str) -> Result<String, GridError> {
        let column = find_column(&self.columns, column_id).ok_or_else(|| GridError::UnknownColumn(column_id.to_string()))?;
        Ok(column.render(row.data(), &self.config.placeholder))
    }

    /// Selection state.
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Selected keys, sorted.
    pub fn selected_keys(&self) -> Vec<RowKey> {
        self.selection.selected_keys()
    }

    /// Returns `true` if the row with `key` is selected.
    pub fn is_selected(&self, key: &str) -> bool {
        self.selection.is_selected(key)
    }

    /// Selected rows among the filtered rows, in display order.
    pub fn selected_rows(&self) -> Vec<&Row<T>> {
        self.selection.selected_rows(self.filtered_rows())
    }

    // =========================================================================
    // Export
    // =========================================================================

    /// Every filtered row.
    pub fn export_filtered(&self) -> ExportTable {
        Exporter::to_table(self.filtered_rows(), &self.columns)
    }

    /// The selected rows passing the filter, or every filtered row when none
    /// of the selected rows pass it (or nothing is selected).
    pub fn export_selection(&self) -> ExportTable {
        let selected = self.selected_rows();
        if selected.is_empty() {
            return self.export_filtered();
        }
        Exporter::to_table(selected, &self.columns)
    }

    /// The current page.
    pub fn export_page(&self) -> ExportTable {
        Exporter::to_table(self.page_rows(), &self.columns)
    }

    // =========================================================================
    // Filtering
    // =========================================================================

    /// Record typed global filter input. It commits once the debounce window
    /// passes without further input.
    pub fn input_global_filter(&mut self, text: impl Into<String>) -> Result<(), GridError> {
        self.ensure_live()?;
        self.draft.set_global(text);
        self.debouncer.push(self.draft.clone(), Instant::now());
        Ok(())
    }

    /// Record typed per-column filter input. Debounced like the global input.
    pub fn input_column_filter(&mut self, column_id: &str, text: impl Into<String>) -> Result<(), GridError> {
        self.ensure_live()?;
        self.filterable_column(column_id)?;
        self.draft.set_column(column_id, text);
        self.debouncer.push(self.draft.clone(), Instant::now());
        Ok(())
    }

    /// Set and commit the global filter immediately.
    ///
    /// Returns `true` if the committed filter changed.
    pub fn set_global_filter(&mut self, text: impl Into<String>) -> Result<bool, GridError> {
        self.ensure_live()?;
        self.draft.set_global(text);
        self.debouncer.cancel();
        Ok(self.commit_filter(self.draft.clone()))
    }

    /// Set and commit a per-column filter immediately. Empty text removes it.
    pub fn set_column_filter(&mut self, column_id: &str, text: impl Into<String>) -> Result<bool, GridError> {
        self.ensure_live()?;
        self.filterable_column(column_id)?;
        self.draft.set_column(column_id, text);
        self.debouncer.cancel();
        Ok(self.commit_filter(self.draft.clone()))
    }

    /// Drop every filter, typed or committed.
    pub fn clear_filters(&mut self) -> Result<bool, GridError> {
        self.ensure_live()?;
        self.draft.clear();
        self.debouncer.cancel();
        Ok(self.commit_filter(FilterState::new()))
    }

    /// Switch global matching between substring and fuzzy.
    pub fn set_filter_mode(&mut self, mode: FilterMode) -> Result<(), GridError> {
        self.ensure_live()?;
        if self.filter_engine.mode() == mode {
            return Ok(());
        }
        self.filter_engine.set_mode(mode);
        self.config.filter_mode = mode;
        if self.filter.active_global().is_some() {
            self.refresh_filter();
            self.clamp_client_page();
        }
        Ok(())
    }

    /// Commit debounced input whose window has passed.
    ///
    /// Returns `true` if the committed filter changed.
    pub fn tick(&mut self) -> bool {
        if self.torn_down {
            return false;
        }
        match self.debouncer.poll(Instant::now()) {
            Some(state) => self.commit_filter(state),
            None => false,
        }
    }

    /// Wait out the debounce window, then commit.
    ///
    /// Returns immediately when nothing is pending.
    pub async fn settle(&mut self) -> bool {
        if self.torn_down {
            return false;
        }
        match self.debouncer.wait().await {
            Some(state) => self.commit_filter(state),
            None => false,
        }
    }

    /// Commit pending input now, skipping the rest of the window.
    pub fn flush_filter(&mut self) -> bool {
        if self.torn_down {
            return false;
        }
        match self.debouncer.flush() {
            Some(state) => self.commit_filter(state),
            None => false,
        }
    }

    fn commit_filter(&mut self, state: FilterState) -> bool {
        if state == self.filter {
            return false;
        }
        debug!("Committing filter {:?}", state);
        self.filter = state;
        self.events.emit(GridEvent::FilterChanged(self.filter.clone()));
        self.refresh_filter();
        self.forget_server_total();
        self.clamp_client_page();
        true
    }

    // =========================================================================
    // Sorting
    // =========================================================================

    /// Single-sort header click: ascending, descending, then unsorted.
    ///
    /// Other sort keys are dropped. Returns the column's new direction.
    pub fn toggle_sort(&mut self, column_id: &str) -> Result<Option<Direction>, GridError> {
        self.ensure_live()?;
        self.sortable_column(column_id)?;
        let direction = self.sort.toggle(column_id);
        self.sort_changed();
        Ok(direction)
    }

    /// Multi-sort header click: cycles only this column's key, keeping the
    /// others.
    pub fn toggle_sort_multi(&mut self, column_id: &str) -> Result<Option<Direction>, GridError> {
        self.ensure_live()?;
        self.sortable_column(column_id)?;
        let direction = self.sort.toggle_multi(column_id);
        self.sort_changed();
        Ok(direction)
    }

    /// Replace every sort key.
    pub fn set_sort(&mut self, sort: SortState) -> Result<(), GridError> {
        self.ensure_live()?;
        for key in sort.keys() {
            self.sortable_column(&key.column_id)?;
        }
        if sort == self.sort {
            return Ok(());
        }
        self.sort = sort;
        self.sort_changed();
        Ok(())
    }

    /// Back to source order.
    pub fn clear_sort(&mut self) -> Result<(), GridError> {
        self.ensure_live()?;
        if self.sort.is_empty() {
            return Ok(());
        }
        self.sort.clear();
        self.sort_changed();
        Ok(())
    }

    fn sort_changed(&mut self) {
        debug!("Sort is now {:?}", self.sort.keys());
        self.events.emit(GridEvent::SortChanged(self.sort.clone()));
        self.refresh_sort();
    }

    // =========================================================================
    // Pagination
    // =========================================================================

    /// Go to a page. Indices past the last known page clamp to it and emit
    /// [`GridEvent::PageClamped`].
    ///
    /// Returns the page index now in effect.
    pub fn set_page(&mut self, page_index: usize) -> Result<usize, GridError> {
        self.ensure_live()?;
        let mut target = page_index;
        if let Some(total) = self.known_total() {
            let last = self.pagination.last_page_index(total);
            if page_index > last {
                debug!("Page {} out of range, clamping to {}", page_index, last);
                self.events.emit(GridEvent::PageClamped {
                    from: page_index,
                    to: last,
                });
                target = last;
            }
        }
        if self.pagination.set_page_index(target) {
            self.events.emit(GridEvent::PageChanged { page_index: target });
        }
        Ok(target)
    }

    /// Next page, if there is one. Before the first server page commits the
    /// total is unknown and the index always advances.
    pub fn next_page(&mut self) -> Result<usize, GridError> {
        let current = self.pagination.page_index();
        match self.known_total() {
            Some(total) if !self.pagination.has_next(total) => Ok(current),
            _ => self.set_page(current + 1),
        }
    }

    /// Previous page, if there is one.
    pub fn previous_page(&mut self) -> Result<usize, GridError> {
        match self.pagination.page_index() {
            0 => Ok(0),
            current => self.set_page(current - 1),
        }
    }

    /// First page.
    pub fn first_page(&mut self) -> Result<usize, GridError> {
        self.set_page(0)
    }

    /// Last known page. Stays put while the server total is unknown.
    pub fn last_page(&mut self) -> Result<usize, GridError> {
        match self.known_total() {
            Some(total) => self.set_page(self.pagination.last_page_index(total)),
            None => Ok(self.pagination.page_index()),
        }
    }

    /// Change the page size. The page index always returns to 0.
    pub fn set_page_size(&mut self, page_size: usize) -> Result<(), GridError> {
        self.ensure_live()?;
        let before = self.pagination;
        self.pagination.set_page_size(page_size)?;
        self.config.page_size = page_size;
        if before != self.pagination {
            self.events.emit(GridEvent::PageSizeChanged { page_size });
        }
        Ok(())
    }

    fn clamp_client_page(&mut self) {
        let total = match &self.backend {
            Backend::Client(data) => data.view.len(),
            Backend::Server(_) => return,
        };
        if let Some(clamp) = self.pagination.clamp(total) {
            debug!("Row count shrank to {}, page {} -> {}", total, clamp.from, clamp.to);
            self.events.emit(clamp.into());
        }
    }

    // =========================================================================
    // Selection
    // =========================================================================

    /// Toggle one row. In single-selection mode selecting a row replaces the
    /// previous one.
    pub fn toggle_row(&mut self, key: &RowKey) -> Result<SelectionDelta, GridError> {
        self.ensure_live()?;
        self.ensure_known_row(key)?;
        let delta = match self.config.selection_mode {
            SelectionMode::None => SelectionDelta::default(),
            SelectionMode::Single if !self.selection.is_selected(key.as_str()) => self.selection.select(key),
            SelectionMode::Single | SelectionMode::Multiple => self.selection.toggle(key),
        };
        Ok(self.selection_changed(delta))
    }

    /// Select from the anchor row to `target` over the filtered rows in
    /// display order. With `extend`, rows outside the range stay selected.
    pub fn select_range(&mut self, target: &RowKey, extend: bool) -> Result<SelectionDelta, GridError> {
        self.ensure_live()?;
        self.ensure_known_row(target)?;
        let delta = match self.config.selection_mode {
            SelectionMode::None => SelectionDelta::default(),
            SelectionMode::Single => self.selection.select(target),
            SelectionMode::Multiple => {
                let ordered = self.filtered_keys();
                self.selection.range_select(target, &ordered, extend)
            }
        };
        Ok(self.selection_changed(delta))
    }

    /// Select every row passing the filter, or deselect them all if they are
    /// already selected. Rows outside the filter keep their state.
    ///
    /// In server mode the rows passing the filter that the grid can see are
    /// those of the current page.
    pub fn toggle_all(&mut self) -> Result<SelectionDelta, GridError> {
        self.ensure_live()?;
        if self.config.selection_mode != SelectionMode::Multiple {
            return Ok(SelectionDelta::default());
        }
        let keys = self.filtered_keys();
        let delta = self.selection.toggle_all(&keys);
        Ok(self.selection_changed(delta))
    }

    /// Deselect everything.
    pub fn clear_selection(&mut self) -> Result<SelectionDelta, GridError> {
        self.ensure_live()?;
        let delta = self.selection.clear();
        Ok(self.selection_changed(delta))
    }

    fn selection_changed(&mut self, delta: SelectionDelta) -> SelectionDelta {
        if !delta.is_empty() {
            self.events.emit(GridEvent::SelectionChanged(delta.clone()));
        }
        delta
    }

    fn ensure_known_row(&self, key: &RowKey) -> Result<(), GridError> {
        match &self.backend {
            Backend::Client(data) if data.get(key.as_str()).is_none() => Err(GridError::UnknownRow(key.clone())),
            _ => Ok(()),
        }
    }

    // =========================================================================
    // Notifications
    // =========================================================================

    /// Register a listener for every committed change.
    pub fn on_change(&mut self, listener: impl FnMut(&GridEvent) + 'static) {
        self.events.subscribe(Box::new(listener));
    }

    /// Take the queued events, oldest first.
    pub fn drain_events(&mut self) -> Vec<GridEvent> {
        self.events.drain()
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Clear filter, sort, selection and page index. Page size is kept.
    pub fn reset(&mut self) -> Result<(), GridError> {
        self.ensure_live()?;
        self.clear_state();
        self.refresh_filter();
        self.forget_server_total();
        Ok(())
    }

    fn clear_state(&mut self) {
        self.debouncer.cancel();
        self.draft.clear();
        self.filter.clear();
        self.sort.clear();
        self.pagination.set_page_index(0);
        let delta = self.selection.clear();
        self.events.emit(GridEvent::Reset);
        self.selection_changed(delta);
    }

    /// Replace every row of a client-mode grid.
    ///
    /// The selection is cleared since the old identities no longer apply.
    pub fn set_rows(&mut self, rows: Vec<Row<T>>) -> Result<(), GridError> {
        self.ensure_live()?;
        let Backend::Client(data) = &mut self.backend else {
            return Err(GridError::WrongMode { expected: Mode::Client });
        };
        *data = ClientData::new(rows)?;
        let delta = self.selection.clear();
        self.selection_changed(delta);
        self.refresh_filter();
        self.events.emit(GridEvent::DataReplaced { total: self.total() });
        self.clamp_client_page();
        Ok(())
    }

    /// Move to client mode over `rows`. Filter, sort, page and selection
    /// reset so no state from the previous mode leaks over.
    pub fn switch_to_client(&mut self, rows: Vec<Row<T>>) -> Result<(), GridError> {
        self.ensure_live()?;
        let data = ClientData::new(rows)?;
        self.backend = Backend::Client(data);
        self.clear_state();
        self.refresh_filter();
        self.events.emit(GridEvent::DataReplaced { total: self.total() });
        Ok(())
    }

    /// Stop accepting changes. Pending debounced input is dropped, spawned
    /// fetches are cancelled and listeners are released.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        debug!("Tearing down {} grid", self.mode());
        self.torn_down = true;
        self.cancel.cancel();
        self.debouncer.cancel();
        self.events.clear_listeners();
    }

    /// Returns `true` after [`teardown`](Self::teardown).
    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    pub(super) fn ensure_live(&self) -> Result<(), GridError> {
        if self.torn_down {
            return Err(GridError::TornDown);
        }
        Ok(())
    }

    // =========================================================================
    // Internal helpers
    // =========================================================================

    fn filterable_column(&self, column_id: &str) -> Result<(), GridError> {
        match find_column(&self.columns, column_id) {
            Some(column) if column.is_filterable() => Ok(()),
            Some(_) => Err(GridError::NotFilterable(column_id.to_string())),
            None => Err(GridError::UnknownColumn(column_id.to_string())),
        }
    }

    fn sortable_column(&self, column_id: &str) -> Result<(), GridError> {
        match find_column(&self.columns, column_id) {
            Some(column) if column.is_sortable() => Ok(()),
            Some(_) => Err(GridError::NotSortable(column_id.to_string())),
            None => Err(GridError::UnknownColumn(column_id.to_string())),
        }
    }

    /// Recompute the client view from the committed filter and sort.
    pub(super) fn refresh_filter(&mut self) {
        if let Backend::Client(data) = &mut self.backend {
            data.filtered = self.filter_engine.matching_indices(&data.rows, &self.columns, &self.filter);
            data.view = data.filtered.clone();
            SortEngine::sort_indices(&data.rows, &mut data.view, &self.columns, &self.sort);
        }
    }

    /// The server total described the previous filter. Until a page for the
    /// new one commits, paging runs unclamped and a fetch is needed.
    fn forget_server_total(&mut self) {
        if let Backend::Server(server) = &mut self.backend {
            server.total = None;
            server.latest_query = None;
        }
    }

    /// Re-sort the client view. Ties keep source order, not the previous
    /// view order.
    fn refresh_sort(&mut self) {
        if let Backend::Client(data) = &mut self.backend {
            data.view = data.filtered.clone();
            SortEngine::sort_indices(&data.rows, &mut data.view, &self.columns, &self.sort);
        }
    }
}

impl<T> Drop for DataGrid<T> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl<T> std::fmt::Debug for DataGrid<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataGrid")
            .field("mode", &self.mode())
            .field("columns", &self.columns)
            .field("filter", &self.filter)
            .field("sort", &self.sort)
            .field("pagination", &self.pagination)
            .field("selected", &self.selection.len())
            .field("total", &self.known_total())
            .field("torn_down", &self.torn_down)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;

    use super::*;

    #[derive(Debug, Clone)]
    struct Link {
        name: String,
        region: &'static str,
        latency_ms: Option<u32>,
    }

    fn link(name: &str, region: &'static str, latency_ms: Option<u32>) -> Link {
        Link {
            name: name.to_string(),
            region,
            latency_ms,
        }
    }

    fn columns() -> Vec<Column<Link>> {
        vec![
            Column::new("name", "Name", |l: &Link| l.name.clone()).sortable(),
            Column::new("region", "Region", |l: &Link| l.region).sortable(),
            Column::new("latency", "Latency", |l: &Link| l.latency_ms)
                .sortable()
                .filterable(false),
        ]
    }

    fn rows() -> Vec<Row<Link>> {
        vec![
            Row::new("a", link("alpha", "north", Some(12))),
            Row::new("b", link("bravo", "south", None)),
            Row::new("c", link("charlie", "north", Some(3))),
            Row::new("d", link("delta", "east", Some(30))),
            Row::new("e", link("echo", "north", Some(12))),
        ]
    }

    fn grid(page_size: usize) -> DataGrid<Link> {
        DataGrid::client(columns(), rows(), GridConfig::default().with_page_size(page_size)).unwrap()
    }

    fn keys(grid: &DataGrid<Link>) -> Vec<String> {
        grid.page_rows().iter().map(|r| r.key().to_string()).collect()
    }

    #[test]
    fn test_duplicate_column_and_key_rejected() {
        let mut cols = columns();
        cols.push(Column::new("name", "Again", |l: &Link| l.name.clone()));
        assert_eq!(
            DataGrid::client(cols, rows(), GridConfig::default()).unwrap_err(),
            GridError::DuplicateColumn("name".into())
        );

        let mut dup = rows();
        dup.push(Row::new("a", link("again", "west", None)));
        assert_eq!(
            DataGrid::client(columns(), dup, GridConfig::default()).unwrap_err(),
            GridError::DuplicateKey(RowKey::from("a"))
        );
    }

    #[test]
    fn test_global_filter_matches_any_column() {
        let mut grid = grid(10);
        grid.set_global_filter("NORTH").unwrap();
        assert_eq!(keys(&grid), vec!["a", "c", "e"]);
        grid.set_global_filter("brav").unwrap();
        assert_eq!(keys(&grid), vec!["b"]);
    }

    #[test]
    fn test_column_filter_rejects_non_filterable() {
        let mut grid = grid(10);
        assert_eq!(
            grid.set_column_filter("latency", "12"),
            Err(GridError::NotFilterable("latency".into()))
        );
        assert_eq!(
            grid.set_column_filter("missing", "x"),
            Err(GridError::UnknownColumn("missing".into()))
        );
    }

    #[test]
    fn test_sort_cycle_and_missing_last() {
        let mut grid = grid(10);
        assert_eq!(grid.toggle_sort("latency").unwrap(), Some(Direction::Asc));
        assert_eq!(keys(&grid), vec!["c", "a", "e", "d", "b"]);
        assert_eq!(grid.toggle_sort("latency").unwrap(), Some(Direction::Desc));
        assert_eq!(keys(&grid), vec!["d", "a", "e", "c", "b"]);
        assert_eq!(grid.toggle_sort("latency").unwrap(), None);
        assert_eq!(keys(&grid), vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn test_non_sortable_column_errors() {
        let mut grid = DataGrid::client(
            vec![Column::new("name", "Name", |l: &Link| l.name.clone())],
            rows(),
            GridConfig::default(),
        )
        .unwrap();
        assert_eq!(grid.toggle_sort("name"), Err(GridError::NotSortable("name".into())));
    }

    #[test]
    fn test_filter_shrink_clamps_page() {
        let mut grid = grid(2);
        assert_eq!(grid.set_page(2).unwrap(), 2);
        assert_eq!(keys(&grid), vec!["e"]);
        grid.drain_events();

        grid.set_global_filter("north").unwrap();
        assert_eq!(grid.page_index(), 1);
        assert_eq!(keys(&grid), vec!["e"]);
        assert!(grid.drain_events().contains(&GridEvent::PageClamped { from: 2, to: 1 }));
    }

    #[test]
    fn test_set_page_past_end_clamps() {
        let mut grid = grid(2);
        assert_eq!(grid.set_page(9).unwrap(), 2);
        assert_eq!(
            grid.drain_events(),
            vec![
                GridEvent::PageClamped { from: 9, to: 2 },
                GridEvent::PageChanged { page_index: 2 },
            ]
        );
    }

    #[test]
    fn test_page_size_change_resets_index() {
        let mut grid = grid(2);
        grid.next_page().unwrap();
        grid.set_page_size(3).unwrap();
        assert_eq!(grid.page_index(), 0);
        assert_eq!(grid.page_count(), 2);
        assert_eq!(grid.set_page_size(0), Err(GridError::ZeroPageSize));
    }

    #[test]
    fn test_navigation_stops_at_edges() {
        let mut grid = grid(2);
        assert_eq!(grid.previous_page().unwrap(), 0);
        assert_eq!(grid.last_page().unwrap(), 2);
        assert_eq!(grid.next_page().unwrap(), 2);
        assert_eq!(grid.first_page().unwrap(), 0);
    }

    #[test]
    fn test_selection_survives_sort_filter_page() {
        let mut grid = grid(2);
        grid.toggle_row(&RowKey::from("c")).unwrap();
        grid.toggle_row(&RowKey::from("e")).unwrap();

        grid.toggle_sort("name").unwrap();
        grid.toggle_sort("name").unwrap();
        grid.set_global_filter("north").unwrap();
        grid.next_page().unwrap();

        assert_eq!(grid.selected_keys(), vec![RowKey::from("c"), RowKey::from("e")]);
        let selected: Vec<&str> = grid.selected_rows().iter().map(|r| r.key().as_str()).collect();
        assert_eq!(selected, vec!["e", "c"]);
    }

    #[test]
    fn test_toggle_all_uses_filtered_rows_not_page() {
        let mut grid = grid(1);
        grid.set_global_filter("north").unwrap();
        grid.toggle_all().unwrap();
        assert_eq!(grid.selected_keys().len(), 3);
        assert_eq!(grid.selected_rows().len(), 3);
        grid.toggle_all().unwrap();
        assert!(grid.selected_keys().is_empty());
    }

    #[test]
    fn test_single_selection_mode_replaces() {
        let config = GridConfig::default().with_selection_mode(SelectionMode::Single);
        let mut grid = DataGrid::client(columns(), rows(), config).unwrap();
        grid.toggle_row(&RowKey::from("a")).unwrap();
        grid.toggle_row(&RowKey::from("b")).unwrap();
        assert_eq!(grid.selected_keys(), vec![RowKey::from("b")]);
        assert!(grid.toggle_all().unwrap().is_empty());
    }

    #[test]
    fn test_unknown_row_rejected() {
        let mut grid = grid(10);
        assert_eq!(
            grid.toggle_row(&RowKey::from("zz")),
            Err(GridError::UnknownRow(RowKey::from("zz")))
        );
    }

    #[test]
    fn test_select_range_in_display_order() {
        let mut grid = grid(10);
        grid.toggle_sort("name").unwrap();
        grid.toggle_sort("name").unwrap();
        grid.toggle_row(&RowKey::from("d")).unwrap();
        grid.select_range(&RowKey::from("b"), false).unwrap();
        assert_eq!(
            grid.selected_keys(),
            vec![RowKey::from("b"), RowKey::from("c"), RowKey::from("d")]
        );
    }

    #[test]
    fn test_set_rows_clears_selection_and_reports() {
        let mut grid = grid(10);
        grid.toggle_row(&RowKey::from("a")).unwrap();
        grid.drain_events();
        grid.set_rows(rows().into_iter().take(2).collect()).unwrap();
        assert!(grid.selected_keys().is_empty());
        assert!(grid.drain_events().contains(&GridEvent::DataReplaced { total: 2 }));
    }

    #[test]
    fn test_reset_clears_everything_but_page_size() {
        let mut grid = grid(2);
        grid.set_global_filter("north").unwrap();
        grid.toggle_sort("name").unwrap();
        grid.toggle_row(&RowKey::from("a")).unwrap();
        grid.next_page().unwrap();
        grid.reset().unwrap();
        assert!(grid.filter_state().is_empty());
        assert!(grid.sort_state().is_empty());
        assert!(grid.selected_keys().is_empty());
        assert_eq!(grid.page_index(), 0);
        assert_eq!(grid.page_size(), 2);
        assert_eq!(grid.total(), 5);
    }

    #[test]
    fn test_cell_text_placeholder() {
        let config = GridConfig::default().with_placeholder("-");
        let grid = DataGrid::client(columns(), rows(), config).unwrap();
        let bravo = grid.row("b").unwrap();
        assert_eq!(grid.cell_text(bravo, "latency").unwrap(), "-");
        assert_eq!(grid.cell_text(bravo, "name").unwrap(), "bravo");
        assert!(grid.cell_text(bravo, "nope").is_err());
    }

    #[test]
    fn test_export_selection_falls_back_to_filtered() {
        let mut grid = grid(1);
        grid.set_global_filter("north").unwrap();
        assert_eq!(grid.export_selection().len(), 3);
        grid.toggle_row(&RowKey::from("e")).unwrap();
        let table = grid.export_selection();
        assert_eq!(table.keys(), vec![&RowKey::from("e")]);
        assert_eq!(table.headers, vec!["Name", "Region", "Latency"]);
        assert_eq!(grid.export_page().len(), 1);
    }

    #[test]
    fn test_export_selection_hidden_by_filter_exports_filtered() {
        let mut grid = grid(10);
        grid.toggle_row(&RowKey::from("b")).unwrap();
        grid.set_global_filter("north").unwrap();

        let table = grid.export_selection();
        assert_eq!(table.keys(), vec![&RowKey::from("a"), &RowKey::from("c"), &RowKey::from("e")]);
        assert!(grid.is_selected("b"));
    }

    #[test]
    fn test_window_tracks_row_count() {
        let config = GridConfig::default().with_overscan(0).with_page_size(100);
        let mut grid = DataGrid::client(columns(), rows(), config).unwrap();
        let metrics = ScrollMetrics::new(0, 2);
        assert_eq!(grid.window(metrics).total_height, 5);
        grid.set_global_filter("north").unwrap();
        let window = grid.window(metrics);
        assert_eq!(window.total_height, 3);
        assert_eq!(window.padding_bottom, 1);
        let visible: Vec<&str> = grid.visible_rows(metrics).iter().map(|v| v.row.key().as_str()).collect();
        assert_eq!(visible, vec!["a", "c"]);
        assert_eq!(grid.scroll_to_row("e", metrics), Some(1));
    }

    #[test]
    fn test_listener_sees_committed_changes() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut grid = grid(10);
        grid.on_change(move |e| sink.borrow_mut().push(e.clone()));
        grid.set_global_filter("north").unwrap();
        grid.set_global_filter("north").unwrap();
        grid.toggle_sort("name").unwrap();
        assert_eq!(seen.borrow().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounced_input_commits_once() {
        let mut grid = grid(10);
        grid.input_global_filter("n").unwrap();
        tokio::time::advance(Duration::from_millis(100)).await;
        grid.input_global_filter("no").unwrap();
        tokio::time::advance(Duration::from_millis(100)).await;
        grid.input_global_filter("north").unwrap();

        assert!(!grid.tick());
        assert_eq!(grid.total(), 5);
        assert_eq!(grid.draft_filter().global(), "north");

        tokio::time::advance(Duration::from_millis(200)).await;
        assert!(grid.tick());
        assert_eq!(grid.total(), 3);
        let filter_events = grid
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GridEvent::FilterChanged(_)))
            .count();
        assert_eq!(filter_events, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_settle_waits_for_window() {
        let mut grid = grid(10);
        grid.input_column_filter("region", "east").unwrap();
        let started = Instant::now();
        assert!(grid.settle().await);
        assert!(started.elapsed() >= Duration::from_millis(200));
        assert_eq!(keys(&grid), vec!["d"]);
        assert!(!grid.settle().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_teardown_drops_pending_input() {
        let mut grid = grid(10);
        grid.input_global_filter("north").unwrap();
        grid.teardown();
        tokio::time::advance(Duration::from_millis(500)).await;
        assert!(!grid.tick());
        assert_eq!(grid.total(), 5);
        assert_eq!(grid.input_global_filter("x"), Err(GridError::TornDown));
    }
}
