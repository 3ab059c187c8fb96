//! Column descriptors

use std::fmt;
use std::sync::Arc;

use super::CellValue;

/// Reads one field out of a row payload.
pub type Accessor<T> = Arc<dyn Fn(&T) -> CellValue + Send + Sync>;

/// Custom cell renderer. Returning `None` renders the grid placeholder.
pub type Renderer<T> = Arc<dyn Fn(&T) -> Option<String> + Send + Sync>;

/// Declarative column configuration.
///
/// Every column reads its value through a typed accessor, so a mismatched
/// field is a compile error rather than an empty cell at runtime. Columns are
/// filterable by default and opt into sorting.
///
/// # Examples
///
/// ```
/// use tabula_lib::model::Column;
///
/// struct Link {
///     name: String,
///     region: Option<String>,
///     capacity_mbps: u32,
/// }
///
/// let columns: Vec<Column<Link>> = vec![
///     Column::new("name", "Name", |l: &Link| l.name.clone()).sortable(),
///     Column::new("region", "Region", |l: &Link| l.region.clone()),
///     Column::new("capacity", "Capacity", |l: &Link| l.capacity_mbps)
///         .sortable()
///         .render_with(|l: &Link| Some(format!("{} Mbps", l.capacity_mbps))),
/// ];
/// assert!(columns[0].is_sortable());
/// assert!(!columns[1].is_sortable());
/// ```
pub struct Column<T> {
    id: String,
    header: String,
    accessor: Accessor<T>,
    render: Option<Renderer<T>>,
    sortable: bool,
    filterable: bool,
}

impl<T> Column<T> {
    /// Create a new column.
    ///
    /// # Arguments
    /// * `id` - Stable column id used by sort/filter state
    /// * `header` - Header label, also used as the export header
    /// * `accessor` - Reads the cell value from a row payload
    pub fn new<V, F>(id: impl Into<String>, header: impl Into<String>, accessor: F) -> Self
    where
        T: 'static,
        V: Into<CellValue>,
        F: Fn(&T) -> V + Send + Sync + 'static,
    {
        Self {
            id: id.into(),
            header: header.into(),
            accessor: Arc::new(move |row: &T| -> CellValue { accessor(row).into() }),
            render: None,
            sortable: false,
            filterable: true,
        }
    }

    /// Make the column sortable.
    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    /// Set whether the column takes part in global and per-column filtering.
    pub fn filterable(mut self, filterable: bool) -> Self {
        self.filterable = filterable;
        self
    }

    /// Use a custom renderer for display text.
    pub fn render_with<F>(mut self, render: F) -> Self
    where
        F: Fn(&T) -> Option<String> + Send + Sync + 'static,
    {
        self.render = Some(Arc::new(render));
        self
    }

    /// Column id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Header label.
    pub fn header(&self) -> &str {
        &self.header
    }

    /// Whether sorting on this column is allowed.
    pub fn is_sortable(&self) -> bool {
        self.sortable
    }

    /// Whether this column is matched by filters.
    pub fn is_filterable(&self) -> bool {
        self.filterable
    }

    /// Read the raw cell value for a row payload.
    pub fn value(&self, row: &T) -> CellValue {
        (self.accessor)(row)
    }

    /// Stringified cell value, as used by filtering and export.
    pub fn text(&self, row: &T) -> String {
        self.value(row).to_text().into_owned()
    }

    /// Display text for a cell.
    ///
    /// Uses the custom renderer when present. A renderer returning `None`,
    /// or a missing value without a renderer, yields `placeholder`.
    pub fn render(&self, row: &T, placeholder: &str) -> String {
        if let Some(render) = &self.render {
            return render(row).unwrap_or_else(|| placeholder.to_string());
        }
        match self.value(row) {
            CellValue::Missing => placeholder.to_string(),
            value => value.to_text().into_owned(),
        }
    }
}

impl<T> Clone for Column<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            header: self.header.clone(),
            accessor: Arc::clone(&self.accessor),
            render: self.render.clone(),
            sortable: self.sortable,
            filterable: self.filterable,
        }
    }
}

impl<T> fmt::Debug for Column<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("id", &self.id)
            .field("header", &self.header)
            .field("sortable", &self.sortable)
            .field("filterable", &self.filterable)
            .field("custom_render", &self.render.is_some())
            .finish()
    }
}

/// Find a column by id.
pub fn find_column<'a, T>(columns: &'a [Column<T>], id: &str) -> Option<&'a Column<T>> {
    columns.iter().find(|c| c.id == id)
}
