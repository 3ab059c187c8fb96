//! Grid misuse errors

use crate::grid::Mode;
use crate::model::RowKey;

/// Errors returned when the grid is asked to do something its current
/// configuration cannot honor.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    /// No column with this id was declared.
    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    /// The column exists but was not declared sortable.
    #[error("Column is not sortable: {0}")]
    NotSortable(String),

    /// The column exists but was not declared filterable.
    #[error("Column is not filterable: {0}")]
    NotFilterable(String),

    /// Two columns were declared with the same id.
    #[error("Duplicate column id: {0}")]
    DuplicateColumn(String),

    /// Two rows in one data set share an identity key.
    #[error("Duplicate row key: {0}")]
    DuplicateKey(RowKey),

    /// No row with this key is loaded.
    #[error("Unknown row: {0}")]
    UnknownRow(RowKey),

    /// Page size must be at least one row.
    #[error("Page size must be greater than zero")]
    ZeroPageSize,

    /// The operation only makes sense in the other data-sourcing mode.
    #[error("Operation requires {expected} mode")]
    WrongMode {
        /// Mode the operation needs.
        expected: Mode,
    },

    /// The grid was torn down and no longer accepts changes.
    #[error("Grid has been torn down")]
    TornDown,
}
