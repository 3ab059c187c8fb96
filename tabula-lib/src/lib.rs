//! Tabular data grid engine
//!
//! Column model, filtering, sorting, pagination, ID-based selection,
//! virtualized windowing and flat export over typed rows, in client mode
//! (all rows held locally) or server mode (pages fetched from a
//! [`PageSource`](source::PageSource)).

pub mod config;
pub mod error;
pub mod export;
pub mod filter;
pub mod grid;
pub mod model;
pub mod page;
pub mod selection;
pub mod sort;
pub mod source;
pub mod viewport;

pub use config::GridConfig;
pub use grid::{DataGrid, FetchOutcome, GridEvent, Mode};
