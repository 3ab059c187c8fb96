//! Multi-key sorting.

mod engine;
mod state;

pub use engine::{SortEngine, compare_cells};
pub use state::{Direction, SortKey, SortState};
