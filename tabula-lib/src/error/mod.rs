//! Error types

mod export;
mod fetch;
mod grid;

pub use export::*;
pub use fetch::*;
pub use grid::*;
