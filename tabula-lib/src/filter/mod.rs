//! Global and per-column filtering.
//!
//! The committed [`FilterState`] is applied by the [`FilterEngine`]; typed
//! input is coalesced by a [`Debouncer`] before it is committed.

mod debounce;
mod engine;
mod rank;
mod state;

pub use debounce::Debouncer;
pub use engine::{FilterEngine, FilterMode};
pub use rank::{FuzzyRanker, Ranker};
pub use state::FilterState;
