//! The data grid engine.
//!
//! [`DataGrid`] composes the column model, filtering, sorting, pagination,
//! selection and virtualization into one owned state object. One engine
//! serves both data-sourcing modes:
//!
//! - **Client**: the grid holds every row and filters, sorts and pages
//!   locally. Views are index lists into the row arena, so no payload is
//!   copied or reordered.
//! - **Server**: the grid only describes what it wants through a
//!   [`PageQuery`](crate::page::PageQuery); a
//!   [`PageSource`](crate::source::PageSource) owns the result set. Every
//!   request carries a [`RequestToken`](crate::source::RequestToken) and only
//!   the latest one may commit.
//!
//! Every committed change is reported as a [`GridEvent`].

mod backend;
mod engine;
mod events;
mod server;

pub use engine::DataGrid;
pub use events::{FetchOutcome, GridEvent};

use std::fmt;

/// Where the authoritative result set lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// All rows are held locally.
    Client,
    /// A page source owns the rows.
    Server,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Client => write!(f, "client"),
            Mode::Server => write!(f, "server"),
        }
    }
}
