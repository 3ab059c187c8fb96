//! Server-mode page sources
//!
//! A [`PageSource`] answers one [`PageQuery`] with one [`PageResponse`]. The
//! grid tags every outbound query with a [`RequestToken`] and commits only
//! the response for the latest one.

mod memory;
mod request;

pub use memory::*;
pub use request::*;

use std::future::Future;

use async_trait::async_trait;

use crate::error::FetchError;
use crate::page::{PageQuery, PageResponse};

/// Produces pages of rows for a server-mode grid.
///
/// The source owns the authoritative result set: filtering, ordering and
/// slicing all happen on its side. Implementations report failures as
/// [`FetchError`]s; the grid keeps its last good page when one occurs.
///
/// # Example
///
/// ```
/// use async_trait::async_trait;
/// use tabula_lib::error::FetchError;
/// use tabula_lib::model::Row;
/// use tabula_lib::page::{PageQuery, PageResponse};
/// use tabula_lib::source::PageSource;
///
/// struct Numbers;
///
/// #[async_trait]
/// impl PageSource<u32> for Numbers {
///     async fn fetch_page(&self, query: PageQuery) -> Result<PageResponse<u32>, FetchError> {
///         let start = query.offset() as u32;
///         let items = (start..start + query.page_size as u32)
///             .filter(|n| *n < 45)
///             .map(|n| Row::new(n, n))
///             .collect();
///         Ok(PageResponse::new(items, 45))
///     }
/// }
/// ```
#[async_trait]
pub trait PageSource<T>: Send + Sync {
    /// Fetches the page described by `query`.
    async fn fetch_page(&self, query: PageQuery) -> Result<PageResponse<T>, FetchError>;
}

/// A [`PageSource`] backed by a closure returning a future.
///
/// # Example
///
/// ```
/// use tabula_lib::error::FetchError;
/// use tabula_lib::page::{PageQuery, PageResponse};
/// use tabula_lib::source::FnSource;
///
/// let source = FnSource::new(|_query: PageQuery| async {
///     Ok::<_, FetchError>(PageResponse::<String>::empty())
/// });
/// ```
pub struct FnSource<F> {
    fetch: F,
}

impl<F> FnSource<F> {
    /// Wraps a fetch closure.
    pub fn new(fetch: F) -> Self {
        Self { fetch }
    }
}

impl<F> std::fmt::Debug for FnSource<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnSource").finish_non_exhaustive()
    }
}

#[async_trait]
impl<T, F, Fut> PageSource<T> for FnSource<F>
where
    T: Send + 'static,
    F: Fn(PageQuery) -> Fut + Send + Sync,
    Fut: Future<Output = Result<PageResponse<T>, FetchError>> + Send + 'static,
{
    async fn fetch_page(&self, query: PageQuery) -> Result<PageResponse<T>, FetchError> {
        (self.fetch)(query).await
    }
}
