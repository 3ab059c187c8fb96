//! Server-mode fetching
//!
//! Two ways to drive a server grid:
//!
//! - **Tickets**: [`DataGrid::begin_fetch`] issues a token and the query, the
//!   host calls its backend however it likes and hands the result to
//!   [`DataGrid::complete_fetch`].
//! - **Spawned**: [`DataGrid::dispatch_fetch`] runs the page source on the
//!   tokio runtime; [`DataGrid::poll_responses`] or
//!   [`DataGrid::next_response`] apply what came back.
//!
//! Either way only the response for the most recently issued token commits.

use std::sync::Arc;

use log::{debug, warn};

use crate::error::{FetchError, GridError};
use crate::page::{PageQuery, PageResponse, Paginator};
use crate::selection::SelectionDelta;
use crate::source::{FetchTicket, PageSource, RequestToken, RequestTracker};

use super::Mode;
use super::backend::{Backend, ServerData};
use super::engine::DataGrid;
use super::events::{FetchOutcome, GridEvent};

impl<T> DataGrid<T> {
    /// The query describing the current page, sort and committed filter.
    pub fn current_query(&self) -> PageQuery {
        Paginator::describe(&self.pagination, &self.sort, &self.filter)
    }

    /// Returns `true` while the latest request is unresolved. The previous
    /// page stays readable meanwhile.
    pub fn is_loading(&self) -> bool {
        match &self.backend {
            Backend::Server(server) => server.pending.is_some(),
            Backend::Client(_) => false,
        }
    }

    /// Failure of the latest request, cleared by the next committed page.
    pub fn last_error(&self) -> Option<&FetchError> {
        match &self.backend {
            Backend::Server(server) => server.error.as_ref(),
            Backend::Client(_) => None,
        }
    }

    /// Returns `true` if the current state has not been requested yet.
    pub fn needs_fetch(&self) -> bool {
        if self.torn_down {
            return false;
        }
        match &self.backend {
            Backend::Server(server) => server.latest_query.as_ref() != Some(&self.current_query()),
            Backend::Client(_) => false,
        }
    }

    /// Issue a request for the current state.
    ///
    /// Every earlier request becomes stale.
    pub fn begin_fetch(&mut self) -> Result<FetchTicket, GridError> {
        self.ensure_live()?;
        let query = self.current_query();
        let Backend::Server(server) = &mut self.backend else {
            return Err(GridError::WrongMode { expected: Mode::Server });
        };

        let token = server.tracker.issue();
        let ticket = FetchTicket { token, query };
        server.latest_query = Some(ticket.query.clone());
        if let Some(previous) = server.pending.replace(ticket.clone()) {
            debug!("Request {} superseded by {}", previous.token, token);
        }
        debug!("Requesting {}", ticket.query.to_query_string());

        self.events.emit(GridEvent::FetchStarted {
            token,
            query: ticket.query.clone(),
        });
        Ok(ticket)
    }

    /// Apply the result of a request.
    ///
    /// Results for anything but the latest token are dropped. A failure keeps
    /// the previous page and records the error. A page past the end clamps
    /// the page index and leaves the grid needing another fetch.
    pub fn complete_fetch(
        &mut self,
        token: RequestToken,
        result: Result<PageResponse<T>, FetchError>,
    ) -> FetchOutcome {
        if self.torn_down {
            debug!("Ignoring response {} after teardown", token);
            return FetchOutcome::Stale;
        }
        let Backend::Server(server) = &mut self.backend else {
            return FetchOutcome::Stale;
        };
        if !server.tracker.is_latest(token) {
            debug!("Discarding stale response {}", token);
            return FetchOutcome::Stale;
        }
        server.pending = None;

        let response = match result {
            Ok(response) => response,
            Err(error) => {
                warn!("Fetch {} failed: {}", token, error);
                server.error = Some(error.clone());
                self.events.emit(GridEvent::FetchFailed {
                    token,
                    error: error.clone(),
                });
                return FetchOutcome::Failed(error);
            }
        };

        let total = response.total;
        server.total = Some(total);
        server.error = None;

        if let Some(clamp) = self.pagination.clamp(total) {
            debug!("Server total {} ends before page {}, clamping to {}", total, clamp.from, clamp.to);
            self.events.emit(clamp.into());
            return FetchOutcome::Clamped(clamp);
        }

        debug!("Committed page {} ({} rows of {})", self.pagination.page_index(), response.items.len(), total);
        server.page = response.items;
        self.events.emit(GridEvent::FetchCompleted { token, total });
        FetchOutcome::Committed { total }
    }

    /// Point a server grid at a different source.
    ///
    /// The page and selection are dropped; filter and sort are kept and the
    /// grid needs a fetch.
    pub fn replace_source(&mut self, source: impl PageSource<T> + 'static) -> Result<(), GridError> {
        self.ensure_live()?;
        let Backend::Server(server) = &mut self.backend else {
            return Err(GridError::WrongMode { expected: Mode::Server });
        };
        let tracker = std::mem::take(&mut server.tracker);
        *server = ServerData::new(Arc::new(source), tracker);

        self.pagination.set_page_index(0);
        let delta = self.selection.clear();
        if !delta.is_empty() {
            self.events.emit(GridEvent::SelectionChanged(delta));
        }
        self.events.emit(GridEvent::DataReplaced { total: 0 });
        Ok(())
    }

    /// Move to server mode. Filter, sort, page and selection reset so no
    /// state from the previous mode leaks over.
    pub fn switch_to_server(&mut self, source: impl PageSource<T> + 'static) -> Result<(), GridError> {
        self.ensure_live()?;
        let tracker = match &mut self.backend {
            Backend::Server(server) => std::mem::take(&mut server.tracker),
            Backend::Client(_) => RequestTracker::new(),
        };
        self.backend = Backend::Server(ServerData::new(Arc::new(source), tracker));
        self.debouncer.cancel();
        self.draft.clear();
        self.filter.clear();
        self.sort.clear();
        self.pagination.set_page_index(0);
        let delta: SelectionDelta = self.selection.clear();
        self.events.emit(GridEvent::Reset);
        if !delta.is_empty() {
            self.events.emit(GridEvent::SelectionChanged(delta));
        }
        self.events.emit(GridEvent::DataReplaced { total: 0 });
        Ok(())
    }
}

impl<T: Send + 'static> DataGrid<T> {
    /// Issue a request and run it on the tokio runtime.
    ///
    /// The task is cancelled when the grid is torn down or dropped. Must be
    /// called from within a runtime.
    pub fn dispatch_fetch(&mut self) -> Result<RequestToken, GridError> {
        let ticket = self.begin_fetch()?;
        let Backend::Server(server) = &mut self.backend else {
            return Err(GridError::WrongMode { expected: Mode::Server });
        };

        let source = Arc::clone(&server.source);
        let tx = server.tx.clone();
        let cancel = self.cancel.clone();
        server.outstanding += 1;

        let FetchTicket { token, query } = ticket;
        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("Fetch {} cancelled", token);
                }
                result = source.fetch_page(query) => {
                    // The grid may be gone already
                    let _ = tx.send((token, result));
                }
            }
        });
        Ok(token)
    }

    /// Dispatch a fetch if the current state has not been requested yet.
    pub fn fetch_if_needed(&mut self) -> Result<Option<RequestToken>, GridError> {
        if self.needs_fetch() {
            self.dispatch_fetch().map(Some)
        } else {
            Ok(None)
        }
    }

    /// Re-issue the current request, typically after a failure.
    pub fn retry(&mut self) -> Result<RequestToken, GridError> {
        self.dispatch_fetch()
    }

    /// Apply every spawned response that has already arrived.
    pub fn poll_responses(&mut self) -> Vec<FetchOutcome> {
        let mut outcomes = Vec::new();
        loop {
            let received = match &mut self.backend {
                Backend::Server(server) => server.rx.try_recv().ok(),
                Backend::Client(_) => None,
            };
            let Some((token, result)) = received else {
                break;
            };
            outcomes.push(self.receive(token, result));
        }
        outcomes
    }

    /// Wait for the next spawned response and apply it.
    ///
    /// Returns `None` when no spawned fetch is outstanding.
    pub async fn next_response(&mut self) -> Option<FetchOutcome> {
        if self.torn_down {
            return None;
        }
        let received = match &mut self.backend {
            Backend::Server(server) if server.outstanding > 0 => server.rx.recv().await,
            _ => None,
        };
        let (token, result) = received?;
        Some(self.receive(token, result))
    }

    /// Apply spawned responses until none are outstanding.
    pub async fn wait_idle(&mut self) -> Vec<FetchOutcome> {
        let mut outcomes = Vec::new();
        while let Some(outcome) = self.next_response().await {
            outcomes.push(outcome);
        }
        outcomes
    }

    fn receive(&mut self, token: RequestToken, result: Result<PageResponse<T>, FetchError>) -> FetchOutcome {
        if let Backend::Server(server) = &mut self.backend {
            server.outstanding = server.outstanding.saturating_sub(1);
        }
        let outcome = self.complete_fetch(token, result);
        if matches!(outcome, FetchOutcome::Clamped(_))
            && let Err(e) = self.dispatch_fetch()
        {
            debug!("Could not refetch after clamp: {}", e);
        }
        outcome
    }
}
