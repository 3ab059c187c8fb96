//! Mode-specific row storage

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::error::{FetchError, GridError};
use crate::model::{Row, RowKey};
use crate::page::{PageQuery, PageResponse};
use crate::source::{FetchTicket, PageSource, RequestToken, RequestTracker};

use super::Mode;

pub(super) type Response<T> = (RequestToken, Result<PageResponse<T>, FetchError>);

pub(super) enum Backend<T> {
    Client(ClientData<T>),
    Server(ServerData<T>),
}

impl<T> Backend<T> {
    pub(super) fn mode(&self) -> Mode {
        match self {
            Backend::Client(_) => Mode::Client,
            Backend::Server(_) => Mode::Server,
        }
    }
}

/// Every row plus index views into it.
pub(super) struct ClientData<T> {
    pub(super) rows: Vec<Row<T>>,
    pub(super) positions: HashMap<RowKey, usize>,
    /// Passing rows in source order.
    pub(super) filtered: Vec<usize>,
    /// `filtered` after sorting.
    pub(super) view: Vec<usize>,
}

impl<T> ClientData<T> {
    pub(super) fn new(rows: Vec<Row<T>>) -> Result<Self, GridError> {
        let mut positions = HashMap::with_capacity(rows.len());
        for (index, row) in rows.iter().enumerate() {
            if positions.insert(row.key().clone(), index).is_some() {
                return Err(GridError::DuplicateKey(row.key().clone()));
            }
        }
        let all: Vec<usize> = (0..rows.len()).collect();
        Ok(Self {
            rows,
            positions,
            filtered: all.clone(),
            view: all,
        })
    }

    pub(super) fn view_rows(&self) -> impl Iterator<Item = &Row<T>> {
        self.view.iter().map(|&i| &self.rows[i])
    }

    pub(super) fn get(&self, key: &str) -> Option<&Row<T>> {
        self.positions.get(key).map(|&i| &self.rows[i])
    }
}

/// The last committed page plus request bookkeeping.
pub(super) struct ServerData<T> {
    pub(super) source: Arc<dyn PageSource<T>>,
    pub(super) page: Vec<Row<T>>,
    /// `None` until the first page commits.
    pub(super) total: Option<usize>,
    pub(super) tracker: RequestTracker,
    /// Latest issued request, until it resolves.
    pub(super) pending: Option<FetchTicket>,
    /// Query of the latest issued request.
    pub(super) latest_query: Option<PageQuery>,
    pub(super) error: Option<FetchError>,
    pub(super) tx: mpsc::UnboundedSender<Response<T>>,
    pub(super) rx: mpsc::UnboundedReceiver<Response<T>>,
    /// Spawned fetches whose response has not been received.
    pub(super) outstanding: usize,
}

impl<T> ServerData<T> {
    pub(super) fn new(source: Arc<dyn PageSource<T>>, tracker: RequestTracker) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            source,
            page: Vec::new(),
            total: None,
            tracker,
            pending: None,
            latest_query: None,
            error: None,
            tx,
            rx,
            outstanding: 0,
        }
    }
}
