//! Request ordering for last-request-wins.

use std::fmt;

use crate::page::PageQuery;

/// Monotonically increasing id of one outbound page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

impl RequestToken {
    /// Raw sequence number.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Issues tokens and remembers which one is current.
#[derive(Debug, Default)]
pub struct RequestTracker {
    latest: u64,
}

impl RequestTracker {
    /// Creates a tracker that has issued nothing yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue the next token. Every earlier token becomes stale.
    pub fn issue(&mut self) -> RequestToken {
        self.latest += 1;
        RequestToken(self.latest)
    }

    /// The most recently issued token.
    pub fn latest(&self) -> Option<RequestToken> {
        (self.latest > 0).then_some(RequestToken(self.latest))
    }

    /// Returns `true` if `token` is the most recently issued one.
    pub fn is_latest(&self, token: RequestToken) -> bool {
        token.0 == self.latest
    }
}

/// An issued request: the token to complete it with and the query to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    /// Token to hand back on completion.
    pub token: RequestToken,
    /// Query for the page source.
    pub query: PageQuery,
}
