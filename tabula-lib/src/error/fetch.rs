//! Page source error types

use std::time::Duration;

/// Errors a [`PageSource`](crate::source::PageSource) can report.
///
/// The grid never propagates these out of its read path: a failed fetch
/// leaves the last good page in place and is surfaced through
/// [`DataGrid::last_error`](crate::grid::DataGrid::last_error).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FetchError {
    /// HTTP error response from the backing API.
    #[error("HTTP {status}: {message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Error message.
        message: String,
    },

    /// Network error while fetching.
    #[error("Network error: {0}")]
    Network(String),

    /// Request timed out.
    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    /// Failed to parse the page payload.
    #[error("Response parse error: {0}")]
    Parse(String),

    /// Any other source-specific failure.
    #[error("{0}")]
    Other(String),
}

impl FetchError {
    /// Creates a new HTTP error.
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
        }
    }

    /// Creates a new network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Creates a new parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    /// Creates an error from any other failure description.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }

    /// Returns the HTTP status code if this is an HTTP error.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns `true` if offering the user a retry makes sense.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http { status, .. } => matches!(status, 408 | 429 | 500 | 502 | 503 | 504),
            Self::Network(_) => true,
            Self::Timeout(_) => true,
            _ => false,
        }
    }
}
