//! Outbound page requests and inbound page responses.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::model::Row;
use crate::sort::{Direction, SortKey};

/// Parameters handed to a page source in server mode.
///
/// `sort_by`/`sort_dir` mirror the primary sort key for backends that only
/// understand one; `sort` carries the full priority list.
///
/// # Example
///
/// ```
/// use tabula_lib::page::PageQuery;
/// use tabula_lib::sort::Direction;
///
/// let query = PageQuery::new(2, 20)
///     .with_sort("region", Direction::Desc)
///     .with_filter("plan", "fiber 1g")
///     .with_global("north");
///
/// assert_eq!(query.offset(), 40);
/// assert_eq!(
///     query.to_query_string(),
///     "page=2&pageSize=20&sortBy=region&sortDir=desc&q=north&filter%5Bplan%5D=fiber%201g"
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    /// Zero-based page index.
    pub page: usize,
    /// Rows per page.
    pub page_size: usize,
    /// Primary sort column.
    pub sort_by: Option<String>,
    /// Primary sort direction.
    pub sort_dir: Option<Direction>,
    /// Every sort key in priority order.
    pub sort: Vec<SortKey>,
    /// Non-blank global query.
    pub global: Option<String>,
    /// Non-blank per-column queries.
    pub filters: BTreeMap<String, String>,
}

impl PageQuery {
    /// Unsorted, unfiltered request for one page.
    pub fn new(page: usize, page_size: usize) -> Self {
        Self {
            page,
            page_size,
            ..Default::default()
        }
    }

    /// Adds a sort key at the lowest priority.
    pub fn with_sort(mut self, column_id: impl Into<String>, direction: Direction) -> Self {
        let key = SortKey::new(column_id, direction);
        if self.sort.is_empty() {
            self.sort_by = Some(key.column_id.clone());
            self.sort_dir = Some(direction);
        }
        self.sort.push(key);
        self
    }

    /// Sets the global query.
    pub fn with_global(mut self, query: impl Into<String>) -> Self {
        self.global = Some(query.into());
        self
    }

    /// Adds a per-column query.
    pub fn with_filter(mut self, column_id: impl Into<String>, query: impl Into<String>) -> Self {
        self.filters.insert(column_id.into(), query.into());
        self
    }

    /// Offset of the first requested row.
    pub fn offset(&self) -> usize {
        self.page.saturating_mul(self.page_size)
    }

    /// Flat key/value pairs, for hosts that mirror the grid state in a URL.
    ///
    /// Secondary sort keys are emitted as `sortBy1`/`sortDir1`, and so on.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("page".to_string(), self.page.to_string()),
            ("pageSize".to_string(), self.page_size.to_string()),
        ];
        for (i, key) in self.sort.iter().enumerate() {
            let suffix = if i == 0 { String::new() } else { i.to_string() };
            pairs.push((format!("sortBy{suffix}"), key.column_id.clone()));
            pairs.push((format!("sortDir{suffix}"), key.direction.to_string()));
        }
        if let Some(global) = &self.global {
            pairs.push(("q".to_string(), global.clone()));
        }
        for (column, query) in &self.filters {
            pairs.push((format!("filter[{column}]"), query.clone()));
        }
        pairs
    }

    /// URL-encoded query string built from [`to_query_pairs`](Self::to_query_pairs).
    pub fn to_query_string(&self) -> String {
        self.to_query_pairs()
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// One page of rows plus the server's total-count hint.
#[derive(Debug, Clone, PartialEq)]
pub struct PageResponse<T> {
    /// Rows of the requested page, already filtered, sorted and sliced.
    pub items: Vec<Row<T>>,
    /// Total rows matching the query across all pages.
    pub total: usize,
}

impl<T> PageResponse<T> {
    /// Creates a response.
    pub fn new(items: Vec<Row<T>>, total: usize) -> Self {
        Self { items, total }
    }

    /// An empty result set.
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secondary_sort_pairs() {
        let query = PageQuery::new(0, 10)
            .with_sort("region", Direction::Asc)
            .with_sort("name", Direction::Desc);
        let pairs = query.to_query_pairs();
        assert!(pairs.contains(&("sortBy".to_string(), "region".to_string())));
        assert!(pairs.contains(&("sortBy1".to_string(), "name".to_string())));
        assert!(pairs.contains(&("sortDir1".to_string(), "desc".to_string())));
        assert_eq!(query.sort_by.as_deref(), Some("region"));
    }

    #[test]
    fn test_unsorted_query_string() {
        assert_eq!(PageQuery::new(1, 25).to_query_string(), "page=1&pageSize=25");
    }
}
