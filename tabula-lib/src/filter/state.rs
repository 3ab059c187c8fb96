//! Committed filter state.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

/// Global and per-column filter text.
///
/// Empty or whitespace-only queries are treated as "match everything", and
/// setting a per-column query to empty removes the entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    global: String,
    per_column: BTreeMap<String, String>,
}

impl FilterState {
    /// Create an empty filter state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style global query.
    pub fn with_global(mut self, query: impl Into<String>) -> Self {
        self.set_global(query);
        self
    }

    /// Builder-style per-column query.
    pub fn with_column(mut self, column_id: impl Into<String>, query: impl Into<String>) -> Self {
        self.set_column(column_id, query);
        self
    }

    /// The global query as typed.
    pub fn global(&self) -> &str {
        &self.global
    }

    /// The global query if it is non-blank, untrimmed.
    pub fn active_global(&self) -> Option<&str> {
        is_active(&self.global).then_some(self.global.as_str())
    }

    /// The query for a column, if one is set.
    pub fn column(&self, column_id: &str) -> Option<&str> {
        self.per_column.get(column_id).map(String::as_str)
    }

    /// Iterate non-blank per-column queries in column-id order, untrimmed.
    pub fn active_columns(&self) -> impl Iterator<Item = (&str, &str)> {
        self.per_column
            .iter()
            .filter(|(_, q)| is_active(q))
            .map(|(id, q)| (id.as_str(), q.as_str()))
    }

    /// Set the global query. Returns `true` if it changed.
    pub fn set_global(&mut self, query: impl Into<String>) -> bool {
        let query = query.into();
        if self.global == query {
            return false;
        }
        self.global = query;
        true
    }

    /// Set a per-column query. An empty query removes the entry.
    /// Returns `true` if the state changed.
    pub fn set_column(&mut self, column_id: impl Into<String>, query: impl Into<String>) -> bool {
        let column_id = column_id.into();
        let query = query.into();
        if query.is_empty() {
            return self.per_column.remove(&column_id).is_some();
        }
        match self.per_column.get(&column_id) {
            Some(existing) if *existing == query => false,
            _ => {
                self.per_column.insert(column_id, query);
                true
            }
        }
    }

    /// Clear every query.
    pub fn clear(&mut self) {
        self.global.clear();
        self.per_column.clear();
    }

    /// Returns `true` if no query would exclude any row.
    pub fn is_empty(&self) -> bool {
        self.active_global().is_none() && self.active_columns().next().is_none()
    }
}

fn is_active(query: &str) -> bool {
    !query.trim().is_empty()
}
