//! Row filtering.

use log::debug;
use serde::Deserialize;
use serde::Serialize;

use crate::model::{Column, Row, find_column};

use super::rank::{FuzzyRanker, Ranker};
use super::state::FilterState;

/// How the global query is matched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    /// Case-insensitive substring containment.
    #[default]
    Substring,
    /// Substring containment, or a passing rank from the configured ranker.
    Fuzzy,
}

/// Applies a [`FilterState`] to a row collection.
///
/// - Global query: a row passes if ANY filterable column matches.
/// - Per-column queries: a row passes only if EVERY active query matches its
///   column (case-insensitive substring).
///
/// Results keep source order; sorting is a separate stage.
pub struct FilterEngine {
    mode: FilterMode,
    ranker: Box<dyn Ranker>,
}

impl FilterEngine {
    /// Create an engine using the default fuzzy ranker.
    pub fn new(mode: FilterMode) -> Self {
        Self {
            mode,
            ranker: Box::new(FuzzyRanker::new()),
        }
    }

    /// Replace the ranker used in fuzzy mode.
    pub fn with_ranker(mut self, ranker: impl Ranker + 'static) -> Self {
        self.ranker = Box::new(ranker);
        self
    }

    /// The global matching mode.
    pub fn mode(&self) -> FilterMode {
        self.mode
    }

    /// Switch the global matching mode.
    pub fn set_mode(&mut self, mode: FilterMode) {
        self.mode = mode;
    }

    /// Filter rows, returning references in source order.
    pub fn apply<'a, T>(
        &mut self,
        rows: &'a [Row<T>],
        columns: &[Column<T>],
        state: &FilterState,
    ) -> Vec<&'a Row<T>> {
        self.matching_indices(rows, columns, state)
            .into_iter()
            .map(|i| &rows[i])
            .collect()
    }

    /// Filter rows, returning the indices of passing rows in source order.
    pub fn matching_indices<T>(
        &mut self,
        rows: &[Row<T>],
        columns: &[Column<T>],
        state: &FilterState,
    ) -> Vec<usize> {
        if state.is_empty() {
            return (0..rows.len()).collect();
        }

        let global = state.active_global().map(|q| (q, q.to_lowercase()));
        let searchable: Vec<&Column<T>> = columns.iter().filter(|c| c.is_filterable()).collect();

        let mut per_column = Vec::new();
        for (id, query) in state.active_columns() {
            match find_column(columns, id) {
                Some(column) if column.is_filterable() => {
                    per_column.push((column, query.to_lowercase()));
                }
                Some(_) => debug!("Ignoring filter on non-filterable column '{}'", id),
                None => debug!("Ignoring filter on unknown column '{}'", id),
            }
        }

        let mut matched = Vec::new();
        for (index, row) in rows.iter().enumerate() {
            let data = row.data();

            let columns_pass = per_column
                .iter()
                .all(|(column, query)| column.text(data).to_lowercase().contains(query.as_str()));
            if !columns_pass {
                continue;
            }

            if let Some((raw, lowered)) = &global
                && !self.matches_global(data, &searchable, raw, lowered)
            {
                continue;
            }

            matched.push(index);
        }
        matched
    }

    fn matches_global<T>(
        &mut self,
        data: &T,
        searchable: &[&Column<T>],
        raw: &str,
        lowered: &str,
    ) -> bool {
        for column in searchable {
            let text = column.text(data);
            if text.to_lowercase().contains(lowered) {
                return true;
            }
            if self.mode == FilterMode::Fuzzy && self.ranker.rank(raw, &text).is_some() {
                return true;
            }
        }
        false
    }
}

impl Default for FilterEngine {
    fn default() -> Self {
        Self::new(FilterMode::default())
    }
}

impl std::fmt::Debug for FilterEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterEngine")
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone)]
    struct Site {
        name: &'static str,
        region: &'static str,
        secret: &'static str,
    }

    fn columns() -> Vec<Column<Site>> {
        vec![
            Column::new("name", "Name", |s: &Site| s.name),
            Column::new("region", "Region", |s: &Site| s.region),
            Column::new("secret", "Secret", |s: &Site| s.secret).filterable(false),
        ]
    }

    fn rows() -> Vec<Row<Site>> {
        [
            ("1", "Alpha Tower", "North", "x"),
            ("2", "Bravo Hub", "South", "north"),
            ("3", "Charlie POP", "NORTHEAST", "y"),
            ("4", "Delta Core", "West", "z"),
        ]
        .into_iter()
        .map(|(k, name, region, secret)| Row::new(k, Site { name, region, secret }))
        .collect()
    }

    fn keys(rows: &[&Row<Site>]) -> Vec<String> {
        rows.iter().map(|r| r.key().to_string()).collect()
    }

    #[test]
    fn test_empty_state_matches_everything() {
        let rows = rows();
        let mut engine = FilterEngine::default();
        let out = engine.apply(&rows, &columns(), &FilterState::new().with_global("  "));
        assert_eq!(out.len(), 4);
    }

    #[test]
    fn test_global_substring_case_insensitive() {
        let rows = rows();
        let mut engine = FilterEngine::default();
        let out = engine.apply(&rows, &columns(), &FilterState::new().with_global("north"));
        // Row 2 only matches on a non-filterable column.
        assert_eq!(keys(&out), vec!["1", "3"]);
    }

    #[test]
    fn test_surrounding_whitespace_is_part_of_the_query() {
        let rows = rows();
        let mut engine = FilterEngine::default();
        let out = engine.apply(&rows, &columns(), &FilterState::new().with_global("Alpha "));
        assert_eq!(keys(&out), vec!["1"]);
        // "north " does not occur in "North" or "NORTHEAST"
        let out = engine.apply(&rows, &columns(), &FilterState::new().with_global("north "));
        assert!(out.is_empty());
        let out = engine.apply(&rows, &columns(), &FilterState::new().with_column("region", "north "));
        assert!(out.is_empty());
    }

    #[test]
    fn test_per_column_is_conjunctive() {
        let rows = rows();
        let mut engine = FilterEngine::default();
        let state = FilterState::new()
            .with_column("region", "north")
            .with_column("name", "charlie");
        let out = engine.apply(&rows, &columns(), &state);
        assert_eq!(keys(&out), vec!["3"]);
    }

    #[test]
    fn test_unknown_column_is_ignored() {
        let rows = rows();
        let mut engine = FilterEngine::default();
        let state = FilterState::new().with_column("bogus", "zzz");
        assert_eq!(engine.apply(&rows, &columns(), &state).len(), 4);
    }

    #[test]
    fn test_fuzzy_mode_uses_ranker() {
        let rows = rows();
        let mut substring = FilterEngine::new(FilterMode::Substring);
        let mut fuzzy = FilterEngine::new(FilterMode::Fuzzy);
        let state = FilterState::new().with_global("dlcr");
        assert!(substring.apply(&rows, &columns(), &state).is_empty());
        assert_eq!(keys(&fuzzy.apply(&rows, &columns(), &state)), vec!["4"]);
    }

    #[test]
    fn test_custom_ranker() {
        let rows = rows();
        let mut engine = FilterEngine::new(FilterMode::Fuzzy)
            .with_ranker(|_q: &str, h: &str| h.starts_with('B').then_some(1u32));
        let state = FilterState::new().with_global("no-substring-match");
        assert_eq!(keys(&engine.apply(&rows, &columns(), &state)), vec!["2"]);
    }

    #[test]
    fn test_idempotent() {
        let rows = rows();
        let mut engine = FilterEngine::default();
        let state = FilterState::new().with_global("o");
        let once: Vec<Row<Site>> = engine
            .apply(&rows, &columns(), &state)
            .into_iter()
            .cloned()
            .collect();
        let twice = engine.apply(&once, &columns(), &state);
        assert_eq!(keys(&twice), once.iter().map(|r| r.key().to_string()).collect::<Vec<_>>());
    }
}
