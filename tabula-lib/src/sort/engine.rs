//! Stable multi-key sorting.

use std::cmp::Ordering;

use log::debug;

use crate::model::{CellValue, Column, Row, find_column};

use super::state::{Direction, SortState};

/// Compare two cell values for one sort key.
///
/// Missing values sort last regardless of direction, so page boundaries stay
/// put when the user flips a column.
pub fn compare_cells(a: &CellValue, b: &CellValue, direction: Direction) -> Ordering {
    match (a.is_missing(), b.is_missing()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => {
            let ordering = a.compare(b);
            match direction {
                Direction::Asc => ordering,
                Direction::Desc => ordering.reverse(),
            }
        }
    }
}

/// Applies a [`SortState`] to a row collection.
#[derive(Debug, Clone, Copy, Default)]
pub struct SortEngine;

impl SortEngine {
    /// Sort rows, returning references in sorted order.
    pub fn apply<'a, T>(rows: &'a [Row<T>], columns: &[Column<T>], state: &SortState) -> Vec<&'a Row<T>> {
        let mut indices: Vec<usize> = (0..rows.len()).collect();
        Self::sort_indices(rows, &mut indices, columns, state);
        indices.into_iter().map(|i| &rows[i]).collect()
    }

    /// Reorder `indices` (positions into `rows`) by the sort state.
    ///
    /// Keys are compared in priority order and the first non-equal key
    /// decides. Entries that compare equal on every key keep their relative
    /// order in `indices`. Keys naming unknown or non-sortable columns are
    /// skipped.
    pub fn sort_indices<T>(
        rows: &[Row<T>],
        indices: &mut Vec<usize>,
        columns: &[Column<T>],
        state: &SortState,
    ) {
        let mut keyed_columns = Vec::with_capacity(state.keys().len());
        for key in state.keys() {
            match find_column(columns, &key.column_id) {
                Some(column) if column.is_sortable() => keyed_columns.push((column, key.direction)),
                Some(_) => debug!("Skipping sort on non-sortable column '{}'", key.column_id),
                None => debug!("Skipping sort on unknown column '{}'", key.column_id),
            }
        }
        if keyed_columns.is_empty() || indices.len() < 2 {
            return;
        }

        // Decorate once so accessors run O(n) times, not O(n log n).
        let mut decorated: Vec<(usize, usize, Vec<CellValue>)> = indices
            .iter()
            .enumerate()
            .map(|(position, &index)| {
                let data = rows[index].data();
                let values = keyed_columns
                    .iter()
                    .map(|(column, _)| column.value(data).sort_key())
                    .collect();
                (position, index, values)
            })
            .collect();

        decorated.sort_by(|(pos_a, _, a), (pos_b, _, b)| {
            a.iter()
                .zip(b.iter())
                .zip(keyed_columns.iter())
                .map(|((va, vb), (_, direction))| compare_cells(va, vb, *direction))
                .find(|o| *o != Ordering::Equal)
                .unwrap_or_else(|| pos_a.cmp(pos_b))
        });

        indices.clear();
        indices.extend(decorated.into_iter().map(|(_, index, _)| index));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone)]
    struct Plan {
        name: &'static str,
        speed: Option<i64>,
    }

    fn columns() -> Vec<Column<Plan>> {
        vec![
            Column::new("name", "Name", |p: &Plan| p.name).sortable(),
            Column::new("speed", "Speed", |p: &Plan| p.speed).sortable(),
            Column::new("fixed", "Fixed", |_: &Plan| "same"),
        ]
    }

    fn rows(data: &[(&'static str, &'static str, Option<i64>)]) -> Vec<Row<Plan>> {
        data.iter()
            .map(|(k, name, speed)| Row::new(*k, Plan { name: *name, speed: *speed }))
            .collect()
    }

    fn keys(rows: &[&Row<Plan>]) -> Vec<String> {
        rows.iter().map(|r| r.key().to_string()).collect()
    }

    #[test]
    fn test_text_is_case_insensitive() {
        let rows = rows(&[("1", "beta", None), ("2", "Alpha", None), ("3", "alpha2", None)]);
        let out = SortEngine::apply(&rows, &columns(), &SortState::asc("name"));
        assert_eq!(keys(&out), vec!["2", "3", "1"]);
    }

    #[test]
    fn test_numbers_compare_numerically() {
        let rows = rows(&[("1", "a", Some(100)), ("2", "b", Some(20)), ("3", "c", Some(3))]);
        let out = SortEngine::apply(&rows, &columns(), &SortState::asc("speed"));
        assert_eq!(keys(&out), vec!["3", "2", "1"]);
    }

    #[test]
    fn test_missing_sorts_last_in_both_directions() {
        let rows = rows(&[("1", "a", None), ("2", "b", Some(20)), ("3", "c", Some(50))]);
        let asc = SortEngine::apply(&rows, &columns(), &SortState::asc("speed"));
        assert_eq!(keys(&asc), vec!["2", "3", "1"]);
        let desc = SortEngine::apply(&rows, &columns(), &SortState::desc("speed"));
        assert_eq!(keys(&desc), vec!["3", "2", "1"]);
    }

    #[test]
    fn test_secondary_key_breaks_ties() {
        let rows = rows(&[
            ("1", "b", Some(10)),
            ("2", "a", Some(20)),
            ("3", "a", Some(10)),
        ]);
        let state = SortState::asc("name").then_desc("speed");
        let out = SortEngine::apply(&rows, &columns(), &state);
        assert_eq!(keys(&out), vec!["2", "3", "1"]);
    }

    #[test]
    fn test_equal_keys_keep_input_order() {
        let rows = rows(&[("1", "x", Some(1)), ("2", "x", Some(1)), ("3", "x", Some(1))]);
        let mut indices = vec![2, 0, 1];
        SortEngine::sort_indices(&rows, &mut indices, &columns(), &SortState::desc("name"));
        assert_eq!(indices, vec![2, 0, 1]);
    }

    #[test]
    fn test_non_sortable_column_is_skipped() {
        let rows = rows(&[("1", "b", None), ("2", "a", None)]);
        let out = SortEngine::apply(&rows, &columns(), &SortState::asc("fixed"));
        assert_eq!(keys(&out), vec!["1", "2"]);
    }
}
