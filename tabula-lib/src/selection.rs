//! Row selection by identity.
//!
//! Selection tracks [`RowKey`]s, never positions, so it survives sorting,
//! filtering, paging and virtualized scrolling of the same logical rows.
//! Every mutation computes the next key set and reports the difference
//! against the current one as a [`SelectionDelta`].

use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;

use crate::model::{Row, RowKey};

/// What a grid lets the user select.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    /// Selection calls are no-ops.
    None,
    /// At most one row.
    Single,
    /// Any number of rows, including range and select-all.
    #[default]
    Multiple,
}

/// Keys added and removed by one selection change, each sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionDelta {
    /// Newly selected keys.
    pub added: Vec<RowKey>,
    /// Newly deselected keys.
    pub removed: Vec<RowKey>,
}

impl SelectionDelta {
    /// Returns `true` if nothing changed.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// The set of selected row keys plus the anchor used for range selection.
///
/// Rows that leave the filtered set stay selected; only [`clear`](Self::clear)
/// or the owning grid replacing its data empties the set.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    keys: BTreeSet<RowKey>,
    anchor: Option<RowKey>,
}

impl Selection {
    /// Empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Selected keys in key order.
    pub fn selected_keys(&self) -> Vec<RowKey> {
        self.keys.iter().cloned().collect()
    }

    /// Selected keys in key order, borrowed.
    pub fn iter(&self) -> impl Iterator<Item = &RowKey> {
        self.keys.iter()
    }

    pub fn is_selected(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Last key toggled or selected on its own.
    pub fn anchor(&self) -> Option<&RowKey> {
        self.anchor.as_ref()
    }

    /// Drop every key and the anchor.
    pub fn clear(&mut self) -> SelectionDelta {
        self.anchor = None;
        self.replace(BTreeSet::new())
    }

    /// Make `key` the only selected key.
    pub fn select(&mut self, key: &RowKey) -> SelectionDelta {
        self.anchor = Some(key.clone());
        self.replace(BTreeSet::from([key.clone()]))
    }

    /// Flip one key and move the anchor to it.
    pub fn toggle(&mut self, key: &RowKey) -> SelectionDelta {
        self.anchor = Some(key.clone());
        if self.keys.remove(key) {
            SelectionDelta {
                added: Vec::new(),
                removed: vec![key.clone()],
            }
        } else {
            self.keys.insert(key.clone());
            SelectionDelta {
                added: vec![key.clone()],
                removed: Vec::new(),
            }
        }
    }

    /// Select the keys between the anchor and `target` in `ordered`, which is
    /// the filtered display order. Without `extend` the span becomes the
    /// whole selection.
    ///
    /// Falls back to [`select`](Self::select) when either end is not in
    /// `ordered`. The anchor does not move.
    pub fn range_select(&mut self, target: &RowKey, ordered: &[RowKey], extend: bool) -> SelectionDelta {
        let Some(span) = self.span(target, ordered) else {
            return self.select(target);
        };
        let mut next = if extend { self.keys.clone() } else { BTreeSet::new() };
        next.extend(span.iter().cloned());
        self.replace(next)
    }

    fn span<'a>(&self, target: &RowKey, ordered: &'a [RowKey]) -> Option<&'a [RowKey]> {
        let from = self.anchor.as_ref().unwrap_or(target);
        let a = ordered.iter().position(|k| k == from)?;
        let b = ordered.iter().position(|k| k == target)?;
        Some(&ordered[a.min(b)..=a.max(b)])
    }

    /// Select every key of `filtered`, or deselect them all when every one
    /// is already selected. Keys outside `filtered` are untouched.
    pub fn toggle_all(&mut self, filtered: &[RowKey]) -> SelectionDelta {
        let covered = !filtered.is_empty() && filtered.iter().all(|k| self.keys.contains(k));
        let mut next = self.keys.clone();
        if covered {
            for key in filtered {
                next.remove(key);
            }
        } else {
            next.extend(filtered.iter().cloned());
        }
        self.replace(next)
    }

    /// The selected rows among `rows`, in the order given.
    ///
    /// The grid passes its whole filtered collection here, so the result
    /// does not depend on what is scrolled into view.
    pub fn selected_rows<'a, T: 'a>(&self, rows: impl IntoIterator<Item = &'a Row<T>>) -> Vec<&'a Row<T>> {
        rows.into_iter().filter(|row| self.keys.contains(row.key())).collect()
    }

    fn replace(&mut self, next: BTreeSet<RowKey>) -> SelectionDelta {
        let delta = SelectionDelta {
            added: next.difference(&self.keys).cloned().collect(),
            removed: self.keys.difference(&next).cloned().collect(),
        };
        self.keys = next;
        delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(ids: &[&str]) -> Vec<RowKey> {
        ids.iter().map(|id| RowKey::from(*id)).collect()
    }

    #[test]
    fn test_default_mode_is_multiple() {
        assert_eq!(SelectionMode::default(), SelectionMode::Multiple);
    }

    #[test]
    fn test_toggle_adds_then_removes() {
        let mut selection = Selection::new();
        let key = RowKey::from("a");
        assert_eq!(selection.toggle(&key).added, keys(&["a"]));
        assert!(selection.is_selected("a"));
        assert_eq!(selection.toggle(&key).removed, keys(&["a"]));
        assert!(selection.is_empty());
        assert_eq!(selection.anchor(), Some(&key));
    }

    #[test]
    fn test_select_replaces() {
        let mut selection = Selection::new();
        selection.toggle_all(&keys(&["a", "b"]));
        let delta = selection.select(&RowKey::from("c"));
        assert_eq!(delta.added, keys(&["c"]));
        assert_eq!(delta.removed, keys(&["a", "b"]));
        assert_eq!(selection.selected_keys(), keys(&["c"]));
    }

    #[test]
    fn test_range_select_both_directions() {
        let ordered = keys(&["a", "b", "c", "d", "e"]);
        let mut selection = Selection::new();
        selection.toggle(&RowKey::from("d"));
        selection.range_select(&RowKey::from("b"), &ordered, false);
        assert_eq!(selection.selected_keys(), keys(&["b", "c", "d"]));
        assert_eq!(selection.anchor(), Some(&RowKey::from("d")));
    }

    #[test]
    fn test_range_select_without_extend_drops_outside() {
        let ordered = keys(&["a", "b", "c", "d", "e"]);
        let mut selection = Selection::new();
        selection.toggle(&RowKey::from("e"));
        selection.toggle(&RowKey::from("a"));
        let delta = selection.range_select(&RowKey::from("b"), &ordered, false);
        assert_eq!(delta.added, keys(&["b"]));
        assert_eq!(delta.removed, keys(&["e"]));
        assert_eq!(selection.selected_keys(), keys(&["a", "b"]));
    }

    #[test]
    fn test_range_select_with_extend_keeps_outside() {
        let ordered = keys(&["a", "b", "c"]);
        let mut selection = Selection::new();
        selection.toggle(&RowKey::from("z"));
        selection.toggle(&RowKey::from("a"));
        selection.range_select(&RowKey::from("c"), &ordered, true);
        assert_eq!(selection.selected_keys(), keys(&["a", "b", "c", "z"]));
    }

    #[test]
    fn test_range_select_with_filtered_out_anchor_selects_target() {
        let mut selection = Selection::new();
        selection.toggle(&RowKey::from("gone"));
        selection.range_select(&RowKey::from("b"), &keys(&["a", "b"]), false);
        assert_eq!(selection.selected_keys(), keys(&["b"]));
    }

    #[test]
    fn test_toggle_all_flips_when_everything_selected() {
        let filtered = keys(&["a", "b", "c"]);
        let mut selection = Selection::new();
        selection.toggle(&RowKey::from("b"));

        let delta = selection.toggle_all(&filtered);
        assert_eq!(delta.added, keys(&["a", "c"]));
        assert_eq!(selection.len(), 3);

        let delta = selection.toggle_all(&filtered);
        assert_eq!(delta.removed, filtered);
        assert!(selection.is_empty());
    }

    #[test]
    fn test_toggle_all_keeps_keys_outside_filter() {
        let mut selection = Selection::new();
        selection.toggle(&RowKey::from("z"));
        selection.toggle_all(&keys(&["a", "b"]));
        selection.toggle_all(&keys(&["a", "b"]));
        assert_eq!(selection.selected_keys(), keys(&["z"]));
    }

    #[test]
    fn test_toggle_all_on_nothing_is_empty_delta() {
        let mut selection = Selection::new();
        assert!(selection.toggle_all(&[]).is_empty());
    }

    #[test]
    fn test_selected_rows_follow_given_order() {
        let rows: Vec<Row<u32>> = (0..5u32).map(|i| Row::new(i, i)).collect();
        let mut selection = Selection::new();
        selection.toggle_all(&keys(&["3", "1"]));
        let picked: Vec<u32> = selection
            .selected_rows(rows.iter().rev())
            .into_iter()
            .map(|r| *r.data())
            .collect();
        assert_eq!(picked, vec![3, 1]);
    }
}
