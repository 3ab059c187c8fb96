//! Sort state and the header toggle policy.

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Ascending order (A-Z, 0-9).
    Asc,
    /// Descending order (Z-A, 9-0).
    Desc,
}

impl Direction {
    /// The opposite direction.
    pub fn reverse(self) -> Self {
        match self {
            Direction::Asc => Direction::Desc,
            Direction::Desc => Direction::Asc,
        }
    }

    /// Lowercase name, as sent in outbound queries.
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the sort state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortKey {
    /// Column id.
    pub column_id: String,
    /// Direction for this column.
    pub direction: Direction,
}

impl SortKey {
    /// Creates a sort key.
    pub fn new(column_id: impl Into<String>, direction: Direction) -> Self {
        Self {
            column_id: column_id.into(),
            direction,
        }
    }
}

/// Ordered list of sort keys; the first entry is the primary key.
///
/// A column appears at most once. Setting a column that is already present
/// updates its entry in place and keeps its priority.
///
/// # Toggle policy
///
/// Clicking the same header cycles `Asc -> Desc -> unsorted -> Asc`.
/// [`toggle`](Self::toggle) is the single-sort variant: a column not in the
/// state replaces every other key. [`toggle_multi`](Self::toggle_multi) keeps
/// the other keys and appends new columns at the lowest priority.
///
/// # Example
///
/// ```
/// use tabula_lib::sort::{Direction, SortState};
///
/// let mut sort = SortState::new();
/// assert_eq!(sort.toggle("region"), Some(Direction::Asc));
/// assert_eq!(sort.toggle("region"), Some(Direction::Desc));
/// assert_eq!(sort.toggle("region"), None);
/// assert!(sort.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    keys: Vec<SortKey>,
}

impl SortState {
    /// Create an empty (unsorted) state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Single-key ascending state.
    pub fn asc(column_id: impl Into<String>) -> Self {
        Self {
            keys: vec![SortKey::new(column_id, Direction::Asc)],
        }
    }

    /// Single-key descending state.
    pub fn desc(column_id: impl Into<String>) -> Self {
        Self {
            keys: vec![SortKey::new(column_id, Direction::Desc)],
        }
    }

    /// Adds a lower-priority ascending key.
    pub fn then_asc(mut self, column_id: impl Into<String>) -> Self {
        self.set(column_id, Direction::Asc);
        self
    }

    /// Adds a lower-priority descending key.
    pub fn then_desc(mut self, column_id: impl Into<String>) -> Self {
        self.set(column_id, Direction::Desc);
        self
    }

    /// The keys in priority order.
    pub fn keys(&self) -> &[SortKey] {
        &self.keys
    }

    /// The primary key, if any.
    pub fn primary(&self) -> Option<&SortKey> {
        self.keys.first()
    }

    /// Direction currently applied to a column.
    pub fn direction_of(&self, column_id: &str) -> Option<Direction> {
        self.keys
            .iter()
            .find(|k| k.column_id == column_id)
            .map(|k| k.direction)
    }

    /// Returns `true` if nothing is sorted.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Set a column's direction, replacing an existing entry in place or
    /// appending a new lowest-priority entry.
    pub fn set(&mut self, column_id: impl Into<String>, direction: Direction) {
        let column_id = column_id.into();
        match self.keys.iter_mut().find(|k| k.column_id == column_id) {
            Some(key) => key.direction = direction,
            None => self.keys.push(SortKey::new(column_id, direction)),
        }
    }

    /// Remove a column from the state. Returns `true` if it was present.
    pub fn remove(&mut self, column_id: &str) -> bool {
        let before = self.keys.len();
        self.keys.retain(|k| k.column_id != column_id);
        self.keys.len() != before
    }

    /// Clear all keys.
    pub fn clear(&mut self) {
        self.keys.clear();
    }

    /// Single-sort header toggle. Returns the column's new direction, or
    /// `None` when the cycle reached "unsorted".
    pub fn toggle(&mut self, column_id: &str) -> Option<Direction> {
        let next = next_direction(self.direction_of(column_id));
        self.keys.clear();
        if let Some(direction) = next {
            self.keys.push(SortKey::new(column_id, direction));
        }
        next
    }

    /// Multi-sort header toggle: only this column's entry cycles.
    pub fn toggle_multi(&mut self, column_id: &str) -> Option<Direction> {
        let next = next_direction(self.direction_of(column_id));
        match next {
            Some(direction) => self.set(column_id, direction),
            None => {
                self.remove(column_id);
            }
        }
        next
    }
}

fn next_direction(current: Option<Direction>) -> Option<Direction> {
    match current {
        None => Some(Direction::Asc),
        Some(Direction::Asc) => Some(Direction::Desc),
        Some(Direction::Desc) => None,
    }
}
