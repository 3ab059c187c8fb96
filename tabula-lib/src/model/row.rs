//! Row identity and payload

use std::borrow::Borrow;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;

/// Stable identity of a logical record.
///
/// Keys drive selection and diffing. They must stay the same across
/// re-fetches of the same record and must never be derived from a row's
/// position in a list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowKey(String);

impl RowKey {
    /// Creates a key from anything string-like.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for RowKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RowKey {
    fn from(v: &str) -> Self {
        Self(v.to_string())
    }
}

impl From<String> for RowKey {
    fn from(v: String) -> Self {
        Self(v)
    }
}

impl From<&String> for RowKey {
    fn from(v: &String) -> Self {
        Self(v.clone())
    }
}

impl From<i64> for RowKey {
    fn from(v: i64) -> Self {
        Self(v.to_string())
    }
}

impl From<u64> for RowKey {
    fn from(v: u64) -> Self {
        Self(v.to_string())
    }
}

impl From<i32> for RowKey {
    fn from(v: i32) -> Self {
        Self(v.to_string())
    }
}

impl From<u32> for RowKey {
    fn from(v: u32) -> Self {
        Self(v.to_string())
    }
}

/// An immutable row: a payload plus its identity key.
///
/// # Example
///
/// ```
/// use tabula_lib::model::Row;
///
/// #[derive(Debug, Clone)]
/// struct Subscriber {
///     account: u64,
///     region: String,
/// }
///
/// let row = Row::new(1042u64, Subscriber { account: 1042, region: "North".into() });
/// assert_eq!(row.key().as_str(), "1042");
/// assert_eq!(row.data().region, "North");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Row<T> {
    key: RowKey,
    data: T,
}

impl<T> Row<T> {
    /// Creates a row with the given identity key.
    pub fn new(key: impl Into<RowKey>, data: T) -> Self {
        Self {
            key: key.into(),
            data,
        }
    }

    /// Creates a row, deriving the key from the payload.
    pub fn keyed_by(data: T, key_fn: impl FnOnce(&T) -> RowKey) -> Self {
        let key = key_fn(&data);
        Self { key, data }
    }

    /// Returns the identity key.
    pub fn key(&self) -> &RowKey {
        &self.key
    }

    /// Returns the payload.
    pub fn data(&self) -> &T {
        &self.data
    }

    /// Consumes the row and returns the payload.
    pub fn into_data(self) -> T {
        self.data
    }
}
