//! Cell values produced by column accessors

use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;

/// A value read out of a row by a column accessor.
///
/// Accessors return `Missing` for absent or malformed fields; the grid renders
/// those with its placeholder and sorts them last instead of failing.
///
/// # Example
///
/// ```
/// use tabula_lib::model::CellValue;
///
/// let name = CellValue::from("North POP");
/// let uplink = CellValue::from(10_000i64);
/// let missing = CellValue::from(None::<String>);
/// assert!(missing.is_missing());
/// assert_eq!(uplink.to_text(), "10000");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    /// Absent or unreadable value.
    #[default]
    Missing,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Floating point value.
    Float(f64),
    /// Text value.
    Text(String),
}

impl CellValue {
    /// Returns `true` if this is a missing value.
    pub fn is_missing(&self) -> bool {
        matches!(self, CellValue::Missing)
    }

    /// Returns the type name of this value.
    pub fn type_name(&self) -> &'static str {
        match self {
            CellValue::Missing => "missing",
            CellValue::Bool(_) => "bool",
            CellValue::Int(_) => "int",
            CellValue::Float(_) => "float",
            CellValue::Text(_) => "text",
        }
    }

    /// Stringified form used for filtering and export.
    ///
    /// `Missing` stringifies to the empty string.
    pub fn to_text(&self) -> Cow<'_, str> {
        match self {
            CellValue::Missing => Cow::Borrowed(""),
            CellValue::Text(s) => Cow::Borrowed(s.as_str()),
            CellValue::Bool(b) => Cow::Owned(b.to_string()),
            CellValue::Int(i) => Cow::Owned(i.to_string()),
            CellValue::Float(f) => Cow::Owned(f.to_string()),
        }
    }

    /// Converts a loosely typed JSON value into a cell value.
    ///
    /// Arrays and objects are kept as their compact JSON text.
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => CellValue::Missing,
            serde_json::Value::Bool(b) => CellValue::Bool(*b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => CellValue::Int(i),
                None => n.as_f64().map(CellValue::Float).unwrap_or(CellValue::Missing),
            },
            serde_json::Value::String(s) => CellValue::Text(s.clone()),
            other => CellValue::Text(other.to_string()),
        }
    }

    /// Key used by the sort engine: text folded to lowercase so comparisons
    /// are case-insensitive.
    pub(crate) fn sort_key(&self) -> CellValue {
        match self {
            CellValue::Text(s) => CellValue::Text(s.to_lowercase()),
            other => other.clone(),
        }
    }

    fn kind_rank(&self) -> u8 {
        match self {
            CellValue::Bool(_) => 0,
            CellValue::Int(_) | CellValue::Float(_) => 1,
            CellValue::Text(_) => 2,
            CellValue::Missing => 3,
        }
    }

    /// Total ordering between two values.
    ///
    /// Numbers compare numerically across `Int`/`Float`, booleans order
    /// `false < true`, and mixed kinds order `Bool < number < Text < Missing`.
    /// Text is compared as-is; use [`sort_key`](Self::sort_key) first for a
    /// case-insensitive comparison.
    pub fn compare(&self, other: &CellValue) -> Ordering {
        match (self, other) {
            (CellValue::Missing, CellValue::Missing) => Ordering::Equal,
            (CellValue::Bool(a), CellValue::Bool(b)) => a.cmp(b),
            (CellValue::Int(a), CellValue::Int(b)) => a.cmp(b),
            (CellValue::Int(a), CellValue::Float(b)) => (*a as f64).total_cmp(b),
            (CellValue::Float(a), CellValue::Int(b)) => a.total_cmp(&(*b as f64)),
            (CellValue::Float(a), CellValue::Float(b)) => a.total_cmp(b),
            (CellValue::Text(a), CellValue::Text(b)) => a.cmp(b),
            (a, b) => a.kind_rank().cmp(&b.kind_rank()),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

// =============================================================================
// From implementations
// =============================================================================

impl From<bool> for CellValue {
    fn from(v: bool) -> Self {
        CellValue::Bool(v)
    }
}

impl From<i32> for CellValue {
    fn from(v: i32) -> Self {
        CellValue::Int(v.into())
    }
}

impl From<i64> for CellValue {
    fn from(v: i64) -> Self {
        CellValue::Int(v)
    }
}

impl From<u32> for CellValue {
    fn from(v: u32) -> Self {
        CellValue::Int(v.into())
    }
}

impl From<u64> for CellValue {
    fn from(v: u64) -> Self {
        i64::try_from(v)
            .map(CellValue::Int)
            .unwrap_or(CellValue::Float(v as f64))
    }
}

impl From<usize> for CellValue {
    fn from(v: usize) -> Self {
        CellValue::from(v as u64)
    }
}

impl From<f32> for CellValue {
    fn from(v: f32) -> Self {
        CellValue::Float(v.into())
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        CellValue::Float(v)
    }
}

impl From<&str> for CellValue {
    fn from(v: &str) -> Self {
        CellValue::Text(v.to_string())
    }
}

impl From<String> for CellValue {
    fn from(v: String) -> Self {
        CellValue::Text(v)
    }
}

impl From<&String> for CellValue {
    fn from(v: &String) -> Self {
        CellValue::Text(v.clone())
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(CellValue::Missing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_text() {
        assert_eq!(CellValue::Missing.to_text(), "");
        assert_eq!(CellValue::from(true).to_text(), "true");
        assert_eq!(CellValue::from(42i64).to_text(), "42");
        assert_eq!(CellValue::from(2.5).to_text(), "2.5");
        assert_eq!(CellValue::from("abc").to_text(), "abc");
    }

    #[test]
    fn test_numeric_compare_across_kinds() {
        assert_eq!(CellValue::Int(2).compare(&CellValue::Float(10.0)), Ordering::Less);
        assert_eq!(CellValue::Float(3.0).compare(&CellValue::Int(3)), Ordering::Equal);
        // Lexically "10" < "9", numerically it is not.
        assert_eq!(CellValue::Int(10).compare(&CellValue::Int(9)), Ordering::Greater);
    }

    #[test]
    fn test_mixed_kind_order() {
        assert_eq!(CellValue::Bool(true).compare(&CellValue::Int(0)), Ordering::Less);
        assert_eq!(CellValue::Int(0).compare(&CellValue::from("a")), Ordering::Less);
        assert_eq!(CellValue::from("a").compare(&CellValue::Missing), Ordering::Less);
    }

    #[test]
    fn test_sort_key_folds_case() {
        let a = CellValue::from("Bravo").sort_key();
        let b = CellValue::from("alpha").sort_key();
        assert_eq!(a.compare(&b), Ordering::Greater);
    }

    #[test]
    fn test_from_json() {
        use serde_json::json;

        assert_eq!(CellValue::from_json(&json!(null)), CellValue::Missing);
        assert_eq!(CellValue::from_json(&json!(7)), CellValue::Int(7));
        assert_eq!(CellValue::from_json(&json!(1.5)), CellValue::Float(1.5));
        assert_eq!(CellValue::from_json(&json!("x")), CellValue::from("x"));
        assert_eq!(CellValue::from_json(&json!([1, 2])), CellValue::from("[1,2]"));
    }

    #[test]
    fn test_option_conversion() {
        assert_eq!(CellValue::from(Some(5i64)), CellValue::Int(5));
        assert_eq!(CellValue::from(None::<i64>), CellValue::Missing);
    }
}
