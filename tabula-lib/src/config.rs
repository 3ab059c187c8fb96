//! Grid configuration

use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

use crate::error::GridError;
use crate::filter::FilterMode;
use crate::selection::SelectionMode;

/// Rows per page unless configured otherwise.
pub const DEFAULT_PAGE_SIZE: usize = 25;

/// Quiet window for typed filter input unless configured otherwise.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(200);

/// Per-grid settings.
///
/// Loadable from JSON; any field left out takes its default. The debounce
/// window is written in milliseconds as `debounce_ms`.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use tabula_lib::config::GridConfig;
/// use tabula_lib::filter::FilterMode;
///
/// let config = GridConfig::default()
///     .with_page_size(50)
///     .with_debounce(Duration::from_millis(300))
///     .with_filter_mode(FilterMode::Fuzzy);
/// assert!(config.validate().is_ok());
///
/// let loaded: GridConfig = serde_json::from_str(r#"{"page_size": 10, "debounce_ms": 0}"#).unwrap();
/// assert_eq!(loaded.page_size, 10);
/// assert_eq!(loaded.debounce, Duration::ZERO);
/// assert_eq!(loaded.overscan, 5);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Rows per page.
    ///
    /// Default: 25
    pub page_size: usize,

    /// Quiet window before typed filter input commits. Zero commits on the
    /// next tick.
    ///
    /// Default: 200ms
    #[serde(rename = "debounce_ms", with = "duration_ms")]
    pub debounce: Duration,

    /// Estimated row height used by the virtualizer.
    ///
    /// Default: 1
    pub row_height: u64,

    /// Rows rendered beyond each viewport edge.
    ///
    /// Default: 5
    pub overscan: usize,

    /// Global filter matching mode.
    ///
    /// Default: substring
    pub filter_mode: FilterMode,

    /// What row selection is allowed.
    ///
    /// Default: multiple
    pub selection_mode: SelectionMode,

    /// Text shown for missing or unrenderable cells.
    ///
    /// Default: empty
    pub placeholder: String,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            debounce: DEFAULT_DEBOUNCE,
            row_height: 1,
            overscan: 5,
            filter_mode: FilterMode::Substring,
            selection_mode: SelectionMode::Multiple,
            placeholder: String::new(),
        }
    }
}

impl GridConfig {
    /// Creates a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the page size.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Sets the debounce window.
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Sets the estimated row height.
    pub fn with_row_height(mut self, row_height: u64) -> Self {
        self.row_height = row_height;
        self
    }

    /// Sets the overscan.
    pub fn with_overscan(mut self, overscan: usize) -> Self {
        self.overscan = overscan;
        self
    }

    /// Sets the global filter mode.
    pub fn with_filter_mode(mut self, filter_mode: FilterMode) -> Self {
        self.filter_mode = filter_mode;
        self
    }

    /// Sets the selection mode.
    pub fn with_selection_mode(mut self, selection_mode: SelectionMode) -> Self {
        self.selection_mode = selection_mode;
        self
    }

    /// Sets the placeholder text.
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    /// Check values a grid cannot run with.
    pub fn validate(&self) -> Result<(), GridError> {
        if self.page_size == 0 {
            return Err(GridError::ZeroPageSize);
        }
        Ok(())
    }
}

mod duration_ms {
    use std::time::Duration;

    use serde::Deserialize;
    use serde::Deserializer;
    use serde::Serializer;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis().min(u64::MAX as u128) as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
