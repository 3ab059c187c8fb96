//! Export errors

/// Errors writing an [`ExportTable`](crate::export::ExportTable) out.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// The delimited writer rejected a record.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Flushing the delimited writer failed.
    #[error("Failed to flush export: {0}")]
    Flush(#[from] std::io::Error),

    /// The written bytes were not UTF-8.
    #[error("Export is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// Building the JSON value failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
