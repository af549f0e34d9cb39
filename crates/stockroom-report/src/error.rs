//! Report errors.

use thiserror::Error;

/// Errors from writing a report to its sink.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The destination rejected the write.
    #[error("Failed to write {report} report: {source}")]
    Io {
        report: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for report operations.
pub type ReportResult<T> = Result<T, ReportError>;
