//! Error types for the report binary.
//!
//! [`ReportError`] is the top-level error type that wraps every failure
//! mode between loading the configuration and printing the report.

use std::path::PathBuf;

/// Top-level error for the report binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: safra_analytics::ConfigError,
    },

    /// A dataset file or directory could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        /// The file or directory that failed.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A dataset file was not a valid JSON array of records.
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        /// The file that failed.
        path: PathBuf,
        /// The underlying JSON error.
        source: serde_json::Error,
    },

    /// The records failed validation.
    #[error("invalid records: {source}")]
    Ledger {
        /// The underlying validation error.
        #[from]
        source: safra_ledger::LedgerError,
    },

    /// An analytics engine failed.
    #[error("analytics error: {source}")]
    Analytics {
        /// The underlying analytics error.
        #[from]
        source: safra_analytics::AnalyticsError,
    },

    /// The report could not be serialized.
    #[error("failed to serialize report: {source}")]
    Output {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },

    /// The analysis task panicked or was cancelled.
    #[error("analysis task failed: {source}")]
    Task {
        /// The underlying join error.
        #[from]
        source: tokio::task::JoinError,
    },

    /// The whole run exceeded its deadline.
    #[error("report timed out after {millis} ms")]
    Timeout {
        /// The deadline that elapsed.
        millis: u64,
    },
}
