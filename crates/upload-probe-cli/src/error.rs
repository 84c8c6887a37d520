//! Error types for the CLI

use thiserror::Error;
use upload_probe::ProbeError;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur in the CLI
#[derive(Debug, Error)]
pub enum CliError {
    /// One or more uploads did not behave as the fixture expects
    #[error("{failed} of {total} uploads failed")]
    TestFailures {
        /// Failed cases
        failed: usize,
        /// Cases run
        total: usize,
    },

    /// Fixture records and CSV files disagree
    #[error("Fixture out of sync: {unmatched} file(s) without a record, {missing} record(s) without a file")]
    FixtureAudit {
        /// CSV files with no record
        unmatched: usize,
        /// Records with no CSV file
        missing: usize,
    },

    /// IO error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Library error
    #[error("{0}")]
    Probe(#[from] ProbeError),

    /// Report serialization error
    #[error("Report serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}
