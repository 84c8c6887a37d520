//! Result and error types for upload-probe.

use std::time::Duration;
use thiserror::Error;

/// Result type for upload-probe operations
pub type ProbeResult<T> = Result<T, ProbeError>;

/// Errors that can occur while driving or verifying an upload
#[derive(Debug, Error)]
pub enum ProbeError {
    /// Browser launch error
    #[error("Failed to launch browser: {message}")]
    BrowserLaunch {
        /// Error message
        message: String,
    },

    /// Navigation error
    #[error("Navigation to {url} failed: {message}")]
    Navigation {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// Element did not become ready in time
    #[error("Timed out after {ms}ms waiting for {selector}{}", last_error_suffix(.last_error.as_deref()))]
    Timeout {
        /// Selector that was awaited
        selector: String,
        /// Timeout in milliseconds
        ms: u64,
        /// Last probe failure seen before the deadline
        last_error: Option<String>,
    },

    /// Element was not in the DOM when an action needed it
    #[error("Element not found: {selector}")]
    ElementNotFound {
        /// Selector that matched nothing
        selector: String,
    },

    /// Input simulation error (file injection, clicks)
    #[error("Input simulation failed: {message}")]
    Input {
        /// Error message
        message: String,
    },

    /// Page error (script evaluation, DOM reads, teardown)
    #[error("Page error: {message}")]
    Page {
        /// Error message
        message: String,
    },

    /// Result text was not a well-formed upload response
    #[error("Could not decode upload result: {message} (raw: {raw:?})")]
    Decode {
        /// Decoder message
        message: String,
        /// Text read from the result container
        raw: String,
    },

    /// Parsed response disagrees with the fixture
    #[error("{field} mismatch: expected {expected}, got {actual}")]
    ExpectationMismatch {
        /// Compared field
        field: String,
        /// Value from the fixture
        expected: String,
        /// Value from the response
        actual: String,
    },

    /// Error response carried neither `errors` nor `message`
    #[error("Malformed response: {message}")]
    MalformedResponse {
        /// Error message
        message: String,
    },

    /// Fixture file unreadable, malformed or incomplete
    #[error("Fixture error: {message}")]
    Fixture {
        /// Error message
        message: String,
    },

    /// Invalid configuration value
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn last_error_suffix(last_error: Option<&str>) -> String {
    last_error.map_or_else(String::new, |e| format!(" (last error: {e})"))
}

impl ProbeError {
    /// Create a fixture error
    #[must_use]
    pub fn fixture(message: impl Into<String>) -> Self {
        Self::Fixture {
            message: message.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a timeout error
    #[must_use]
    pub fn timeout(
        selector: impl Into<String>,
        timeout: Duration,
        last_error: Option<String>,
    ) -> Self {
        Self::Timeout {
            selector: selector.into(),
            ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            last_error,
        }
    }

    /// Create a page error
    #[must_use]
    pub fn page(message: impl Into<String>) -> Self {
        Self::Page {
            message: message.into(),
        }
    }

    /// Create an input error
    #[must_use]
    pub fn input(message: impl Into<String>) -> Self {
        Self::Input {
            message: message.into(),
        }
    }

    /// Create an expectation mismatch
    #[must_use]
    pub fn mismatch(
        field: impl Into<String>,
        expected: impl std::fmt::Display,
        actual: impl std::fmt::Display,
    ) -> Self {
        Self::ExpectationMismatch {
            field: field.into(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }
}
