//! Upload Probe: end-to-end checks for a CSV upload-and-validate web page
//!
//! Each input file listed in `expected_results.json` is uploaded through a
//! real browser, the JSON rendered into the results element is decoded, and
//! the outcome is compared with the fixture record for that file.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//! │ Fixture      │──►│ UploadSuite  │──►│ UploadPage   │──►│ UploadDriver │
//! │ (expected_   │   │ (partition,  │   │ (open,       │   │ (Chromium or │
//! │  results)    │   │  verify)     │   │  upload, read│   │  mock)       │
//! └──────────────┘   └──────────────┘   └──────────────┘   └──────────────┘
//! ```
//!
//! Files with `error_count == 0` must validate; all others must be rejected
//! with exactly the row errors or message the fixture names.

#![warn(missing_docs)]

/// Verification of decoded responses against fixture records
#[allow(clippy::missing_errors_doc)]
pub mod assertion;

/// Chromium-backed driver (feature `browser`)
#[allow(clippy::missing_errors_doc)]
pub mod browser;

/// Configuration from builders and environment
#[allow(clippy::missing_errors_doc)]
pub mod config;

/// Browser driver abstraction and the scripted mock
#[allow(clippy::missing_errors_doc)]
pub mod driver;

/// Expected-results fixture and its partitions
#[allow(clippy::missing_errors_doc)]
pub mod fixture;

/// Suite runner and per-case reports
pub mod harness;

/// Element selectors and readiness
pub mod locator;

/// Subscriber setup
pub mod logging;

/// Page model of the upload page
#[allow(clippy::missing_errors_doc)]
pub mod page_object;

/// Error types
pub mod result;

/// Decoded upload response
#[allow(clippy::missing_errors_doc)]
pub mod upload;

/// One upload in a fresh browser context
#[allow(clippy::missing_errors_doc)]
pub mod workflow;

pub use assertion::{verify_invalid, verify_valid, InvalidCheck, ValidCheck};
pub use browser::BrowserConfig;
#[cfg(feature = "browser")]
pub use browser::{ChromiumDriver, ChromiumLauncher};
pub use config::{ProbeConfig, DEFAULT_BASE_URL};
pub use driver::{BrowserLauncher, CallLog, MockDriver, MockLauncher, UploadDriver};
pub use fixture::{Expectation, ExpectationSet, FixtureAudit, UploadCase, Verdict};
pub use harness::{CaseOutcome, CaseReport, SuiteReport, UploadSuite};
pub use locator::{Locator, PollStep, ReadinessPoll, Selector, DEFAULT_POLL_INTERVAL_MS};
pub use logging::LogFormat;
pub use page_object::{PageObject, UploadPage, DEFAULT_ELEMENT_TIMEOUT_MS};
pub use result::{ProbeError, ProbeResult};
pub use upload::{ErrorDetail, UploadResult, UploadStatus};
pub use workflow::UploadWorkflow;

/// Prelude for convenient imports
pub mod prelude {
    pub use super::assertion::*;
    pub use super::browser::*;
    pub use super::config::*;
    pub use super::driver::*;
    pub use super::fixture::*;
    pub use super::harness::*;
    pub use super::locator::*;
    pub use super::logging::LogFormat;
    pub use super::page_object::*;
    pub use super::result::*;
    pub use super::upload::*;
    pub use super::workflow::*;
}
