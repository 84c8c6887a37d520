//! Checks of a parsed upload response against its fixture record.

use crate::fixture::Expectation;
use crate::result::{ProbeError, ProbeResult};
use crate::upload::{ErrorDetail, UploadResult, UploadStatus};
use serde_json::Value;

/// A valid file that passed verification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidCheck {
    /// Rows the application accepted
    pub rows: usize,
}

/// How an invalid file passed verification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidCheck {
    /// Row errors equal the fixture's `expected_errors`
    RowErrors(usize),
    /// Message equals the fixture's `expected_message`
    Message,
    /// A message came back but the fixture names none, so only the status
    /// was compared
    MessageUnchecked(String),
}

fn expect_status(result: &UploadResult, expected: UploadStatus) -> ProbeResult<()> {
    let actual = result.status();
    if actual == expected {
        Ok(())
    } else {
        Err(ProbeError::mismatch("status", expected, actual))
    }
}

fn pretty(values: &[Value]) -> String {
    serde_json::to_string(values).unwrap_or_else(|_| format!("{values:?}"))
}

/// Verify a response for a file expected to validate
///
/// The row count must equal both `success_count` and `total`, so a fixture
/// whose two counts disagree can never pass.
pub fn verify_valid(result: &UploadResult, expected: &Expectation) -> ProbeResult<ValidCheck> {
    expect_status(result, UploadStatus::Success)?;
    let rows = result.rows().map_or(0, <[Value]>::len);

    let success_count = expected
        .success_count
        .ok_or_else(|| ProbeError::fixture("valid record has no success_count"))?;
    if rows as u64 != success_count {
        return Err(ProbeError::mismatch("success_count", success_count, rows));
    }

    let total = expected
        .total
        .ok_or_else(|| ProbeError::fixture("valid record has no total"))?;
    if rows as u64 != total {
        return Err(ProbeError::mismatch(
            "total",
            total,
            format!("{rows} rows"),
        ));
    }

    Ok(ValidCheck { rows })
}

/// Verify a response for a file expected to be rejected
pub fn verify_invalid(result: &UploadResult, expected: &Expectation) -> ProbeResult<InvalidCheck> {
    expect_status(result, UploadStatus::Error)?;

    match result.error_detail() {
        Some(ErrorDetail::Rows(errors)) => {
            let expected_errors = expected.expected_errors.as_deref().ok_or_else(|| {
                ProbeError::fixture(format!(
                    "response has row errors {errors} but the record has no expected_errors"
                ))
            })?;
            match errors.as_array() {
                Some(rows) if rows.as_slice() == expected_errors => {
                    Ok(InvalidCheck::RowErrors(rows.len()))
                }
                _ => Err(ProbeError::mismatch(
                    "errors",
                    pretty(expected_errors),
                    errors,
                )),
            }
        }
        Some(ErrorDetail::Message(message)) => match expected.expected_message.as_deref() {
            Some(expected_message) if expected_message == message => Ok(InvalidCheck::Message),
            Some(expected_message) => Err(ProbeError::mismatch(
                "message",
                format!("{expected_message:?}"),
                format!("{message:?}"),
            )),
            None => Ok(InvalidCheck::MessageUnchecked(message.to_string())),
        },
        Some(ErrorDetail::Missing) | None => Err(ProbeError::MalformedResponse {
            message: "No 'errors' or 'message' field returned by server".to_string(),
        }),
    }
}
