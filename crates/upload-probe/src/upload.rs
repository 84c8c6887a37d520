//! The upload response the application renders into its result container.
//!
//! Wire shapes:
//!
//! ```text
//! {"status": "success", "data": [ <row>, ... ]}
//! {"status": "error", "errors": [ <row-error>, ... ]}
//! {"status": "error", "message": "<string>"}
//! ```
//!
//! Rows and row errors are kept as raw JSON values; their shape belongs to
//! the application, and comparisons against the fixture are exact.

use crate::result::{ProbeError, ProbeResult};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// Parsed upload response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum UploadResult {
    /// Every row validated
    Success {
        /// Accepted rows
        data: Vec<Value>,
    },
    /// Validation failed
    Error {
        /// Row-level error descriptors, as sent; `Some(Value::Null)` when the
        /// key is present with a null value
        #[serde(
            default,
            deserialize_with = "present",
            skip_serializing_if = "Option::is_none"
        )]
        errors: Option<Value>,
        /// File-level error message
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
}

/// Status tag of an upload response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    /// `"success"`
    Success,
    /// `"error"`
    Error,
}

impl fmt::Display for UploadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => f.write_str("success"),
            Self::Error => f.write_str("error"),
        }
    }
}

/// What an error response says went wrong
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ErrorDetail<'a> {
    /// Row-level errors (checked first when both are present); any value,
    /// including `null` or a non-list, counts once the key is present
    Rows(&'a Value),
    /// File-level message
    Message(&'a str),
    /// Neither field was present
    Missing,
}

/// Keeps a present key distinct from an absent one, even when its value is null
fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

impl UploadResult {
    /// Decode the text read from the result container
    pub fn parse(raw: &str) -> ProbeResult<Self> {
        serde_json::from_str(raw).map_err(|e| ProbeError::Decode {
            message: e.to_string(),
            raw: raw.to_string(),
        })
    }

    /// Status tag
    #[must_use]
    pub const fn status(&self) -> UploadStatus {
        match self {
            Self::Success { .. } => UploadStatus::Success,
            Self::Error { .. } => UploadStatus::Error,
        }
    }

    /// Accepted rows of a success response
    #[must_use]
    pub fn rows(&self) -> Option<&[Value]> {
        match self {
            Self::Success { data } => Some(data),
            Self::Error { .. } => None,
        }
    }

    /// Detail of an error response; `None` for success
    #[must_use]
    pub fn error_detail(&self) -> Option<ErrorDetail<'_>> {
        match self {
            Self::Success { .. } => None,
            Self::Error {
                errors: Some(errors),
                ..
            } => Some(ErrorDetail::Rows(errors)),
            Self::Error {
                message: Some(message),
                ..
            } => Some(ErrorDetail::Message(message)),
            Self::Error { .. } => Some(ErrorDetail::Missing),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    mod parse_tests {
        use super::*;

        #[test]
        fn test_success() {
            let result = UploadResult::parse(r#"{"status":"success","data":[{"a":1},{"a":2}]}"#)
                .unwrap();
            assert_eq!(result.status(), UploadStatus::Success);
            assert_eq!(result.rows().map(<[Value]>::len), Some(2));
            assert!(result.error_detail().is_none());
        }

        #[test]
        fn test_row_errors() {
            let result = UploadResult::parse(
                r#"{"status":"error","errors":[{"row":3,"field":"email","msg":"invalid"}]}"#,
            )
            .unwrap();
            assert_eq!(result.status(), UploadStatus::Error);
            let expected = json!([{"row": 3, "field": "email", "msg": "invalid"}]);
            assert_eq!(result.error_detail(), Some(ErrorDetail::Rows(&expected)));
        }

        #[test]
        fn test_file_message() {
            let result = UploadResult::parse(
                r#"{"status":"error","message":"Unable to parse CSV: invalid encoding"}"#,
            )
            .unwrap();
            assert_eq!(
                result.error_detail(),
                Some(ErrorDetail::Message("Unable to parse CSV: invalid encoding"))
            );
        }

        #[test]
        fn test_errors_take_precedence_over_message() {
            let result =
                UploadResult::parse(r#"{"status":"error","errors":[],"message":"x"}"#).unwrap();
            assert_eq!(result.error_detail(), Some(ErrorDetail::Rows(&json!([]))));
        }

        #[test]
        fn test_null_errors_are_still_row_errors() {
            let result =
                UploadResult::parse(r#"{"status":"error","errors":null,"message":"x"}"#).unwrap();
            assert_eq!(result.error_detail(), Some(ErrorDetail::Rows(&Value::Null)));
        }

        #[test]
        fn test_absent_errors_fall_back_to_message() {
            let result = UploadResult::parse(r#"{"status":"error","message":"x"}"#).unwrap();
            assert_eq!(result.error_detail(), Some(ErrorDetail::Message("x")));
        }

        #[test]
        fn test_error_without_detail_still_parses() {
            let result = UploadResult::parse(r#"{"status":"error"}"#).unwrap();
            assert_eq!(result.error_detail(), Some(ErrorDetail::Missing));
        }

        #[test]
        fn test_not_json_is_decode_error() {
            let err = UploadResult::parse("Internal Server Error").unwrap_err();
            match err {
                ProbeError::Decode { raw, .. } => assert_eq!(raw, "Internal Server Error"),
                other => panic!("expected decode error, got {other}"),
            }
        }

        #[test]
        fn test_unknown_status_is_decode_error() {
            let err = UploadResult::parse(r#"{"status":"pending"}"#).unwrap_err();
            assert!(matches!(err, ProbeError::Decode { .. }));
        }

        #[test]
        fn test_success_without_data_is_decode_error() {
            let err = UploadResult::parse(r#"{"status":"success"}"#).unwrap_err();
            assert!(matches!(err, ProbeError::Decode { .. }));
        }
    }

    #[test]
    fn test_status_display() {
        assert_eq!(UploadStatus::Success.to_string(), "success");
        assert_eq!(UploadStatus::Error.to_string(), "error");
    }
}
