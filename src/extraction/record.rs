//! Contents of `*_error.json` artifacts.

use crate::llm::{CallError, ExtractionResponse};
use serde::Serialize;

/// Classification for documents that could not be read from disk.
pub const READ_FAILED: &str = "Failed to read or prepare PDF file";
/// Classification for failed remote calls.
pub const CALL_FAILED: &str = "API call failed";
/// Classification for responses that are not usable JSON.
pub const INVALID_JSON: &str = "Invalid JSON format received from API";

/// Why one input document produced no result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorRecord {
    pub error: &'static str,
    pub filename: String,
    #[serde(flatten)]
    pub detail: ErrorDetail,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ErrorDetail {
    /// Read and call failures.
    Failure {
        exception_type: String,
        details: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        prompt_feedback: Option<String>,
    },
    /// The call succeeded but its text was rejected by the validator.
    Response {
        raw_response: String,
        prompt_feedback: String,
    },
}

impl ErrorRecord {
    pub fn read_failure(filename: impl Into<String>, err: &std::io::Error) -> Self {
        Self {
            error: READ_FAILED,
            filename: filename.into(),
            detail: ErrorDetail::Failure {
                exception_type: format!("{:?}", err.kind()),
                details: err.to_string(),
                prompt_feedback: None,
            },
        }
    }

    pub fn call_failure(filename: impl Into<String>, err: &CallError) -> Self {
        Self {
            error: CALL_FAILED,
            filename: filename.into(),
            detail: ErrorDetail::Failure {
                exception_type: err.exception_type().to_string(),
                details: err.to_string(),
                prompt_feedback: err.prompt_feedback().map(ToString::to_string),
            },
        }
    }

    pub fn invalid_response(filename: impl Into<String>, response: &ExtractionResponse) -> Self {
        Self {
            error: INVALID_JSON,
            filename: filename.into(),
            detail: ErrorDetail::Response {
                raw_response: response.text.clone(),
                prompt_feedback: response.feedback_summary(),
            },
        }
    }
}
