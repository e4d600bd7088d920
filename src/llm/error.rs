//! Failure modes of a remote extraction call.

use serde_json::Value;

/// Why a call to the document API failed.
///
/// Every variant is recovered per file by the batch driver; the variant only
/// decides what ends up in the error artifact.
#[derive(Debug, thiserror::Error)]
pub enum CallError {
    /// The request never produced an HTTP response (DNS, TLS, connection reset...).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The API key was rejected.
    #[error("authentication failed ({status}): {message}")]
    Authentication {
        /// HTTP status code.
        status: u16,
        /// Error message from the API.
        message: String,
    },

    /// Rate limit or quota exhausted.
    #[error("quota exceeded ({status}): {message}")]
    Quota {
        /// HTTP status code.
        status: u16,
        /// Error message from the API.
        message: String,
    },

    /// The prompt was blocked by the service's safety filters.
    #[error("content blocked: {reason}")]
    ContentBlocked {
        /// Block reason reported by the service.
        reason: String,
        /// Raw prompt feedback.
        feedback: Value,
    },

    /// The request was refused as malformed or otherwise invalid.
    #[error("request rejected ({status}): {message}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Error message from the API.
        message: String,
    },

    /// The service failed on its side.
    #[error("server error ({status}): {message}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// Error message from the API.
        message: String,
    },

    /// A 2xx response whose body could not be decoded.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl CallError {
    /// Stable classification written to `exception_type` in error artifacts.
    #[must_use]
    pub fn exception_type(&self) -> &'static str {
        match self {
            Self::Transport(_) => "TransportError",
            Self::Authentication { .. } => "AuthenticationError",
            Self::Quota { .. } => "QuotaExceeded",
            Self::ContentBlocked { .. } => "ContentBlocked",
            Self::Rejected { .. } => "RequestRejected",
            Self::Server { .. } => "ServerError",
            Self::MalformedResponse(_) => "MalformedResponse",
        }
    }

    /// Prompt feedback carried by the failure, if the service sent any.
    #[must_use]
    pub fn prompt_feedback(&self) -> Option<&Value> {
        match self {
            Self::ContentBlocked { feedback, .. } => Some(feedback),
            _ => None,
        }
    }

    /// Map a non-success HTTP status and its body to a variant.
    pub(crate) fn from_status(status: u16, body: &str) -> Self {
        let message = api_error_message(body);
        match status {
            401 | 403 => Self::Authentication { status, message },
            429 => Self::Quota { status, message },
            500..=599 => Self::Server { status, message },
            // Gemini reports an invalid key as 400 INVALID_ARGUMENT
            400 if message.contains("API key") => Self::Authentication { status, message },
            _ => Self::Rejected { status, message },
        }
    }
}

/// Pull `error.message` out of a Google API error body, falling back to a
/// truncated copy of the raw body.
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.pointer("/error/message")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.chars().take(200).collect())
}
