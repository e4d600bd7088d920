//! Turns raw model text into a JSON value.

use serde_json::Value;

const JSON_FENCE: &str = "```json";
const FENCE: &str = "```";

/// Number of characters of the raw response echoed in parse-failure logs.
const LOG_PREVIEW_CHARS: usize = 100;

/// Why a response could not be accepted as an extraction.
#[derive(Debug, thiserror::Error)]
pub enum ResponseError {
    /// The model answered with the literal `null`.
    #[error("received 'null' instead of a JSON value")]
    NullSentinel,

    /// The remaining text is not valid JSON.
    #[error("invalid JSON: {0}")]
    Syntax(#[from] serde_json::Error),
}

/// Remove an optional surrounding code fence.
///
/// A leading "```json" takes precedence over a bare "```"; a trailing "```"
/// is removed independently.
pub fn strip_code_fence(raw: &str) -> &str {
    let mut cleaned = raw.trim();
    if let Some(rest) = cleaned.strip_prefix(JSON_FENCE) {
        cleaned = rest;
    } else if let Some(rest) = cleaned.strip_prefix(FENCE) {
        cleaned = rest;
    }
    if let Some(rest) = cleaned.strip_suffix(FENCE) {
        cleaned = rest;
    }
    cleaned.trim()
}

/// Parse a model response as JSON.
///
/// `null` in any letter case is refused even though it is valid JSON; empty
/// objects and arrays are accepted.
pub fn validate_and_parse_json(raw: &str) -> Result<Value, ResponseError> {
    let cleaned = strip_code_fence(raw);

    if cleaned.eq_ignore_ascii_case("null") {
        tracing::warn!("Received 'null' string instead of JSON object");
        return Err(ResponseError::NullSentinel);
    }

    serde_json::from_str(cleaned).map_err(|e| {
        let preview: String = raw.chars().take(LOG_PREVIEW_CHARS).collect();
        tracing::warn!(error = %e, raw_start = %preview, "JSON decode error");
        ResponseError::Syntax(e)
    })
}
