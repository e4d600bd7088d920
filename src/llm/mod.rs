//! Remote document-understanding clients.
//!
//! The batch driver talks to the model through the [`DocumentExtractor`]
//! trait, so the HTTP client is constructed once per run and injected rather
//! than living in global state.
//!
//! # Clients
//!
//! - [`GeminiClient`]: Google Gemini `generateContent` REST API
//!
//! # Example
//!
//! ```rust,ignore
//! use pdf_json_extract::llm::{DocumentExtractor, ExtractionRequest, GeminiClient, GeminiSettings};
//!
//! let client = GeminiClient::new(settings)?;
//! let response = client
//!     .extract(ExtractionRequest {
//!         filename: "invoice.pdf",
//!         mime_type: "application/pdf",
//!         data: &bytes,
//!         instructions: &prompt,
//!     })
//!     .await?;
//! println!("{}", response.text);
//! ```

mod error;
pub mod gemini;

pub use error::CallError;
pub use gemini::{GeminiClient, GeminiSettings};

use async_trait::async_trait;

/// A single document submitted for extraction.
#[derive(Debug, Clone, Copy)]
pub struct ExtractionRequest<'a> {
    /// File name, used for logging only.
    pub filename: &'a str,
    /// MIME type declared for the document part.
    pub mime_type: &'a str,
    /// Raw document bytes.
    pub data: &'a [u8],
    /// Instruction prompt sent alongside the document.
    pub instructions: &'a str,
}

/// Textual payload of a successful call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractionResponse {
    /// Concatenated text of the first candidate. Empty when the model
    /// returned no text parts.
    pub text: String,
    /// Prompt feedback metadata reported by the service, if any.
    pub prompt_feedback: Option<serde_json::Value>,
}

impl ExtractionResponse {
    /// Render the prompt feedback for an error artifact, `"N/A"` when absent.
    #[must_use]
    pub fn feedback_summary(&self) -> String {
        self.prompt_feedback
            .as_ref()
            .map_or_else(|| "N/A".to_string(), ToString::to_string)
    }
}

/// A client that turns one document plus instructions into model text.
#[async_trait]
pub trait DocumentExtractor: Send + Sync + std::fmt::Debug {
    /// Submit a document and return the model's textual response.
    async fn extract(
        &self,
        request: ExtractionRequest<'_>,
    ) -> Result<ExtractionResponse, CallError>;

    /// Model identifier requests are sent to.
    fn model(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_feedback_summary_defaults_to_na() {
        let response = ExtractionResponse::default();
        assert_eq!(response.feedback_summary(), "N/A");
    }

    #[test]
    fn test_feedback_summary_renders_json() {
        let response = ExtractionResponse {
            text: String::new(),
            prompt_feedback: Some(json!({"blockReason": "SAFETY"})),
        };
        assert_eq!(response.feedback_summary(), r#"{"blockReason":"SAFETY"}"#);
    }
}
