//! Google Gemini `generateContent` client.
//!
//! Each call sends one user turn holding the document as base64 inline data
//! followed by the instruction prompt.

use super::{CallError, DocumentExtractor, ExtractionRequest, ExtractionResponse};
use crate::config::ApiKey;
use anyhow::Context;
use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

/// Connection settings for [`GeminiClient`].
#[derive(Debug, Clone)]
pub struct GeminiSettings {
    /// API root, e.g. `https://generativelanguage.googleapis.com`.
    pub base_url: String,
    /// Model identifier, e.g. `gemini-1.5-flash`.
    pub model: String,
    /// API key sent in the `x-goog-api-key` header.
    pub api_key: ApiKey,
}

/// Document extractor backed by the Gemini REST API.
///
/// No request timeout is set; calls wait as long as the transport allows.
#[derive(Debug)]
pub struct GeminiClient {
    http: reqwest::Client,
    endpoint: Url,
    settings: GeminiSettings,
}

impl GeminiClient {
    /// Build a client bound to `settings.model`.
    pub fn new(settings: GeminiSettings) -> anyhow::Result<Self> {
        let base = Url::parse(&format!("{}/", settings.base_url.trim_end_matches('/')))
            .with_context(|| format!("invalid Gemini base URL '{}'", settings.base_url))?;
        let endpoint = base
            .join(&format!("v1beta/models/{}:generateContent", settings.model))
            .with_context(|| format!("invalid model name '{}'", settings.model))?;

        let http = reqwest::Client::builder()
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            http,
            endpoint,
            settings,
        })
    }

    /// Fully resolved `generateContent` URL.
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl DocumentExtractor for GeminiClient {
    async fn extract(
        &self,
        request: ExtractionRequest<'_>,
    ) -> Result<ExtractionResponse, CallError> {
        let body = GenerateContentRequest::new(&request);

        tracing::debug!(
            name: "gemini.request",
            filename = request.filename,
            model = %self.settings.model,
            "Sending generateContent request"
        );

        let response = self
            .http
            .post(self.endpoint.clone())
            .header("x-goog-api-key", self.settings.api_key.expose())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(CallError::from_status(status.as_u16(), &error_text));
        }

        let raw = response.text().await?;
        let parsed: GenerateContentResponse =
            serde_json::from_str(&raw).map_err(|e| CallError::MalformedResponse(e.to_string()))?;
        parsed.into_extraction()
    }

    fn model(&self) -> &str {
        &self.settings.model
    }
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

impl<'a> GenerateContentRequest<'a> {
    fn new(request: &ExtractionRequest<'a>) -> Self {
        Self {
            contents: vec![Content {
                role: "user",
                parts: vec![
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: request.mime_type,
                            data: STANDARD.encode(request.data),
                        },
                    },
                    Part::Text {
                        text: request.instructions,
                    },
                ],
            }],
        }
    }
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text { text: &'a str },
    InlineData { inline_data: InlineData<'a> },
}

#[derive(Debug, Serialize)]
struct InlineData<'a> {
    mime_type: &'a str,
    data: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
    #[serde(default)]
    thought: bool,
}

impl GenerateContentResponse {
    fn into_extraction(self) -> Result<ExtractionResponse, CallError> {
        let Self {
            candidates,
            prompt_feedback,
        } = self;

        if candidates.is_empty() {
            let reason = prompt_feedback
                .as_ref()
                .and_then(|f| f.get("blockReason"))
                .and_then(Value::as_str)
                .map(str::to_string);
            if let (Some(reason), Some(feedback)) = (reason, prompt_feedback.clone()) {
                return Err(CallError::ContentBlocked { reason, feedback });
            }
        }

        // Thought summaries are not part of the answer
        let text = candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter(|p| !p.thought)
                    .filter_map(|p| p.text)
                    .collect::<String>()
            })
            .unwrap_or_default();

        Ok(ExtractionResponse {
            text,
            prompt_feedback,
        })
    }
}
