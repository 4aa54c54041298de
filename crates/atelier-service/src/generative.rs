//! Gemini `generateContent` proxy.
//!
//! The browser builds the prompt; the service only adds the API key and forwards the
//! request so the key never leaves the server.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Error type for generative provider calls.
#[derive(Debug, thiserror::Error)]
pub enum GenerativeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider returned a non-success status.
    #[error("Gemini API error: {status}")]
    Api {
        /// HTTP status.
        status: u16,
        /// Raw response body.
        body: String,
    },
}

/// A `generateContent` request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    /// Conversation turns; the UI always sends one.
    pub contents: Vec<Content>,
}

/// One turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    /// Text and image parts.
    pub parts: Vec<Part>,
}

/// A text or inline image part.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Part {
    /// Prompt text.
    Text {
        /// The text.
        text: String,
    },
    /// Base64 image data.
    InlineData {
        /// The image.
        inline_data: InlineData,
    },
}

/// Inline image payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InlineData {
    /// e.g. `image/jpeg`.
    pub mime_type: String,
    /// Base64 data.
    pub data: String,
}

impl GenerateRequest {
    /// Whether the request carries at least one part.
    #[must_use]
    pub fn has_parts(&self) -> bool {
        self.contents.iter().any(|c| !c.parts.is_empty())
    }
}

/// Gemini API client.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    /// Gemini API base URL.
    pub const BASE_URL: &'static str = "https://generativelanguage.googleapis.com/v1beta";

    /// Create a new Gemini client.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self, GenerativeError> {
        let client = Client::builder().timeout(Duration::from_secs(60)).build()?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            model: model.into(),
            base_url: Self::BASE_URL.to_string(),
        })
    }

    /// Point the client at a different API host.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Configured model name.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Forward a request and return the provider's JSON unchanged.
    pub async fn generate(
        &self,
        request: &GenerateRequest,
    ) -> Result<serde_json::Value, GenerativeError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, model = %self.model, "Gemini request failed");
            return Err(GenerativeError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json().await?)
    }
}

/// First candidate's first text part, with markdown code fences removed.
#[must_use]
pub fn extract_text(response: &serde_json::Value) -> Option<String> {
    let text = response
        .pointer("/candidates/0/content/parts/0/text")?
        .as_str()?;
    let cleaned = text.replace("```json", "").replace("```", "");
    let cleaned = cleaned.trim();
    (!cleaned.is_empty()).then(|| cleaned.to_string())
}
