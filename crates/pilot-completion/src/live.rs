//! HTTP-backed completion client

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::client::{CompletionClient, CompletionError, CompletionRequest};

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const API_KEY_VAR: &str = "ANTHROPIC_API_KEY";
const API_VERSION: &str = "2023-06-01";

/// Completion client backed by an HTTP messages endpoint
///
/// Stateless apart from the connection pool; one instance is shared by
/// every group in a run.
pub struct LiveCompletionClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl LiveCompletionClient {
    /// Build a client with an explicit credential
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
        }
    }

    /// Build a client from the `ANTHROPIC_API_KEY` environment variable
    pub fn from_env() -> Result<Self, CompletionError> {
        let api_key =
            std::env::var(API_KEY_VAR).map_err(|_| CompletionError::Credential(API_KEY_VAR))?;
        Ok(Self::new(api_key))
    }

    /// Override the service base URL (used for stub servers in tests)
    #[inline]
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[derive(Serialize)]
struct WireRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: Vec<WireMessage<'a>>,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct WireResponse {
    content: Vec<WireContent>,
}

#[derive(Deserialize)]
struct WireContent {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

#[async_trait]
impl CompletionClient for LiveCompletionClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String, CompletionError> {
        let body = WireRequest {
            model: &request.model,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            system: request.system.as_deref(),
            messages: vec![WireMessage {
                role: "user",
                content: &request.user,
            }],
        };

        tracing::debug!(model = %request.model, tier = ?request.tier, "dispatching completion");

        let response = self
            .http
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "completion service rejected request");
            return Err(CompletionError::Service {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: WireResponse = response.json().await?;
        let text: String = parsed
            .content
            .iter()
            .filter(|block| block.kind == "text")
            .map(|block| block.text.as_str())
            .collect();

        if text.is_empty() {
            return Err(CompletionError::Empty);
        }
        Ok(text)
    }
}
