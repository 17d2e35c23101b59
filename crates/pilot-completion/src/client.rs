//! Completion client trait and request type

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Cost tier of the model behind a request
///
/// Pre- and post-interviews use the deep tier (larger budget, longer
/// inter-call delay); check-ins and step input generation use the fast
/// tier. The rate limiter keys its delay off this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelTier {
    /// Higher-cost model for interview phases
    Deep,
    /// Lower-cost model for per-step calls
    Fast,
}

/// One completion request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Model identifier
    pub model: String,
    /// Cost tier (drives the rate-limit delay)
    pub tier: ModelTier,
    /// Maximum output tokens
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
    /// Optional system text
    pub system: Option<String>,
    /// User text (the assembled prompt)
    pub user: String,
}

impl CompletionRequest {
    /// Create a request with no system text
    #[inline]
    #[must_use]
    pub fn new(
        model: impl Into<String>,
        tier: ModelTier,
        max_tokens: u32,
        temperature: f32,
        user: impl Into<String>,
    ) -> Self {
        Self {
            model: model.into(),
            tier,
            max_tokens,
            temperature,
            system: None,
            user: user.into(),
        }
    }

    /// With system text
    #[inline]
    #[must_use]
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }
}

/// Errors at the completion boundary
///
/// These never propagate past a phase runner: every variant is recovered
/// locally via fallback synthesis.
#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    /// No credential available in the environment
    #[error("completion credential missing ({0} not set)")]
    Credential(&'static str),

    /// Transport-level failure
    #[error("completion transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Service answered with a non-success status
    #[error("completion service error: status {status}: {message}")]
    Service { status: u16, message: String },

    /// Service answered but produced no text content
    #[error("completion response contained no text")]
    Empty,
}

/// One-shot completion capability
///
/// Implementations must be safe to share across concurrently running
/// groups. The live client is; test stubs use interior mutability.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Issue one completion request and return the raw response text
    async fn complete(&self, request: CompletionRequest) -> Result<String, CompletionError>;
}

#[async_trait]
impl<C: CompletionClient + ?Sized> CompletionClient for std::sync::Arc<C> {
    async fn complete(&self, request: CompletionRequest) -> Result<String, CompletionError> {
        (**self).complete(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_builder() {
        let req = CompletionRequest::new("deep-model", ModelTier::Deep, 2000, 0.8, "hello")
            .with_system("you are a participant");
        assert_eq!(req.tier, ModelTier::Deep);
        assert_eq!(req.system.as_deref(), Some("you are a participant"));
    }

    #[test]
    fn error_display() {
        let err = CompletionError::Service {
            status: 429,
            message: "rate limited".to_string(),
        };
        assert!(err.to_string().contains("429"));
    }
}
