//! The opaque UI-interaction seam
//!
//! Workshop execution drives the hosted workshop through this trait:
//! navigate to a step, capture the visible state, scan for error
//! markers. The harness never looks inside the pages beyond what these
//! three calls return.

use async_trait::async_trait;

/// A UI-capability call failed
#[derive(Debug, Clone, thiserror::Error)]
#[error("ui interaction failed at {url}: {message}")]
pub struct InteractionError {
    /// URL the capability was pointed at when it failed
    pub url: String,
    pub message: String,
}

/// Visible page state after a step's interactions
#[derive(Debug, Clone)]
pub struct UiState {
    pub url: String,
    pub title: String,
    /// Platform commentary shown to the participant, if any
    pub commentary: Option<String>,
}

/// Result of scanning the page for error markers
#[derive(Debug, Clone, Default)]
pub struct UiErrorScan {
    pub count: usize,
    pub texts: Vec<String>,
}

/// Opaque per-step UI capability
#[async_trait]
pub trait UiDriver: Send + Sync {
    /// Navigate to a step URL
    async fn navigate(&self, url: &str) -> Result<(), InteractionError>;

    /// Capture the current page state
    async fn capture_state(&self) -> Result<UiState, InteractionError>;

    /// Scan the page for error markers
    async fn detect_errors(&self) -> Result<UiErrorScan, InteractionError>;
}
