//! Phase-level model configuration

use serde::{Deserialize, Serialize};

/// Model ids and token budgets for the two tiers
///
/// The deep tier serves pre- and post-interviews; the fast tier serves
/// check-ins and step-input generation. Injected, never read from
/// globals.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PhaseConfig {
    /// Model id for interview phases
    pub deep_model: String,
    /// Model id for per-step calls
    pub fast_model: String,
    /// Token budget for interview responses
    pub deep_max_tokens: u32,
    /// Token budget for per-step responses
    pub fast_max_tokens: u32,
}

impl Default for PhaseConfig {
    fn default() -> Self {
        Self {
            deep_model: "claude-3-5-sonnet-latest".to_string(),
            fast_model: "claude-3-5-haiku-latest".to_string(),
            deep_max_tokens: 2000,
            fast_max_tokens: 1000,
        }
    }
}
