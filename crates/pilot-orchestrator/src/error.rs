//! Orchestrator error taxonomy

/// Failures the orchestrator itself can surface
///
/// Per-persona failures are absorbed by the phase runners; only a
/// panicking group task reaches this level.
#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    /// A group task panicked or was cancelled
    #[error("group \"{group}\" task did not complete")]
    GroupTaskFailed { group: String },
}
