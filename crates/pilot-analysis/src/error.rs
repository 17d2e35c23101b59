//! Analysis and report error taxonomy

use pilot_model::{JourneyInconsistency, PersonaId};

/// Fatal aggregation failures
///
/// Any of these halts the run with a diagnostic instead of emitting a
/// report over inconsistent data.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    /// A journey violated its structural invariants
    #[error(transparent)]
    Inconsistent(#[from] JourneyInconsistency),

    /// The same persona id appeared in more than one record
    #[error("persona {0} appears more than once in the aggregation")]
    DuplicatePersona(PersonaId),

    /// Step/check-in pairing broken for one persona
    #[error("check-in pairing broken for {persona_id}: {detail}")]
    PairingMismatch {
        persona_id: PersonaId,
        detail: String,
    },
}

/// Failures while writing report artifacts
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("failed to write report artifact: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize analysis dump: {0}")]
    Serialize(#[from] serde_json::Error),
}
