//! Error types for the data model

use crate::persona::PersonaId;

/// Catalog loading and validation errors
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Catalog file could not be read
    #[error("catalog io error: {0}")]
    Io(#[from] std::io::Error),

    /// Catalog file is not valid JSON for the persona schema
    #[error("malformed catalog: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Two personas share an id
    #[error("duplicate persona id: {0}")]
    DuplicateId(PersonaId),

    /// A persona violates a model invariant
    #[error("invalid persona {id}: {reason}")]
    InvalidPersona { id: PersonaId, reason: String },

    /// Catalog contains no personas
    #[error("catalog is empty")]
    Empty,
}

/// A journey violating its structural invariants
///
/// Fatal for an analysis run: the analyzer refuses to aggregate over
/// inconsistent data and reports which persona and invariant failed.
#[derive(Debug, Clone, thiserror::Error)]
#[error("inconsistent journey for persona {persona_id}: {detail}")]
pub struct JourneyInconsistency {
    /// Persona whose journey is inconsistent
    pub persona_id: PersonaId,
    /// Which invariant failed
    pub detail: String,
}
