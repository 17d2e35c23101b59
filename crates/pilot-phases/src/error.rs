//! Phase-boundary failure taxonomy
//!
//! A `PhaseFailure` only travels from the attempt helper back to its own
//! runner, which recovers with fallback synthesis. Nothing outside this
//! crate ever sees one.

use pilot_completion::CompletionError;

use crate::parser::ParseFailure;

/// Why one phase attempt produced no usable record
#[derive(Debug, thiserror::Error)]
pub enum PhaseFailure {
    /// The completion call itself failed
    #[error(transparent)]
    Completion(#[from] CompletionError),

    /// The call succeeded but no valid structured block was decoded
    #[error(transparent)]
    Parse(#[from] ParseFailure),
}
