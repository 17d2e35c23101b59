//! Pilot Phases - prompt building, response parsing, and phase runners
//!
//! One persona's journey is four phases: pre-interview, workshop
//! execution over eleven steps, a check-in after every step, and a
//! post-interview. Each phase runner builds a prompt from the persona's
//! static attributes, calls the completion client once, and decodes the
//! first well-formed JSON block in the response. On call failure or
//! parse failure the runner substitutes a deterministic fallback
//! synthesized from the persona's own attributes; errors never
//! propagate past a runner.
//!
//! Workshop execution additionally drives the opaque UI capability
//! (navigate, capture state, detect errors) once per step. A UI failure
//! within the first five steps drops the persona out of the workshop; a
//! later one is recorded as a stuck observation and the journey
//! continues.

#![warn(unreachable_pub)]

pub mod check_in;
pub mod config;
pub mod error;
pub mod fallback;
pub mod interaction;
pub mod parser;
pub mod post_interview;
pub mod pre_interview;
pub mod prompt;
pub mod workshop;

pub use check_in::CheckInRunner;
pub use config::PhaseConfig;
pub use error::PhaseFailure;
pub use interaction::{InteractionError, UiDriver, UiErrorScan, UiState};
pub use parser::{extract_first, ParseFailure};
pub use post_interview::PostInterviewRunner;
pub use pre_interview::PreInterviewRunner;
pub use prompt::{temperature_for, PromptBuilder};
pub use workshop::{StepOutcome, WorkshopExecutionRunner};
