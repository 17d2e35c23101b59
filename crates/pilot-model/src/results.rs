//! Per-phase result records and journeys
//!
//! Phase runners create these; they are immutable once created. Every
//! record carries a `synthesized` flag so the analysis can tell genuine
//! model output from deterministic fallback data.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::JourneyInconsistency;
use crate::persona::PersonaId;
use crate::steps::{self, FOUNDATIONAL_STEPS, TOTAL_STEPS};

/// Mood reported in the pre-interview
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreInterviewMood {
    Excited,
    Neutral,
    Worried,
    Skeptical,
}

/// Mood reported in a check-in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckInMood {
    Good,
    Neutral,
    Struggling,
    Frustrated,
}

/// Bounded satisfaction score in [1, 10]
///
/// Construction is fail-closed: out-of-range values are rejected, never
/// clamped. A malformed model response therefore surfaces as a parse
/// failure rather than being silently laundered into the statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Satisfaction(u8);

impl Satisfaction {
    /// Create a score, rejecting values outside [1, 10]
    pub fn new(value: u8) -> Result<Self, OutOfRange> {
        if (1..=10).contains(&value) {
            Ok(Self(value))
        } else {
            Err(OutOfRange(value))
        }
    }

    /// Create a score from an internally computed value, clamping into
    /// [1, 10]
    ///
    /// Only for synthesized data the harness computes itself; decoded
    /// model output must go through [`Satisfaction::new`] so that
    /// out-of-range values are rejected.
    #[inline]
    #[must_use]
    pub fn clamped(value: u8) -> Self {
        Self(value.clamp(1, 10))
    }

    /// Raw value
    #[inline]
    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Satisfaction {
    type Error = OutOfRange;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Satisfaction> for u8 {
    fn from(s: Satisfaction) -> u8 {
        s.0
    }
}

/// Satisfaction score outside [1, 10]
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("satisfaction {0} outside [1, 10]")]
pub struct OutOfRange(pub u8);

/// Pre-interview record for one persona
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreInterviewResult {
    pub persona_id: PersonaId,
    pub persona_name: String,
    /// What the participant hopes to get out of the workshop
    pub expectations: String,
    pub concerns: Vec<String>,
    pub digital_experience: String,
    pub time_worries: String,
    pub key_questions: Vec<String>,
    pub initial_mood: PreInterviewMood,
    pub timestamp: DateTime<Utc>,
    /// True when this record is fallback-synthesized
    pub synthesized: bool,
}

/// Check-in record taken right after one workshop step
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckInResult {
    /// Step this check-in pairs with (strict 1:1 pairing)
    pub step: u8,
    pub feeling: String,
    pub difficulties: Vec<String>,
    pub would_continue: bool,
    pub would_continue_reason: String,
    pub immediate_improvements: Vec<String>,
    pub mood: CheckInMood,
    pub satisfaction: Satisfaction,
    pub timestamp: DateTime<Utc>,
    pub synthesized: bool,
}

/// Hardest moment named in the post-interview
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HardestMoment {
    pub step: u8,
    pub reason: String,
}

/// Recommendation verdict
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub yes: bool,
    pub reason: String,
}

/// Post-interview record for one persona
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostInterviewResult {
    pub persona_id: PersonaId,
    pub persona_name: String,
    pub expectation_vs_reality: String,
    pub hardest_moment: HardestMoment,
    /// How applicable the workshop outcome is to the team, 1-10
    pub applicability_score: Satisfaction,
    pub applicability_reason: String,
    pub would_recommend: Recommendation,
    pub urgent_improvements: Vec<String>,
    pub if_again: String,
    pub overall_feedback: String,
    pub timestamp: DateTime<Utc>,
    pub synthesized: bool,
}

/// Kind of facilitator observation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ObservationKind {
    Error,
    Stuck,
    TimeIssue,
    DropoutRisk,
    Smooth,
    Confusion,
}

/// Observation severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        };
        write!(f, "{s}")
    }
}

/// Inferred participant reaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonaReaction {
    Frustrated,
    Blocked,
    TimePressure,
    Confused,
    Ok,
    DropoutRisk,
}

/// One facilitator observation during workshop execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Observation {
    /// Step the observation belongs to
    pub step: u8,
    pub kind: ObservationKind,
    /// Free-text note
    pub note: String,
    pub reaction: PersonaReaction,
    pub severity: Severity,
    pub timestamp: DateTime<Utc>,
}

/// One executed workshop step
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepExecution {
    /// 1-based step number
    pub step: u8,
    pub step_name: String,
    /// Wall-clock duration in minutes
    pub duration_minutes: f64,
    /// Input data entered at this step
    pub input: serde_json::Value,
    /// Errors detected on the page
    pub error_count: usize,
    /// Visible platform commentary, if any
    pub commentary: Option<String>,
    /// Observations raised during this step
    pub observations: Vec<Observation>,
}

/// One persona's complete recorded path through the workshop
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkshopJourney {
    pub persona_id: PersonaId,
    pub persona_name: String,
    /// Executed steps in order; steps at or after a dropout are absent
    pub steps: Vec<StepExecution>,
    /// All observations across steps
    pub observations: Vec<Observation>,
    /// Number of completed steps
    pub completed_steps: usize,
    /// Step at which the persona dropped out, if any
    pub dropout_at: Option<u8>,
    pub dropout_reason: Option<String>,
    /// Total wall-clock duration in minutes
    pub total_duration_minutes: f64,
}

impl WorkshopJourney {
    /// Completion rate in [0, 1]
    #[inline]
    #[must_use]
    pub fn completion_rate(&self) -> f64 {
        self.completed_steps as f64 / f64::from(TOTAL_STEPS)
    }

    /// Whether the persona dropped out during a foundational step
    #[inline]
    #[must_use]
    pub fn foundational_dropout(&self) -> bool {
        self.dropout_at.is_some_and(|at| at <= FOUNDATIONAL_STEPS)
    }

    /// Verify the journey's structural invariants
    ///
    /// Checked before analysis; a violation is fatal for the run since a
    /// report over inconsistent data would be misleading.
    ///
    /// # Errors
    /// - claimed completed-step count disagrees with recorded executions
    /// - completed-step count exceeds the total step count
    /// - steps out of order or outside [1, TOTAL_STEPS]
    /// - dropout set but executions exist at or past the dropout step,
    ///   or the completed count is not `dropout_at - 1`
    pub fn check_consistency(&self) -> Result<(), JourneyInconsistency> {
        if self.completed_steps > usize::from(TOTAL_STEPS) {
            return Err(JourneyInconsistency {
                persona_id: self.persona_id.clone(),
                detail: format!(
                    "claims {} completed steps, workshop has {}",
                    self.completed_steps, TOTAL_STEPS
                ),
            });
        }
        if self.completed_steps != self.steps.len() {
            return Err(JourneyInconsistency {
                persona_id: self.persona_id.clone(),
                detail: format!(
                    "claims {} completed steps but records {} executions",
                    self.completed_steps,
                    self.steps.len()
                ),
            });
        }
        let mut prev = 0u8;
        for exec in &self.steps {
            if exec.step == 0 || exec.step > TOTAL_STEPS || exec.step <= prev {
                return Err(JourneyInconsistency {
                    persona_id: self.persona_id.clone(),
                    detail: format!("step {} out of order or out of range", exec.step),
                });
            }
            if steps::step(exec.step).is_none() {
                return Err(JourneyInconsistency {
                    persona_id: self.persona_id.clone(),
                    detail: format!("step {} is not a defined workshop step", exec.step),
                });
            }
            prev = exec.step;
        }
        if let Some(at) = self.dropout_at {
            if self.steps.iter().any(|s| s.step >= at) {
                return Err(JourneyInconsistency {
                    persona_id: self.persona_id.clone(),
                    detail: format!("dropout at step {at} but executions exist at or past it"),
                });
            }
            if self.completed_steps != usize::from(at) - 1 {
                return Err(JourneyInconsistency {
                    persona_id: self.persona_id.clone(),
                    detail: format!(
                        "dropout at step {at} implies {} completed steps, found {}",
                        usize::from(at) - 1,
                        self.completed_steps
                    ),
                });
            }
        }
        Ok(())
    }
}
