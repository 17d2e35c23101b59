//! Per-persona journey assembly
//!
//! Phase order is fixed: pre-interview, then for each step a workshop
//! execution immediately followed by its check-in (strict pairing),
//! then the post-interview. A dropout at step K skips executions and
//! check-ins for steps >= K; the post-interview still runs over the
//! partial journey.

use std::sync::Arc;

use chrono::Utc;
use pilot_completion::CompletionClient;
use pilot_model::{
    CheckInResult, DigitalMaturity, Observation, ObservationKind, Persona, PersonaId,
    PersonaReaction, PostInterviewResult, PreInterviewResult, Severity, WorkshopJourney,
    workshop_steps, Category, FOUNDATIONAL_STEPS,
};
use pilot_phases::{
    CheckInRunner, PhaseConfig, PostInterviewRunner, PreInterviewRunner, PromptBuilder,
    StepOutcome, UiDriver, WorkshopExecutionRunner,
};
use serde::{Deserialize, Serialize};

/// Everything recorded about one persona during one run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonaRecord {
    pub persona_id: PersonaId,
    pub persona_name: String,
    /// Carried so the analyzer never needs the catalog
    pub category: Category,
    pub digital_maturity: DigitalMaturity,
    pub pre_interview: PreInterviewResult,
    pub journey: WorkshopJourney,
    /// One check-in per executed step, in step order
    pub check_ins: Vec<CheckInResult>,
    pub post_interview: PostInterviewResult,
}

type SharedClient = Arc<dyn CompletionClient>;

/// Sequences the four phases for one persona at a time
pub struct JourneyAssembler {
    pre: PreInterviewRunner<SharedClient>,
    workshop: WorkshopExecutionRunner<SharedClient>,
    check_in: CheckInRunner<SharedClient>,
    post: PostInterviewRunner<SharedClient>,
}

impl JourneyAssembler {
    /// Assembler sharing one completion client across all phases
    #[must_use]
    pub fn new(client: SharedClient, config: PhaseConfig) -> Self {
        let prompts = PromptBuilder::new(config);
        Self {
            pre: PreInterviewRunner::new(Arc::clone(&client), prompts.clone()),
            workshop: WorkshopExecutionRunner::new(Arc::clone(&client), prompts.clone()),
            check_in: CheckInRunner::new(Arc::clone(&client), prompts.clone()),
            post: PostInterviewRunner::new(client, prompts),
        }
    }

    /// Run one persona's complete journey
    ///
    /// Never fails: every phase recovers internally, so the record is
    /// always fully populated (possibly with synthesized parts).
    pub async fn run(&self, persona: &Persona, ui: &dyn UiDriver) -> PersonaRecord {
        tracing::info!(persona = %persona.id, name = %persona.name, "starting journey");
        let pre_interview = self.pre.run(persona).await;

        let mut steps = Vec::new();
        let mut check_ins = Vec::new();
        let mut observations: Vec<Observation> = Vec::new();
        let mut dropout_at = None;
        let mut dropout_reason = None;

        for step in workshop_steps() {
            match self.workshop.run_step(persona, step, ui).await {
                StepOutcome::Completed(execution) => {
                    // Check-in for step N consumes step N's execution
                    let check_in = self.check_in.run(persona, &execution).await;
                    observations.extend(execution.observations.iter().cloned());
                    steps.push(execution);
                    check_ins.push(check_in);
                }
                StepOutcome::Dropout { at, reason } => {
                    let severity = if at <= FOUNDATIONAL_STEPS {
                        Severity::Critical
                    } else {
                        Severity::High
                    };
                    observations.push(Observation {
                        step: at,
                        kind: ObservationKind::DropoutRisk,
                        note: reason.clone(),
                        reaction: PersonaReaction::DropoutRisk,
                        severity,
                        timestamp: Utc::now(),
                    });
                    dropout_at = Some(at);
                    dropout_reason = Some(reason);
                    break;
                }
            }
        }

        let journey = WorkshopJourney {
            persona_id: persona.id.clone(),
            persona_name: persona.name.clone(),
            completed_steps: steps.len(),
            total_duration_minutes: steps.iter().map(|s| s.duration_minutes).sum(),
            steps,
            observations,
            dropout_at,
            dropout_reason,
        };

        let post_interview = self.post.run(persona, &journey).await;
        tracing::info!(
            persona = %persona.id,
            completed = journey.completed_steps,
            dropout = ?journey.dropout_at,
            "journey finished"
        );

        PersonaRecord {
            persona_id: persona.id.clone(),
            persona_name: persona.name.clone(),
            category: persona.category,
            digital_maturity: persona.team.digital_maturity,
            pre_interview,
            journey,
            check_ins,
            post_interview,
        }
    }
}
