//! Post-step check-in phase runner

use chrono::Utc;
use pilot_completion::CompletionClient;
use pilot_model::{CheckInMood, CheckInResult, Persona, Satisfaction, StepExecution};
use serde::Deserialize;

use crate::error::PhaseFailure;
use crate::fallback;
use crate::parser::extract_first;
use crate::prompt::PromptBuilder;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CheckInResponse {
    feeling: String,
    difficulties: Vec<String>,
    would_continue: bool,
    would_continue_reason: String,
    immediate_improvements: Vec<String>,
    mood: CheckInMood,
    /// Decoded through the bounded newtype; out-of-range rejects the block
    satisfaction: Satisfaction,
}

/// Runs the check-in that follows each executed step
///
/// The check-in for step N always consumes step N's execution record;
/// the result carries the same step number.
pub struct CheckInRunner<C> {
    client: C,
    prompts: PromptBuilder,
}

impl<C: CompletionClient> CheckInRunner<C> {
    /// Runner over the given client and prompt builder
    #[inline]
    #[must_use]
    pub fn new(client: C, prompts: PromptBuilder) -> Self {
        Self { client, prompts }
    }

    /// Check in with one persona about one executed step
    pub async fn run(&self, persona: &Persona, execution: &StepExecution) -> CheckInResult {
        match self.attempt(persona, execution).await {
            Ok(result) => result,
            Err(failure) => {
                tracing::warn!(
                    persona = %persona.id,
                    step = execution.step,
                    %failure,
                    "check-in failed, synthesizing fallback"
                );
                fallback::check_in(persona, execution)
            }
        }
    }

    async fn attempt(
        &self,
        persona: &Persona,
        execution: &StepExecution,
    ) -> Result<CheckInResult, PhaseFailure> {
        let request = self.prompts.check_in(persona, execution);
        let raw = self.client.complete(request).await?;
        let parsed: CheckInResponse = extract_first(&raw)?;
        Ok(CheckInResult {
            step: execution.step,
            feeling: parsed.feeling,
            difficulties: parsed.difficulties,
            would_continue: parsed.would_continue,
            would_continue_reason: parsed.would_continue_reason,
            immediate_improvements: parsed.immediate_improvements,
            mood: parsed.mood,
            satisfaction: parsed.satisfaction,
            timestamp: Utc::now(),
            synthesized: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PhaseConfig;
    use async_trait::async_trait;
    use pilot_completion::{CompletionError, CompletionRequest};
    use pilot_model::test_fixtures::sample_persona;
    use pilot_model::Category;

    mockall::mock! {
        pub Completion {}

        #[async_trait]
        impl CompletionClient for Completion {
            async fn complete(
                &self,
                request: CompletionRequest,
            ) -> Result<String, CompletionError>;
        }
    }

    fn runner(client: MockCompletion) -> CheckInRunner<MockCompletion> {
        CheckInRunner::new(client, PromptBuilder::new(PhaseConfig::default()))
    }

    fn execution(step: u8) -> StepExecution {
        StepExecution {
            step,
            step_name: format!("step {step}"),
            duration_minutes: 6.0,
            input: serde_json::Value::Null,
            error_count: 0,
            commentary: None,
            observations: Vec::new(),
        }
    }

    fn response(satisfaction: i32) -> String {
        format!(
            r#"{{"feeling": "fine", "difficulties": [], "wouldContinue": true,
               "wouldContinueReason": "curious", "immediateImprovements": [],
               "mood": "good", "satisfaction": {satisfaction}}}"#
        )
    }

    #[tokio::test]
    async fn result_pairs_with_its_step() {
        let mut client = MockCompletion::new();
        client
            .expect_complete()
            .return_once(|_| Ok(response(7)));
        let persona = sample_persona("P001", Category::Marketing);
        let result = runner(client).run(&persona, &execution(4)).await;
        assert_eq!(result.step, 4);
        assert_eq!(result.satisfaction.value(), 7);
        assert!(!result.synthesized);
    }

    #[tokio::test]
    async fn boundary_satisfaction_values_accepted() {
        for value in [1, 10] {
            let mut client = MockCompletion::new();
            client
                .expect_complete()
                .return_once(move |_| Ok(response(value)));
            let persona = sample_persona("P001", Category::Sales);
            let result = runner(client).run(&persona, &execution(2)).await;
            assert!(!result.synthesized);
            assert_eq!(i32::from(result.satisfaction.value()), value);
        }
    }

    #[tokio::test]
    async fn out_of_range_satisfaction_rejected_into_fallback() {
        for value in [-1, 0, 11] {
            let mut client = MockCompletion::new();
            client
                .expect_complete()
                .return_once(move |_| Ok(response(value)));
            let persona = sample_persona("P001", Category::Operations);
            let result = runner(client).run(&persona, &execution(2)).await;
            // Reject, never clamp: the record comes from fallback synthesis
            assert!(result.synthesized);
            assert!((1..=10).contains(&result.satisfaction.value()));
        }
    }

    #[tokio::test]
    async fn call_failure_yields_fallback_for_same_step() {
        let mut client = MockCompletion::new();
        client
            .expect_complete()
            .return_once(|_| Err(CompletionError::Empty));
        let persona = sample_persona("P001", Category::Finance);
        let result = runner(client).run(&persona, &execution(9)).await;
        assert!(result.synthesized);
        assert_eq!(result.step, 9);
    }
}
