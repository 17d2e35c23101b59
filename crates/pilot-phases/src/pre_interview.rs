//! Pre-interview phase runner

use chrono::Utc;
use pilot_completion::CompletionClient;
use pilot_model::{Persona, PreInterviewMood, PreInterviewResult};
use serde::Deserialize;

use crate::error::PhaseFailure;
use crate::fallback;
use crate::parser::extract_first;
use crate::prompt::PromptBuilder;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PreInterviewResponse {
    expectations: String,
    concerns: Vec<String>,
    digital_experience: String,
    time_worries: String,
    key_questions: Vec<String>,
    initial_mood: PreInterviewMood,
}

/// Runs the pre-interview for one persona
///
/// Never fails: a completion or parse failure yields a synthesized
/// record flagged as such.
pub struct PreInterviewRunner<C> {
    client: C,
    prompts: PromptBuilder,
}

impl<C: CompletionClient> PreInterviewRunner<C> {
    /// Runner over the given client and prompt builder
    #[inline]
    #[must_use]
    pub fn new(client: C, prompts: PromptBuilder) -> Self {
        Self { client, prompts }
    }

    /// Interview one persona
    pub async fn run(&self, persona: &Persona) -> PreInterviewResult {
        match self.attempt(persona).await {
            Ok(result) => result,
            Err(failure) => {
                tracing::warn!(
                    persona = %persona.id,
                    %failure,
                    "pre-interview failed, synthesizing fallback"
                );
                fallback::pre_interview(persona)
            }
        }
    }

    async fn attempt(&self, persona: &Persona) -> Result<PreInterviewResult, PhaseFailure> {
        let request = self.prompts.pre_interview(persona);
        let raw = self.client.complete(request).await?;
        let parsed: PreInterviewResponse = extract_first(&raw)?;
        tracing::debug!(persona = %persona.id, "pre-interview decoded");
        Ok(PreInterviewResult {
            persona_id: persona.id.clone(),
            persona_name: persona.name.clone(),
            expectations: parsed.expectations,
            concerns: parsed.concerns,
            digital_experience: parsed.digital_experience,
            time_worries: parsed.time_worries,
            key_questions: parsed.key_questions,
            initial_mood: parsed.initial_mood,
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

    fn runner(client: MockCompletion) -> PreInterviewRunner<MockCompletion> {
        PreInterviewRunner::new(client, PromptBuilder::new(PhaseConfig::default()))
    }

    #[tokio::test]
    async fn well_formed_response_is_decoded() {
        let mut client = MockCompletion::new();
        client.expect_complete().return_once(|_| {
            Ok(r#"Sure! {"expectations": "faster reporting", "concerns": ["time"],
                "digitalExperience": "mixed", "timeWorries": "busy season",
                "keyQuestions": ["will it stick?"], "initialMood": "excited"}"#
                .to_string())
        });
        let persona = sample_persona("P001", Category::Marketing);
        let result = runner(client).run(&persona).await;
        assert!(!result.synthesized);
        assert_eq!(result.initial_mood, PreInterviewMood::Excited);
        assert_eq!(result.expectations, "faster reporting");
    }

    #[tokio::test]
    async fn call_failure_yields_fallback() {
        let mut client = MockCompletion::new();
        client
            .expect_complete()
            .return_once(|_| Err(CompletionError::Empty));
        let persona = sample_persona("P001", Category::Sales);
        let result = runner(client).run(&persona).await;
        assert!(result.synthesized);
        assert_eq!(result.persona_id, persona.id);
    }

    #[tokio::test]
    async fn malformed_response_yields_fallback() {
        let mut client = MockCompletion::new();
        client
            .expect_complete()
            .return_once(|_| Ok("I'd rather not answer in JSON today.".to_string()));
        let persona = sample_persona("P001", Category::Finance);
        let result = runner(client).run(&persona).await;
        assert!(result.synthesized);
    }

    #[tokio::test]
    async fn unknown_mood_variant_is_rejected_not_defaulted() {
        let mut client = MockCompletion::new();
        client.expect_complete().return_once(|_| {
            Ok(r#"{"expectations": "x", "concerns": [], "digitalExperience": "y",
                "timeWorries": "z", "keyQuestions": [], "initialMood": "ecstatic"}"#
                .to_string())
        });
        let persona = sample_persona("P001", Category::Strategy);
        let result = runner(client).run(&persona).await;
        assert!(result.synthesized);
    }
}
