//! Post-interview phase runner
//!
//! Runs after the workshop whether or not the journey completed; a
//! partial journey is summarized in the prompt so the reflection stays
//! grounded in what the persona actually saw.

use chrono::Utc;
use pilot_completion::CompletionClient;
use pilot_model::{
    HardestMoment, Persona, PostInterviewResult, Recommendation, Satisfaction, WorkshopJourney,
    TOTAL_STEPS,
};
use serde::Deserialize;

use crate::error::PhaseFailure;
use crate::fallback;
use crate::parser::extract_first;
use crate::prompt::PromptBuilder;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HardestMomentResponse {
    step: u8,
    reason: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecommendationResponse {
    yes: bool,
    reason: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PostInterviewResponse {
    expectation_vs_reality: String,
    hardest_moment: HardestMomentResponse,
    applicability_score: Satisfaction,
    applicability_reason: String,
    would_recommend: RecommendationResponse,
    urgent_improvements: Vec<String>,
    if_again: String,
    overall_feedback: String,
}

/// Runs the closing interview for one persona
pub struct PostInterviewRunner<C> {
    client: C,
    prompts: PromptBuilder,
}

impl<C: CompletionClient> PostInterviewRunner<C> {
    /// Runner over the given client and prompt builder
    #[inline]
    #[must_use]
    pub fn new(client: C, prompts: PromptBuilder) -> Self {
        Self { client, prompts }
    }

    /// Interview one persona about their (possibly partial) journey
    pub async fn run(&self, persona: &Persona, journey: &WorkshopJourney) -> PostInterviewResult {
        match self.attempt(persona, journey).await {
            Ok(result) => result,
            Err(failure) => {
                tracing::warn!(
                    persona = %persona.id,
                    %failure,
                    "post-interview failed, synthesizing fallback"
                );
                fallback::post_interview(persona, journey)
            }
        }
    }

    async fn attempt(
        &self,
        persona: &Persona,
        journey: &WorkshopJourney,
    ) -> Result<PostInterviewResult, PhaseFailure> {
        let request = self.prompts.post_interview(persona, journey);
        let raw = self.client.complete(request).await?;
        let parsed: PostInterviewResponse = extract_first(&raw)?;

        // A hardest moment outside the step range is as malformed as a
        // bad score; reject the whole block
        if parsed.hardest_moment.step == 0 || parsed.hardest_moment.step > TOTAL_STEPS {
            return Err(crate::parser::ParseFailure::SchemaMismatch {
                candidates: 1,
                last_error: format!(
                    "hardest moment step {} outside [1, {TOTAL_STEPS}]",
                    parsed.hardest_moment.step
                ),
            }
            .into());
        }

        Ok(PostInterviewResult {
            persona_id: persona.id.clone(),
            persona_name: persona.name.clone(),
            expectation_vs_reality: parsed.expectation_vs_reality,
            hardest_moment: HardestMoment {
                step: parsed.hardest_moment.step,
                reason: parsed.hardest_moment.reason,
            },
            applicability_score: parsed.applicability_score,
            applicability_reason: parsed.applicability_reason,
            would_recommend: Recommendation {
                yes: parsed.would_recommend.yes,
                reason: parsed.would_recommend.reason,
            },
            urgent_improvements: parsed.urgent_improvements,
            if_again: parsed.if_again,
            overall_feedback: parsed.overall_feedback,
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
    use pilot_model::{Category, PersonaId};

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

    fn runner(client: MockCompletion) -> PostInterviewRunner<MockCompletion> {
        PostInterviewRunner::new(client, PromptBuilder::new(PhaseConfig::default()))
    }

    fn journey(completed: usize, dropout_at: Option<u8>) -> WorkshopJourney {
        WorkshopJourney {
            persona_id: PersonaId::new("P001"),
            persona_name: "Lead P001".to_string(),
            steps: Vec::new(),
            observations: Vec::new(),
            completed_steps: completed,
            dropout_at,
            dropout_reason: dropout_at.map(|at| format!("stopped at {at}")),
            total_duration_minutes: 40.0,
        }
    }

    fn response(hardest_step: u8) -> String {
        format!(
            r#"{{"expectationVsReality": "better than feared",
               "hardestMoment": {{"step": {hardest_step}, "reason": "dense form"}},
               "applicabilityScore": 7, "applicabilityReason": "fits our reporting",
               "wouldRecommend": {{"yes": true, "reason": "worth the time"}},
               "urgentImprovements": ["clearer labels"], "ifAgain": "bring examples",
               "overallFeedback": "solid"}}"#
        )
    }

    #[tokio::test]
    async fn well_formed_reflection_is_decoded() {
        let mut client = MockCompletion::new();
        client.expect_complete().return_once(|_| Ok(response(5)));
        let persona = sample_persona("P001", Category::Marketing);
        let result = runner(client).run(&persona, &journey(11, None)).await;
        assert!(!result.synthesized);
        assert!(result.would_recommend.yes);
        assert_eq!(result.hardest_moment.step, 5);
    }

    #[tokio::test]
    async fn hardest_moment_outside_range_is_rejected() {
        let mut client = MockCompletion::new();
        client.expect_complete().return_once(|_| Ok(response(12)));
        let persona = sample_persona("P001", Category::Sales);
        let result = runner(client).run(&persona, &journey(11, None)).await;
        assert!(result.synthesized);
    }

    #[tokio::test]
    async fn partial_journey_still_gets_an_interview() {
        let mut client = MockCompletion::new();
        client
            .expect_complete()
            .withf(|req| req.user.contains("You gave up at step 3"))
            .return_once(|_| Err(CompletionError::Empty));
        let persona = sample_persona("P001", Category::Operations);
        let result = runner(client).run(&persona, &journey(2, Some(3))).await;
        assert!(result.synthesized);
        assert!(!result.would_recommend.yes);
    }
}
