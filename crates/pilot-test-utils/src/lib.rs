//! Pilot Test Utils - shared fixtures for the pilot workspace
//!
//! Scripted stand-ins for the two external capabilities (the completion
//! service and the workshop UI) plus persona helpers, used by the
//! orchestrator and analysis test suites. Nothing here ships in a
//! production binary.

#![warn(unreachable_pub)]

use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::Mutex;
use pilot_completion::{CompletionClient, CompletionError, CompletionRequest};
use pilot_model::{Category, Persona, PersonaCatalog};
use pilot_phases::{InteractionError, UiDriver, UiErrorScan, UiState};

pub use pilot_model::test_fixtures::sample_persona;

/// A catalog of `n` personas cycling through the given categories
///
/// Ids run P001, P002, ... so tests can address personas positionally.
#[must_use]
pub fn sample_catalog(n: usize, categories: &[Category]) -> PersonaCatalog {
    let personas: Vec<Persona> = (0..n)
        .map(|i| {
            let category = categories[i % categories.len()];
            sample_persona(&format!("P{:03}", i + 1), category)
        })
        .collect();
    PersonaCatalog::from_personas(personas).expect("sample catalog is valid")
}

/// Completion client whose every call fails
pub struct AlwaysFailClient;

#[async_trait]
impl CompletionClient for AlwaysFailClient {
    async fn complete(&self, _request: CompletionRequest) -> Result<String, CompletionError> {
        Err(CompletionError::Service {
            status: 500,
            message: "scripted failure".to_string(),
        })
    }
}

/// Completion client that always answers with prose containing no JSON
pub struct MalformedClient;

#[async_trait]
impl CompletionClient for MalformedClient {
    async fn complete(&self, _request: CompletionRequest) -> Result<String, CompletionError> {
        Ok("I would rather describe my feelings in free text, if that's alright.".to_string())
    }
}

/// Completion client that pops pre-scripted responses in order
///
/// Errors once the queue is exhausted.
pub struct QueueClient {
    responses: Mutex<VecDeque<String>>,
}

impl QueueClient {
    #[must_use]
    pub fn new(responses: impl IntoIterator<Item = String>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
        }
    }
}

#[async_trait]
impl CompletionClient for QueueClient {
    async fn complete(&self, _request: CompletionRequest) -> Result<String, CompletionError> {
        self.responses
            .lock()
            .pop_front()
            .ok_or(CompletionError::Empty)
    }
}

/// Phase-aware scripted client
///
/// Detects which phase a request belongs to from the prompt's response
/// schema and returns a well-formed canned answer for it, except for
/// personas listed as malformed, which always get schema-free prose.
pub struct ScriptedPhaseClient {
    malformed_for: Vec<String>,
}

impl ScriptedPhaseClient {
    /// Client answering well-formed for everyone
    #[must_use]
    pub fn well_formed() -> Self {
        Self {
            malformed_for: Vec::new(),
        }
    }

    /// Answer malformed for any prompt mentioning one of these names
    #[must_use]
    pub fn malformed_for(names: impl IntoIterator<Item = String>) -> Self {
        Self {
            malformed_for: names.into_iter().collect(),
        }
    }
}

#[async_trait]
impl CompletionClient for ScriptedPhaseClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String, CompletionError> {
        if self.malformed_for.iter().any(|n| request.user.contains(n)) {
            return Ok("hmm, let me think about that one out loud instead.".to_string());
        }
        let response = if request.user.contains("initialMood") {
            r#"{"expectations": "smoother reporting", "concerns": ["time away from the team"],
                "digitalExperience": "comfortable with our current tools",
                "timeWorries": "three hours is long", "keyQuestions": ["what changes on Monday?"],
                "initialMood": "neutral"}"#
        } else if request.user.contains("\"satisfaction\"") {
            r#"{"feeling": "went fine", "difficulties": [], "wouldContinue": true,
                "wouldContinueReason": "still useful", "immediateImprovements": [],
                "mood": "good", "satisfaction": 8}"#
        } else if request.user.contains("expectationVsReality") {
            r#"{"expectationVsReality": "about what I expected",
                "hardestMoment": {"step": 5, "reason": "the detail entry was long"},
                "applicabilityScore": 7, "applicabilityReason": "maps onto our reporting pain",
                "wouldRecommend": {"yes": true, "reason": "worth the afternoon"},
                "urgentImprovements": ["clearer field labels"],
                "ifAgain": "bring concrete examples", "overallFeedback": "solid workshop"}"#
        } else {
            r#"{"mainTask": "weekly reporting", "painPoint": "manual consolidation"}"#
        };
        Ok(response.to_string())
    }
}

/// UI driver where every interaction succeeds
pub struct ScriptedUiDriver {
    errors_per_step: usize,
    commentary: Option<String>,
}

impl ScriptedUiDriver {
    /// Every step loads cleanly with zero errors
    #[must_use]
    pub fn clean() -> Self {
        Self {
            errors_per_step: 0,
            commentary: None,
        }
    }

    /// Every step reports the given number of page errors
    #[must_use]
    pub fn with_errors(errors_per_step: usize) -> Self {
        Self {
            errors_per_step,
            commentary: None,
        }
    }

    /// Every captured state carries this commentary
    #[must_use]
    pub fn with_commentary(mut self, commentary: impl Into<String>) -> Self {
        self.commentary = Some(commentary.into());
        self
    }
}

#[async_trait]
impl UiDriver for ScriptedUiDriver {
    async fn navigate(&self, _url: &str) -> Result<(), InteractionError> {
        Ok(())
    }

    async fn capture_state(&self) -> Result<UiState, InteractionError> {
        Ok(UiState {
            url: "/workshop".to_string(),
            title: "Workshop".to_string(),
            commentary: self.commentary.clone(),
        })
    }

    async fn detect_errors(&self) -> Result<UiErrorScan, InteractionError> {
        Ok(UiErrorScan {
            count: self.errors_per_step,
            texts: vec!["scripted page error".to_string(); self.errors_per_step],
        })
    }
}

/// UI driver that fails navigation at exactly one step
pub struct FlakyStepUi {
    failing_url: String,
}

impl FlakyStepUi {
    /// Fail every navigation to the given 1-based step
    ///
    /// # Panics
    /// If the step number is not a defined workshop step.
    #[must_use]
    pub fn failing_at(step: u8) -> Self {
        let step = pilot_model::step(step).expect("defined workshop step");
        Self {
            failing_url: step.url.to_string(),
        }
    }
}

#[async_trait]
impl UiDriver for FlakyStepUi {
    async fn navigate(&self, url: &str) -> Result<(), InteractionError> {
        if url == self.failing_url {
            Err(InteractionError {
                url: url.to_string(),
                message: "scripted navigation failure".to_string(),
            })
        } else {
            Ok(())
        }
    }

    async fn capture_state(&self) -> Result<UiState, InteractionError> {
        Ok(UiState {
            url: "/workshop".to_string(),
            title: "Workshop".to_string(),
            commentary: None,
        })
    }

    async fn detect_errors(&self) -> Result<UiErrorScan, InteractionError> {
        Ok(UiErrorScan::default())
    }
}
