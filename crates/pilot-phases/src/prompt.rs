//! Prompt assembly and temperature policy
//!
//! Every prompt starts from the same persona identity block so the
//! model stays in character across phases, adds a short reasoning
//! scaffold, category-specific examples, and then the phase-specific
//! request with an explicit JSON response schema.

use std::fmt::Write as _;

use once_cell::sync::Lazy;
use pilot_completion::{CompletionRequest, ModelTier};
use pilot_model::{
    Category, ChangeResistance, DigitalMaturity, Persona, StepExecution, WorkshopJourney,
    WorkshopStep,
};

use crate::config::PhaseConfig;

/// Sampling temperature for one persona
///
/// Less mature teams get a higher base (more erratic simulated
/// behavior); change resistance nudges it up or down. Clamped to
/// [0.5, 1.0].
#[must_use]
pub fn temperature_for(persona: &Persona) -> f32 {
    let base: f32 = match persona.team.digital_maturity {
        DigitalMaturity::Beginner => 0.9,
        DigitalMaturity::Intermediate => 0.8,
        DigitalMaturity::Advanced => 0.7,
        DigitalMaturity::Expert => 0.6,
    };
    let adjustment = match persona.personality.change_resistance {
        ChangeResistance::High => 0.1,
        ChangeResistance::Medium => 0.0,
        ChangeResistance::Low => -0.05,
    };
    (base + adjustment).clamp(0.5, 1.0)
}

/// Phase-tone examples for one department category
struct CategoryExamples {
    /// How this department tends to phrase pain points
    pain_voice: &'static str,
    /// What automation wins look like here
    automation_voice: &'static str,
}

static DEFAULT_EXAMPLES: CategoryExamples = CategoryExamples {
    pain_voice: "recurring manual work that pulls the team away from its core responsibilities",
    automation_voice: "removing repetitive coordination and reporting effort",
};

/// Examples keyed by the closed category enum
///
/// Unlisted categories fall back to an explicit default instead of
/// silently borrowing another category's voice.
static CATEGORY_EXAMPLES: Lazy<Vec<(Category, CategoryExamples)>> = Lazy::new(|| {
    vec![
        (
            Category::Marketing,
            CategoryExamples {
                pain_voice: "campaign reporting stitched together from five tools every Monday",
                automation_voice: "auto-compiled performance dashboards and templated briefs",
            },
        ),
        (
            Category::Sales,
            CategoryExamples {
                pain_voice: "CRM hygiene and pipeline updates eating selling hours",
                automation_voice: "automatic deal-stage updates and follow-up reminders",
            },
        ),
        (
            Category::Operations,
            CategoryExamples {
                pain_voice: "status chasing across teams because handoffs are undocumented",
                automation_voice: "standardized intake forms and automated status rollups",
            },
        ),
        (
            Category::ResearchAndDevelopment,
            CategoryExamples {
                pain_voice: "experiment logs and literature notes scattered across folders",
                automation_voice: "automated experiment tracking and result summarization",
            },
        ),
        (
            Category::HumanResources,
            CategoryExamples {
                pain_voice: "onboarding checklists tracked by hand for every new hire",
                automation_voice: "templated onboarding flows and automated reminder chains",
            },
        ),
        (
            Category::Finance,
            CategoryExamples {
                pain_voice: "month-end close delayed by manual reconciliation spreadsheets",
                automation_voice: "automated reconciliation checks and close-status tracking",
            },
        ),
        (
            Category::InformationTechnology,
            CategoryExamples {
                pain_voice: "ticket triage interrupting project work all day",
                automation_voice: "auto-categorized tickets and self-service runbooks",
            },
        ),
        (
            Category::Strategy,
            CategoryExamples {
                pain_voice: "briefing decks rebuilt from scratch for every stakeholder",
                automation_voice: "reusable analysis templates and automated data pulls",
            },
        ),
    ]
});

fn examples_for(category: Category) -> &'static CategoryExamples {
    CATEGORY_EXAMPLES
        .iter()
        .find(|(c, _)| *c == category)
        .map_or(&DEFAULT_EXAMPLES, |(_, e)| e)
}

const REASONING_SCAFFOLD: &str = "Before answering, think briefly about how someone with this \
background, patience level, and attitude would genuinely react. Stay in character. Then answer \
with a single JSON object exactly matching the requested schema, and nothing else after it.";

/// Builds completion requests for every phase
///
/// Pure: the same persona and context always produce the same request.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    config: PhaseConfig,
}

impl PromptBuilder {
    /// Builder over the given model configuration
    #[inline]
    #[must_use]
    pub fn new(config: PhaseConfig) -> Self {
        Self { config }
    }

    fn identity_block(persona: &Persona) -> String {
        let mut block = String::with_capacity(1024);
        let _ = writeln!(
            block,
            "You are {name}, a team leader in the {dept} department ({cat}) at {company}.",
            name = persona.name,
            dept = persona.department,
            cat = persona.category,
            company = persona.company,
        );
        let _ = writeln!(
            block,
            "You have been in the role for {years:.1} years; before that you were {prev}. \
             Leadership style: {style}.",
            years = persona.leader_profile.years_in_role,
            prev = persona.leader_profile.previous_role,
            style = persona.leader_profile.leadership_style,
        );
        let _ = writeln!(
            block,
            "Your team: {size} people ({composition}), digital maturity {maturity}, {dist}.",
            size = persona.team.size,
            composition = persona.team.composition,
            maturity = persona.team.digital_maturity,
            dist = persona.team.maturity_distribution,
        );
        let _ = writeln!(
            block,
            "Main tasks: {tasks}. Tools in use: {tools}.",
            tasks = persona.work.main_tasks.join("; "),
            tools = persona.work.tools_used.join(", "),
        );
        let _ = writeln!(
            block,
            "Pain points: {pains}. Automation needs: {needs}. Work structure: {structure}.",
            pains = persona.work.pain_points.join("; "),
            needs = persona.work.automation_needs.join("; "),
            structure = persona.work.work_structure.level,
        );
        let _ = writeln!(
            block,
            "Personality: patience {patience}/10, tech affinity {tech}/10, change resistance \
             {resistance:?}, learning speed {speed:?}. Initial attitude toward this workshop: \
             {attitude:?}. Dropout risk: {risk}%.",
            patience = persona.personality.patience,
            tech = persona.personality.tech_savvy,
            resistance = persona.personality.change_resistance,
            speed = persona.personality.learning_speed,
            attitude = persona.expected_behavior.initial_attitude,
            risk = persona.expected_behavior.dropout_risk,
        );
        let examples = examples_for(persona.category);
        let _ = writeln!(
            block,
            "In your department, pain typically sounds like \"{pain}\" and automation wins look \
             like \"{auto}\".",
            pain = examples.pain_voice,
            auto = examples.automation_voice,
        );
        block
    }

    /// Pre-interview request (deep tier)
    #[must_use]
    pub fn pre_interview(&self, persona: &Persona) -> CompletionRequest {
        let mut user = Self::identity_block(persona);
        user.push('\n');
        user.push_str(
            "You are about to attend a three-hour workshop that analyzes your team's work and \
             designs automation for it. An interviewer asks about your expectations before it \
             starts.\n\nRespond with JSON:\n\
             {\"expectations\": string, \"concerns\": [string], \"digitalExperience\": string, \
             \"timeWorries\": string, \"keyQuestions\": [string], \
             \"initialMood\": \"excited\"|\"neutral\"|\"worried\"|\"skeptical\"}",
        );
        CompletionRequest::new(
            self.config.deep_model.clone(),
            ModelTier::Deep,
            self.config.deep_max_tokens,
            temperature_for(persona),
            user,
        )
        .with_system(REASONING_SCAFFOLD.to_string())
    }

    /// Step-input generation request (fast tier)
    ///
    /// Asks for realistic form data this persona would enter at the
    /// given workshop step.
    #[must_use]
    pub fn step_input(&self, persona: &Persona, step: &WorkshopStep) -> CompletionRequest {
        let mut user = Self::identity_block(persona);
        let _ = write!(
            user,
            "\nYou are at workshop step {number} of 11: \"{name}\" ({desc}).\n\
             Produce the form input you would actually type here, as one JSON object whose keys \
             are the field names and whose values are your entries. Keep entries short and \
             specific to your team.",
            number = step.number,
            name = step.name,
            desc = step.description,
        );
        CompletionRequest::new(
            self.config.fast_model.clone(),
            ModelTier::Fast,
            self.config.fast_max_tokens,
            temperature_for(persona),
            user,
        )
        .with_system(REASONING_SCAFFOLD.to_string())
    }

    /// Check-in request right after a step (fast tier)
    #[must_use]
    pub fn check_in(&self, persona: &Persona, execution: &StepExecution) -> CompletionRequest {
        let mut user = Self::identity_block(persona);
        let _ = write!(
            user,
            "\nYou just finished workshop step {number}: \"{name}\". It took you \
             {minutes:.1} minutes and you hit {errors} error(s) on the page.",
            number = execution.step,
            name = execution.step_name,
            minutes = execution.duration_minutes,
            errors = execution.error_count,
        );
        if let Some(commentary) = &execution.commentary {
            let _ = write!(user, " The platform commented: \"{commentary}\".");
        }
        user.push_str(
            "\nA facilitator asks how it went.\n\nRespond with JSON:\n\
             {\"feeling\": string, \"difficulties\": [string], \"wouldContinue\": boolean, \
             \"wouldContinueReason\": string, \"immediateImprovements\": [string], \
             \"mood\": \"good\"|\"neutral\"|\"struggling\"|\"frustrated\", \
             \"satisfaction\": integer 1-10}",
        );
        CompletionRequest::new(
            self.config.fast_model.clone(),
            ModelTier::Fast,
            self.config.fast_max_tokens,
            temperature_for(persona),
            user,
        )
        .with_system(REASONING_SCAFFOLD.to_string())
    }

    /// Post-interview request over the whole journey (deep tier)
    #[must_use]
    pub fn post_interview(&self, persona: &Persona, journey: &WorkshopJourney) -> CompletionRequest {
        let mut user = Self::identity_block(persona);
        let total_errors: usize = journey.steps.iter().map(|s| s.error_count).sum();
        let _ = write!(
            user,
            "\nThe workshop is over. You completed {completed} of 11 steps in \
             {minutes:.1} minutes with {errors} error(s) along the way.",
            completed = journey.completed_steps,
            minutes = journey.total_duration_minutes,
            errors = total_errors,
        );
        if let Some(at) = journey.dropout_at {
            let reason = journey.dropout_reason.as_deref().unwrap_or("unspecified");
            let _ = write!(
                user,
                " You gave up at step {at} ({reason}) and did not see the rest.",
            );
        }
        user.push_str(
            "\nAn interviewer asks you to reflect on the whole experience.\n\nRespond with JSON:\n\
             {\"expectationVsReality\": string, \
             \"hardestMoment\": {\"step\": integer 1-11, \"reason\": string}, \
             \"applicabilityScore\": integer 1-10, \"applicabilityReason\": string, \
             \"wouldRecommend\": {\"yes\": boolean, \"reason\": string}, \
             \"urgentImprovements\": [string], \"ifAgain\": string, \"overallFeedback\": string}",
        );
        CompletionRequest::new(
            self.config.deep_model.clone(),
            ModelTier::Deep,
            self.config.deep_max_tokens,
            temperature_for(persona),
            user,
        )
        .with_system(REASONING_SCAFFOLD.to_string())
    }
}
