//! Deterministic fallback synthesis
//!
//! When a completion call fails or its response does not decode, the
//! runner substitutes a record built entirely from the persona's static
//! attributes. The pipeline never stalls on one bad response; fidelity
//! is traded for robustness, and every synthesized record is flagged so
//! the analysis can tell them apart from genuine model output.

use chrono::Utc;
use pilot_model::{
    CheckInMood, CheckInResult, DigitalMaturity, HardestMoment, InitialAttitude, Persona,
    PostInterviewResult, PreInterviewMood, PreInterviewResult, Recommendation, Satisfaction,
    StepExecution, WorkshopJourney, WorkshopStep,
};

/// Mood for a synthesized pre-interview, from the declared attitude
#[must_use]
pub fn pre_interview_mood(attitude: InitialAttitude) -> PreInterviewMood {
    match attitude {
        InitialAttitude::Eager => PreInterviewMood::Excited,
        InitialAttitude::Neutral => PreInterviewMood::Neutral,
        InitialAttitude::Worried => PreInterviewMood::Worried,
        InitialAttitude::Skeptical => PreInterviewMood::Skeptical,
    }
}

/// Synthesized pre-interview record
#[must_use]
pub fn pre_interview(persona: &Persona) -> PreInterviewResult {
    let attitude = persona.expected_behavior.initial_attitude;
    let concerns = if persona.expected_behavior.concerns.is_empty() {
        vec![persona.work.pain_points[0].clone()]
    } else {
        persona.expected_behavior.concerns.clone()
    };
    PreInterviewResult {
        persona_id: persona.id.clone(),
        persona_name: persona.name.clone(),
        expectations: format!(
            "I mainly hope this helps with: {}",
            persona.work.automation_needs[0]
        ),
        concerns,
        digital_experience: format!(
            "Our team is at a {} level with digital tools; we mostly use {}.",
            persona.team.digital_maturity,
            persona.work.tools_used.join(", "),
        ),
        time_worries: "Three hours is a lot to carve out of a normal week.".to_string(),
        key_questions: vec![format!(
            "Can this actually fix \"{}\"?",
            persona.work.pain_points[0]
        )],
        initial_mood: pre_interview_mood(attitude),
        timestamp: Utc::now(),
        synthesized: true,
    }
}

/// Placeholder form input for one step
#[must_use]
pub fn step_input(persona: &Persona, step: &WorkshopStep) -> serde_json::Value {
    serde_json::json!({
        "note": format!("{} for the {} team", step.name, persona.department),
        "mainTask": persona.work.main_tasks[0],
        "painPoint": persona.work.pain_points[0],
    })
}

/// Synthesized check-in for one executed step
///
/// Mood and satisfaction derive from the declared attitude, degraded
/// when the step hit errors.
#[must_use]
pub fn check_in(persona: &Persona, execution: &StepExecution) -> CheckInResult {
    let attitude = persona.expected_behavior.initial_attitude;
    let had_errors = execution.error_count > 0;

    let mood = if had_errors {
        CheckInMood::Struggling
    } else {
        match attitude {
            InitialAttitude::Eager => CheckInMood::Good,
            InitialAttitude::Neutral | InitialAttitude::Worried => CheckInMood::Neutral,
            InitialAttitude::Skeptical => CheckInMood::Struggling,
        }
    };

    let base: u8 = match attitude {
        InitialAttitude::Eager => 8,
        InitialAttitude::Neutral => 6,
        InitialAttitude::Worried => 5,
        InitialAttitude::Skeptical => 4,
    };
    let penalty = u8::try_from(execution.error_count.min(3)).unwrap_or(3);
    let satisfaction = Satisfaction::clamped(base.saturating_sub(penalty));

    let difficulties = if had_errors {
        vec![format!(
            "Hit {} error(s) during \"{}\"",
            execution.error_count, execution.step_name
        )]
    } else {
        Vec::new()
    };

    CheckInResult {
        step: execution.step,
        feeling: format!("\"{}\" was manageable, moving on.", execution.step_name),
        difficulties,
        would_continue: persona.expected_behavior.dropout_risk < 70,
        would_continue_reason: if persona.expected_behavior.dropout_risk < 70 {
            "Still expecting something useful out of this.".to_string()
        } else {
            "Not convinced this is worth the remaining time.".to_string()
        },
        immediate_improvements: vec![persona.work.automation_needs[0].clone()],
        mood,
        satisfaction,
        timestamp: Utc::now(),
        synthesized: true,
    }
}

/// Synthesized post-interview over a complete or partial journey
#[must_use]
pub fn post_interview(persona: &Persona, journey: &WorkshopJourney) -> PostInterviewResult {
    // Hardest moment: the most error-laden step, else the longest one,
    // else step 1 for an immediately abandoned journey
    let hardest = journey
        .steps
        .iter()
        .max_by(|a, b| {
            a.error_count.cmp(&b.error_count).then(
                a.duration_minutes
                    .partial_cmp(&b.duration_minutes)
                    .unwrap_or(std::cmp::Ordering::Equal),
            )
        })
        .map_or(
            HardestMoment {
                step: journey.dropout_at.unwrap_or(1),
                reason: "Could not get going at all.".to_string(),
            },
            |exec| HardestMoment {
                step: exec.step,
                reason: format!(
                    "\"{}\" took {:.1} minutes with {} error(s).",
                    exec.step_name, exec.duration_minutes, exec.error_count
                ),
            },
        );

    let applicability: u8 = match persona.team.digital_maturity {
        DigitalMaturity::Beginner => 5,
        DigitalMaturity::Intermediate => 6,
        DigitalMaturity::Advanced => 7,
        DigitalMaturity::Expert => 8,
    };
    let finished = journey.dropout_at.is_none();
    let recommend = finished && persona.expected_behavior.dropout_risk < 50;

    PostInterviewResult {
        persona_id: persona.id.clone(),
        persona_name: persona.name.clone(),
        expectation_vs_reality: if finished {
            "Roughly what I expected, with a few rough edges.".to_string()
        } else {
            "I expected more guidance; I did not make it to the end.".to_string()
        },
        hardest_moment: hardest,
        applicability_score: Satisfaction::clamped(applicability),
        applicability_reason: format!(
            "A {} team can apply part of this without much ramp-up.",
            persona.team.digital_maturity
        ),
        would_recommend: Recommendation {
            yes: recommend,
            reason: if recommend {
                "Useful enough for leaders with similar pain points.".to_string()
            } else {
                "Too much friction in its current state.".to_string()
            },
        },
        urgent_improvements: persona.work.automation_needs.clone(),
        if_again: "I would block the time properly and bring team examples.".to_string(),
        overall_feedback: format!(
            "Completed {} of 11 steps; the idea is sound but execution needs polish.",
            journey.completed_steps
        ),
        timestamp: Utc::now(),
        synthesized: true,
    }
}

#[cfg(test)]
mod tests {
    use pilot_model::test_fixtures::sample_persona;
    use pilot_model::Category;
    use pretty_assertions::assert_eq;

    use super::*;

    fn exec(step: u8, errors: usize) -> StepExecution {
        StepExecution {
            step,
            step_name: format!("step {step}"),
            duration_minutes: 5.0,
            input: serde_json::Value::Null,
            error_count: errors,
            commentary: None,
            observations: Vec::new(),
        }
    }

    #[test]
    fn pre_interview_marks_synthesized_and_uses_attributes() {
        let mut persona = sample_persona("P001", Category::Finance);
        persona.expected_behavior.initial_attitude = InitialAttitude::Skeptical;
        let result = pre_interview(&persona);
        assert!(result.synthesized);
        assert_eq!(result.initial_mood, PreInterviewMood::Skeptical);
        assert!(result.expectations.contains(&persona.work.automation_needs[0]));
    }

    #[test]
    fn step_input_draws_on_persona_work() {
        let persona = sample_persona("P001", Category::Finance);
        let step = pilot_model::step(2).unwrap();
        let input = step_input(&persona, step);
        assert_eq!(input["mainTask"], persona.work.main_tasks[0].as_str());
        assert_eq!(input["painPoint"], persona.work.pain_points[0].as_str());
    }

    #[test]
    fn check_in_degrades_on_errors() {
        let persona = sample_persona("P001", Category::Sales);
        let clean = check_in(&persona, &exec(2, 0));
        let errored = check_in(&persona, &exec(2, 2));
        assert!(errored.satisfaction < clean.satisfaction);
        assert_eq!(errored.mood, CheckInMood::Struggling);
        assert!(!errored.difficulties.is_empty());
    }

    #[test]
    fn check_in_satisfaction_never_leaves_bounds() {
        let mut persona = sample_persona("P001", Category::Sales);
        persona.expected_behavior.initial_attitude = InitialAttitude::Skeptical;
        let result = check_in(&persona, &exec(2, 50));
        assert!(result.satisfaction.value() >= 1);
    }

    #[test]
    fn post_interview_handles_empty_journey() {
        let persona = sample_persona("P001", Category::Marketing);
        let journey = WorkshopJourney {
            persona_id: persona.id.clone(),
            persona_name: persona.name.clone(),
            steps: Vec::new(),
            observations: Vec::new(),
            completed_steps: 0,
            dropout_at: Some(1),
            dropout_reason: Some("navigation failed".to_string()),
            total_duration_minutes: 0.0,
        };
        let result = post_interview(&persona, &journey);
        assert_eq!(result.hardest_moment.step, 1);
        assert!(!result.would_recommend.yes);
        assert!(result.synthesized);
    }

    #[test]
    fn post_interview_picks_most_errored_step_as_hardest() {
        let persona = sample_persona("P001", Category::Operations);
        let journey = WorkshopJourney {
            persona_id: persona.id.clone(),
            persona_name: persona.name.clone(),
            steps: vec![exec(1, 0), exec(2, 3), exec(3, 1)],
            observations: Vec::new(),
            completed_steps: 3,
            dropout_at: None,
            dropout_reason: None,
            total_duration_minutes: 15.0,
        };
        let result = post_interview(&persona, &journey);
        assert_eq!(result.hardest_moment.step, 2);
    }
}
