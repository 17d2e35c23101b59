//! The facilitator analyzer
//!
//! All ranking ties break on step number or lexicographic text so that
//! identical inputs always produce byte-identical output.

use indexmap::IndexMap;
use pilot_model::{
    workshop_steps, DigitalMaturity, ObservationKind, PersonaId, PreInterviewMood, Severity,
    FOUNDATIONAL_STEPS,
};
use pilot_orchestrator::{PersonaRecord, PilotOutcome};
use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

/// Free-text frequency entry, truncated for grouping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrequencyEntry {
    pub text: String,
    pub count: usize,
}

/// Pre-workshop mood tally
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoodCount {
    pub mood: PreInterviewMood,
    pub count: usize,
}

/// Population-level statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallStats {
    pub personas: usize,
    /// Journeys with no dropout
    pub finished_journeys: usize,
    pub dropouts: usize,
    pub mean_completion_rate: f64,
    /// Mean over every check-in satisfaction, or None with zero check-ins
    pub mean_satisfaction: Option<f64>,
    /// Share of phase records that were fallback-synthesized
    pub synthesized_share: f64,
    /// Pre-workshop moods in enum order
    pub mood_tally: Vec<MoodCount>,
}

/// One step where personas got stuck, ranked by distinct personas
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StuckPoint {
    pub step: u8,
    pub step_name: String,
    pub personas: Vec<PersonaId>,
}

/// One step with time overruns past 1.5x the expected minutes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeOverrun {
    pub step: u8,
    pub step_name: String,
    pub expected_minutes: f64,
    pub flagged_personas: Vec<PersonaId>,
    /// Mean duration/expected ratio among flagged personas
    pub mean_overrun_ratio: f64,
}

/// One step ranked by total page errors
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorHotspot {
    pub step: u8,
    pub step_name: String,
    pub total_errors: usize,
    pub affected_personas: Vec<PersonaId>,
}

/// One persona on the dropout-risk list
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropoutEntry {
    pub persona_id: PersonaId,
    pub persona_name: String,
    /// Step the persona actually dropped at, if they did
    pub dropout_at: Option<u8>,
    pub severity: Severity,
    pub reason: String,
}

/// Aggregates for one department category
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPattern {
    pub category: String,
    pub personas: usize,
    pub mean_satisfaction: Option<f64>,
    pub recommendation_rate: f64,
    pub top_difficulties: Vec<FrequencyEntry>,
    pub top_improvements: Vec<FrequencyEntry>,
}

/// Aggregates for one digital-maturity tier
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaturityPattern {
    pub maturity: DigitalMaturity,
    pub personas: usize,
    pub mean_satisfaction: Option<f64>,
    pub mean_completion_rate: f64,
}

/// Severity bucket for one step's mean satisfaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepVerdict {
    Critical,
    Important,
    Monitor,
    Healthy,
}

impl StepVerdict {
    /// Bucket a mean satisfaction; a step nobody reached is critical
    #[must_use]
    pub fn from_mean_satisfaction(mean: Option<f64>) -> Self {
        match mean {
            None => StepVerdict::Critical,
            Some(m) if m < 6.0 => StepVerdict::Critical,
            Some(m) if m < 7.5 => StepVerdict::Important,
            Some(m) if m < 8.5 => StepVerdict::Monitor,
            Some(_) => StepVerdict::Healthy,
        }
    }
}

impl std::fmt::Display for StepVerdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            StepVerdict::Critical => "critical",
            StepVerdict::Important => "important",
            StepVerdict::Monitor => "monitor",
            StepVerdict::Healthy => "healthy",
        };
        write!(f, "{s}")
    }
}

/// Per-step breakdown entry, one per defined workshop step
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepSummary {
    pub step: u8,
    pub step_name: String,
    pub expected_minutes: f64,
    /// Personas that executed this step
    pub reached: usize,
    pub mean_duration_minutes: Option<f64>,
    pub mean_satisfaction: Option<f64>,
    pub total_errors: usize,
    pub top_difficulties: Vec<FrequencyEntry>,
    pub top_improvements: Vec<FrequencyEntry>,
    pub verdict: StepVerdict,
}

/// The derived, read-only analysis; fully regenerated each run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacilitatorAnalysis {
    pub run_id: String,
    pub overall: OverallStats,
    pub stuck_points: Vec<StuckPoint>,
    pub time_overruns: Vec<TimeOverrun>,
    pub error_hotspots: Vec<ErrorHotspot>,
    pub dropouts: Vec<DropoutEntry>,
    pub category_patterns: Vec<CategoryPattern>,
    pub maturity_patterns: Vec<MaturityPattern>,
    pub per_step: Vec<StepSummary>,
    /// Fraction of post-interviews with a positive recommendation
    pub recommendation_rate: f64,
}

const TOP_N: usize = 3;
const TRUNCATE_AT: usize = 60;
const OVERRUN_RATIO: f64 = 1.5;

fn truncate(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= TRUNCATE_AT {
        trimmed.to_string()
    } else {
        let head: String = trimmed.chars().take(TRUNCATE_AT).collect();
        format!("{head}…")
    }
}

/// Top-N frequency table over free-text entries
///
/// Counts truncated text; ties rank lexicographically so output is
/// stable.
fn top_frequencies<'a>(texts: impl Iterator<Item = &'a str>) -> Vec<FrequencyEntry> {
    let mut counts: IndexMap<String, usize> = IndexMap::new();
    for text in texts {
        if text.trim().is_empty() {
            continue;
        }
        *counts.entry(truncate(text)).or_insert(0) += 1;
    }
    let mut entries: Vec<FrequencyEntry> = counts
        .into_iter()
        .map(|(text, count)| FrequencyEntry { text, count })
        .collect();
    entries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.text.cmp(&b.text)));
    entries.truncate(TOP_N);
    entries
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

/// Pure aggregation over one run's persona records
pub struct FacilitatorAnalyzer;

impl FacilitatorAnalyzer {
    /// Analyze a run outcome
    ///
    /// # Errors
    /// Fatal on any structural inconsistency; see [`AnalysisError`].
    pub fn analyze(outcome: &PilotOutcome) -> Result<FacilitatorAnalysis, AnalysisError> {
        let records: Vec<&PersonaRecord> = outcome.records().collect();
        Self::check_consistency(&records)?;
        tracing::info!(personas = records.len(), "aggregating facilitator analysis");

        Ok(FacilitatorAnalysis {
            run_id: outcome.run_id.clone(),
            overall: Self::overall(&records),
            stuck_points: Self::stuck_points(&records),
            time_overruns: Self::time_overruns(&records),
            error_hotspots: Self::error_hotspots(&records),
            dropouts: Self::dropouts(&records),
            category_patterns: Self::category_patterns(&records),
            maturity_patterns: Self::maturity_patterns(&records),
            per_step: Self::per_step(&records),
            recommendation_rate: Self::recommendation_rate(&records),
        })
    }

    fn check_consistency(records: &[&PersonaRecord]) -> Result<(), AnalysisError> {
        let mut seen: Vec<&PersonaId> = Vec::with_capacity(records.len());
        for record in records {
            if seen.contains(&&record.persona_id) {
                return Err(AnalysisError::DuplicatePersona(record.persona_id.clone()));
            }
            seen.push(&record.persona_id);

            record.journey.check_consistency()?;

            if record.check_ins.len() != record.journey.steps.len() {
                return Err(AnalysisError::PairingMismatch {
                    persona_id: record.persona_id.clone(),
                    detail: format!(
                        "{} check-ins against {} executed steps",
                        record.check_ins.len(),
                        record.journey.steps.len()
                    ),
                });
            }
            for (execution, check_in) in record.journey.steps.iter().zip(&record.check_ins) {
                if execution.step != check_in.step {
                    return Err(AnalysisError::PairingMismatch {
                        persona_id: record.persona_id.clone(),
                        detail: format!(
                            "check-in for step {} paired with execution of step {}",
                            check_in.step, execution.step
                        ),
                    });
                }
            }
        }
        Ok(())
    }

    fn overall(records: &[&PersonaRecord]) -> OverallStats {
        let personas = records.len();
        let dropouts = records
            .iter()
            .filter(|r| r.journey.dropout_at.is_some())
            .count();
        let mean_completion_rate =
            mean(records.iter().map(|r| r.journey.completion_rate())).unwrap_or(0.0);
        let mean_satisfaction = mean(
            records
                .iter()
                .flat_map(|r| r.check_ins.iter())
                .map(|c| f64::from(c.satisfaction.value())),
        );

        let mut synthesized = 0usize;
        let mut total = 0usize;
        for record in records {
            total += 2 + record.check_ins.len();
            synthesized += usize::from(record.pre_interview.synthesized)
                + usize::from(record.post_interview.synthesized)
                + record.check_ins.iter().filter(|c| c.synthesized).count();
        }
        let synthesized_share = if total == 0 {
            0.0
        } else {
            synthesized as f64 / total as f64
        };

        let mood_tally = [
            PreInterviewMood::Excited,
            PreInterviewMood::Neutral,
            PreInterviewMood::Worried,
            PreInterviewMood::Skeptical,
        ]
        .into_iter()
        .map(|mood| MoodCount {
            mood,
            count: records
                .iter()
                .filter(|r| r.pre_interview.initial_mood == mood)
                .count(),
        })
        .collect();

        OverallStats {
            personas,
            finished_journeys: personas - dropouts,
            dropouts,
            mean_completion_rate,
            mean_satisfaction,
            synthesized_share,
            mood_tally,
        }
    }

    /// STUCK and DROPOUT_RISK observations grouped by step, ranked by
    /// distinct-persona count (ties on step number)
    fn stuck_points(records: &[&PersonaRecord]) -> Vec<StuckPoint> {
        let mut by_step: IndexMap<u8, Vec<PersonaId>> = IndexMap::new();
        for record in records {
            for obs in &record.journey.observations {
                if matches!(
                    obs.kind,
                    ObservationKind::Stuck | ObservationKind::DropoutRisk
                ) {
                    let entry = by_step.entry(obs.step).or_default();
                    if !entry.contains(&record.persona_id) {
                        entry.push(record.persona_id.clone());
                    }
                }
            }
        }
        let mut points: Vec<StuckPoint> = by_step
            .into_iter()
            .map(|(step, personas)| StuckPoint {
                step,
                step_name: step_name(step),
                personas,
            })
            .collect();
        points.sort_by(|a, b| {
            b.personas
                .len()
                .cmp(&a.personas.len())
                .then_with(|| a.step.cmp(&b.step))
        });
        points
    }

    fn time_overruns(records: &[&PersonaRecord]) -> Vec<TimeOverrun> {
        let mut overruns = Vec::new();
        for step in workshop_steps() {
            let mut flagged = Vec::new();
            let mut ratios = Vec::new();
            for record in records {
                if let Some(execution) =
                    record.journey.steps.iter().find(|e| e.step == step.number)
                {
                    let ratio = execution.duration_minutes / step.expected_minutes;
                    if ratio >= OVERRUN_RATIO {
                        flagged.push(record.persona_id.clone());
                        ratios.push(ratio);
                    }
                }
            }
            if !flagged.is_empty() {
                overruns.push(TimeOverrun {
                    step: step.number,
                    step_name: step.name.to_string(),
                    expected_minutes: step.expected_minutes,
                    mean_overrun_ratio: mean(ratios.into_iter()).unwrap_or(0.0),
                    flagged_personas: flagged,
                });
            }
        }
        overruns.sort_by(|a, b| {
            b.flagged_personas
                .len()
                .cmp(&a.flagged_personas.len())
                .then_with(|| a.step.cmp(&b.step))
        });
        overruns
    }

    fn error_hotspots(records: &[&PersonaRecord]) -> Vec<ErrorHotspot> {
        let mut hotspots = Vec::new();
        for step in workshop_steps() {
            let mut total_errors = 0usize;
            let mut affected = Vec::new();
            for record in records {
                if let Some(execution) =
                    record.journey.steps.iter().find(|e| e.step == step.number)
                {
                    if execution.error_count > 0 {
                        total_errors += execution.error_count;
                        affected.push(record.persona_id.clone());
                    }
                }
            }
            if total_errors > 0 {
                hotspots.push(ErrorHotspot {
                    step: step.number,
                    step_name: step.name.to_string(),
                    total_errors,
                    affected_personas: affected,
                });
            }
        }
        hotspots.sort_by(|a, b| {
            b.total_errors
                .cmp(&a.total_errors)
                .then_with(|| a.step.cmp(&b.step))
        });
        hotspots
    }

    /// Journeys with an actual dropout, plus personas with a
    /// DROPOUT_RISK observation who still finished
    fn dropouts(records: &[&PersonaRecord]) -> Vec<DropoutEntry> {
        let mut entries = Vec::new();
        for record in records {
            if let Some(at) = record.journey.dropout_at {
                let severity = if at <= FOUNDATIONAL_STEPS {
                    Severity::Critical
                } else {
                    Severity::High
                };
                entries.push(DropoutEntry {
                    persona_id: record.persona_id.clone(),
                    persona_name: record.persona_name.clone(),
                    dropout_at: Some(at),
                    severity,
                    reason: record
                        .journey
                        .dropout_reason
                        .clone()
                        .unwrap_or_else(|| "unspecified".to_string()),
                });
            } else if let Some(obs) = record
                .journey
                .observations
                .iter()
                .find(|o| o.kind == ObservationKind::DropoutRisk)
            {
                entries.push(DropoutEntry {
                    persona_id: record.persona_id.clone(),
                    persona_name: record.persona_name.clone(),
                    dropout_at: None,
                    severity: obs.severity,
                    reason: obs.note.clone(),
                });
            }
        }
        entries.sort_by(|a, b| {
            a.severity
                .cmp(&b.severity)
                .then_with(|| a.persona_id.cmp(&b.persona_id))
        });
        entries
    }

    fn category_patterns(records: &[&PersonaRecord]) -> Vec<CategoryPattern> {
        let mut by_category: IndexMap<String, Vec<&PersonaRecord>> = IndexMap::new();
        for record in records {
            by_category
                .entry(record.category.to_string())
                .or_default()
                .push(record);
        }
        by_category
            .into_iter()
            .map(|(category, group)| {
                let mean_satisfaction = mean(
                    group
                        .iter()
                        .flat_map(|r| r.check_ins.iter())
                        .map(|c| f64::from(c.satisfaction.value())),
                );
                let recommended = group
                    .iter()
                    .filter(|r| r.post_interview.would_recommend.yes)
                    .count();
                CategoryPattern {
                    category,
                    personas: group.len(),
                    mean_satisfaction,
                    recommendation_rate: recommended as f64 / group.len() as f64,
                    top_difficulties: top_frequencies(
                        group
                            .iter()
                            .flat_map(|r| r.check_ins.iter())
                            .flat_map(|c| c.difficulties.iter())
                            .map(String::as_str),
                    ),
                    top_improvements: top_frequencies(
                        group
                            .iter()
                            .flat_map(|r| r.check_ins.iter())
                            .flat_map(|c| c.immediate_improvements.iter())
                            .map(String::as_str),
                    ),
                }
            })
            .collect()
    }

    fn maturity_patterns(records: &[&PersonaRecord]) -> Vec<MaturityPattern> {
        [
            DigitalMaturity::Beginner,
            DigitalMaturity::Intermediate,
            DigitalMaturity::Advanced,
            DigitalMaturity::Expert,
        ]
        .into_iter()
        .filter_map(|maturity| {
            let group: Vec<_> = records
                .iter()
                .filter(|r| r.digital_maturity == maturity)
                .collect();
            if group.is_empty() {
                return None;
            }
            Some(MaturityPattern {
                maturity,
                personas: group.len(),
                mean_satisfaction: mean(
                    group
                        .iter()
                        .flat_map(|r| r.check_ins.iter())
                        .map(|c| f64::from(c.satisfaction.value())),
                ),
                mean_completion_rate: mean(group.iter().map(|r| r.journey.completion_rate()))
                    .unwrap_or(0.0),
            })
        })
        .collect()
    }

    fn per_step(records: &[&PersonaRecord]) -> Vec<StepSummary> {
        workshop_steps()
            .iter()
            .map(|step| {
                let executions: Vec<_> = records
                    .iter()
                    .filter_map(|r| r.journey.steps.iter().find(|e| e.step == step.number))
                    .collect();
                let check_ins: Vec<_> = records
                    .iter()
                    .filter_map(|r| r.check_ins.iter().find(|c| c.step == step.number))
                    .collect();
                let mean_satisfaction = mean(
                    check_ins
                        .iter()
                        .map(|c| f64::from(c.satisfaction.value())),
                );
                StepSummary {
                    step: step.number,
                    step_name: step.name.to_string(),
                    expected_minutes: step.expected_minutes,
                    reached: executions.len(),
                    mean_duration_minutes: mean(
                        executions.iter().map(|e| e.duration_minutes),
                    ),
                    mean_satisfaction,
                    total_errors: executions.iter().map(|e| e.error_count).sum(),
                    top_difficulties: top_frequencies(
                        check_ins
                            .iter()
                            .flat_map(|c| c.difficulties.iter())
                            .map(String::as_str),
                    ),
                    top_improvements: top_frequencies(
                        check_ins
                            .iter()
                            .flat_map(|c| c.immediate_improvements.iter())
                            .map(String::as_str),
                    ),
                    verdict: StepVerdict::from_mean_satisfaction(mean_satisfaction),
                }
            })
            .collect()
    }

    fn recommendation_rate(records: &[&PersonaRecord]) -> f64 {
        if records.is_empty() {
            return 0.0;
        }
        let positive = records
            .iter()
            .filter(|r| r.post_interview.would_recommend.yes)
            .count();
        positive as f64 / records.len() as f64
    }
}

fn step_name(step: u8) -> String {
    pilot_model::step(step).map_or_else(|| format!("step {step}"), |s| s.name.to_string())
}
