//! Report generation
//!
//! Pure formatting of a finished analysis into a fixed-section Markdown
//! artifact, plus a machine-readable JSON dump of the same analysis
//! written next to it. No analytical logic lives here.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use pilot_orchestrator::PilotOutcome;

use crate::analyzer::{FacilitatorAnalysis, FrequencyEntry};
use crate::error::ReportError;

/// Paths of the artifacts written for one run
#[derive(Debug, Clone)]
pub struct ReportPaths {
    pub markdown: PathBuf,
    pub json: PathBuf,
}

/// Renders and writes the per-run report artifacts
pub struct ReportGenerator;

impl ReportGenerator {
    /// Render the fixed-section Markdown report
    ///
    /// The raw outcome is passed alongside the analysis so closing
    /// feedback can be quoted verbatim.
    #[must_use]
    pub fn render_markdown(analysis: &FacilitatorAnalysis, outcome: &PilotOutcome) -> String {
        let mut md = String::with_capacity(8 * 1024);

        let _ = writeln!(md, "# Workshop Pilot Report\n");
        let _ = writeln!(md, "Run `{}`\n", analysis.run_id);

        Self::summary_section(&mut md, analysis);
        Self::mood_section(&mut md, analysis);
        Self::per_step_section(&mut md, analysis);
        Self::friction_section(&mut md, analysis);
        Self::dropout_section(&mut md, analysis);
        Self::category_section(&mut md, analysis);
        Self::maturity_section(&mut md, analysis);
        Self::recommendation_section(&mut md, analysis);
        Self::quotes_section(&mut md, outcome);

        md
    }

    /// Write the Markdown report and the JSON dump into `dir`
    pub fn write(
        analysis: &FacilitatorAnalysis,
        outcome: &PilotOutcome,
        dir: &Path,
    ) -> Result<ReportPaths, ReportError> {
        std::fs::create_dir_all(dir)?;
        let markdown = dir.join(format!("pilot-report-{}.md", analysis.run_id));
        let json = dir.join(format!("pilot-analysis-{}.json", analysis.run_id));

        std::fs::write(&markdown, Self::render_markdown(analysis, outcome))?;
        std::fs::write(&json, serde_json::to_string_pretty(analysis)?)?;
        tracing::info!(markdown = %markdown.display(), json = %json.display(), "report written");

        Ok(ReportPaths { markdown, json })
    }

    fn summary_section(md: &mut String, analysis: &FacilitatorAnalysis) {
        let o = &analysis.overall;
        let _ = writeln!(md, "## Summary\n");
        let _ = writeln!(md, "- Personas simulated: {}", o.personas);
        let _ = writeln!(
            md,
            "- Finished journeys: {} ({} dropout(s))",
            o.finished_journeys, o.dropouts
        );
        let _ = writeln!(
            md,
            "- Mean completion rate: {:.0}%",
            o.mean_completion_rate * 100.0
        );
        match o.mean_satisfaction {
            Some(s) => {
                let _ = writeln!(md, "- Mean check-in satisfaction: {s:.1}/10");
            }
            None => {
                let _ = writeln!(md, "- Mean check-in satisfaction: n/a (no check-ins)");
            }
        }
        let _ = writeln!(
            md,
            "- Recommendation rate: {:.0}%",
            analysis.recommendation_rate * 100.0
        );
        let _ = writeln!(
            md,
            "- Fallback-synthesized records: {:.0}%\n",
            o.synthesized_share * 100.0
        );
    }

    fn mood_section(md: &mut String, analysis: &FacilitatorAnalysis) {
        let _ = writeln!(md, "## Pre-workshop mood\n");
        for entry in &analysis.overall.mood_tally {
            let _ = writeln!(md, "- {:?}: {}", entry.mood, entry.count);
        }
        md.push('\n');
    }

    fn per_step_section(md: &mut String, analysis: &FacilitatorAnalysis) {
        let _ = writeln!(md, "## Per-step breakdown\n");
        let _ = writeln!(
            md,
            "| Step | Name | Reached | Mean min (expected) | Mean satisfaction | Errors | Verdict |"
        );
        let _ = writeln!(md, "|---|---|---|---|---|---|---|");
        for s in &analysis.per_step {
            let duration = s
                .mean_duration_minutes
                .map_or_else(|| "-".to_string(), |d| format!("{d:.1}"));
            let satisfaction = s
                .mean_satisfaction
                .map_or_else(|| "-".to_string(), |v| format!("{v:.1}"));
            let _ = writeln!(
                md,
                "| {} | {} | {} | {} ({:.0}) | {} | {} | {} |",
                s.step, s.step_name, s.reached, duration, s.expected_minutes, satisfaction,
                s.total_errors, s.verdict
            );
        }
        md.push('\n');
        for s in &analysis.per_step {
            if s.top_difficulties.is_empty() && s.top_improvements.is_empty() {
                continue;
            }
            let _ = writeln!(md, "**Step {} — {}**", s.step, s.step_name);
            Self::frequency_list(md, "Difficulties", &s.top_difficulties);
            Self::frequency_list(md, "Asked-for improvements", &s.top_improvements);
            md.push('\n');
        }
    }

    fn friction_section(md: &mut String, analysis: &FacilitatorAnalysis) {
        let _ = writeln!(md, "## Friction\n");

        let _ = writeln!(md, "### Stuck points\n");
        if analysis.stuck_points.is_empty() {
            let _ = writeln!(md, "None observed.\n");
        } else {
            for p in &analysis.stuck_points {
                let _ = writeln!(
                    md,
                    "- Step {} ({}): {} persona(s)",
                    p.step,
                    p.step_name,
                    p.personas.len()
                );
            }
            md.push('\n');
        }

        let _ = writeln!(md, "### Time overruns (past 1.5x expected)\n");
        if analysis.time_overruns.is_empty() {
            let _ = writeln!(md, "None observed.\n");
        } else {
            for t in &analysis.time_overruns {
                let _ = writeln!(
                    md,
                    "- Step {} ({}): {} persona(s), mean {:.1}x of {:.0} min",
                    t.step,
                    t.step_name,
                    t.flagged_personas.len(),
                    t.mean_overrun_ratio,
                    t.expected_minutes
                );
            }
            md.push('\n');
        }

        let _ = writeln!(md, "### Error hotspots\n");
        if analysis.error_hotspots.is_empty() {
            let _ = writeln!(md, "None observed.\n");
        } else {
            for h in &analysis.error_hotspots {
                let _ = writeln!(
                    md,
                    "- Step {} ({}): {} error(s) across {} persona(s)",
                    h.step,
                    h.step_name,
                    h.total_errors,
                    h.affected_personas.len()
                );
            }
            md.push('\n');
        }
    }

    fn dropout_section(md: &mut String, analysis: &FacilitatorAnalysis) {
        let _ = writeln!(md, "## Dropouts and dropout risks\n");
        if analysis.dropouts.is_empty() {
            let _ = writeln!(md, "None.\n");
            return;
        }
        for d in &analysis.dropouts {
            let location = d
                .dropout_at
                .map_or_else(|| "at risk".to_string(), |at| format!("dropped at step {at}"));
            let _ = writeln!(
                md,
                "- **{}** {} ({location}, severity {}): {}",
                d.persona_id, d.persona_name, d.severity, d.reason
            );
        }
        md.push('\n');
    }

    fn category_section(md: &mut String, analysis: &FacilitatorAnalysis) {
        let _ = writeln!(md, "## Per-category patterns\n");
        for c in &analysis.category_patterns {
            let satisfaction = c
                .mean_satisfaction
                .map_or_else(|| "-".to_string(), |v| format!("{v:.1}/10"));
            let _ = writeln!(
                md,
                "### {} ({} persona(s), satisfaction {satisfaction}, recommends {:.0}%)\n",
                c.category,
                c.personas,
                c.recommendation_rate * 100.0
            );
            Self::frequency_list(md, "Difficulties", &c.top_difficulties);
            Self::frequency_list(md, "Asked-for improvements", &c.top_improvements);
            md.push('\n');
        }
    }

    fn maturity_section(md: &mut String, analysis: &FacilitatorAnalysis) {
        let _ = writeln!(md, "## Per-maturity patterns\n");
        for m in &analysis.maturity_patterns {
            let satisfaction = m
                .mean_satisfaction
                .map_or_else(|| "-".to_string(), |v| format!("{v:.1}/10"));
            let _ = writeln!(
                md,
                "- {}: {} persona(s), satisfaction {satisfaction}, completion {:.0}%",
                m.maturity,
                m.personas,
                m.mean_completion_rate * 100.0
            );
        }
        md.push('\n');
    }

    fn recommendation_section(md: &mut String, analysis: &FacilitatorAnalysis) {
        let _ = writeln!(md, "## Recommendations\n");
        for (heading, verdict) in [
            ("Fix before the next pilot", "critical"),
            ("Important", "important"),
            ("Monitor", "monitor"),
        ] {
            let steps: Vec<_> = analysis
                .per_step
                .iter()
                .filter(|s| s.verdict.to_string() == verdict)
                .collect();
            if steps.is_empty() {
                continue;
            }
            let _ = writeln!(md, "### {heading}\n");
            for s in steps {
                let satisfaction = s
                    .mean_satisfaction
                    .map_or_else(|| "no one reached it".to_string(), |v| format!("{v:.1}/10"));
                let _ = writeln!(md, "- Step {} ({}): {satisfaction}", s.step, s.step_name);
            }
            md.push('\n');
        }
    }

    /// Up to three closing quotes, preferring genuine model output
    fn quotes_section(md: &mut String, outcome: &PilotOutcome) {
        let mut quotes: Vec<_> = outcome
            .records()
            .filter(|r| !r.post_interview.synthesized)
            .collect();
        if quotes.is_empty() {
            quotes = outcome.records().collect();
        }
        if quotes.is_empty() {
            return;
        }
        let _ = writeln!(md, "## In their words\n");
        for record in quotes.iter().take(3) {
            let _ = writeln!(
                md,
                "> {}\n>\n> — {}\n",
                record.post_interview.overall_feedback, record.persona_name
            );
        }
    }

    fn frequency_list(md: &mut String, label: &str, entries: &[FrequencyEntry]) {
        if entries.is_empty() {
            return;
        }
        let _ = writeln!(md, "{label}:");
        for e in entries {
            let _ = writeln!(md, "- {} ({}x)", e.text, e.count);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::FacilitatorAnalyzer;
    use pilot_model::Category;
    use pilot_orchestrator::{GroupOrchestrator, PilotConfig};
    use pilot_phases::PhaseConfig;
    use pilot_test_utils::{sample_catalog, AlwaysFailClient, ScriptedUiDriver};
    use std::sync::Arc;

    async fn run_outcome() -> PilotOutcome {
        let catalog = sample_catalog(2, &[Category::Marketing, Category::Finance]);
        let orchestrator = GroupOrchestrator::new(
            PilotConfig::new(PhaseConfig::default()),
            Arc::new(AlwaysFailClient),
            Arc::new(ScriptedUiDriver::clean()),
        );
        orchestrator.run(&catalog).await.unwrap()
    }

    #[tokio::test]
    async fn markdown_contains_all_fixed_sections() {
        let outcome = run_outcome().await;
        let analysis = FacilitatorAnalyzer::analyze(&outcome).unwrap();
        let md = ReportGenerator::render_markdown(&analysis, &outcome);

        for heading in [
            "# Workshop Pilot Report",
            "## Summary",
            "## Pre-workshop mood",
            "## Per-step breakdown",
            "## Friction",
            "## Dropouts and dropout risks",
            "## Per-category patterns",
            "## Per-maturity patterns",
            "## Recommendations",
        ] {
            assert!(md.contains(heading), "missing section: {heading}");
        }
    }

    #[tokio::test]
    async fn artifacts_are_written_next_to_each_other() {
        let outcome = run_outcome().await;
        let analysis = FacilitatorAnalyzer::analyze(&outcome).unwrap();
        let dir = tempfile::tempdir().unwrap();

        let paths = ReportGenerator::write(&analysis, &outcome, dir.path()).unwrap();
        assert!(paths.markdown.exists());
        assert!(paths.json.exists());

        let dumped: FacilitatorAnalysis =
            serde_json::from_str(&std::fs::read_to_string(&paths.json).unwrap()).unwrap();
        assert_eq!(dumped.run_id, analysis.run_id);
        assert_eq!(dumped.overall.personas, 2);
    }

    #[tokio::test]
    async fn rendering_is_deterministic() {
        let outcome = run_outcome().await;
        let analysis = FacilitatorAnalyzer::analyze(&outcome).unwrap();
        let a = ReportGenerator::render_markdown(&analysis, &outcome);
        let b = ReportGenerator::render_markdown(&analysis, &outcome);
        assert_eq!(a, b);
    }
}
