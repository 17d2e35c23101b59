//! End-to-end pipeline scenarios: catalog in, report artifacts out.

use std::sync::Arc;

use pilot_analysis::{FacilitatorAnalyzer, ReportGenerator};
use pilot_model::{Category, ObservationKind, PersonaCatalog, PersonaId};
use pilot_orchestrator::{GroupOrchestrator, PilotConfig};
use pilot_phases::PhaseConfig;
use pilot_test_utils::{
    sample_catalog, sample_persona, AlwaysFailClient, FlakyStepUi, MalformedClient, QueueClient,
    ScriptedPhaseClient, ScriptedUiDriver,
};

fn orchestrator(
    client: impl pilot_completion::CompletionClient + 'static,
    ui: impl pilot_phases::UiDriver + 'static,
) -> GroupOrchestrator {
    GroupOrchestrator::new(
        PilotConfig::new(PhaseConfig::default()),
        Arc::new(client),
        Arc::new(ui),
    )
}

#[tokio::test]
async fn always_failing_client_still_completes_every_persona() {
    let catalog = sample_catalog(4, &[Category::Marketing, Category::Sales]);
    let outcome = orchestrator(AlwaysFailClient, ScriptedUiDriver::clean())
        .run(&catalog)
        .await
        .unwrap();

    assert_eq!(outcome.persona_count(), 4);
    for record in outcome.records() {
        assert!(record.pre_interview.synthesized);
        assert!(record.check_ins.iter().all(|c| c.synthesized));
        assert!(record.post_interview.synthesized);
        assert_eq!(record.journey.completed_steps, 11);
    }

    // The analysis and report still come out the other end
    let analysis = FacilitatorAnalyzer::analyze(&outcome).unwrap();
    assert_eq!(analysis.overall.personas, 4);
    assert!((analysis.overall.synthesized_share - 1.0).abs() < f64::EPSILON);
    let md = ReportGenerator::render_markdown(&analysis, &outcome);
    assert!(md.contains("## Summary"));
}

#[tokio::test]
async fn prose_only_responses_synthesize_every_record() {
    let catalog = sample_catalog(2, &[Category::Operations]);
    let outcome = orchestrator(MalformedClient, ScriptedUiDriver::clean())
        .run(&catalog)
        .await
        .unwrap();

    for record in outcome.records() {
        assert!(record.pre_interview.synthesized);
        assert!(record.check_ins.iter().all(|c| c.synthesized));
        assert!(record.post_interview.synthesized);
        assert_eq!(record.journey.completed_steps, 11);
    }
    let analysis = FacilitatorAnalyzer::analyze(&outcome).unwrap();
    assert!(analysis.dropouts.is_empty());
    assert!((analysis.overall.synthesized_share - 1.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn exhausted_response_queue_falls_back_mid_journey() {
    let catalog = sample_catalog(1, &[Category::Finance]);
    // One genuine pre-interview answer, then nothing
    let client = QueueClient::new([r#"{"expectations": "smoother reporting",
        "concerns": ["time away from the team"],
        "digitalExperience": "comfortable with our current tools",
        "timeWorries": "three hours is long",
        "keyQuestions": ["what changes on Monday?"],
        "initialMood": "neutral"}"#
        .to_string()]);
    let outcome = orchestrator(client, ScriptedUiDriver::clean())
        .run(&catalog)
        .await
        .unwrap();

    let record = outcome.records().next().unwrap();
    assert!(!record.pre_interview.synthesized);
    assert!(record.check_ins.iter().all(|c| c.synthesized));
    assert!(record.post_interview.synthesized);
    assert_eq!(record.journey.completed_steps, 11);
}

#[tokio::test]
async fn page_errors_become_hotspots_and_commentary_is_kept() {
    let catalog = sample_catalog(1, &[Category::Sales]);
    let ui = ScriptedUiDriver::with_errors(2).with_commentary("the form kept resetting");
    let outcome = orchestrator(ScriptedPhaseClient::well_formed(), ui)
        .run(&catalog)
        .await
        .unwrap();

    let record = outcome.records().next().unwrap();
    assert!(record
        .journey
        .steps
        .iter()
        .all(|s| s.error_count == 2
            && s.commentary.as_deref() == Some("the form kept resetting")));

    let analysis = FacilitatorAnalyzer::analyze(&outcome).unwrap();
    assert_eq!(analysis.error_hotspots.len(), 11);
    assert_eq!(analysis.error_hotspots[0].total_errors, 2);
    assert_eq!(
        analysis.error_hotspots[0].affected_personas,
        vec![PersonaId::new("P001")]
    );
}

#[tokio::test]
async fn one_malformed_persona_among_well_formed_ones() {
    let catalog = PersonaCatalog::from_personas(vec![
        sample_persona("P001", Category::Marketing),
        sample_persona("P002", Category::Marketing),
        sample_persona("P003", Category::Marketing),
    ])
    .unwrap();
    // Persona three only ever gets schema-free prose back
    let client = ScriptedPhaseClient::malformed_for(vec!["Lead P003".to_string()]);
    let outcome = orchestrator(client, ScriptedUiDriver::clean())
        .run(&catalog)
        .await
        .unwrap();

    let records: Vec<_> = outcome.records().collect();
    assert!(!records[0].pre_interview.synthesized);
    assert!(!records[1].pre_interview.synthesized);
    assert!(records[0].check_ins.iter().all(|c| !c.synthesized));

    assert!(records[2].pre_interview.synthesized);
    assert!(records[2].check_ins.iter().all(|c| c.synthesized));
    assert!(records[2].post_interview.synthesized);
    assert_eq!(records[2].journey.completed_steps, 11);

    let analysis = FacilitatorAnalyzer::analyze(&outcome).unwrap();
    assert!(analysis.dropouts.is_empty());
    // All three posts (two genuine, one synthesized) recommend here
    assert!((analysis.recommendation_rate - 1.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn interaction_failure_at_step_three_drops_out() {
    let catalog = PersonaCatalog::from_personas(vec![sample_persona(
        "P001",
        Category::Operations,
    )])
    .unwrap();
    let outcome = orchestrator(ScriptedPhaseClient::well_formed(), FlakyStepUi::failing_at(3))
        .run(&catalog)
        .await
        .unwrap();

    let record = outcome.records().next().unwrap();
    assert_eq!(record.journey.dropout_at, Some(3));
    assert_eq!(record.journey.completed_steps, 2);
    assert!(record.journey.steps.iter().all(|s| s.step < 3));
    assert_eq!(record.check_ins.len(), 2);

    let analysis = FacilitatorAnalyzer::analyze(&outcome).unwrap();
    assert_eq!(analysis.dropouts.len(), 1);
    assert_eq!(analysis.dropouts[0].dropout_at, Some(3));
}

#[tokio::test]
async fn interaction_failure_at_step_seven_continues_to_eleven() {
    let catalog = PersonaCatalog::from_personas(vec![sample_persona(
        "P001",
        Category::Operations,
    )])
    .unwrap();
    let outcome = orchestrator(ScriptedPhaseClient::well_formed(), FlakyStepUi::failing_at(7))
        .run(&catalog)
        .await
        .unwrap();

    let record = outcome.records().next().unwrap();
    assert_eq!(record.journey.dropout_at, None);
    assert_eq!(record.journey.completed_steps, 11);
    assert!(record
        .journey
        .observations
        .iter()
        .any(|o| o.kind == ObservationKind::Stuck && o.step == 7));

    let analysis = FacilitatorAnalyzer::analyze(&outcome).unwrap();
    assert_eq!(analysis.stuck_points.len(), 1);
    assert_eq!(analysis.stuck_points[0].step, 7);
}

#[tokio::test]
async fn two_groups_both_appear_with_order_preserved() {
    let catalog = PersonaCatalog::from_personas(vec![
        sample_persona("P001", Category::Marketing),
        sample_persona("P002", Category::Finance),
        sample_persona("P003", Category::Marketing),
        sample_persona("P004", Category::Finance),
    ])
    .unwrap();
    let outcome = orchestrator(ScriptedPhaseClient::well_formed(), ScriptedUiDriver::clean())
        .run(&catalog)
        .await
        .unwrap();

    assert_eq!(outcome.groups.len(), 2);
    let marketing: Vec<_> = outcome.groups[0]
        .records
        .iter()
        .map(|r| r.persona_id.clone())
        .collect();
    assert_eq!(
        marketing,
        vec![PersonaId::new("P001"), PersonaId::new("P003")]
    );
    let finance: Vec<_> = outcome.groups[1]
        .records
        .iter()
        .map(|r| r.persona_id.clone())
        .collect();
    assert_eq!(finance, vec![PersonaId::new("P002"), PersonaId::new("P004")]);

    // Exactly one journey per catalog persona
    let analysis = FacilitatorAnalyzer::analyze(&outcome).unwrap();
    assert_eq!(analysis.overall.personas, 4);
}
