//! Pilot harness binary
//!
//! Loads a persona catalog, runs the full pilot (group-parallel,
//! persona-sequential), aggregates the facilitator analysis, and writes
//! the Markdown report plus the JSON dump.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use clap::{value_parser, Arg, ArgAction, Command};
use pilot_analysis::{FacilitatorAnalyzer, ReportGenerator};
use pilot_completion::{
    CompletionClient, CompletionError, CompletionRequest, FixedDelayLimiter, LiveCompletionClient,
    RateLimitedClient,
};
use pilot_model::PersonaCatalog;
use pilot_orchestrator::{GroupOrchestrator, GroupSpec, PilotConfig};
use pilot_phases::{PhaseConfig, UiDriver};
use tracing_subscriber::EnvFilter;

/// Offline stand-in for the completion service
///
/// Every call fails, so every phase record comes from fallback
/// synthesis; useful for exercising the pipeline without credentials.
struct OfflineClient;

#[async_trait]
impl CompletionClient for OfflineClient {
    async fn complete(&self, _request: CompletionRequest) -> Result<String, CompletionError> {
        Err(CompletionError::Credential("ANTHROPIC_API_KEY"))
    }
}

/// UI stand-in until a browser-automation driver is wired in
///
/// Steps load cleanly with no page errors; journeys exercise the happy
/// path of the interaction seam.
struct HeadlessUi;

#[async_trait]
impl UiDriver for HeadlessUi {
    async fn navigate(&self, _url: &str) -> Result<(), pilot_phases::InteractionError> {
        Ok(())
    }

    async fn capture_state(&self) -> Result<pilot_phases::UiState, pilot_phases::InteractionError> {
        Ok(pilot_phases::UiState {
            url: "/workshop".to_string(),
            title: "Workshop".to_string(),
            commentary: None,
        })
    }

    async fn detect_errors(
        &self,
    ) -> Result<pilot_phases::UiErrorScan, pilot_phases::InteractionError> {
        Ok(pilot_phases::UiErrorScan::default())
    }
}

fn cli() -> Command {
    Command::new("pilot-harness")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Synthetic-persona pilot simulation for the workshop platform")
        .subcommand_required(true)
        .subcommand(
            Command::new("run")
                .about("Run the full pilot and write the report")
                .arg(
                    Arg::new("personas")
                        .long("personas")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Path to the persona catalog (JSON array)"),
                )
                .arg(
                    Arg::new("out")
                        .long("out")
                        .default_value("reports")
                        .value_parser(value_parser!(PathBuf))
                        .help("Directory for report artifacts"),
                )
                .arg(
                    Arg::new("groups")
                        .long("groups")
                        .value_parser(value_parser!(PathBuf))
                        .help("Optional group spec (JSON array of {name, categories})"),
                )
                .arg(
                    Arg::new("deep-delay")
                        .long("deep-delay")
                        .default_value("4")
                        .value_parser(value_parser!(u64))
                        .help("Seconds between deep-tier completion calls"),
                )
                .arg(
                    Arg::new("fast-delay")
                        .long("fast-delay")
                        .default_value("1")
                        .value_parser(value_parser!(u64))
                        .help("Seconds between fast-tier completion calls"),
                )
                .arg(
                    Arg::new("dry-run")
                        .long("dry-run")
                        .action(ArgAction::SetTrue)
                        .help("Run offline: no completion calls, fallback synthesis only"),
                ),
        )
        .subcommand(
            Command::new("validate")
                .about("Load and validate a persona catalog, then exit")
                .arg(
                    Arg::new("personas")
                        .long("personas")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Path to the persona catalog (JSON array)"),
                ),
        )
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let matches = cli().get_matches();
    match matches.subcommand() {
        Some(("run", args)) => run(args).await,
        Some(("validate", args)) => validate(args),
        _ => unreachable!("subcommand required"),
    }
}

fn validate(args: &clap::ArgMatches) -> anyhow::Result<()> {
    let path = args.get_one::<PathBuf>("personas").unwrap();
    let catalog = PersonaCatalog::load(path)
        .with_context(|| format!("loading persona catalog from {}", path.display()))?;
    println!("catalog OK: {} persona(s)", catalog.len());
    Ok(())
}

async fn run(args: &clap::ArgMatches) -> anyhow::Result<()> {
    let personas = args.get_one::<PathBuf>("personas").unwrap();
    let out = args.get_one::<PathBuf>("out").unwrap();
    let deep_delay = *args.get_one::<u64>("deep-delay").unwrap();
    let fast_delay = *args.get_one::<u64>("fast-delay").unwrap();
    let dry_run = args.get_flag("dry-run");

    let catalog = PersonaCatalog::load(personas)
        .with_context(|| format!("loading persona catalog from {}", personas.display()))?;

    let mut config = PilotConfig::new(PhaseConfig::default());
    if let Some(path) = args.get_one::<PathBuf>("groups") {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading group spec from {}", path.display()))?;
        let groups: Vec<GroupSpec> = serde_json::from_str(&raw).context("parsing group spec")?;
        config = config.with_groups(groups);
    }

    let client: Arc<dyn CompletionClient> = if dry_run {
        tracing::info!("dry run: completion calls disabled, fallback synthesis only");
        Arc::new(OfflineClient)
    } else {
        let live = LiveCompletionClient::from_env()
            .context("completion credential missing; use --dry-run to run offline")?;
        let limiter = FixedDelayLimiter::new(
            Duration::from_secs(deep_delay),
            Duration::from_secs(fast_delay),
        );
        Arc::new(RateLimitedClient::new(live, limiter))
    };

    let orchestrator = GroupOrchestrator::new(config, client, Arc::new(HeadlessUi));
    let outcome = orchestrator.run(&catalog).await?;

    // A consistency failure here halts the run; no report is written
    // over data the analyzer cannot trust
    let analysis = FacilitatorAnalyzer::analyze(&outcome)?;
    let paths = ReportGenerator::write(&analysis, &outcome, out)?;

    println!("report: {}", paths.markdown.display());
    println!("analysis dump: {}", paths.json.display());
    println!(
        "personas: {}  dropouts: {}  recommendation rate: {:.0}%",
        analysis.overall.personas,
        analysis.overall.dropouts,
        analysis.recommendation_rate * 100.0
    );
    Ok(())
}
