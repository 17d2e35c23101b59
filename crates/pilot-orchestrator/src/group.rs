//! Concurrent group execution
//!
//! Each group runs on its own task; personas within a group run
//! strictly sequentially so the centralized rate limiter sees one
//! in-flight persona per group. Results are appended per group only
//! after that group fully completes; the aggregate is returned once
//! every group has finished.

use std::sync::Arc;

use futures::future::join_all;
use pilot_completion::CompletionClient;
use pilot_model::PersonaCatalog;
use pilot_phases::UiDriver;
use serde::{Deserialize, Serialize};

use crate::config::PilotConfig;
use crate::error::OrchestratorError;
use crate::journey::{JourneyAssembler, PersonaRecord};

/// Records of one fully completed group
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupOutcome {
    pub name: String,
    /// Persona records in the group's catalog order
    pub records: Vec<PersonaRecord>,
}

/// Aggregate result of one run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PilotOutcome {
    pub run_id: String,
    /// Groups in configured order
    pub groups: Vec<GroupOutcome>,
}

impl PilotOutcome {
    /// All persona records across groups, group order then persona order
    pub fn records(&self) -> impl Iterator<Item = &PersonaRecord> {
        self.groups.iter().flat_map(|g| g.records.iter())
    }

    /// Total personas simulated
    #[must_use]
    pub fn persona_count(&self) -> usize {
        self.groups.iter().map(|g| g.records.len()).sum()
    }
}

/// Runs the whole population, group-parallel and persona-sequential
pub struct GroupOrchestrator {
    config: PilotConfig,
    client: Arc<dyn CompletionClient>,
    ui: Arc<dyn UiDriver>,
}

impl GroupOrchestrator {
    /// Orchestrator over injected configuration and capabilities
    #[must_use]
    pub fn new(config: PilotConfig, client: Arc<dyn CompletionClient>, ui: Arc<dyn UiDriver>) -> Self {
        Self { config, client, ui }
    }

    /// Run every persona in the catalog and return the union of results
    ///
    /// One persona's failures never block others; the only error here
    /// is a group task failing to complete at all.
    pub async fn run(&self, catalog: &PersonaCatalog) -> Result<PilotOutcome, OrchestratorError> {
        let partitions = self.config.partition(catalog);
        tracing::info!(
            run_id = %self.config.run_id,
            groups = partitions.len(),
            personas = catalog.len(),
            "starting pilot run"
        );

        let mut handles = Vec::with_capacity(partitions.len());
        for (name, personas) in partitions {
            let personas: Vec<_> = personas.into_iter().cloned().collect();
            let assembler =
                JourneyAssembler::new(Arc::clone(&self.client), self.config.phase.clone());
            let ui = Arc::clone(&self.ui);
            let group_name = name.clone();

            let handle = tokio::spawn(async move {
                tracing::info!(group = %group_name, personas = personas.len(), "group started");
                let mut records = Vec::with_capacity(personas.len());
                for persona in &personas {
                    records.push(assembler.run(persona, ui.as_ref()).await);
                }
                tracing::info!(group = %group_name, "group finished");
                GroupOutcome {
                    name: group_name,
                    records,
                }
            });
            handles.push((name, handle));
        }

        let mut groups = Vec::with_capacity(handles.len());
        let names: Vec<String> = handles.iter().map(|(n, _)| n.clone()).collect();
        let joined = join_all(handles.into_iter().map(|(_, h)| h)).await;
        for (name, joined) in names.into_iter().zip(joined) {
            let outcome = joined.map_err(|_| OrchestratorError::GroupTaskFailed {
                group: name,
            })?;
            groups.push(outcome);
        }

        Ok(PilotOutcome {
            run_id: self.config.run_id.clone(),
            groups,
        })
    }
}
