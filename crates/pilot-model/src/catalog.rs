//! Persona catalog
//!
//! The catalog is an injected repository: loaded once from a JSON file
//! (or built in memory for tests), validated, then treated as immutable
//! for the rest of the run. Iteration order is catalog order, which the
//! orchestrator preserves within groups.

use std::path::Path;

use indexmap::IndexMap;

use crate::error::CatalogError;
use crate::persona::{Category, Persona, PersonaId};

/// Immutable persona population for one run
#[derive(Debug, Clone)]
pub struct PersonaCatalog {
    personas: Vec<Persona>,
}

impl PersonaCatalog {
    /// Build a catalog from personas, validating each and rejecting
    /// duplicates and empty populations
    pub fn from_personas(personas: Vec<Persona>) -> Result<Self, CatalogError> {
        if personas.is_empty() {
            return Err(CatalogError::Empty);
        }
        let mut seen: Vec<&PersonaId> = Vec::with_capacity(personas.len());
        for persona in &personas {
            persona.validate()?;
            if seen.contains(&&persona.id) {
                return Err(CatalogError::DuplicateId(persona.id.clone()));
            }
            seen.push(&persona.id);
        }
        Ok(Self { personas })
    }

    /// Load a catalog from a JSON file (an array of personas)
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path)?;
        let personas: Vec<Persona> = serde_json::from_str(&raw)?;
        tracing::info!(count = personas.len(), "loaded persona catalog");
        Self::from_personas(personas)
    }

    /// Number of personas
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.personas.len()
    }

    /// Whether the catalog is empty (never true for a constructed catalog)
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.personas.is_empty()
    }

    /// Personas in catalog order
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Persona> {
        self.personas.iter()
    }

    /// Look up one persona by id
    #[must_use]
    pub fn get(&self, id: &PersonaId) -> Option<&Persona> {
        self.personas.iter().find(|p| &p.id == id)
    }

    /// Partition personas by category, preserving catalog order within
    /// each bucket and first-seen order across buckets
    #[must_use]
    pub fn by_category(&self) -> IndexMap<Category, Vec<&Persona>> {
        let mut map: IndexMap<Category, Vec<&Persona>> = IndexMap::new();
        for persona in &self.personas {
            map.entry(persona.category).or_default().push(persona);
        }
        map
    }
}

#[cfg(any(test, feature = "fixtures"))]
pub mod test_fixtures {
    //! Minimal persona builders for in-crate tests
    use crate::persona::*;

    /// A small but fully populated persona
    pub fn sample_persona(id: &str, category: Category) -> Persona {
        Persona {
            id: PersonaId::new(id),
            name: format!("Lead {id}"),
            company: "Acme Holdings".to_string(),
            department: format!("{category} Team"),
            category,
            leader_profile: LeaderProfile {
                years_in_role: 1.0,
                previous_role: "Senior specialist".to_string(),
                leadership_style: "Data-first, still finding footing with delegation".to_string(),
                hidden_struggles: vec!["Imposter feelings around senior reports".to_string()],
            },
            team: Team {
                size: 8,
                senior_count: 3,
                junior_count: 5,
                composition: "3 seniors, 5 juniors".to_string(),
                digital_maturity: DigitalMaturity::Intermediate,
                maturity_distribution: "2 advanced, 4 intermediate, 2 beginner".to_string(),
                resistance_factors: vec!["Tool fatigue from last year's rollout".to_string()],
            },
            work: Work {
                main_tasks: vec![
                    "Weekly performance reporting".to_string(),
                    "Cross-team campaign planning".to_string(),
                ],
                tools_used: vec![
                    "Spreadsheets".to_string(),
                    "Slack".to_string(),
                    "Jira".to_string(),
                ],
                pain_points: vec![
                    "Manual weekly data consolidation eats four hours".to_string(),
                    "No shared process for handoffs".to_string(),
                ],
                automation_needs: vec![
                    "Automated report aggregation".to_string(),
                    "Templated task intake".to_string(),
                ],
                work_structure: WorkStructure {
                    level: WorkStructureLevel::SemiStructured,
                    description: "Processes exist but are not written down".to_string(),
                },
            },
            expected_behavior: ExpectedBehavior {
                initial_attitude: InitialAttitude::Eager,
                concerns: vec!["Three hours may not fit the team's calendar".to_string()],
                dropout_risk: 15,
            },
            personality: Personality {
                patience: 6,
                tech_savvy: 7,
                change_resistance: ChangeResistance::Medium,
                learning_speed: LearningSpeed::Fast,
            },
        }
    }
}
