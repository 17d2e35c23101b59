//! Injected run configuration
//!
//! Grouping used to live in static tables; it is now an explicit
//! configuration object handed to the orchestrator, and the catalog is
//! an injected repository rather than an imported constant.

use pilot_model::{Category, Persona, PersonaCatalog};
use pilot_phases::PhaseConfig;
use serde::{Deserialize, Serialize};

/// One named persona group
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupSpec {
    /// Group label used in logs and the report
    pub name: String,
    /// Categories routed into this group
    pub categories: Vec<Category>,
}

/// Label of the automatic trailing group for unmatched personas
pub const UNASSIGNED_GROUP: &str = "unassigned";

/// Full configuration for one pilot run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PilotConfig {
    /// Run identifier, stamped on the report
    pub run_id: String,
    /// Model configuration shared by all phases
    pub phase: PhaseConfig,
    /// Explicit groups; when empty, each category becomes its own group
    pub groups: Vec<GroupSpec>,
}

impl PilotConfig {
    /// Config with a fresh run id and per-category grouping
    #[must_use]
    pub fn new(phase: PhaseConfig) -> Self {
        Self {
            run_id: ulid::Ulid::new().to_string(),
            phase,
            groups: Vec::new(),
        }
    }

    /// Use the given explicit groups
    #[must_use]
    pub fn with_groups(mut self, groups: Vec<GroupSpec>) -> Self {
        self.groups = groups;
        self
    }

    /// Partition the catalog into named, disjoint groups
    ///
    /// Each persona goes to the first group listing its category, in
    /// catalog order within the group. Personas matching no group land
    /// in an automatic trailing group so nobody is silently dropped.
    /// With no explicit groups, each category present in the catalog
    /// becomes its own group in first-seen order.
    #[must_use]
    pub fn partition<'a>(&self, catalog: &'a PersonaCatalog) -> Vec<(String, Vec<&'a Persona>)> {
        if self.groups.is_empty() {
            return catalog
                .by_category()
                .into_iter()
                .map(|(category, personas)| (category.to_string(), personas))
                .collect();
        }

        let mut buckets: Vec<(String, Vec<&Persona>)> = self
            .groups
            .iter()
            .map(|g| (g.name.clone(), Vec::new()))
            .collect();
        let mut unassigned: Vec<&Persona> = Vec::new();

        for persona in catalog.iter() {
            let slot = self
                .groups
                .iter()
                .position(|g| g.categories.contains(&persona.category));
            match slot {
                Some(idx) => buckets[idx].1.push(persona),
                None => unassigned.push(persona),
            }
        }
        if !unassigned.is_empty() {
            buckets.push((UNASSIGNED_GROUP.to_string(), unassigned));
        }
        buckets.retain(|(_, personas)| !personas.is_empty());
        buckets
    }
}

#[cfg(test)]
mod tests {
    use pilot_model::test_fixtures::sample_persona;
    use pretty_assertions::assert_eq;

    use super::*;

    fn catalog() -> PersonaCatalog {
        PersonaCatalog::from_personas(vec![
            sample_persona("P001", Category::Marketing),
            sample_persona("P002", Category::Sales),
            sample_persona("P003", Category::Marketing),
            sample_persona("P004", Category::Strategy),
        ])
        .unwrap()
    }

    #[test]
    fn default_grouping_is_per_category() {
        let config = PilotConfig::new(PhaseConfig::default());
        let catalog = catalog();
        let groups = config.partition(&catalog);
        let names: Vec<_> = groups.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["Marketing", "Sales", "Strategy"]);
        assert_eq!(groups[0].1.len(), 2);
    }

    #[test]
    fn explicit_groups_route_by_first_match() {
        let config = PilotConfig::new(PhaseConfig::default()).with_groups(vec![
            GroupSpec {
                name: "commercial".to_string(),
                categories: vec![Category::Marketing, Category::Sales],
            },
            GroupSpec {
                name: "also-marketing".to_string(),
                categories: vec![Category::Marketing],
            },
        ]);
        let catalog = catalog();
        let groups = config.partition(&catalog);
        // Marketing personas all land in the first matching group
        assert_eq!(groups[0].0, "commercial");
        assert_eq!(groups[0].1.len(), 3);
        // Strategy matched nothing and fell into the trailing group
        assert_eq!(groups[1].0, UNASSIGNED_GROUP);
        assert_eq!(groups[1].1[0].id.as_str(), "P004");
    }

    #[test]
    fn catalog_order_is_preserved_within_groups() {
        let config = PilotConfig::new(PhaseConfig::default());
        let catalog = catalog();
        let groups = config.partition(&catalog);
        let marketing: Vec<_> = groups[0].1.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(marketing, vec!["P001", "P003"]);
    }
}
