//! Persona records
//!
//! A persona is one synthetic workshop participant: a team leader with a
//! fixed organizational and behavioral profile. Personas are loaded once
//! from the catalog and never mutated during a run.

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

/// Persona identifier as given in the catalog (e.g. "P001")
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PersonaId(pub String);

impl PersonaId {
    /// Create new persona id
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw id
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PersonaId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Department category (closed set)
///
/// Used as the stable grouping key for concurrent execution and as the
/// lookup key for category-specific prompt examples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Marketing,
    Sales,
    Operations,
    #[serde(rename = "R&D")]
    ResearchAndDevelopment,
    #[serde(rename = "HR")]
    HumanResources,
    Finance,
    #[serde(rename = "IT")]
    InformationTechnology,
    Strategy,
}

impl Category {
    /// All categories in canonical order
    pub const ALL: [Category; 8] = [
        Category::Marketing,
        Category::Sales,
        Category::Operations,
        Category::ResearchAndDevelopment,
        Category::HumanResources,
        Category::Finance,
        Category::InformationTechnology,
        Category::Strategy,
    ];
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Category::Marketing => "Marketing",
            Category::Sales => "Sales",
            Category::Operations => "Operations",
            Category::ResearchAndDevelopment => "R&D",
            Category::HumanResources => "HR",
            Category::Finance => "Finance",
            Category::InformationTechnology => "IT",
            Category::Strategy => "Strategy",
        };
        write!(f, "{s}")
    }
}

/// Team-wide digital maturity tier (ordered: Beginner is least mature)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DigitalMaturity {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

impl std::fmt::Display for DigitalMaturity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DigitalMaturity::Beginner => "Beginner",
            DigitalMaturity::Intermediate => "Intermediate",
            DigitalMaturity::Advanced => "Advanced",
            DigitalMaturity::Expert => "Expert",
        };
        write!(f, "{s}")
    }
}

/// Personal resistance to change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeResistance {
    Low,
    Medium,
    High,
}

/// Personal learning speed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LearningSpeed {
    Slow,
    Medium,
    Fast,
}

/// How structured the team's day-to-day work is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WorkStructureLevel {
    Unstructured,
    SemiStructured,
    HighlyStructured,
}

impl std::fmt::Display for WorkStructureLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            WorkStructureLevel::Unstructured => "unstructured",
            WorkStructureLevel::SemiStructured => "semi-structured",
            WorkStructureLevel::HighlyStructured => "highly-structured",
        };
        write!(f, "{s}")
    }
}

/// Declared attitude going into the workshop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InitialAttitude {
    Eager,
    Neutral,
    Worried,
    Skeptical,
}

/// Team-leader profile
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderProfile {
    /// Years in the leader role (new leaders: roughly 0.5 - 1.5)
    pub years_in_role: f32,
    /// Role before promotion
    pub previous_role: String,
    /// Self-described leadership style
    pub leadership_style: String,
    /// Struggles not visible to the team
    #[serde(default)]
    pub hidden_struggles: Vec<String>,
}

/// Team composition and maturity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    /// Headcount excluding the leader
    pub size: u32,
    /// Senior members
    pub senior_count: u32,
    /// Junior members
    pub junior_count: u32,
    /// Free-text composition description
    pub composition: String,
    /// Team-wide digital maturity tier
    pub digital_maturity: DigitalMaturity,
    /// Free-text per-member maturity distribution
    pub maturity_distribution: String,
    /// Factors working against adoption of new tooling
    #[serde(default)]
    pub resistance_factors: Vec<String>,
}

/// Work-structure classification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkStructure {
    /// Structuredness level
    pub level: WorkStructureLevel,
    /// Free-text description of the level
    pub description: String,
}

/// The team's actual work
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Work {
    /// Main recurring tasks (3-5)
    pub main_tasks: Vec<String>,
    /// Tools currently in use
    pub tools_used: Vec<String>,
    /// Concrete pain points, most pressing first
    pub pain_points: Vec<String>,
    /// Areas where automation is wanted
    pub automation_needs: Vec<String>,
    /// Structuredness of the work
    pub work_structure: WorkStructure,
}

/// Expected workshop behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpectedBehavior {
    /// Declared initial attitude
    pub initial_attitude: InitialAttitude,
    /// Concerns about participating
    pub concerns: Vec<String>,
    /// Dropout risk, percent in [0, 100]
    pub dropout_risk: u8,
}

/// Leader personality traits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Personality {
    /// Patience, 1-10
    pub patience: u8,
    /// Tech affinity, 1-10
    pub tech_savvy: u8,
    /// Resistance to change
    pub change_resistance: ChangeResistance,
    /// Learning speed
    pub learning_speed: LearningSpeed,
}

/// One synthetic workshop participant
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Persona {
    /// Catalog identifier
    pub id: PersonaId,
    /// Display name
    pub name: String,
    /// Company
    pub company: String,
    /// Department name
    pub department: String,
    /// Department category (grouping key)
    pub category: Category,
    /// Leader profile
    pub leader_profile: LeaderProfile,
    /// Team composition
    pub team: Team,
    /// Day-to-day work
    pub work: Work,
    /// Expected workshop behavior
    pub expected_behavior: ExpectedBehavior,
    /// Personality traits
    pub personality: Personality,
}

impl Persona {
    /// Validate catalog invariants for this persona
    ///
    /// # Errors
    /// - dropout risk outside [0, 100]
    /// - senior + junior counts not summing to team size
    /// - patience or tech affinity outside [1, 10]
    /// - empty main-task, pain point or automation-need lists (fallback
    ///   synthesis draws on them, so they must be present)
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.expected_behavior.dropout_risk > 100 {
            return Err(CatalogError::InvalidPersona {
                id: self.id.clone(),
                reason: format!(
                    "dropout risk {} outside [0, 100]",
                    self.expected_behavior.dropout_risk
                ),
            });
        }
        if self.team.senior_count.checked_add(self.team.junior_count) != Some(self.team.size) {
            return Err(CatalogError::InvalidPersona {
                id: self.id.clone(),
                reason: format!(
                    "seniority counts {} + {} do not sum to team size {}",
                    self.team.senior_count, self.team.junior_count, self.team.size
                ),
            });
        }
        for (trait_name, value) in [
            ("patience", self.personality.patience),
            ("tech affinity", self.personality.tech_savvy),
        ] {
            if !(1..=10).contains(&value) {
                return Err(CatalogError::InvalidPersona {
                    id: self.id.clone(),
                    reason: format!("{trait_name} {value} outside [1, 10]"),
                });
            }
        }
        if self.work.main_tasks.is_empty() {
            return Err(CatalogError::InvalidPersona {
                id: self.id.clone(),
                reason: "no main tasks listed".to_string(),
            });
        }
        if self.work.pain_points.is_empty() {
            return Err(CatalogError::InvalidPersona {
                id: self.id.clone(),
                reason: "no pain points listed".to_string(),
            });
        }
        if self.work.automation_needs.is_empty() {
            return Err(CatalogError::InvalidPersona {
                id: self.id.clone(),
                reason: "no automation needs listed".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::catalog::test_fixtures::sample_persona;

    #[test]
    fn valid_persona_passes() {
        let persona = sample_persona("P001", Category::Marketing);
        assert!(persona.validate().is_ok());
    }

    #[test]
    fn dropout_risk_over_100_rejected() {
        let mut persona = sample_persona("P001", Category::Marketing);
        persona.expected_behavior.dropout_risk = 101;
        let err = persona.validate().unwrap_err();
        assert!(err.to_string().contains("dropout risk"));
    }

    #[test]
    fn seniority_counts_must_sum_to_size() {
        let mut persona = sample_persona("P001", Category::Sales);
        persona.team.senior_count = 1;
        persona.team.junior_count = 1;
        persona.team.size = 9;
        let err = persona.validate().unwrap_err();
        assert!(err.to_string().contains("seniority counts"));
    }

    #[test]
    fn seniority_count_overflow_is_reported_not_panicked() {
        let mut persona = sample_persona("P001", Category::Sales);
        persona.team.senior_count = u32::MAX;
        persona.team.junior_count = 2;
        let err = persona.validate().unwrap_err();
        assert!(err.to_string().contains("seniority counts"));
    }

    #[test]
    fn empty_main_tasks_rejected() {
        let mut persona = sample_persona("P001", Category::Finance);
        persona.work.main_tasks.clear();
        let err = persona.validate().unwrap_err();
        assert!(err.to_string().contains("main tasks"));
    }

    #[test]
    fn empty_pain_points_rejected() {
        let mut persona = sample_persona("P001", Category::Finance);
        persona.work.pain_points.clear();
        assert!(persona.validate().is_err());
    }

    #[test]
    fn category_serde_uses_short_names() {
        let json = serde_json::to_string(&Category::ResearchAndDevelopment).unwrap();
        assert_eq!(json, "\"R&D\"");
        let back: Category = serde_json::from_str("\"HR\"").unwrap();
        assert_eq!(back, Category::HumanResources);
    }
}
