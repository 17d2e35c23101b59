//! The fixed eleven-step workshop definition
//!
//! Step numbers are 1-based. Expected minutes feed the time-overrun
//! baseline in the facilitator analysis.

use once_cell::sync::Lazy;
use serde::Serialize;

/// Total number of workshop steps
pub const TOTAL_STEPS: u8 = 11;

/// Steps at or below this index are foundational: an interaction failure
/// here drops the persona out of the workshop entirely.
pub const FOUNDATIONAL_STEPS: u8 = 5;

/// One ordered workshop stage
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkshopStep {
    /// 1-based step number
    pub number: u8,
    /// Short name
    pub name: &'static str,
    /// Relative URL on the workshop host
    pub url: &'static str,
    /// Expected duration in minutes
    pub expected_minutes: f64,
    /// What the participant does here
    pub description: &'static str,
}

static WORKSHOP_STEPS: Lazy<Vec<WorkshopStep>> = Lazy::new(|| {
    vec![
        WorkshopStep {
            number: 1,
            name: "Workshop kickoff",
            url: "/workshop",
            expected_minutes: 5.0,
            description: "Platform introduction and goal setting",
        },
        WorkshopStep {
            number: 2,
            name: "Mission statement",
            url: "/workshop?step=2",
            expected_minutes: 10.0,
            description: "Define team goals and customer value",
        },
        WorkshopStep {
            number: 3,
            name: "Team situation review",
            url: "/workshop?step=3",
            expected_minutes: 7.0,
            description: "Enter team characteristics and current state",
        },
        WorkshopStep {
            number: 4,
            name: "Work domain definition",
            url: "/workshop?step=4",
            expected_minutes: 8.0,
            description: "Enter the main work domains",
        },
        WorkshopStep {
            number: 5,
            name: "Work detail entry",
            url: "/workshop?step=5",
            expected_minutes: 15.0,
            description: "Write out concrete work content",
        },
        WorkshopStep {
            number: 6,
            name: "Automated work extraction",
            url: "/workshop?step=6",
            expected_minutes: 3.0,
            description: "Automated analysis and extraction",
        },
        WorkshopStep {
            number: 7,
            name: "Extraction review",
            url: "/workshop?step=7",
            expected_minutes: 10.0,
            description: "Review and correct extracted results",
        },
        WorkshopStep {
            number: 8,
            name: "Automation education",
            url: "/workshop?step=8",
            expected_minutes: 15.0,
            description: "Automation concepts and case studies",
        },
        WorkshopStep {
            number: 9,
            name: "Adoption consulting",
            url: "/workshop?step=9",
            expected_minutes: 10.0,
            description: "Adoption strategy and ROI analysis",
        },
        WorkshopStep {
            number: 10,
            name: "Workflow design",
            url: "/workshop?step=10",
            expected_minutes: 12.0,
            description: "Design the automation workflow",
        },
        WorkshopStep {
            number: 11,
            name: "Final report",
            url: "/workshop?step=11",
            expected_minutes: 5.0,
            description: "Review the resulting analysis report",
        },
    ]
});

/// All workshop steps in order
#[inline]
#[must_use]
pub fn workshop_steps() -> &'static [WorkshopStep] {
    &WORKSHOP_STEPS
}

/// Look up one step by its 1-based number
#[inline]
#[must_use]
pub fn step(number: u8) -> Option<&'static WorkshopStep> {
    WORKSHOP_STEPS.get(usize::from(number.checked_sub(1)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eleven_steps_numbered_in_order() {
        let steps = workshop_steps();
        assert_eq!(steps.len(), usize::from(TOTAL_STEPS));
        for (idx, s) in steps.iter().enumerate() {
            assert_eq!(usize::from(s.number), idx + 1);
        }
    }

    #[test]
    fn step_lookup() {
        assert_eq!(step(1).unwrap().name, "Workshop kickoff");
        assert_eq!(step(11).unwrap().name, "Final report");
        assert!(step(0).is_none());
        assert!(step(12).is_none());
    }

    #[test]
    fn foundational_boundary_within_range() {
        assert!(FOUNDATIONAL_STEPS < TOTAL_STEPS);
    }
}
