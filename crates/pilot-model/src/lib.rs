//! Pilot Model - data model for the workshop pilot simulation
//!
//! Defines the immutable inputs and the per-run records:
//! - Personas and the catalog they are loaded from
//! - The fixed eleven-step workshop definition
//! - Per-phase result records (pre-interview, check-in, post-interview)
//! - Step executions, facilitator observations, and complete journeys
//!
//! Everything here is plain data. Phase runners create the records,
//! the analyzer consumes them; neither mutates inputs after creation.

#![warn(unreachable_pub)]

pub mod catalog;
pub mod error;
pub mod persona;
pub mod results;
pub mod steps;

pub use catalog::PersonaCatalog;
pub use error::{CatalogError, JourneyInconsistency};
pub use persona::{
    Category, ChangeResistance, DigitalMaturity, ExpectedBehavior, InitialAttitude, LeaderProfile,
    LearningSpeed, Persona, PersonaId, Personality, Team, Work, WorkStructure, WorkStructureLevel,
};
pub use results::{
    CheckInMood, CheckInResult, HardestMoment, Observation, ObservationKind, OutOfRange,
    PersonaReaction, PostInterviewResult, PreInterviewMood, PreInterviewResult, Recommendation,
    Satisfaction, Severity, StepExecution, WorkshopJourney,
};
pub use steps::{WorkshopStep, step, workshop_steps, FOUNDATIONAL_STEPS, TOTAL_STEPS};

#[cfg(any(test, feature = "fixtures"))]
pub use catalog::test_fixtures;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
