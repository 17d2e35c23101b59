//! Pilot Orchestrator - journey assembly and group-level concurrency
//!
//! The orchestrator partitions the persona population into disjoint
//! groups by department category, runs the groups concurrently (one
//! task each), and runs personas within a group strictly sequentially.
//! The shared aggregation is appended per group only after that group
//! fully completes, so there is no cross-group write contention.
//!
//! Persona failures never reach this layer: the phase runners recover
//! everything with fallback synthesis, so a group task only fails by
//! panicking, which is surfaced as an orchestrator error.

#![warn(unreachable_pub)]

pub mod config;
pub mod error;
pub mod group;
pub mod journey;

pub use config::{GroupSpec, PilotConfig, UNASSIGNED_GROUP};
pub use error::OrchestratorError;
pub use group::{GroupOrchestrator, GroupOutcome, PilotOutcome};
pub use journey::{JourneyAssembler, PersonaRecord};
