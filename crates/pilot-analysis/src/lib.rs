//! Pilot Analysis - cross-persona aggregation and reporting
//!
//! The facilitator analyzer is a pure function over the recorded
//! journeys, check-ins, and post-interviews: ranked stuck points, time
//! overruns, error hotspots, dropout risks, category and maturity
//! patterns, a per-step breakdown, and the recommendation rate. It is
//! idempotent and never mutates its inputs.
//!
//! Structural inconsistencies in the input (a journey claiming more
//! completed steps than it records, broken step/check-in pairing) are
//! fatal: the run refuses to produce a report over data it cannot
//! trust, and says exactly which invariant failed for which persona.

#![warn(unreachable_pub)]

pub mod analyzer;
pub mod error;
pub mod report;

pub use analyzer::{
    CategoryPattern, DropoutEntry, ErrorHotspot, FacilitatorAnalysis, FacilitatorAnalyzer,
    FrequencyEntry, MaturityPattern, MoodCount, OverallStats, StepSummary, StepVerdict,
    StuckPoint, TimeOverrun,
};
pub use error::{AnalysisError, ReportError};
pub use report::{ReportGenerator, ReportPaths};
