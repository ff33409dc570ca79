//! Floor search.
//!
//! # Modules
//!
//! - [`trial`] - Version assignments and their verdicts
//! - [`strategy`] - How one dependency's candidates are walked
//! - [`engine`] - The ceiling, floor and confirmation phases
//! - [`report`] - Per-dependency results and exit codes

pub mod engine;
pub mod report;
pub mod strategy;
pub mod trial;

pub use engine::{Candidates, Dependency, SearchEngine, SearchProgress};
pub use report::{
    Confirmation, DependencyFloor, FloorOutcome, Report, RunOutcome, TrialCounts,
    EXIT_CEILING_FAILURE, EXIT_CONFIRMATION_FAILURE, EXIT_SUCCESS, EXIT_UNRESOLVED,
};
pub use strategy::{FloorSearch, FloorStrategy, LinearDescent, Observation, OldestOnly, SearchState};
pub use trial::{Phase, Pin, Trial, TrialResult, Verdict};
