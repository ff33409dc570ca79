//! Search results.

use serde::Serialize;

use super::strategy::Observation;
use super::trial::TrialResult;
use crate::requirements::{SpecifierSet, Version};

/// Exit code when every phase passed and every floor is known.
pub const EXIT_SUCCESS: i32 = 0;
/// Exit code when the newest versions already fail.
pub const EXIT_CEILING_FAILURE: i32 = 3;
/// Exit code when the floors do not pass together.
pub const EXIT_CONFIRMATION_FAILURE: i32 = 4;
/// Exit code when at least one floor could not be determined.
pub const EXIT_UNRESOLVED: i32 = 5;

/// What was determined for one variable dependency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FloorOutcome {
    /// Floor found by probing older versions.
    Verified { version: Version },
    /// Only one candidate exists; it is both ceiling and floor.
    Single { version: Version },
    /// The fast probe of the oldest candidate failed.
    MinimumUnknown,
    /// The index does not know this name.
    NotFound,
    /// No release satisfies the declared constraint.
    NoCandidates,
}

impl FloorOutcome {
    pub fn floor(&self) -> Option<&Version> {
        match self {
            Self::Verified { version } | Self::Single { version } => Some(version),
            _ => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.floor().is_some()
    }
}

/// Search record for one variable dependency.
#[derive(Debug, Clone, Serialize)]
pub struct DependencyFloor {
    /// Canonical name.
    pub name: String,
    /// Requirement as declared.
    pub declared: String,
    #[serde(skip)]
    pub specifier: SpecifierSet,
    /// Number of candidate versions searched.
    pub candidates: usize,
    /// Newest candidate, validated by the ceiling trial.
    pub ceiling: Option<Version>,
    pub outcome: FloorOutcome,
    /// Floor-phase probes, newest first.
    pub observations: Vec<Observation>,
}

impl DependencyFloor {
    pub fn floor(&self) -> Option<&Version> {
        self.outcome.floor()
    }

    pub fn trials(&self) -> usize {
        self.observations.len()
    }

    /// `name>=floor` when the floor is newer than what is declared.
    ///
    /// Exact pins are left alone; a requirement without a lower bound always
    /// gets a suggestion.
    pub fn suggestion(&self) -> Option<String> {
        if self.specifier.is_pinned() {
            return None;
        }
        let floor = self.floor()?;
        match self.specifier.lower_bound() {
            Some(lower) if floor <= lower => None,
            _ => Some(format!("{}>={}", self.name, floor)),
        }
    }
}

/// Result of the joint floor trial.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Confirmation {
    Confirmed,
    Failed {
        /// Dependencies moved below their ceilings in the joint trial.
        flagged: Vec<String>,
        result: TrialResult,
    },
}

impl Confirmation {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, Self::Confirmed)
    }
}

/// Trials issued per phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TrialCounts {
    pub ceiling: usize,
    pub floor: usize,
    pub confirmation: usize,
}

impl TrialCounts {
    pub fn total(&self) -> usize {
        self.ceiling + self.floor + self.confirmation
    }
}

/// Final mapping of variable dependencies to their floors.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub dependencies: Vec<DependencyFloor>,
    pub confirmation: Confirmation,
    pub trials: TrialCounts,
}

impl Report {
    /// Look up a dependency by canonical name.
    pub fn get(&self, name: &str) -> Option<&DependencyFloor> {
        self.dependencies.iter().find(|d| d.name == name)
    }

    /// Dependencies whose floor is unknown.
    pub fn unresolved(&self) -> impl Iterator<Item = &DependencyFloor> {
        self.dependencies.iter().filter(|d| !d.outcome.is_resolved())
    }

    /// Requirement lines that would tighten declared floors.
    pub fn suggestions(&self) -> Vec<String> {
        self.dependencies
            .iter()
            .filter_map(DependencyFloor::suggestion)
            .collect()
    }
}

/// Outcome of a whole run.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RunOutcome {
    /// The newest versions fail; nothing else was tried.
    CeilingFailure {
        /// Installer lines of the failing trial.
        requirements: Vec<String>,
        result: TrialResult,
    },
    Completed { report: Report },
}

impl RunOutcome {
    pub fn report(&self) -> Option<&Report> {
        match self {
            Self::Completed { report } => Some(report),
            Self::CeilingFailure { .. } => None,
        }
    }

    /// Process exit code. Ceiling failure outranks confirmation failure,
    /// which outranks unresolved floors.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::CeilingFailure { .. } => EXIT_CEILING_FAILURE,
            Self::Completed { report } if !report.confirmation.is_confirmed() => {
                EXIT_CONFIRMATION_FAILURE
            }
            Self::Completed { report } if report.unresolved().next().is_some() => EXIT_UNRESOLVED,
            Self::Completed { .. } => EXIT_SUCCESS,
        }
    }
}
