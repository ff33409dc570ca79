//! Trials: one exact version assignment, installed and tested once.

use std::fmt;
use std::time::Duration;

use serde::Serialize;

use crate::requirements::{Requirement, Version};

/// Which gate a trial belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Every variable dependency at its newest candidate.
    Ceiling,
    /// One dependency moved below its ceiling, the rest held there.
    Floor,
    /// Every variable dependency at its discovered floor.
    Confirmation,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Ceiling => "ceiling",
            Self::Floor => "floor",
            Self::Confirmation => "confirmation",
        };
        f.write_str(name)
    }
}

/// A variable dependency fixed to one version.
#[derive(Debug, Clone)]
pub struct Pin {
    requirement: Requirement,
    version: Version,
}

impl Pin {
    pub fn new(requirement: Requirement, version: Version) -> Self {
        Self {
            requirement,
            version,
        }
    }

    /// Canonical name of the pinned dependency.
    pub fn name(&self) -> &str {
        self.requirement.canonical_name()
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    /// The same requirement pinned to a different version.
    pub fn repinned(&self, version: &Version) -> Self {
        Self::new(self.requirement.clone(), version.clone())
    }

    /// `name[extras]==version; marker`
    pub fn install_line(&self) -> String {
        self.requirement.install_line(Some(&self.version))
    }
}

/// One complete assignment handed to the executor.
///
/// `fixed` and `unpinned` lines are identical across every trial of a run;
/// only `pins` vary.
#[derive(Debug, Clone)]
pub struct Trial {
    pub phase: Phase,
    /// Canonical name of the dependency this trial moves, in the floor phase.
    pub subject: Option<String>,
    pub pins: Vec<Pin>,
    pub unpinned: Vec<String>,
    pub fixed: Vec<String>,
}

impl Trial {
    /// Version assigned to `name`, if it is pinned.
    pub fn version_of(&self, name: &str) -> Option<&Version> {
        self.pins
            .iter()
            .find(|p| p.name() == name)
            .map(|p| p.version())
    }

    /// Copy of this trial with `name` repinned to `version`.
    pub fn with_version(&self, phase: Phase, name: &str, version: &Version) -> Self {
        let pins = self
            .pins
            .iter()
            .map(|p| {
                if p.name() == name {
                    p.repinned(version)
                } else {
                    p.clone()
                }
            })
            .collect();
        Self {
            phase,
            subject: Some(name.to_string()),
            pins,
            unpinned: self.unpinned.clone(),
            fixed: self.fixed.clone(),
        }
    }

    /// Requirement lines for a single installer invocation: fixed first,
    /// then unpinned, then pins.
    pub fn install_args(&self) -> Vec<String> {
        self.fixed
            .iter()
            .chain(self.unpinned.iter())
            .cloned()
            .chain(self.pins.iter().map(Pin::install_line))
            .collect()
    }

    /// Short description for progress output.
    pub fn label(&self) -> String {
        match (&self.phase, &self.subject) {
            (Phase::Floor, Some(name)) => match self.version_of(name) {
                Some(v) => format!("{}=={}", name, v),
                None => name.clone(),
            },
            (Phase::Ceiling, _) => "max".to_string(),
            _ => "min".to_string(),
        }
    }
}

/// Pass/fail signal from one trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Pass,
    Fail,
}

impl Verdict {
    pub fn passed(self) -> bool {
        self == Verdict::Pass
    }
}

/// Outcome of executing a trial. Never retried.
#[derive(Debug, Clone, Serialize)]
pub struct TrialResult {
    pub verdict: Verdict,
    /// Captured install and test output, for diagnostics only.
    pub output: String,
    #[serde(skip)]
    pub duration: Duration,
}

impl TrialResult {
    pub fn pass(output: impl Into<String>, duration: Duration) -> Self {
        Self {
            verdict: Verdict::Pass,
            output: output.into(),
            duration,
        }
    }

    pub fn fail(output: impl Into<String>, duration: Duration) -> Self {
        Self {
            verdict: Verdict::Fail,
            output: output.into(),
            duration,
        }
    }

    pub fn passed(&self) -> bool {
        self.verdict.passed()
    }
}
