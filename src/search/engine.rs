//! Three-phase floor search.
//!
//! 1. Ceiling: every variable dependency at its newest candidate. A failure
//!    aborts the run.
//! 2. Floor: each dependency on its own, others held at the ceiling, walked
//!    down by the configured [`FloorStrategy`].
//! 3. Confirmation: every dependency at its floor, together, once.
//!
//! Trials run strictly one after another.

use tracing::{debug, info, warn};

use super::report::{
    Confirmation, DependencyFloor, FloorOutcome, Report, RunOutcome, TrialCounts,
};
use super::strategy::{FloorStrategy, LinearDescent, OldestOnly};
use super::trial::{Phase, Pin, Trial, TrialResult, Verdict};
use crate::environment::TrialExecutor;
use crate::error::{FloorError, Result};
use crate::index::{VersionOracle, VersionSource};
use crate::requirements::{Requirement, Version};

/// Candidate versions of one variable dependency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Candidates {
    /// Ascending; empty when nothing satisfies the declared constraint.
    Listed(Vec<Version>),
    /// The index does not know the name.
    NotFound,
}

/// A variable dependency ready to be searched.
#[derive(Debug, Clone)]
pub struct Dependency {
    pub requirement: Requirement,
    pub candidates: Candidates,
}

impl Dependency {
    pub fn new(requirement: Requirement, versions: Vec<Version>) -> Self {
        Self {
            requirement,
            candidates: Candidates::Listed(versions),
        }
    }

    /// Query the oracle for `requirement`'s candidates. An unknown name is
    /// recorded rather than raised; other index failures propagate.
    pub fn resolve<S: VersionSource>(
        requirement: Requirement,
        oracle: &VersionOracle<S>,
        extend: bool,
    ) -> Result<Self> {
        let candidates = match oracle.versions(
            requirement.canonical_name(),
            requirement.specifier(),
            extend,
        ) {
            Ok(versions) => Candidates::Listed(versions),
            Err(FloorError::PackageNotFound { name }) => {
                warn!("{} is not on the index", name);
                Candidates::NotFound
            }
            Err(e) => return Err(e),
        };
        Ok(Self {
            requirement,
            candidates,
        })
    }

    pub fn name(&self) -> &str {
        self.requirement.canonical_name()
    }

    /// Candidate list, if the name was found.
    pub fn versions(&self) -> Option<&[Version]> {
        match &self.candidates {
            Candidates::Listed(versions) => Some(versions),
            Candidates::NotFound => None,
        }
    }

    /// Newest candidate.
    pub fn ceiling(&self) -> Option<&Version> {
        self.versions().and_then(|v| v.last())
    }
}

/// Progress events emitted while searching.
#[derive(Debug)]
pub enum SearchProgress<'a> {
    /// A phase is starting.
    PhaseStarting { phase: Phase },
    /// A trial is about to run. `index` is zero-based; `total` is an upper
    /// bound.
    TrialStarting {
        trial: &'a Trial,
        index: usize,
        total: usize,
    },
    /// A trial finished.
    TrialFinished {
        trial: &'a Trial,
        result: &'a TrialResult,
    },
    /// A dependency's floor search is final.
    DependencyFinished { floor: &'a DependencyFloor },
}

/// Drives an executor through the three phases.
pub struct SearchEngine<E> {
    executor: E,
    strategy: Box<dyn FloorStrategy>,
    fixed: Vec<String>,
}

impl<E: TrialExecutor> SearchEngine<E> {
    /// Engine with exact linear descent.
    pub fn new(executor: E) -> Self {
        Self::with_strategy(executor, Box::new(LinearDescent))
    }

    /// Engine probing only the oldest candidate of each dependency.
    pub fn fast(executor: E) -> Self {
        Self::with_strategy(executor, Box::new(OldestOnly))
    }

    pub fn with_strategy(executor: E, strategy: Box<dyn FloorStrategy>) -> Self {
        Self {
            executor,
            strategy,
            fixed: Vec::new(),
        }
    }

    /// Lines installed unchanged in every trial.
    pub fn with_fixed(mut self, fixed: Vec<String>) -> Self {
        self.fixed = fixed;
        self
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub fn into_executor(self) -> E {
        self.executor
    }

    /// Upper bound on trials for a run over `dependencies`.
    pub fn estimate_trials(&self, dependencies: &[Dependency]) -> usize {
        let floor: usize = dependencies
            .iter()
            .filter_map(Dependency::versions)
            .map(|v| self.strategy.max_trials(v.len()))
            .sum();
        floor + 2
    }

    /// Run all three phases.
    pub fn run(&mut self, dependencies: &[Dependency]) -> Result<RunOutcome> {
        self.run_with_progress(dependencies, |_| {})
    }

    /// Run all three phases with a progress callback.
    pub fn run_with_progress(
        &mut self,
        dependencies: &[Dependency],
        mut on_progress: impl FnMut(SearchProgress<'_>),
    ) -> Result<RunOutcome> {
        let total = self.estimate_trials(dependencies);
        let mut issued = 0;
        let mut counts = TrialCounts::default();

        info!("Checking newest versions");
        on_progress(SearchProgress::PhaseStarting {
            phase: Phase::Ceiling,
        });
        let ceiling = self.ceiling_trial(dependencies);
        let result = run_trial(
            &mut self.executor,
            &ceiling,
            &mut issued,
            total,
            &mut on_progress,
        )?;
        counts.ceiling = 1;
        if !result.passed() {
            warn!("Newest versions fail; not searching further");
            return Ok(RunOutcome::CeilingFailure {
                requirements: ceiling.install_args(),
                result,
            });
        }

        info!("Searching floors with {} strategy", self.strategy.name());
        on_progress(SearchProgress::PhaseStarting { phase: Phase::Floor });
        let mut floors = Vec::with_capacity(dependencies.len());
        for dependency in dependencies {
            let floor = self.search_dependency(
                dependency,
                &ceiling,
                &mut issued,
                total,
                &mut on_progress,
            )?;
            counts.floor += floor.trials();
            on_progress(SearchProgress::DependencyFinished { floor: &floor });
            floors.push(floor);
        }

        info!("Checking all floors together");
        on_progress(SearchProgress::PhaseStarting {
            phase: Phase::Confirmation,
        });
        let joint = confirmation_trial(&ceiling, &floors);
        let result = run_trial(
            &mut self.executor,
            &joint,
            &mut issued,
            total,
            &mut on_progress,
        )?;
        counts.confirmation = 1;

        let confirmation = if result.passed() {
            Confirmation::Confirmed
        } else {
            let flagged: Vec<String> = floors
                .iter()
                .filter(|f| f.floor().is_some_and(|v| Some(v) != f.ceiling.as_ref()))
                .map(|f| f.name.clone())
                .collect();
            warn!("Floors fail together; check {}", flagged.join(", "));
            Confirmation::Failed { flagged, result }
        };

        Ok(RunOutcome::Completed {
            report: Report {
                dependencies: floors,
                confirmation,
                trials: counts,
            },
        })
    }

    fn ceiling_trial(&self, dependencies: &[Dependency]) -> Trial {
        let mut pins = Vec::new();
        let mut unpinned = Vec::new();
        for dependency in dependencies {
            match dependency.ceiling() {
                Some(newest) => pins.push(Pin::new(
                    dependency.requirement.clone(),
                    newest.clone(),
                )),
                None => {
                    // The installer may still find what the index listing could not.
                    debug!("Installing {} unpinned", dependency.name());
                    unpinned.push(dependency.requirement.install_line(None));
                }
            }
        }
        Trial {
            phase: Phase::Ceiling,
            subject: None,
            pins,
            unpinned,
            fixed: self.fixed.clone(),
        }
    }

    fn search_dependency<F>(
        &mut self,
        dependency: &Dependency,
        ceiling: &Trial,
        issued: &mut usize,
        total: usize,
        on_progress: &mut F,
    ) -> Result<DependencyFloor>
    where
        F: FnMut(SearchProgress<'_>),
    {
        let name = dependency.name();
        let mut record = DependencyFloor {
            name: name.to_string(),
            declared: dependency.requirement.raw().to_string(),
            specifier: dependency.requirement.specifier().clone(),
            candidates: 0,
            ceiling: dependency.ceiling().cloned(),
            outcome: FloorOutcome::NotFound,
            observations: Vec::new(),
        };

        let versions = match &dependency.candidates {
            Candidates::NotFound => return Ok(record),
            Candidates::Listed(versions) => versions,
        };
        record.candidates = versions.len();

        match versions.len() {
            0 => {
                warn!("No release of {} satisfies {}", name, dependency.requirement);
                record.outcome = FloorOutcome::NoCandidates;
            }
            1 => {
                debug!("{} has a single candidate", name);
                record.outcome = FloorOutcome::Single {
                    version: versions[0].clone(),
                };
            }
            _ => {
                let executor = &mut self.executor;
                let mut probe = |version: &Version| -> Result<Verdict> {
                    let trial = ceiling.with_version(Phase::Floor, name, version);
                    let result = run_trial(executor, &trial, issued, total, on_progress)?;
                    Ok(result.verdict)
                };
                let search = self.strategy.find_floor(versions, &mut probe)?;

                record.outcome = match search.floor {
                    Some(version) => FloorOutcome::Verified { version },
                    None => {
                        warn!("Could not determine a floor for {}", name);
                        FloorOutcome::MinimumUnknown
                    }
                };
                record.observations = search.observations;
            }
        }

        Ok(record)
    }
}

/// The ceiling trial with every resolved dependency moved to its floor.
/// Dependencies without a known floor stay at their ceiling.
fn confirmation_trial(ceiling: &Trial, floors: &[DependencyFloor]) -> Trial {
    let pins = ceiling
        .pins
        .iter()
        .map(|pin| {
            match floors
                .iter()
                .find(|f| f.name == pin.name())
                .and_then(DependencyFloor::floor)
            {
                Some(floor) => pin.repinned(floor),
                None => pin.clone(),
            }
        })
        .collect();
    Trial {
        phase: Phase::Confirmation,
        subject: None,
        pins,
        unpinned: ceiling.unpinned.clone(),
        fixed: ceiling.fixed.clone(),
    }
}

fn run_trial<E, F>(
    executor: &mut E,
    trial: &Trial,
    issued: &mut usize,
    total: usize,
    on_progress: &mut F,
) -> Result<TrialResult>
where
    E: TrialExecutor,
    F: FnMut(SearchProgress<'_>),
{
    on_progress(SearchProgress::TrialStarting {
        trial,
        index: *issued,
        total,
    });
    *issued += 1;

    debug!("Trial {}/{} ({}): {}", issued, total, trial.phase, trial.label());
    let result = executor.run(trial)?;
    debug!("Trial {} -> {:?}", trial.label(), result.verdict);

    on_progress(SearchProgress::TrialFinished {
        trial,
        result: &result,
    });
    Ok(result)
}
