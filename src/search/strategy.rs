//! Per-dependency floor search strategies.
//!
//! A strategy sees one dependency's ascending candidate list and a probe
//! that runs a trial with that dependency moved to a given version (every
//! other dependency held at its ceiling). The newest candidate is already
//! known to pass, so it is never probed.

use serde::Serialize;

use super::trial::Verdict;
use crate::error::Result;
use crate::requirements::Version;

/// One probed version and its verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Observation {
    pub version: Version,
    pub verdict: Verdict,
}

/// What a strategy concluded for one dependency.
#[derive(Debug, Clone)]
pub struct FloorSearch {
    /// Oldest version known to pass, or `None` when it could not be
    /// determined.
    pub floor: Option<Version>,
    /// Probes in the order they were issued.
    pub observations: Vec<Observation>,
}

impl FloorSearch {
    /// Trials spent.
    pub fn trials(&self) -> usize {
        self.observations.len()
    }
}

/// Probe callback: run one trial at the given version.
pub type Probe<'a> = dyn FnMut(&Version) -> Result<Verdict> + 'a;

/// Decides which versions of one dependency to try, and in what order.
pub trait FloorStrategy {
    /// Name shown in diagnostics.
    fn name(&self) -> &'static str;

    /// Upper bound on probes for a list of `candidates` versions.
    fn max_trials(&self, candidates: usize) -> usize;

    /// Find the floor among `candidates` (ascending, non-empty).
    fn find_floor(&self, candidates: &[Version], probe: &mut Probe<'_>) -> Result<FloorSearch>;
}

/// Walk state for one dependency: the oldest version seen passing, the
/// next index to probe, and whether the walk is over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchState {
    known_good: usize,
    next: Option<usize>,
    terminal: bool,
}

impl SearchState {
    /// Start at the newest of `len` candidates.
    pub fn new(len: usize) -> Self {
        let known_good = len.saturating_sub(1);
        let next = known_good.checked_sub(1);
        Self {
            known_good,
            next,
            terminal: next.is_none(),
        }
    }

    /// Index of the oldest candidate seen passing.
    pub fn known_good(&self) -> usize {
        self.known_good
    }

    /// Index to probe next, or `None` once terminal.
    pub fn next_candidate(&self) -> Option<usize> {
        if self.terminal {
            None
        } else {
            self.next
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    /// Record the verdict for `index`. A pass moves the known-good version
    /// down; a failure ends the walk.
    pub fn record(&mut self, index: usize, verdict: Verdict) {
        match verdict {
            Verdict::Pass => {
                self.known_good = index;
                self.next = index.checked_sub(1);
                self.terminal = self.next.is_none();
            }
            Verdict::Fail => self.terminal = true,
        }
    }
}

/// Try each older version in turn until one fails. Exact, at up to
/// `n - 1` trials.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearDescent;

impl FloorStrategy for LinearDescent {
    fn name(&self) -> &'static str {
        "linear"
    }

    fn max_trials(&self, candidates: usize) -> usize {
        candidates.saturating_sub(1)
    }

    fn find_floor(&self, candidates: &[Version], probe: &mut Probe<'_>) -> Result<FloorSearch> {
        let mut state = SearchState::new(candidates.len());
        let mut observations = Vec::new();

        while let Some(index) = state.next_candidate() {
            let version = &candidates[index];
            let verdict = probe(version)?;
            observations.push(Observation {
                version: version.clone(),
                verdict,
            });
            state.record(index, verdict);
        }

        Ok(FloorSearch {
            floor: candidates.get(state.known_good()).cloned(),
            observations,
        })
    }
}

/// Only try the oldest candidate. One trial; a failure leaves the floor
/// unknown.
#[derive(Debug, Clone, Copy, Default)]
pub struct OldestOnly;

impl FloorStrategy for OldestOnly {
    fn name(&self) -> &'static str {
        "oldest-only"
    }

    fn max_trials(&self, candidates: usize) -> usize {
        usize::from(candidates > 1)
    }

    fn find_floor(&self, candidates: &[Version], probe: &mut Probe<'_>) -> Result<FloorSearch> {
        if candidates.len() < 2 {
            return Ok(FloorSearch {
                floor: candidates.first().cloned(),
                observations: Vec::new(),
            });
        }

        let oldest = &candidates[0];
        let verdict = probe(oldest)?;
        Ok(FloorSearch {
            floor: verdict.passed().then(|| oldest.clone()),
            observations: vec![Observation {
                version: oldest.clone(),
                verdict,
            }],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FloorError;

    fn versions(list: &[&str]) -> Vec<Version> {
        list.iter().map(|s| s.parse().unwrap()).collect()
    }

    /// Probe that fails for every version in `failing`.
    fn run(
        strategy: &dyn FloorStrategy,
        candidates: &[Version],
        failing: &[&str],
    ) -> (FloorSearch, Vec<String>) {
        let mut probed = Vec::new();
        let search = strategy
            .find_floor(candidates, &mut |v: &Version| {
                probed.push(v.to_string());
                Ok(if failing.contains(&v.to_string().as_str()) {
                    Verdict::Fail
                } else {
                    Verdict::Pass
                })
            })
            .unwrap();
        (search, probed)
    }

    #[test]
    fn state_walks_down_until_failure() {
        let mut state = SearchState::new(4);
        assert_eq!(state.known_good(), 3);
        assert_eq!(state.next_candidate(), Some(2));

        state.record(2, Verdict::Pass);
        assert_eq!(state.known_good(), 2);
        assert_eq!(state.next_candidate(), Some(1));

        state.record(1, Verdict::Fail);
        assert!(state.is_terminal());
        assert_eq!(state.next_candidate(), None);
        assert_eq!(state.known_good(), 2);
    }

    #[test]
    fn state_single_candidate_is_terminal() {
        let state = SearchState::new(1);
        assert!(state.is_terminal());
        assert_eq!(state.known_good(), 0);
    }

    #[test]
    fn linear_stops_one_above_first_failure() {
        let candidates = versions(&["1.0", "1.1", "1.2", "1.3"]);
        let (search, probed) = run(&LinearDescent, &candidates, &["1.0"]);
        assert_eq!(search.floor.as_ref().map(|v| v.to_string()), Some("1.1".into()));
        assert_eq!(probed, vec!["1.2", "1.1", "1.0"]);
        assert_eq!(search.trials(), 3);
    }

    #[test]
    fn linear_failure_just_below_ceiling() {
        let candidates = versions(&["1.0", "1.1", "1.2", "1.3"]);
        let (search, probed) = run(&LinearDescent, &candidates, &["1.2", "1.0"]);
        assert_eq!(search.floor.as_ref().map(|v| v.to_string()), Some("1.3".into()));
        assert_eq!(probed, vec!["1.2"]);
    }

    #[test]
    fn linear_without_failure_reaches_oldest() {
        let candidates = versions(&["1.0", "1.1", "1.2"]);
        let (search, _) = run(&LinearDescent, &candidates, &[]);
        assert_eq!(search.floor.as_ref().map(|v| v.to_string()), Some("1.0".into()));
        assert_eq!(search.trials(), 2);
    }

    #[test]
    fn single_candidate_needs_no_trial() {
        let candidates = versions(&["2.0"]);
        for strategy in [&LinearDescent as &dyn FloorStrategy, &OldestOnly] {
            let (search, probed) = run(strategy, &candidates, &[]);
            assert!(probed.is_empty());
            assert_eq!(search.floor.as_ref().map(|v| v.to_string()), Some("2.0".into()));
            assert_eq!(strategy.max_trials(1), 0);
        }
    }

    #[test]
    fn oldest_only_single_trial() {
        let candidates = versions(&["1.0", "1.1", "1.2", "1.3"]);
        let (pass, probed) = run(&OldestOnly, &candidates, &[]);
        assert_eq!(probed, vec!["1.0"]);
        assert_eq!(pass.floor.as_ref().map(|v| v.to_string()), Some("1.0".into()));

        let (fail, probed) = run(&OldestOnly, &candidates, &["1.0"]);
        assert_eq!(probed, vec!["1.0"]);
        assert!(fail.floor.is_none());
        assert_eq!(OldestOnly.max_trials(4), 1);
    }

    #[test]
    fn trial_errors_propagate() {
        let candidates = versions(&["1.0", "1.1"]);
        let result = LinearDescent.find_floor(&candidates, &mut |_: &Version| {
            Err(FloorError::EnvironmentSetup {
                message: "no venv".to_string(),
            })
        });
        assert!(matches!(result, Err(FloorError::EnvironmentSetup { .. })));
    }
}
