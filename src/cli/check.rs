//! The floor check.
//!
//! Loads settings, classifies the project's requirements, asks the index for
//! candidate versions and drives the search engine, then renders the report.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::cli::args::Cli;
use crate::config::{load_config, ExtendSet, Overrides, Settings};
use crate::environment::{build_backend_metadata, TrialExecutor, VenvExecutor};
use crate::error::{FloorError, Result};
use crate::index::{PypiClient, VersionOracle, VersionSource};
use crate::requirements::{classify_project, ProjectRequirements, Requirement};
use crate::search::{
    Confirmation, Dependency, DependencyFloor, FloorOutcome, Phase, Report, RunOutcome,
    SearchEngine, SearchProgress,
};
use crate::ui::{
    format_duration, FloorRow, FloorSummary, SpinnerHandle, StatusKind, UserInterface,
};

use super::command::{Command, CommandResult};

/// The check command implementation.
pub struct CheckCommand {
    target_dir: PathBuf,
    config: Option<PathBuf>,
    overrides: Overrides,
    json: bool,
}

impl CheckCommand {
    pub fn new(target_dir: &Path, config: Option<&Path>, overrides: Overrides) -> Self {
        Self {
            target_dir: target_dir.to_path_buf(),
            config: config.map(Path::to_path_buf),
            overrides,
            json: false,
        }
    }

    /// Build from parsed arguments.
    pub fn from_cli(cli: &Cli) -> Self {
        Self::new(&cli.target_dir, cli.config.as_deref(), cli.overrides()).with_json(cli.json)
    }

    /// Print the outcome as JSON instead of a table.
    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    /// Defaults, then the config file, then flags.
    pub fn settings(&self) -> Result<Settings> {
        if !self.target_dir.is_dir() {
            return Err(FloorError::ConfigValidationError {
                message: format!(
                    "target directory does not exist: {}",
                    self.target_dir.display()
                ),
            });
        }
        let file = load_config(&self.target_dir, self.config.as_deref())?;
        Settings::resolve(&self.target_dir, file, &self.overrides)
    }

    /// Query candidates for every variable dependency.
    pub fn resolve_dependencies<S: VersionSource>(
        &self,
        variable: &[Requirement],
        oracle: &VersionOracle<S>,
        extend: &ExtendSet,
        ui: &mut dyn UserInterface,
    ) -> Result<Vec<Dependency>> {
        let mut spinner = ui.start_spinner("Fetching versions");
        let mut dependencies = Vec::with_capacity(variable.len());
        for requirement in variable {
            spinner.set_message(&format!("Fetching {}", requirement.name()));
            let extended = extend.contains(requirement.canonical_name());
            match Dependency::resolve(requirement.clone(), oracle, extended) {
                Ok(dependency) => dependencies.push(dependency),
                Err(e) => {
                    spinner.finish_error(&format!("Fetching {} failed", requirement.name()));
                    return Err(e);
                }
            }
        }
        spinner.finish_success(&format!("Fetched {} dependencies", dependencies.len()));

        ui.show_section(
            "Versions",
            &dependencies.iter().map(describe_candidates).collect::<Vec<_>>(),
        );
        Ok(dependencies)
    }

    /// Run the search and render its outcome.
    pub fn check<E: TrialExecutor>(
        &self,
        mut engine: SearchEngine<E>,
        dependencies: &[Dependency],
        ui: &mut dyn UserInterface,
    ) -> Result<CommandResult> {
        let started = Instant::now();
        let verbose = ui.output_mode().shows_command_output();
        ui.message(&format!(
            "Running up to {} trials ({} search)",
            engine.estimate_trials(dependencies),
            engine.strategy_name()
        ));

        let mut spinner: Option<Box<dyn SpinnerHandle>> = None;
        let outcome = engine.run_with_progress(dependencies, |event| match event {
            SearchProgress::PhaseStarting { phase } => {
                ui.message(phase_title(phase));
            }
            SearchProgress::TrialStarting {
                trial,
                index,
                total,
            } => {
                spinner = Some(ui.start_spinner(&format!(
                    "[{}/{}] {}",
                    index + 1,
                    total,
                    trial.label()
                )));
            }
            SearchProgress::TrialFinished { trial, result } => {
                let line = format!(
                    "{:<4} {} ({})",
                    if result.passed() { "OK" } else { "FAIL" },
                    trial.label(),
                    format_duration(result.duration)
                );
                if let Some(mut s) = spinner.take() {
                    if result.passed() {
                        s.finish_success(&line);
                    } else {
                        s.finish_error(&line);
                    }
                }
                if verbose && !result.passed() && trial.phase == Phase::Floor {
                    ui.show_error_block(&trial.label(), &result.output, None);
                }
            }
            SearchProgress::DependencyFinished { floor } => match &floor.outcome {
                FloorOutcome::MinimumUnknown => ui.warning(&format!(
                    "{}: oldest candidate fails, minimum unknown",
                    floor.name
                )),
                FloorOutcome::NotFound => {
                    ui.warning(&format!("{}: not found on the index", floor.name))
                }
                FloorOutcome::NoCandidates => ui.warning(&format!(
                    "{}: no release satisfies {}",
                    floor.name, floor.declared
                )),
                _ => {}
            },
        })?;

        if self.json {
            let json = serde_json::to_string_pretty(&outcome)
                .map_err(|e| FloorError::Other(e.into()))?;
            println!("{}", json);
        } else {
            render_outcome(&outcome, started.elapsed(), ui);
        }

        Ok(CommandResult::from_exit_code(outcome.exit_code()))
    }
}

impl Command for CheckCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let settings = self.settings()?;
        ui.show_header(&format!("floorcheck {}", settings.target_dir.display()));

        let project = classify_project(&settings.target_dir, &settings.requirements, |root| {
            build_backend_metadata(root, &settings.python)
        })?;
        show_classification(&project, ui);

        let client = PypiClient::new(&settings.index_url)?;
        let oracle = VersionOracle::new(client, settings.prereleases);
        let dependencies = self.resolve_dependencies(
            &project.classification.variable,
            &oracle,
            &settings.extend,
            ui,
        )?;

        let executor =
            VenvExecutor::new(&settings.target_dir, &settings.command, &settings.python)?;
        ui.message(&format!(
            "Testing `{}` with {}",
            executor.command(),
            executor.python().display()
        ));
        let engine = if settings.fast {
            SearchEngine::fast(executor)
        } else {
            SearchEngine::new(executor)
        }
        .with_fixed(project.classification.fixed.install_lines());

        self.check(engine, &dependencies, ui)
    }
}

fn phase_title(phase: Phase) -> &'static str {
    match phase {
        Phase::Ceiling => "Checking newest versions",
        Phase::Floor => "Searching floors",
        Phase::Confirmation => "Checking all floors together",
    }
}

fn show_classification(project: &ProjectRequirements, ui: &mut dyn UserInterface) {
    let classification = &project.classification;
    let variable: Vec<String> = classification
        .variable
        .iter()
        .map(|r| r.to_string())
        .collect();
    let manifests: Vec<String> = project
        .manifests
        .iter()
        .map(|p| p.display().to_string())
        .collect();

    let mut items = vec![
        format!("metadata: {}", project.metadata_source),
        format!("variable: {}", list_or_none(&variable)),
        format!(
            "fixed: {} from {}",
            classification.fixed.len(),
            list_or_none(&manifests)
        ),
    ];
    if ui.output_mode().shows_command_output() {
        items.extend(
            classification
                .fixed
                .install_lines()
                .into_iter()
                .map(|line| format!("  {}", line)),
        );
    }
    ui.show_section("Summary", &items);
}

fn list_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "(none)".to_string()
    } else {
        items.join(", ")
    }
}

fn describe_candidates(dependency: &Dependency) -> String {
    match dependency.versions() {
        None => format!("{}: not found", dependency.name()),
        Some([]) => format!("{}: no candidates", dependency.name()),
        Some([only]) => format!("{}: {}", dependency.name(), only),
        Some(versions) => format!(
            "{}: {} .. {} ({} candidates)",
            dependency.name(),
            versions[0],
            versions[versions.len() - 1],
            versions.len()
        ),
    }
}

fn render_outcome(outcome: &RunOutcome, elapsed: Duration, ui: &mut dyn UserInterface) {
    match outcome {
        RunOutcome::CeilingFailure {
            requirements,
            result,
        } => {
            ui.error("Newest versions fail; no floors were searched");
            ui.show_error_block(
                &requirements.join(" "),
                &result.output,
                Some("Make the test command pass with the newest releases first"),
            );
        }
        RunOutcome::Completed { report } => render_report(report, elapsed, ui),
    }
}

fn render_report(report: &Report, elapsed: Duration, ui: &mut dyn UserInterface) {
    ui.show_floor_summary(&floor_summary(report, elapsed));

    for suggestion in report.suggestions() {
        ui.show_hint(&format!("Suggest narrowing: {}", suggestion));
    }

    match &report.confirmation {
        Confirmation::Confirmed => ui.success("Floors pass together"),
        Confirmation::Failed { flagged, result } => {
            ui.warning(&format!(
                "Floors fail together; check {}",
                list_or_none(flagged)
            ));
            ui.show_error_block(
                "min",
                &result.output,
                Some("Each floor passed alone; the combination needs manual inspection"),
            );
        }
    }

    let unresolved: Vec<&str> = report.unresolved().map(|d| d.name.as_str()).collect();
    if !unresolved.is_empty() {
        ui.warning(&format!("Floor unknown for {}", unresolved.join(", ")));
    }
}

/// Table rows for `report`.
pub fn floor_summary(report: &Report, elapsed: Duration) -> FloorSummary {
    let flagged: &[String] = match &report.confirmation {
        Confirmation::Failed { flagged, .. } => flagged,
        Confirmation::Confirmed => &[],
    };
    FloorSummary {
        rows: report
            .dependencies
            .iter()
            .map(|d| floor_row(d, flagged.contains(&d.name)))
            .collect(),
        total_trials: report.trials.total(),
        total_duration: elapsed,
    }
}

fn floor_row(dependency: &DependencyFloor, flagged: bool) -> FloorRow {
    let (floor, status) = match &dependency.outcome {
        FloorOutcome::Verified { version } | FloorOutcome::Single { version } => {
            let status = if flagged {
                StatusKind::Warning
            } else {
                StatusKind::Success
            };
            (version.to_string(), status)
        }
        FloorOutcome::MinimumUnknown => ("unknown".to_string(), StatusKind::Warning),
        FloorOutcome::NotFound => ("not found".to_string(), StatusKind::Failed),
        FloorOutcome::NoCandidates => ("none".to_string(), StatusKind::Skipped),
    };
    FloorRow {
        name: dependency.name.clone(),
        declared: dependency.declared.clone(),
        floor,
        status,
        trials: dependency.trials(),
    }
}
