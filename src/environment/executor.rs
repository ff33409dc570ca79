//! Trial execution.

use std::path::{Path, PathBuf};
use std::time::Instant;

use super::venv::Venv;
use crate::error::{FloorError, Result};
use crate::search::{Trial, TrialResult};
use crate::shell::execute;

/// Installs a trial's assignment in isolation and runs the test command.
///
/// Each call is one expensive blocking cycle. Infrastructure failures are
/// errors and abort the run; everything the project itself does wrong is a
/// failing verdict.
pub trait TrialExecutor {
    fn run(&mut self, trial: &Trial) -> Result<TrialResult>;
}

/// Find `python` on `PATH`, or check it as a path.
pub fn resolve_interpreter(python: &str) -> Result<PathBuf> {
    let resolved = which::which(python).map_err(|e| {
        tracing::debug!("which {}: {}", python, e);
        FloorError::InterpreterNotFound {
            python: python.to_string(),
        }
    })?;
    tracing::debug!("Using interpreter {}", resolved.display());
    Ok(resolved)
}

/// Runs each trial in a fresh virtual environment.
#[derive(Debug, Clone)]
pub struct VenvExecutor {
    project_root: PathBuf,
    command: String,
    python: PathBuf,
}

impl VenvExecutor {
    /// Resolve `python` on `PATH` (or as a path) and build an executor that
    /// runs `command` from `project_root`.
    pub fn new(project_root: &Path, command: &str, python: &str) -> Result<Self> {
        Ok(Self {
            project_root: project_root.to_path_buf(),
            command: command.to_string(),
            python: resolve_interpreter(python)?,
        })
    }

    /// The resolved interpreter used to create environments.
    pub fn python(&self) -> &Path {
        &self.python
    }

    pub fn command(&self) -> &str {
        &self.command
    }
}

impl TrialExecutor for VenvExecutor {
    fn run(&mut self, trial: &Trial) -> Result<TrialResult> {
        let start = Instant::now();
        let venv = Venv::create(&self.python)?;

        let requirements = trial.install_args();
        if !requirements.is_empty() {
            let install = venv.pip_install(&requirements, &self.project_root)?;
            if !install.success {
                // A version that cannot be installed is not a usable floor.
                tracing::debug!("Install failed for {}", trial.label());
                return Ok(TrialResult::fail(
                    format!("pip install failed\n{}", install.combined_output()),
                    start.elapsed(),
                ));
            }
        }

        let options = venv.command_options(Some(&self.project_root));
        let test = execute(&self.command, &options)?;
        tracing::debug!("{} exited with {:?}", self.command, test.exit_code);

        let output = test.combined_output();
        Ok(if test.success {
            TrialResult::pass(output, start.elapsed())
        } else {
            TrialResult::fail(output, start.elapsed())
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::environment::venv::tests::fake_python;
    use crate::search::{Phase, Pin, Verdict};
    use std::fs;
    use tempfile::TempDir;

    fn trial(lines: &[(&str, &str)]) -> Trial {
        Trial {
            phase: Phase::Ceiling,
            subject: None,
            pins: lines
                .iter()
                .map(|(req, v)| Pin::new(req.parse().unwrap(), v.parse().unwrap()))
                .collect(),
            unpinned: Vec::new(),
            fixed: vec!["moreorless".to_string()],
        }
    }

    fn executor(project: &TempDir, tools: &TempDir, command: &str) -> VenvExecutor {
        let python = fake_python(tools.path());
        VenvExecutor::new(project.path(), command, &python.display().to_string()).unwrap()
    }

    #[test]
    fn unknown_interpreter() {
        let err =
            VenvExecutor::new(Path::new("."), "true", "floorcheck-no-such-python").unwrap_err();
        assert!(matches!(err, FloorError::InterpreterNotFound { .. }));
    }

    #[test]
    fn passing_command_is_pass() {
        let project = TempDir::new().unwrap();
        let tools = TempDir::new().unwrap();
        fs::write(project.path().join("Makefile"), "").unwrap();
        let mut exec = executor(&project, &tools, "test -f Makefile && echo \"$VIRTUAL_ENV\"");

        let result = exec.run(&trial(&[("attrs", "20.1.0")])).unwrap();
        assert_eq!(result.verdict, Verdict::Pass);
        assert!(result.output.contains("floorcheck-"));

        let logged = fs::read_to_string(tools.path().join("pip.log")).unwrap();
        assert_eq!(logged.trim(), "moreorless attrs==20.1.0");
    }

    #[test]
    fn installs_from_project_root() {
        let project = TempDir::new().unwrap();
        let tools = TempDir::new().unwrap();
        let mut exec = executor(&project, &tools, "true");
        let mut editable = trial(&[]);
        editable.fixed = vec!["-e .".to_string()];

        assert!(exec.run(&editable).unwrap().passed());

        let cwd = fs::read_to_string(tools.path().join("pip.cwd")).unwrap();
        assert_eq!(
            fs::canonicalize(cwd.trim()).unwrap(),
            fs::canonicalize(project.path()).unwrap()
        );
        let logged = fs::read_to_string(tools.path().join("pip.log")).unwrap();
        assert_eq!(logged.trim(), "-e .");
    }

    #[test]
    fn failing_command_is_fail() {
        let project = TempDir::new().unwrap();
        let tools = TempDir::new().unwrap();
        let mut exec = executor(&project, &tools, "echo broken tests; exit 1");

        let result = exec.run(&trial(&[("attrs", "20.1.0")])).unwrap();
        assert_eq!(result.verdict, Verdict::Fail);
        assert!(result.output.contains("broken tests"));
    }

    #[test]
    fn install_failure_is_fail() {
        let project = TempDir::new().unwrap();
        let tools = TempDir::new().unwrap();
        let marker = project.path().join("ran");
        let command = format!("touch {}", marker.display());
        let mut exec = executor(&project, &tools, &command);

        let result = exec.run(&trial(&[("broken", "0.1")])).unwrap();
        assert_eq!(result.verdict, Verdict::Fail);
        assert!(result.output.contains("pip install failed"));
        assert!(!marker.exists());
    }

    #[test]
    fn venv_bin_is_first_on_path() {
        let project = TempDir::new().unwrap();
        let tools = TempDir::new().unwrap();
        let mut exec = executor(&project, &tools, "command -v python");

        let result = exec.run(&trial(&[])).unwrap();
        assert!(result.passed());
        assert!(result.output.trim().ends_with("/bin/python"));
        assert!(result.output.contains("floorcheck-"));
    }
}
