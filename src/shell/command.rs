//! Captured subprocess execution.

use crate::error::{FloorError, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use super::platform::{shell_executable, shell_flag};

/// Result of running a subprocess.
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Exit code (None if killed by signal).
    pub exit_code: Option<i32>,

    /// Standard output.
    pub stdout: String,

    /// Standard error.
    pub stderr: String,

    /// Execution duration.
    pub duration: Duration,

    /// Whether the process exited with status 0.
    pub success: bool,
}

impl CommandResult {
    /// Create a success result.
    pub fn success(stdout: String, stderr: String, duration: Duration) -> Self {
        Self {
            exit_code: Some(0),
            stdout,
            stderr,
            duration,
            success: true,
        }
    }

    /// Create a failure result.
    pub fn failure(
        exit_code: Option<i32>,
        stdout: String,
        stderr: String,
        duration: Duration,
    ) -> Self {
        Self {
            exit_code,
            stdout,
            stderr,
            duration,
            success: false,
        }
    }

    /// Stdout followed by stderr, for diagnostics.
    pub fn combined_output(&self) -> String {
        let mut out = self.stdout.clone();
        if !self.stderr.is_empty() {
            if !out.is_empty() && !out.ends_with('\n') {
                out.push('\n');
            }
            out.push_str(&self.stderr);
        }
        out
    }
}

/// Options for running a subprocess. Output is always captured.
#[derive(Debug, Clone, Default)]
pub struct CommandOptions {
    /// Working directory.
    pub cwd: Option<PathBuf>,

    /// Environment variables (merged over the inherited environment).
    pub env: HashMap<String, String>,

    /// Inherited variables to unset.
    pub env_remove: Vec<String>,
}

/// Run a command string through the user's shell.
pub fn execute(command: &str, options: &CommandOptions) -> Result<CommandResult> {
    let mut cmd = Command::new(shell_executable());
    cmd.arg(shell_flag()).arg(command);
    run(cmd, command, options)
}

/// Run a program directly with an argument vector.
pub fn run_program(
    program: &Path,
    args: &[String],
    options: &CommandOptions,
) -> Result<CommandResult> {
    let mut cmd = Command::new(program);
    cmd.args(args);
    let label = format!("{} {}", program.display(), args.join(" "));
    run(cmd, &label, options)
}

fn run(mut cmd: Command, label: &str, options: &CommandOptions) -> Result<CommandResult> {
    let start = Instant::now();

    if let Some(cwd) = &options.cwd {
        cmd.current_dir(cwd);
    }
    for key in &options.env_remove {
        cmd.env_remove(key);
    }
    for (key, value) in &options.env {
        cmd.env(key, value);
    }
    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());

    tracing::debug!("Running: {}", label);
    let output = cmd.output().map_err(|e| {
        tracing::debug!("Failed to spawn {}: {}", label, e);
        FloorError::CommandFailed {
            command: label.to_string(),
            code: None,
        }
    })?;

    let duration = start.elapsed();
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    if output.status.success() {
        Ok(CommandResult::success(stdout, stderr, duration))
    } else {
        tracing::debug!("{} exited with {:?}", label, output.status.code());
        Ok(CommandResult::failure(
            output.status.code(),
            stdout,
            stderr,
            duration,
        ))
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn execute_successful_command() {
        let result = execute("echo hello", &CommandOptions::default()).unwrap();

        assert!(result.success);
        assert_eq!(result.exit_code, Some(0));
        assert!(result.stdout.contains("hello"));
    }

    #[test]
    fn execute_failing_command() {
        let result = execute("exit 3", &CommandOptions::default()).unwrap();

        assert!(!result.success);
        assert_eq!(result.exit_code, Some(3));
    }

    #[test]
    fn execute_with_env() {
        let mut options = CommandOptions::default();
        options
            .env
            .insert("FLOORCHECK_TEST_VAR".to_string(), "my_value".to_string());

        let result = execute("echo $FLOORCHECK_TEST_VAR", &options).unwrap();

        assert!(result.success);
        assert!(result.stdout.contains("my_value"));
    }

    #[test]
    fn execute_removes_env() {
        let options = CommandOptions {
            env_remove: vec!["HOME".to_string()],
            ..Default::default()
        };

        let result = execute("echo \"[${HOME:-unset}]\"", &options).unwrap();
        assert!(result.stdout.contains("[unset]"));
    }

    #[test]
    fn execute_with_cwd() {
        let temp = tempfile::TempDir::new().unwrap();
        std::fs::write(temp.path().join("marker.txt"), "x").unwrap();
        let options = CommandOptions {
            cwd: Some(temp.path().to_path_buf()),
            ..Default::default()
        };

        let result = execute("ls", &options).unwrap();

        assert!(result.success);
        assert!(result.stdout.contains("marker.txt"));
    }

    #[test]
    fn combined_output_joins_streams() {
        let result = execute("echo out; echo err >&2; exit 1", &CommandOptions::default()).unwrap();
        let combined = result.combined_output();
        assert!(combined.contains("out"));
        assert!(combined.contains("err"));
        assert!(combined.find("out") < combined.find("err"));
    }

    #[test]
    fn run_program_passes_arguments_verbatim() {
        let args = vec!["a b".to_string(), "$HOME".to_string()];
        let result = run_program(Path::new("echo"), &args, &CommandOptions::default()).unwrap();
        assert_eq!(result.stdout.trim(), "a b $HOME");
    }

    #[test]
    fn run_program_missing_binary_is_error() {
        let err = run_program(
            Path::new("/nonexistent/floorcheck-binary"),
            &[],
            &CommandOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, FloorError::CommandFailed { code: None, .. }));
    }
}
