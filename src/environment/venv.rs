//! Disposable virtual environments.

use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::error::{FloorError, Result};
use crate::shell::{run_program, CommandOptions, CommandResult};

/// A virtual environment in a temporary directory. Dropping it deletes the
/// directory.
#[derive(Debug)]
pub struct Venv {
    dir: TempDir,
}

impl Venv {
    /// Create a venv with `interpreter -m venv`.
    pub fn create(interpreter: &Path) -> Result<Self> {
        let dir = tempfile::Builder::new().prefix("floorcheck-").tempdir()?;
        let args = vec![
            "-m".to_string(),
            "venv".to_string(),
            dir.path().display().to_string(),
        ];

        let result = run_program(interpreter, &args, &CommandOptions::default()).map_err(|e| {
            FloorError::EnvironmentSetup {
                message: e.to_string(),
            }
        })?;
        if !result.success {
            return Err(FloorError::EnvironmentSetup {
                message: format!(
                    "{} -m venv exited with {:?}: {}",
                    interpreter.display(),
                    result.exit_code,
                    result.combined_output().trim()
                ),
            });
        }

        tracing::debug!("Created venv at {}", dir.path().display());
        Ok(Self { dir })
    }

    /// Root of the environment.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Directory holding the environment's executables.
    pub fn bin_dir(&self) -> PathBuf {
        if cfg!(target_os = "windows") {
            self.path().join("Scripts")
        } else {
            self.path().join("bin")
        }
    }

    /// The environment's interpreter.
    pub fn python(&self) -> PathBuf {
        if cfg!(target_os = "windows") {
            self.bin_dir().join("python.exe")
        } else {
            self.bin_dir().join("python")
        }
    }

    /// Install `lines` with one pip invocation run from `cwd`.
    ///
    /// Option lines such as `-e .` are split into separate arguments; every
    /// other line is passed as a single requirement.
    pub fn pip_install(&self, lines: &[String], cwd: &Path) -> Result<CommandResult> {
        let mut args: Vec<String> = ["-m", "pip", "install", "--disable-pip-version-check"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        for line in lines {
            if line.starts_with('-') {
                args.extend(line.split_whitespace().map(str::to_string));
            } else {
                args.push(line.clone());
            }
        }

        tracing::debug!("pip install {} (in {})", lines.join(" "), cwd.display());
        run_program(&self.python(), &args, &self.command_options(Some(cwd)))
    }

    /// Options that run a command as if the environment were activated.
    pub fn command_options(&self, cwd: Option<&Path>) -> CommandOptions {
        let mut env = HashMap::new();
        env.insert("PATH".to_string(), self.search_path());
        env.insert("VIRTUAL_ENV".to_string(), self.path().display().to_string());

        CommandOptions {
            cwd: cwd.map(Path::to_path_buf),
            env,
            env_remove: vec!["PYTHONHOME".to_string()],
        }
    }

    /// `PATH` with the bin dir first.
    fn search_path(&self) -> String {
        let mut paths = vec![self.bin_dir()];
        if let Some(existing) = std::env::var_os("PATH") {
            paths.extend(std::env::split_paths(&existing));
        }
        std::env::join_paths(paths)
            .unwrap_or_else(|_| OsString::from(self.bin_dir()))
            .to_string_lossy()
            .to_string()
    }
}

#[cfg(all(test, unix))]
pub(crate) mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    /// A stand-in interpreter: `-m venv DIR` copies itself to `DIR/bin/python`,
    /// `-m pip install ...` appends its arguments to `pip.log` and its working
    /// directory to `pip.cwd` beside the script, and fails for any requirement
    /// containing `broken`.
    pub(crate) fn fake_python(dir: &Path) -> PathBuf {
        let log = dir.join("pip.log");
        let cwd = dir.join("pip.cwd");
        let script = format!(
            r#"#!/bin/sh
if [ "$1" = "-m" ] && [ "$2" = "venv" ]; then
  mkdir -p "$3/bin" && cp "$0" "$3/bin/python"
  exit $?
fi
if [ "$1" = "-m" ] && [ "$2" = "pip" ]; then
  shift 4
  echo "$@" >> "{log}"
  pwd >> "{cwd}"
  case "$*" in
    *broken*) echo "ERROR: No matching distribution" >&2; exit 1 ;;
  esac
  exit 0
fi
exit 2
"#,
            log = log.display(),
            cwd = cwd.display()
        );
        let path = dir.join("python-fake");
        fs::write(&path, script).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[test]
    fn creates_and_removes_environment() {
        let temp = TempDir::new().unwrap();
        let python = fake_python(temp.path());

        let venv = Venv::create(&python).unwrap();
        let root = venv.path().to_path_buf();
        assert!(venv.python().is_file());
        assert!(venv.bin_dir().starts_with(&root));

        drop(venv);
        assert!(!root.exists());
    }

    #[test]
    fn pip_install_runs_inside_environment() {
        let temp = TempDir::new().unwrap();
        let python = fake_python(temp.path());
        let venv = Venv::create(&python).unwrap();

        let ok = venv
            .pip_install(&["attrs==20.1.0".to_string(), "-e .".to_string()], temp.path())
            .unwrap();
        assert!(ok.success);
        let logged = fs::read_to_string(temp.path().join("pip.log")).unwrap();
        assert_eq!(logged.trim(), "attrs==20.1.0 -e .");

        let failed = venv
            .pip_install(&["broken==0.1".to_string()], temp.path())
            .unwrap();
        assert!(!failed.success);
        assert!(failed.stderr.contains("No matching distribution"));
    }

    #[test]
    fn pip_install_splits_option_lines() {
        let temp = TempDir::new().unwrap();
        let venv = Venv::create(&fake_python(temp.path())).unwrap();
        // The stand-in logs one argument per line here.
        let args_log = temp.path().join("args");
        let script = format!(
            "#!/bin/sh\nfor a in \"$@\"; do echo \"$a\" >> \"{}\"; done\n",
            args_log.display()
        );
        fs::write(venv.python(), script).unwrap();

        let lines = vec![
            "-e .".to_string(),
            "bar[fast]==2.0; python_version >= '3'".to_string(),
        ];
        assert!(venv.pip_install(&lines, temp.path()).unwrap().success);

        let logged = fs::read_to_string(&args_log).unwrap();
        let args: Vec<&str> = logged.lines().skip(4).collect();
        assert_eq!(args, vec!["-e", ".", "bar[fast]==2.0; python_version >= '3'"]);
    }

    #[test]
    fn failing_interpreter_is_setup_error() {
        let err = Venv::create(Path::new("/nonexistent/python")).unwrap_err();
        assert!(matches!(err, FloorError::EnvironmentSetup { .. }));

        let err = Venv::create(Path::new("false")).unwrap_err();
        assert!(matches!(err, FloorError::EnvironmentSetup { .. }));
    }

    #[test]
    fn command_options_activate_environment() {
        let temp = TempDir::new().unwrap();
        let venv = Venv::create(&fake_python(temp.path())).unwrap();

        let options = venv.command_options(Some(temp.path()));
        let path = &options.env["PATH"];
        assert!(path.starts_with(&venv.bin_dir().display().to_string()));
        assert_eq!(options.env["VIRTUAL_ENV"], venv.path().display().to_string());
        assert_eq!(options.cwd.as_deref(), Some(temp.path()));
        assert_eq!(options.env_remove, vec!["PYTHONHOME"]);
    }
}
