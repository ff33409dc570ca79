//! Project metadata prepared by the project's own build backend.
//!
//! Used when nothing declares the dependencies statically. The backend named
//! in `[build-system]` is installed into a throwaway venv and its
//! `prepare_metadata_for_build_wheel` hook writes a `.dist-info` directory
//! whose `METADATA` carries the `Requires-Dist` headers.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use super::executor::resolve_interpreter;
use super::venv::Venv;
use crate::error::{FloorError, Result};
use crate::requirements::{metadata_from_core, MetadataSource, ProjectMetadata};
use crate::shell::run_program;

/// Backend assumed for projects without a `[build-system]` table.
pub const LEGACY_BACKEND: &str = "setuptools.build_meta:__legacy__";

// argv: backend, output dir, then backend-path entries.
const PREPARE_METADATA: &str = r#"
import importlib, sys
backend, out = sys.argv[1], sys.argv[2]
sys.path[:0] = sys.argv[3:]
module, _, attrs = backend.partition(":")
hooks = importlib.import_module(module)
for attr in filter(None, attrs.split(".")):
    hooks = getattr(hooks, attr)
prepare = getattr(hooks, "prepare_metadata_for_build_wheel", None)
if prepare is None:
    sys.exit(backend + " has no prepare_metadata_for_build_wheel hook")
print(prepare(out))
"#;

/// The `[build-system]` table, with the legacy setuptools defaults filled
/// in per key.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BuildSystem {
    #[serde(default = "default_requires")]
    pub requires: Vec<String>,
    #[serde(default = "default_backend")]
    pub build_backend: String,
    #[serde(default)]
    pub backend_path: Vec<String>,
}

impl Default for BuildSystem {
    fn default() -> Self {
        Self {
            requires: default_requires(),
            build_backend: default_backend(),
            backend_path: Vec::new(),
        }
    }
}

fn default_requires() -> Vec<String> {
    vec!["setuptools".to_string(), "wheel".to_string()]
}

fn default_backend() -> String {
    LEGACY_BACKEND.to_string()
}

#[derive(Debug, Deserialize)]
struct PyprojectBuild {
    #[serde(rename = "build-system")]
    build_system: Option<BuildSystem>,
}

impl BuildSystem {
    /// Read `[build-system]` from `root/pyproject.toml`, if there is one.
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join("pyproject.toml");
        if !path.is_file() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(&path)?;
        let doc: PyprojectBuild =
            toml::from_str(&content).map_err(|e| FloorError::ConfigParseError {
                path: path.clone(),
                message: e.to_string(),
            })?;
        Ok(doc.build_system.unwrap_or_default())
    }
}

/// Ask the project's build backend for its declared requirements.
///
/// Needs a `pyproject.toml` or `setup.py` to build from; without either the
/// project has no metadata at all and `python` is never looked up.
pub fn build_backend_metadata(root: &Path, python: &str) -> Result<ProjectMetadata> {
    if !root.join("pyproject.toml").is_file() && !root.join("setup.py").is_file() {
        return Err(FloorError::MetadataNotFound {
            path: root.to_path_buf(),
        });
    }

    let system = BuildSystem::load(root)?;
    let python = resolve_interpreter(python)?;
    tracing::info!("Preparing metadata with {}", system.build_backend);

    let venv = Venv::create(&python)?;
    if !system.requires.is_empty() {
        let install = venv.pip_install(&system.requires, root)?;
        if !install.success {
            return Err(hook_failed(format!(
                "installing {} failed\n{}",
                system.requires.join(" "),
                install.combined_output().trim()
            )));
        }
    }

    let out = tempfile::Builder::new()
        .prefix("floorcheck-metadata-")
        .tempdir()?;
    let mut args = vec![
        "-c".to_string(),
        PREPARE_METADATA.to_string(),
        system.build_backend.clone(),
        out.path().display().to_string(),
    ];
    args.extend(
        system
            .backend_path
            .iter()
            .map(|p| root.join(p).display().to_string()),
    );

    let result = run_program(&venv.python(), &args, &venv.command_options(Some(root)))?;
    if !result.success {
        return Err(hook_failed(result.combined_output().trim().to_string()));
    }

    // Backends may print their own chatter; the hook's answer comes last.
    let dist_info = result
        .stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .next_back()
        .ok_or_else(|| hook_failed("no .dist-info directory reported".to_string()))?;
    let metadata = out.path().join(dist_info).join("METADATA");
    tracing::debug!("Reading {}", metadata.display());
    let content = fs::read_to_string(&metadata)
        .map_err(|e| hook_failed(format!("{}: {}", metadata.display(), e)))?;

    metadata_from_core(MetadataSource::BuildBackend(root.to_path_buf()), &content)
}

fn hook_failed(message: String) -> FloorError {
    FloorError::MetadataHook { message }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn build_system_defaults_without_pyproject() {
        let temp = TempDir::new().unwrap();
        let system = BuildSystem::load(temp.path()).unwrap();
        assert_eq!(system.build_backend, LEGACY_BACKEND);
        assert_eq!(system.requires, vec!["setuptools", "wheel"]);
        assert!(system.backend_path.is_empty());
    }

    #[test]
    fn build_system_fills_missing_keys() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("pyproject.toml"),
            "[build-system]\nrequires = [\"flit_core>=3.2\"]\n",
        )
        .unwrap();
        let system = BuildSystem::load(temp.path()).unwrap();
        assert_eq!(system.requires, vec!["flit_core>=3.2"]);
        assert_eq!(system.build_backend, LEGACY_BACKEND);

        fs::write(
            temp.path().join("pyproject.toml"),
            "[project]\nname = \"demo\"\ndynamic = [\"dependencies\"]\n",
        )
        .unwrap();
        assert_eq!(BuildSystem::load(temp.path()).unwrap(), BuildSystem::default());
    }

    #[test]
    fn nothing_to_build_is_not_found() {
        let temp = TempDir::new().unwrap();
        let err = build_backend_metadata(temp.path(), "/nonexistent/python").unwrap_err();
        assert!(matches!(err, FloorError::MetadataNotFound { .. }));
    }

    #[cfg(unix)]
    mod with_interpreter {
        use super::*;
        use std::os::unix::fs::PermissionsExt;

        /// Interpreter stand-in that records pip installs and answers the
        /// metadata hook with a fixed `.dist-info`, failing for the backend
        /// `broken`.
        fn fake_python(dir: &Path) -> String {
            let script = format!(
                r#"#!/bin/sh
if [ "$1" = "-m" ] && [ "$2" = "venv" ]; then
  mkdir -p "$3/bin" && cp "$0" "$3/bin/python"
  exit $?
fi
if [ "$1" = "-m" ] && [ "$2" = "pip" ]; then
  shift 4
  echo "$@" >> "{log}"
  exit 0
fi
if [ "$1" = "-c" ]; then
  echo "$3 $5" >> "{hook}"
  [ "$3" = "broken" ] && {{ echo "ModuleNotFoundError: broken" >&2; exit 1; }}
  mkdir -p "$4/demo-1.0.dist-info"
  printf 'Name: demo\nRequires-Dist: attrs>=17\nRequires-Dist: pytest; extra == "test"\n' \
    > "$4/demo-1.0.dist-info/METADATA"
  echo "running prepare_metadata_for_build_wheel"
  echo "demo-1.0.dist-info"
  exit 0
fi
exit 2
"#,
                log = dir.join("pip.log").display(),
                hook = dir.join("hook.log").display()
            );
            let path = dir.join("python-fake");
            fs::write(&path, script).unwrap();
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
            path.display().to_string()
        }

        #[test]
        fn setup_py_project_uses_legacy_backend() {
            let project = TempDir::new().unwrap();
            let tools = TempDir::new().unwrap();
            fs::write(project.path().join("setup.py"), "").unwrap();

            let meta =
                build_backend_metadata(project.path(), &fake_python(tools.path())).unwrap();

            let raw: Vec<&str> = meta.requirements.iter().map(|r| r.raw()).collect();
            assert_eq!(raw, vec!["attrs>=17", "pytest; extra == \"test\""]);
            assert_eq!(
                meta.source,
                MetadataSource::BuildBackend(project.path().to_path_buf())
            );
            let pip = fs::read_to_string(tools.path().join("pip.log")).unwrap();
            assert_eq!(pip.trim(), "setuptools wheel");
            let hook = fs::read_to_string(tools.path().join("hook.log")).unwrap();
            assert_eq!(hook.trim(), LEGACY_BACKEND);
        }

        #[test]
        fn declared_backend_and_path_are_used() {
            let project = TempDir::new().unwrap();
            let tools = TempDir::new().unwrap();
            fs::write(
                project.path().join("pyproject.toml"),
                r#"
[build-system]
requires = []
build-backend = "backend:hooks"
backend-path = ["_build"]

[project]
name = "demo"
dynamic = ["dependencies"]
"#,
            )
            .unwrap();

            let meta =
                build_backend_metadata(project.path(), &fake_python(tools.path())).unwrap();

            assert_eq!(meta.requirements.len(), 2);
            assert!(!tools.path().join("pip.log").exists());
            let hook = fs::read_to_string(tools.path().join("hook.log")).unwrap();
            assert_eq!(
                hook.trim(),
                format!("backend:hooks {}", project.path().join("_build").display())
            );
        }

        #[test]
        fn failing_hook_is_an_error() {
            let project = TempDir::new().unwrap();
            let tools = TempDir::new().unwrap();
            fs::write(
                project.path().join("pyproject.toml"),
                "[build-system]\nbuild-backend = \"broken\"\n",
            )
            .unwrap();

            let err = build_backend_metadata(project.path(), &fake_python(tools.path()))
                .unwrap_err();
            match err {
                FloorError::MetadataHook { message } => assert!(message.contains("broken")),
                other => panic!("unexpected error: {other}"),
            }
        }
    }
}
