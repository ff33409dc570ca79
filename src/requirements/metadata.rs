//! Declared install requirements of the project under test.
//!
//! Sources are tried in order and the first one that declares dependencies
//! wins:
//!
//! 1. `pyproject.toml` `[project].dependencies` (unless listed as dynamic)
//! 2. `setup.cfg` `[options] install_requires`
//! 3. `PKG-INFO` `Requires-Dist` headers
//!
//! Projects that declare nothing statically (a bare `setup.py`, or dynamic
//! `[project].dependencies`) need their build backend asked instead; see
//! [`crate::environment::build_backend_metadata`].

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use super::requirement::Requirement;
use crate::error::{FloorError, Result};

/// Where the declared requirements were read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataSource {
    Pyproject(PathBuf),
    SetupCfg(PathBuf),
    PkgInfo(PathBuf),
    /// Core metadata prepared by the build backend of this project root.
    BuildBackend(PathBuf),
}

impl fmt::Display for MetadataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pyproject(p) | Self::SetupCfg(p) | Self::PkgInfo(p) => {
                write!(f, "{}", p.display())
            }
            Self::BuildBackend(p) => write!(f, "build backend of {}", p.display()),
        }
    }
}

/// The project's declared install requirements.
#[derive(Debug, Clone)]
pub struct ProjectMetadata {
    pub source: MetadataSource,
    pub requirements: Vec<Requirement>,
}

/// Read the project's declared install requirements.
pub fn read_project_metadata(root: &Path) -> Result<ProjectMetadata> {
    let pyproject = root.join("pyproject.toml");
    if pyproject.is_file() {
        let content = fs::read_to_string(&pyproject)?;
        if let Some(lines) = pyproject_dependencies(&content, &pyproject)? {
            return finish(MetadataSource::Pyproject(pyproject), lines);
        }
        tracing::debug!("pyproject.toml does not declare static dependencies");
    }

    let setup_cfg = root.join("setup.cfg");
    if setup_cfg.is_file() {
        if let Some(lines) = setup_cfg_dependencies(&fs::read_to_string(&setup_cfg)?) {
            return finish(MetadataSource::SetupCfg(setup_cfg), lines);
        }
    }

    let pkg_info = root.join("PKG-INFO");
    if pkg_info.is_file() {
        let content = fs::read_to_string(&pkg_info)?;
        return metadata_from_core(MetadataSource::PkgInfo(pkg_info), &content);
    }

    Err(FloorError::MetadataNotFound {
        path: root.to_path_buf(),
    })
}

/// Declared requirements from core metadata text (`METADATA` or `PKG-INFO`).
pub fn metadata_from_core(source: MetadataSource, content: &str) -> Result<ProjectMetadata> {
    finish(source, requires_dist(content))
}

fn finish(source: MetadataSource, lines: Vec<String>) -> Result<ProjectMetadata> {
    tracing::info!("Reading declared requirements from {}", source);
    let requirements = lines
        .iter()
        .map(|line| line.parse())
        .collect::<Result<Vec<Requirement>>>()?;
    Ok(ProjectMetadata {
        source,
        requirements,
    })
}

/// `[project].dependencies` from pyproject.toml.
///
/// Returns `None` when there is no `[project]` table or the dependencies are
/// dynamic (computed by the build backend).
fn pyproject_dependencies(content: &str, path: &Path) -> Result<Option<Vec<String>>> {
    let doc: toml::Value = toml::from_str(content).map_err(|e| FloorError::ConfigParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let Some(project) = doc.get("project") else {
        return Ok(None);
    };

    let dynamic = project
        .get("dynamic")
        .and_then(|d| d.as_array())
        .is_some_and(|d| d.iter().any(|v| v.as_str() == Some("dependencies")));
    if dynamic {
        return Ok(None);
    }

    let lines = project
        .get("dependencies")
        .and_then(|d| d.as_array())
        .map(|deps| {
            deps.iter()
                .filter_map(|v| v.as_str())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default();
    Ok(Some(lines))
}

/// `install_requires` from the `[options]` section of setup.cfg.
fn setup_cfg_dependencies(content: &str) -> Option<Vec<String>> {
    let mut in_options = false;
    let mut collecting = false;
    let mut found = false;
    let mut lines = Vec::new();

    for raw in content.lines() {
        let trimmed = raw.trim();

        if trimmed.starts_with('[') && trimmed.ends_with(']') {
            in_options = trimmed == "[options]";
            collecting = false;
            continue;
        }
        if !in_options || trimmed.starts_with('#') || trimmed.starts_with(';') {
            continue;
        }

        let indented = raw.starts_with(' ') || raw.starts_with('\t');
        if collecting && indented {
            if !trimmed.is_empty() {
                lines.push(trimmed.to_string());
            }
            continue;
        }
        collecting = false;

        if let Some((key, value)) = trimmed.split_once('=') {
            if key.trim() == "install_requires" {
                found = true;
                collecting = true;
                let value = value.trim();
                if !value.is_empty() {
                    lines.push(value.to_string());
                }
            }
        }
    }

    found.then_some(lines)
}

/// `Requires-Dist` header values from core metadata.
fn requires_dist(content: &str) -> Vec<String> {
    content
        .lines()
        // Headers end at the first blank line; the body is the description.
        .take_while(|line| !line.trim().is_empty())
        .filter_map(|line| line.strip_prefix("Requires-Dist:"))
        .map(|value| value.trim().to_string())
        .collect()
}
