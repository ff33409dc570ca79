//! Configuration file discovery and loading.

use crate::config::schema::FileConfig;
use crate::error::{FloorError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// File names looked for in the project root, in order.
pub const CONFIG_FILE_NAMES: &[&str] = &[".floorcheck.yml", ".floorcheck.yaml"];

/// Find the project config in `project_root`.
pub fn find_config(project_root: &Path) -> Option<PathBuf> {
    CONFIG_FILE_NAMES
        .iter()
        .map(|name| project_root.join(name))
        .find(|path| path.is_file())
}

/// Load a single config file.
///
/// # Errors
///
/// Returns `ConfigNotFound` if the file doesn't exist.
/// Returns `ConfigParseError` if the YAML is invalid.
pub fn load_config_file(path: &Path) -> Result<FileConfig> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            FloorError::ConfigNotFound {
                path: path.to_path_buf(),
            }
        } else {
            FloorError::Io(e)
        }
    })?;

    parse_config(&content, path)
}

/// Parse YAML content into a [`FileConfig`].
///
/// An empty document is an empty config.
pub fn parse_config(content: &str, source_path: &Path) -> Result<FileConfig> {
    if content.trim().is_empty() {
        return Ok(FileConfig::default());
    }
    serde_yaml::from_str(content).map_err(|e| FloorError::ConfigParseError {
        path: source_path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Load config with optional path override.
///
/// With `config_override` only that file is read and it must exist.
/// Otherwise the project root is searched, and a missing file yields the
/// empty config.
pub fn load_config(project_root: &Path, config_override: Option<&Path>) -> Result<FileConfig> {
    if let Some(path) = config_override {
        tracing::debug!("Loading config from {}", path.display());
        return load_config_file(path);
    }

    match find_config(project_root) {
        Some(path) => {
            tracing::debug!("Loading config from {}", path.display());
            load_config_file(&path)
        }
        None => Ok(FileConfig::default()),
    }
}
