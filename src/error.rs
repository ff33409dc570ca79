//! Error types for floorcheck operations.
//!
//! This module defines [`FloorError`], the primary error type used throughout
//! the application, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Use `FloorError` for failures that stop an operation outright
//! - Search verdicts (a failing ceiling, an unconfirmed floor) are not errors;
//!   they are reported through [`crate::search::RunOutcome`]
//! - Use `anyhow::Error` (via `FloorError::Other`) for unexpected errors

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for floorcheck operations.
#[derive(Debug, Error)]
pub enum FloorError {
    /// A configuration file given explicitly does not exist.
    #[error("Configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse a configuration file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// Invalid configuration structure or values.
    #[error("Invalid configuration: {message}")]
    ConfigValidationError { message: String },

    /// A version string is not valid PEP 440.
    #[error("Invalid version: {input}")]
    InvalidVersion { input: String },

    /// A version specifier could not be parsed.
    #[error("Invalid version specifier: {input}")]
    InvalidSpecifier { input: String },

    /// A requirement line could not be parsed.
    #[error("Invalid requirement '{line}': {message}")]
    InvalidRequirement { line: String, message: String },

    /// A requirements manifest could not be read.
    #[error("Failed to read requirements from {path}: {message}")]
    ManifestRead { path: PathBuf, message: String },

    /// No dependency declarations were found for the project.
    #[error("No dependency metadata in {path} (pyproject.toml, setup.cfg, setup.py, PKG-INFO)")]
    MetadataNotFound { path: PathBuf },

    /// The build backend could not prepare the project's metadata.
    #[error("Build backend failed to prepare metadata: {message}")]
    MetadataHook { message: String },

    /// The package index does not know this package.
    #[error("Package not found on index: {name}")]
    PackageNotFound { name: String },

    /// The package index could not be queried.
    #[error("Index query failed for '{name}': {message}")]
    IndexUnavailable { name: String, message: String },

    /// The Python interpreter used to build environments is missing.
    #[error("Python interpreter not found: {python}")]
    InterpreterNotFound { python: String },

    /// An isolated environment could not be created.
    #[error("Failed to set up environment: {message}")]
    EnvironmentSetup { message: String },

    /// Shell command could not be started.
    #[error("Command failed with exit code {code:?}: {command}")]
    CommandFailed { command: String, code: Option<i32> },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for floorcheck operations.
pub type Result<T> = std::result::Result<T, FloorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_parse_error_displays_path_and_message() {
        let err = FloorError::ConfigParseError {
            path: PathBuf::from("/proj/.floorcheck.yml"),
            message: "invalid syntax".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("/proj/.floorcheck.yml"));
        assert!(msg.contains("invalid syntax"));
    }

    #[test]
    fn invalid_requirement_displays_line_and_message() {
        let err = FloorError::InvalidRequirement {
            line: "attrs>>1".into(),
            message: "bad operator".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("attrs>>1"));
        assert!(msg.contains("bad operator"));
    }

    #[test]
    fn package_not_found_displays_name() {
        let err = FloorError::PackageNotFound {
            name: "no-such-pkg".into(),
        };
        assert!(err.to_string().contains("no-such-pkg"));
    }

    #[test]
    fn metadata_not_found_lists_sources() {
        let err = FloorError::MetadataNotFound {
            path: PathBuf::from("/proj"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/proj"));
        assert!(msg.contains("pyproject.toml"));
    }

    #[test]
    fn command_failed_displays_command_and_code() {
        let err = FloorError::CommandFailed {
            command: "make test".into(),
            code: Some(2),
        };
        let msg = err.to_string();
        assert!(msg.contains("make test"));
        assert!(msg.contains("2"));
    }

    #[test]
    fn io_error_converts_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: FloorError = io_err.into();
        assert!(matches!(err, FloorError::Io(_)));
    }

    #[test]
    fn anyhow_error_is_transparent() {
        let err: FloorError = anyhow::anyhow!("something odd").into();
        assert_eq!(err.to_string(), "something odd");
    }
}
