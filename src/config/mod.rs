//! Configuration loading and resolution.
//!
//! - Schema definitions in [`schema`]
//! - File discovery and loading in [`loader`]
//! - Merging with command-line flags and validation in [`settings`]
//!
//! # Example
//!
//! ```
//! use floorcheck::config::{load_config, Overrides, Settings};
//! use tempfile::TempDir;
//! use std::fs;
//!
//! let temp = TempDir::new().unwrap();
//! fs::write(temp.path().join(".floorcheck.yml"), "command: pytest -x").unwrap();
//!
//! let file = load_config(temp.path(), None).unwrap();
//! let settings = Settings::resolve(temp.path(), file, &Overrides::default()).unwrap();
//! assert_eq!(settings.command, "pytest -x");
//! ```
//!
//! # Precedence
//!
//! 1. Built-in defaults
//! 2. Project config (`.floorcheck.yml`, or the file passed with `--config`)
//! 3. Command-line flags

pub mod loader;
pub mod schema;
pub mod settings;

pub use loader::{find_config, load_config, load_config_file, parse_config, CONFIG_FILE_NAMES};
pub use schema::{FileConfig, StringList};
pub use settings::{
    ExtendSet, Overrides, Settings, DEFAULT_COMMAND, DEFAULT_PYTHON, DEFAULT_REQUIREMENTS,
};
