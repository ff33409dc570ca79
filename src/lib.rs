//! floorcheck - find the oldest dependency versions a Python project still
//! works with.
//!
//! A run has three phases. The newest candidate of every declared dependency
//! is tested together first. Each dependency is then walked down towards its
//! oldest candidate while the others stay at their newest. Finally all
//! discovered floors are tested together.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - `.floorcheck.yml` loading and settings resolution
//! - [`environment`] - Disposable virtual environments running trials
//! - [`error`] - Error types and result aliases
//! - [`index`] - Package index client and version oracle
//! - [`requirements`] - Versions, specifiers, manifests and classification
//! - [`search`] - The three-phase floor search and its report
//! - [`shell`] - Subprocess execution
//! - [`ui`] - Spinners and terminal output
//!
//! # Example
//!
//! ```
//! use floorcheck::requirements::{Requirement, Version};
//!
//! let req: Requirement = "attrs>=17.4,<22".parse().unwrap();
//! assert_eq!(req.canonical_name(), "attrs");
//! assert!(req.specifier().contains(&"19.1.0".parse::<Version>().unwrap(), false));
//! ```

pub mod cli;
pub mod config;
pub mod environment;
pub mod error;
pub mod index;
pub mod requirements;
pub mod search;
pub mod shell;
pub mod ui;

pub use error::{FloorError, Result};
