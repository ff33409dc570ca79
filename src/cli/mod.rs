//! Command-line interface for floorcheck.
//!
//! - [`args`] - Argument definitions using clap derive macros
//! - [`command`] - The [`Command`] trait and [`CommandResult`]
//! - [`check`] - The floor check itself

pub mod args;
pub mod check;
pub mod command;

pub use args::Cli;
pub use check::CheckCommand;
pub use command::{Command, CommandResult};
