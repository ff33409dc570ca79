//! Subprocess execution.

pub mod command;
pub mod platform;

pub use command::{execute, run_program, CommandOptions, CommandResult};
pub use platform::{is_ci, shell_executable};
