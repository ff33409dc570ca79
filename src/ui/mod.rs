//! User interface components.
//!
//! This module provides:
//! - [`UserInterface`] trait for UI abstraction
//! - [`TerminalUI`] for interactive terminal usage
//! - [`NonInteractiveUI`] for CI/headless environments
//! - [`MockUI`] capturing everything for tests
//!
//! # Example
//!
//! ```
//! use floorcheck::ui::{create_ui, OutputMode};
//!
//! let mut ui = create_ui(false, OutputMode::Quiet);
//! ui.show_header("floorcheck");
//! ui.success("All floors confirmed");
//! ```

pub mod mock;
pub mod non_interactive;
pub mod output;
pub mod progress;
pub mod spinner;
pub mod terminal;
pub mod theme;

pub use mock::{MockSpinner, MockUI, SpinnerStatus};
pub use non_interactive::NonInteractiveUI;
pub use output::OutputMode;
pub use progress::format_duration;
pub use spinner::ProgressSpinner;
pub use terminal::{create_ui, TerminalUI};
pub use theme::{should_use_colors, FloorTheme};

use std::time::Duration;

/// Trait for user interface interactions.
///
/// This trait allows mocking the UI in tests.
pub trait UserInterface {
    /// Get the current output mode.
    fn output_mode(&self) -> OutputMode;

    /// Display a message to the user.
    fn message(&mut self, msg: &str);

    /// Display a success message.
    fn success(&mut self, msg: &str);

    /// Display a warning message.
    fn warning(&mut self, msg: &str);

    /// Display an error message.
    fn error(&mut self, msg: &str);

    /// Start a spinner for an operation.
    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle>;

    /// Show a header/banner.
    fn show_header(&mut self, title: &str);

    /// Show a section title followed by indented items.
    fn show_section(&mut self, title: &str, items: &[String]);

    /// Show a hint line.
    fn show_hint(&mut self, hint: &str);

    /// Show captured output framed with a title line.
    fn show_error_block(&mut self, title: &str, output: &str, hint: Option<&str>);

    /// Show the final table of floors.
    fn show_floor_summary(&mut self, summary: &FloorSummary);

    /// Check if running in interactive mode.
    fn is_interactive(&self) -> bool;
}

/// Handle for controlling a spinner.
pub trait SpinnerHandle {
    /// Update the spinner message.
    fn set_message(&mut self, msg: &str);

    /// Mark the operation as successful.
    fn finish_success(&mut self, msg: &str);

    /// Mark the operation as failed.
    fn finish_error(&mut self, msg: &str);

    /// Mark as skipped.
    fn finish_skipped(&mut self, msg: &str);
}

/// Status icon of a summary row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Success,
    Failed,
    Warning,
    Skipped,
}

impl StatusKind {
    /// Plain icon.
    pub fn icon(&self) -> &'static str {
        match self {
            Self::Success => "✓",
            Self::Failed => "✗",
            Self::Warning => "⚠",
            Self::Skipped => "○",
        }
    }

    /// Icon styled with `theme`.
    pub fn styled(&self, theme: &FloorTheme) -> String {
        let style = match self {
            Self::Success => &theme.success,
            Self::Failed => &theme.error,
            Self::Warning => &theme.warning,
            Self::Skipped => &theme.dim,
        };
        style.apply_to(self.icon()).to_string()
    }
}

/// One dependency in the final table.
#[derive(Debug, Clone, PartialEq)]
pub struct FloorRow {
    pub name: String,
    pub declared: String,
    /// Floor version or a short marker such as "unknown".
    pub floor: String,
    pub status: StatusKind,
    pub trials: usize,
}

/// Everything the final table shows.
#[derive(Debug, Clone, PartialEq)]
pub struct FloorSummary {
    pub rows: Vec<FloorRow>,
    pub total_trials: usize,
    pub total_duration: Duration,
}

impl FloorSummary {
    /// Width of the name column.
    pub fn name_width(&self) -> usize {
        self.rows
            .iter()
            .map(|r| r.name.len())
            .max()
            .unwrap_or(0)
            .max(12)
    }
}
