//! Non-interactive UI for CI/headless environments.

use super::progress::format_duration;
use super::theme::FloorTheme;
use super::{FloorSummary, OutputMode, SpinnerHandle, UserInterface};

/// UI implementation for non-interactive mode.
///
/// Spinners become plain lines. In CI (detected via `is_ci()`) the line
/// announcing each trial is dropped and only its result is printed, which
/// keeps log-based output to one line per trial.
pub struct NonInteractiveUI {
    mode: OutputMode,
    is_ci: bool,
}

impl NonInteractiveUI {
    /// Create a new non-interactive UI.
    pub fn new(mode: OutputMode) -> Self {
        Self {
            mode,
            is_ci: crate::shell::is_ci(),
        }
    }

    /// Create with explicit CI flag (for testing).
    pub fn with_ci(mode: OutputMode, is_ci: bool) -> Self {
        Self { mode, is_ci }
    }
}

impl UserInterface for NonInteractiveUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        if self.mode.shows_status() {
            println!("{}", msg);
        }
    }

    fn success(&mut self, msg: &str) {
        if self.mode.shows_status() {
            println!("✓ {}", msg);
        }
    }

    fn warning(&mut self, msg: &str) {
        if self.mode.shows_status() {
            eprintln!("⚠ {}", msg);
        }
    }

    fn error(&mut self, msg: &str) {
        eprintln!("✗ {}", msg);
    }

    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle> {
        let visible = self.mode.shows_progress();
        if visible && !self.is_ci {
            println!("  {}", message);
        }
        Box::new(LineSpinner { indent: 2, visible })
    }

    fn show_header(&mut self, title: &str) {
        if self.mode.shows_status() {
            println!("\n{}\n", title);
        }
    }

    fn show_section(&mut self, title: &str, items: &[String]) {
        if !self.mode.shows_progress() {
            return;
        }
        println!("{}", title);
        for item in items {
            println!("  {}", item);
        }
        println!();
    }

    fn show_hint(&mut self, hint: &str) {
        if self.mode.shows_status() {
            println!("  {}", hint);
        }
    }

    fn show_error_block(&mut self, title: &str, output: &str, hint: Option<&str>) {
        eprintln!();
        eprintln!("    ┌─ Trial ────────────────────────────");
        eprintln!("    │ {}", title);
        if !output.is_empty() {
            eprintln!("    ├─ Output ───────────────────────────");
            for line in output.lines() {
                eprintln!("    │ {}", line);
            }
        }
        eprintln!("    └────────────────────────────────────");
        if let Some(h) = hint {
            eprintln!();
            eprintln!("    Hint: {}", h);
        }
    }

    fn show_floor_summary(&mut self, summary: &FloorSummary) {
        if !self.mode.shows_status() {
            return;
        }

        let width = summary.name_width();
        println!();
        println!("  ┌─ Floors ───────────────────────────");
        for row in &summary.rows {
            let trials = if row.trials == 1 { "trial" } else { "trials" };
            println!(
                "  │ {} {:<width$} {:<12} {:<20} {} {}",
                row.status.icon(),
                row.name,
                row.floor,
                row.declared,
                row.trials,
                trials,
                width = width,
            );
        }
        println!("  ├────────────────────────────────────");
        println!(
            "  │ Total: {} · {} trials",
            format_duration(summary.total_duration),
            summary.total_trials,
        );
        println!("  └────────────────────────────────────");
    }

    fn is_interactive(&self) -> bool {
        false
    }
}

/// Spinner that prints its final line only.
struct LineSpinner {
    indent: usize,
    visible: bool,
}

impl LineSpinner {
    fn print(&self, line: String) {
        if self.visible {
            println!("{}{}", " ".repeat(self.indent), line);
        }
    }
}

impl SpinnerHandle for LineSpinner {
    fn set_message(&mut self, _msg: &str) {}

    fn finish_success(&mut self, msg: &str) {
        self.print(FloorTheme::plain().format_success(msg));
    }

    fn finish_error(&mut self, msg: &str) {
        self.print(FloorTheme::plain().format_error(msg));
    }

    fn finish_skipped(&mut self, msg: &str) {
        self.print(FloorTheme::plain().format_skipped(msg));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::{FloorRow, StatusKind};
    use std::time::Duration;

    #[test]
    fn non_interactive_is_not_interactive() {
        let ui = NonInteractiveUI::new(OutputMode::Normal);
        assert!(!ui.is_interactive());
    }

    #[test]
    fn output_mode_preserved() {
        let ui = NonInteractiveUI::new(OutputMode::Quiet);
        assert_eq!(ui.output_mode(), OutputMode::Quiet);
    }

    #[test]
    fn ci_mode_is_stored() {
        let ui = NonInteractiveUI::with_ci(OutputMode::Normal, true);
        assert!(ui.is_ci);
    }

    #[test]
    fn spinner_visibility_follows_mode() {
        let mut ui = NonInteractiveUI::with_ci(OutputMode::Quiet, false);
        let mut spinner = ui.start_spinner("trial 1/2 max");
        spinner.set_message("ignored");
        spinner.finish_success("OK   max");

        let mut ui = NonInteractiveUI::with_ci(OutputMode::Normal, true);
        let mut spinner = ui.start_spinner("trial 2/2 attrs==17.4.0");
        spinner.finish_error("FAIL attrs==17.4.0");
        spinner.finish_skipped("no candidates");
    }

    #[test]
    fn summary_and_blocks_render() {
        let mut ui = NonInteractiveUI::with_ci(OutputMode::Normal, false);
        ui.show_section("Versions", &["attrs: 3 candidates".to_string()]);
        ui.show_error_block("max", "E   ImportError\n", Some("run with --verbose"));
        ui.show_floor_summary(&FloorSummary {
            rows: vec![FloorRow {
                name: "attrs".to_string(),
                declared: "attrs>=17".to_string(),
                floor: "18.1.0".to_string(),
                status: StatusKind::Success,
                trials: 1,
            }],
            total_trials: 3,
            total_duration: Duration::from_secs(12),
        });
    }
}
