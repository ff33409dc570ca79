//! Visual theme and styling.

use console::Style;

/// Terminal styles used across the UI.
///
/// `plain()` keeps the same slots with no styling, so rendering code never
/// branches on color support.
#[derive(Debug, Clone)]
pub struct FloorTheme {
    pub success: Style,
    pub warning: Style,
    pub error: Style,
    pub dim: Style,
    pub highlight: Style,
    pub header: Style,
    pub duration: Style,
    /// Trial titles and requirement lines.
    pub command: Style,
    /// Box-drawing characters.
    pub border: Style,
    pub hint: Style,
    /// Floor versions in the summary table.
    pub version: Style,
}

impl Default for FloorTheme {
    fn default() -> Self {
        Self::new()
    }
}

impl FloorTheme {
    /// Create the colored theme.
    pub fn new() -> Self {
        Self {
            success: Style::new().green(),
            warning: Style::new().color256(208),
            error: Style::new().red().bold(),
            dim: Style::new().dim(),
            highlight: Style::new().bold(),
            header: Style::new().bold().cyan(),
            duration: Style::new().dim(),
            command: Style::new().dim().italic(),
            border: Style::new().dim(),
            hint: Style::new().cyan().dim(),
            version: Style::new().bold(),
        }
    }

    /// Create a theme without colors (for non-TTY or --no-color).
    pub fn plain() -> Self {
        Self {
            success: Style::new(),
            warning: Style::new(),
            error: Style::new(),
            dim: Style::new(),
            highlight: Style::new(),
            header: Style::new(),
            duration: Style::new(),
            command: Style::new(),
            border: Style::new(),
            hint: Style::new(),
            version: Style::new(),
        }
    }

    /// Colored unless colors are disabled.
    pub fn detect() -> Self {
        if should_use_colors() {
            Self::new()
        } else {
            Self::plain()
        }
    }

    /// `✓ msg` in the success style.
    pub fn format_success(&self, msg: &str) -> String {
        format!("{}", self.success.apply_to(format!("✓ {}", msg)))
    }

    pub fn format_warning(&self, msg: &str) -> String {
        format!("{}", self.warning.apply_to(format!("⚠ {}", msg)))
    }

    pub fn format_error(&self, msg: &str) -> String {
        format!("{}", self.error.apply_to(format!("✗ {}", msg)))
    }

    pub fn format_skipped(&self, msg: &str) -> String {
        format!("{}", self.dim.apply_to(format!("○ {}", msg)))
    }

    /// Banner line shown once per run.
    pub fn format_header(&self, title: &str) -> String {
        format!(
            "{} {}",
            self.header.apply_to("▁"),
            self.highlight.apply_to(title)
        )
    }

    pub fn format_section(&self, title: &str) -> String {
        format!("{}", self.header.apply_to(title))
    }
}

/// Colors only on a terminal, and never with `NO_COLOR` set.
pub fn should_use_colors() -> bool {
    // https://no-color.org/
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }

    console::Term::stdout().is_term()
}
