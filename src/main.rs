//! floorcheck CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use floorcheck::cli::{CheckCommand, Cli, Command};
use floorcheck::shell::is_ci;
use floorcheck::ui::{create_ui, OutputMode};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Exit code for errors that stop the run before a verdict.
const EXIT_ERROR: u8 = 1;

/// Initialize the tracing subscriber for logging.
///
/// Log level is controlled by:
/// 1. `--verbose` sets level to DEBUG
/// 2. `RUST_LOG` environment variable (if set)
/// 3. Default is WARN
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("floorcheck=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("floorcheck=warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    tracing::debug!("floorcheck starting with args: {:?}", cli);

    if cli.no_color {
        std::env::set_var("NO_COLOR", "1");
    }

    // JSON owns stdout.
    let output_mode = if cli.json {
        OutputMode::Silent
    } else {
        OutputMode::from_flags(cli.verbose, cli.quiet)
    };
    let mut ui = create_ui(!is_ci(), output_mode);

    match CheckCommand::from_cli(&cli).execute(ui.as_mut()) {
        Ok(result) => ExitCode::from(u8::try_from(result.exit_code).unwrap_or(EXIT_ERROR)),
        Err(e) => {
            ui.error(&format!("Error: {}", e));
            ExitCode::from(EXIT_ERROR)
        }
    }
}
