//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::Parser;
use std::path::PathBuf;

use crate::config::Overrides;

/// Find the oldest dependency versions a Python project still works with.
#[derive(Debug, Parser)]
#[command(name = "floorcheck")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Project to check
    #[arg(value_name = "TARGET_DIR")]
    pub target_dir: PathBuf,

    /// Test command run in every trial (default: make test)
    #[arg(short, long)]
    pub command: Option<String>,

    /// Probe only the oldest candidate of each dependency
    #[arg(long)]
    pub fast: bool,

    /// Ignore declared constraints for these dependencies (comma-separated, * for all)
    #[arg(long, value_delimiter = ',', value_name = "NAMES")]
    pub extend: Option<Vec<String>>,

    /// Glob patterns of fixed requirements files (comma-separated)
    #[arg(long, value_delimiter = ',', value_name = "GLOBS")]
    pub requirements: Option<Vec<String>>,

    /// Interpreter used to create trial environments (default: python3)
    #[arg(long, value_name = "PATH")]
    pub python: Option<String>,

    /// Root of the JSON package index API
    #[arg(long, value_name = "URL")]
    pub index_url: Option<String>,

    /// Consider pre-release versions
    #[arg(long)]
    pub pre: bool,

    /// Path to config file (overrides TARGET_DIR/.floorcheck.yml)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,

    /// Show diagnostic logs and the output of failed trials
    #[arg(short, long)]
    pub verbose: bool,

    /// Minimal output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

impl Cli {
    /// Settings given on the command line.
    pub fn overrides(&self) -> Overrides {
        Overrides {
            command: self.command.clone(),
            requirements: self.requirements.clone(),
            extend: self.extend.clone(),
            fast: self.fast,
            python: self.python.clone(),
            index_url: self.index_url.clone(),
            prereleases: self.pre,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal() {
        let cli = Cli::try_parse_from(["floorcheck", "."]).unwrap();
        assert_eq!(cli.target_dir, PathBuf::from("."));
        assert!(!cli.fast);
        assert!(cli.command.is_none());
        assert!(cli.extend.is_none());
    }

    #[test]
    fn parses_comma_lists() {
        let cli = Cli::try_parse_from([
            "floorcheck",
            "proj",
            "--extend",
            "attrs,click",
            "--requirements=requirements*.txt,ci/*.txt",
        ])
        .unwrap();
        assert_eq!(cli.extend, Some(vec!["attrs".into(), "click".into()]));
        assert_eq!(
            cli.requirements,
            Some(vec!["requirements*.txt".into(), "ci/*.txt".into()])
        );
    }

    #[test]
    fn overrides_carry_flags() {
        let cli = Cli::try_parse_from([
            "floorcheck",
            "proj",
            "-c",
            "pytest -x",
            "--fast",
            "--pre",
            "--python",
            "python3.11",
            "--index-url",
            "http://localhost:8080/pypi",
        ])
        .unwrap();
        let o = cli.overrides();
        assert_eq!(o.command.as_deref(), Some("pytest -x"));
        assert!(o.fast);
        assert!(o.prereleases);
        assert_eq!(o.python.as_deref(), Some("python3.11"));
        assert_eq!(o.index_url.as_deref(), Some("http://localhost:8080/pypi"));
        assert!(o.requirements.is_none());
    }

    #[test]
    fn requires_target_dir() {
        assert!(Cli::try_parse_from(["floorcheck"]).is_err());
    }

    #[test]
    fn verbose_conflicts_with_quiet() {
        assert!(Cli::try_parse_from(["floorcheck", ".", "-v", "-q"]).is_err());
    }
}
