//! Resolved settings: defaults, then the config file, then flags.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::config::schema::FileConfig;
use crate::error::{FloorError, Result};
use crate::index::DEFAULT_INDEX_URL;
use crate::requirements::canonicalize_name;

/// Test command when none is configured.
pub const DEFAULT_COMMAND: &str = "make test";
/// Interpreter used to build trial environments by default.
pub const DEFAULT_PYTHON: &str = "python3";
/// Fixed requirements manifests by default.
pub const DEFAULT_REQUIREMENTS: &str = "requirements*.txt";

/// Dependencies searched without their declared constraints.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ExtendSet {
    /// Every variable dependency (`*`).
    All,
    /// Canonical names.
    Names(BTreeSet<String>),
    #[default]
    None,
}

impl ExtendSet {
    /// Build from `*` or a list of names.
    pub fn parse(items: &[String]) -> Self {
        if items.iter().any(|i| i.trim() == "*") {
            return Self::All;
        }
        let names: BTreeSet<String> = items
            .iter()
            .map(|i| i.trim())
            .filter(|i| !i.is_empty())
            .map(canonicalize_name)
            .collect();
        if names.is_empty() {
            Self::None
        } else {
            Self::Names(names)
        }
    }

    /// Whether `name` (in any spelling) is extended.
    pub fn contains(&self, name: &str) -> bool {
        match self {
            Self::All => true,
            Self::Names(names) => names.contains(&canonicalize_name(name)),
            Self::None => false,
        }
    }
}

/// Values given on the command line. `None`/`false` defers to the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub command: Option<String>,
    pub requirements: Option<Vec<String>>,
    pub extend: Option<Vec<String>>,
    pub fast: bool,
    pub python: Option<String>,
    pub index_url: Option<String>,
    pub prereleases: bool,
}

/// Fully resolved run settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub target_dir: PathBuf,
    pub command: String,
    pub requirements: Vec<String>,
    pub extend: ExtendSet,
    pub fast: bool,
    pub python: String,
    pub index_url: String,
    pub prereleases: bool,
}

impl Settings {
    /// Merge `file` under `overrides` and validate.
    pub fn resolve(target_dir: &Path, file: FileConfig, overrides: &Overrides) -> Result<Self> {
        let command = overrides
            .command
            .clone()
            .or(file.command)
            .unwrap_or_else(|| DEFAULT_COMMAND.to_string());

        let requirements = overrides
            .requirements
            .clone()
            .or_else(|| file.requirements.map(|r| r.items()))
            .unwrap_or_else(|| vec![DEFAULT_REQUIREMENTS.to_string()]);

        let extend = overrides
            .extend
            .clone()
            .or_else(|| file.extend.map(|e| e.items()))
            .unwrap_or_default();

        let settings = Self {
            target_dir: target_dir.to_path_buf(),
            command,
            requirements,
            extend: ExtendSet::parse(&extend),
            fast: overrides.fast || file.fast.unwrap_or(false),
            python: overrides
                .python
                .clone()
                .or(file.python)
                .unwrap_or_else(|| DEFAULT_PYTHON.to_string()),
            index_url: overrides
                .index_url
                .clone()
                .or(file.index_url)
                .unwrap_or_else(|| DEFAULT_INDEX_URL.to_string()),
            prereleases: overrides.prereleases || file.prereleases.unwrap_or(false),
        };
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        let invalid = |message: String| FloorError::ConfigValidationError { message };

        if self.command.trim().is_empty() {
            return Err(invalid("test command must not be empty".to_string()));
        }
        if self.python.trim().is_empty() {
            return Err(invalid("python interpreter must not be empty".to_string()));
        }
        for pattern in &self.requirements {
            glob::Pattern::new(pattern).map_err(|e| {
                invalid(format!("invalid requirements pattern '{}': {}", pattern, e))
            })?;
        }
        if !(self.index_url.starts_with("http://") || self.index_url.starts_with("https://")) {
            return Err(invalid(format!(
                "index URL must be http(s): {}",
                self.index_url
            )));
        }
        if !self.target_dir.is_dir() {
            return Err(invalid(format!(
                "target directory does not exist: {}",
                self.target_dir.display()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::StringList;
    use tempfile::TempDir;

    fn resolve(file: FileConfig, overrides: Overrides) -> Result<Settings> {
        let temp = TempDir::new().unwrap();
        Settings::resolve(temp.path(), file, &overrides)
    }

    #[test]
    fn defaults() {
        let s = resolve(FileConfig::default(), Overrides::default()).unwrap();
        assert_eq!(s.command, "make test");
        assert_eq!(s.requirements, vec!["requirements*.txt"]);
        assert_eq!(s.extend, ExtendSet::None);
        assert_eq!(s.python, "python3");
        assert_eq!(s.index_url, "https://pypi.org/pypi");
        assert!(!s.fast);
        assert!(!s.prereleases);
    }

    #[test]
    fn file_overrides_defaults() {
        let file = FileConfig {
            command: Some("tox".into()),
            requirements: Some(StringList::One("ci/*.txt".into())),
            extend: Some(StringList::Many(vec!["Attrs".into()])),
            fast: Some(true),
            ..Default::default()
        };
        let s = resolve(file, Overrides::default()).unwrap();
        assert_eq!(s.command, "tox");
        assert_eq!(s.requirements, vec!["ci/*.txt"]);
        assert!(s.extend.contains("attrs"));
        assert!(s.fast);
    }

    #[test]
    fn flags_override_file() {
        let file = FileConfig {
            command: Some("tox".into()),
            python: Some("python3.9".into()),
            ..Default::default()
        };
        let overrides = Overrides {
            command: Some("pytest".into()),
            extend: Some(vec!["*".into()]),
            prereleases: true,
            ..Default::default()
        };
        let s = resolve(file, overrides).unwrap();
        assert_eq!(s.command, "pytest");
        assert_eq!(s.python, "python3.9");
        assert_eq!(s.extend, ExtendSet::All);
        assert!(s.prereleases);
    }

    #[test]
    fn extend_set_canonicalizes() {
        let set = ExtendSet::parse(&["Zope.Interface".into(), " ".into()]);
        assert!(set.contains("zope-interface"));
        assert!(set.contains("zope_interface"));
        assert!(!set.contains("attrs"));
        assert!(ExtendSet::All.contains("anything"));
        assert_eq!(ExtendSet::parse(&[]), ExtendSet::None);
    }

    #[test]
    fn rejects_empty_command() {
        let overrides = Overrides {
            command: Some("  ".into()),
            ..Default::default()
        };
        let err = resolve(FileConfig::default(), overrides).unwrap_err();
        assert!(matches!(err, FloorError::ConfigValidationError { .. }));
    }

    #[test]
    fn rejects_bad_glob_and_url() {
        let overrides = Overrides {
            requirements: Some(vec!["[".into()]),
            ..Default::default()
        };
        assert!(resolve(FileConfig::default(), overrides).is_err());

        let overrides = Overrides {
            index_url: Some("ftp://example.com".into()),
            ..Default::default()
        };
        assert!(resolve(FileConfig::default(), overrides).is_err());
    }

    #[test]
    fn rejects_missing_target() {
        let temp = TempDir::new().unwrap();
        let err = Settings::resolve(
            &temp.path().join("missing"),
            FileConfig::default(),
            &Overrides::default(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }
}
