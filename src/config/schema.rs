//! Configuration schema for `.floorcheck.yml`.
//!
//! Every field is optional; anything left out falls back to the built-in
//! default or is taken from the command line.
//!
//! ```yaml
//! command: make test
//! requirements:
//!   - requirements*.txt
//!   - ci/constraints.txt
//! extend: attrs, click
//! fast: false
//! python: python3.11
//! index_url: https://pypi.org/pypi
//! prereleases: false
//! ```

use serde::{Deserialize, Serialize};

/// Either a single (comma-separated) string or a list of strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StringList {
    One(String),
    Many(Vec<String>),
}

impl StringList {
    /// Flatten into trimmed, non-empty items. Comma-separated strings are
    /// split in both forms.
    pub fn items(&self) -> Vec<String> {
        let parts: Vec<&str> = match self {
            Self::One(s) => vec![s.as_str()],
            Self::Many(v) => v.iter().map(String::as_str).collect(),
        };
        parts
            .iter()
            .flat_map(|p| p.split(','))
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(String::from)
            .collect()
    }
}

/// Contents of a project config file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Test command run in each trial
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,

    /// Glob patterns for fixed requirements manifests
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requirements: Option<StringList>,

    /// Dependencies whose declared constraints are ignored (`*` for all)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extend: Option<StringList>,

    /// Probe only the oldest candidate of each dependency
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fast: Option<bool>,

    /// Interpreter used to create trial environments
    #[serde(skip_serializing_if = "Option::is_none")]
    pub python: Option<String>,

    /// Root of the JSON package index API
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_url: Option<String>,

    /// Consider pre-release versions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prereleases: Option<bool>,
}
