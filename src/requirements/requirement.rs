//! PEP 508 requirement lines.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use super::specifier::SpecifierSet;
use super::version::Version;
use crate::error::{FloorError, Result};

static NAME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([A-Za-z0-9](?:[A-Za-z0-9._-]*[A-Za-z0-9])?)\s*(?:\[([^\]]*)\])?\s*(.*?)\s*$")
        .expect("NAME_REGEX must compile")
});

static SEPARATOR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-_.]+").expect("SEPARATOR_REGEX must compile"));

static EXTRA_MARKER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bextra\s*(==|!=)").expect("EXTRA_MARKER_REGEX must compile"));

/// Normalize a distribution name: lowercase with `-`, `_`, `.` runs folded to `-`.
pub fn canonicalize_name(name: &str) -> String {
    SEPARATOR_REGEX
        .replace_all(name.trim(), "-")
        .to_ascii_lowercase()
}

/// Whether a requirements-file line is a pip directive rather than a named
/// requirement: options (`-e`, `-r`, `--index-url`), local paths, VCS or
/// URL references, and `name @ url` direct references.
pub fn is_pip_directive(line: &str) -> bool {
    let line = line.trim();
    line.starts_with('-')
        || line.starts_with('.')
        || line.starts_with('/')
        || line.starts_with('~')
        || line.contains("://")
        || line.contains(" @ ")
        || line.split_once('@').is_some_and(|(name, _)| {
            !name.contains(|c: char| "<>=!~;".contains(c)) && !name.trim().is_empty()
        })
}

/// A named requirement with its constraint and optional environment marker.
#[derive(Debug, Clone)]
pub struct Requirement {
    name: String,
    canonical: String,
    extras: Vec<String>,
    specifier: SpecifierSet,
    marker: Option<String>,
    raw: String,
}

impl Requirement {
    /// The name as written.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The canonical name used for identity.
    pub fn canonical_name(&self) -> &str {
        &self.canonical
    }

    /// Requested extras, e.g. `["socks"]` for `requests[socks]`.
    pub fn extras(&self) -> &[String] {
        &self.extras
    }

    /// Version constraint (possibly empty).
    pub fn specifier(&self) -> &SpecifierSet {
        &self.specifier
    }

    /// Environment marker text after `;`, if any.
    pub fn marker(&self) -> Option<&str> {
        self.marker.as_deref()
    }

    /// The line as it was declared.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Whether the marker restricts this requirement to an optional extra.
    pub fn is_extra_only(&self) -> bool {
        self.marker
            .as_deref()
            .is_some_and(|m| EXTRA_MARKER_REGEX.is_match(m))
    }

    /// The exact pinned version, if the constraint is `==X`.
    pub fn pinned_version(&self) -> Option<&Version> {
        self.specifier.exact_pin()
    }

    /// Line handed to the installer. Pins to `version` when given, otherwise
    /// keeps the declared constraint. The marker is carried so the installer
    /// evaluates it.
    pub fn install_line(&self, version: Option<&Version>) -> String {
        let mut line = self.name.clone();
        if !self.extras.is_empty() {
            line.push_str(&format!("[{}]", self.extras.join(",")));
        }
        match version {
            Some(v) => line.push_str(&format!("=={}", v)),
            None => line.push_str(&self.specifier.to_string()),
        }
        if let Some(marker) = &self.marker {
            line.push_str(&format!("; {}", marker));
        }
        line
    }
}

impl FromStr for Requirement {
    type Err = FloorError;

    fn from_str(line: &str) -> Result<Self> {
        let invalid = |message: &str| FloorError::InvalidRequirement {
            line: line.trim().to_string(),
            message: message.to_string(),
        };

        let (body, marker) = match line.split_once(';') {
            Some((body, marker)) => (body, Some(marker.trim().to_string())),
            None => (line, None),
        };
        let marker = marker.filter(|m| !m.is_empty());

        let caps = NAME_REGEX
            .captures(body)
            .ok_or_else(|| invalid("expected a distribution name"))?;
        let name = caps[1].to_string();
        let extras = caps
            .get(2)
            .map(|m| {
                m.as_str()
                    .split(',')
                    .map(str::trim)
                    .filter(|e| !e.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        let mut rest = caps.get(3).map(|m| m.as_str()).unwrap_or_default().trim();
        if rest.starts_with('@') {
            return Err(invalid("direct URL references cannot be searched"));
        }
        if let Some(inner) = rest.strip_prefix('(').and_then(|r| r.strip_suffix(')')) {
            rest = inner.trim();
        }

        let specifier = rest
            .parse::<SpecifierSet>()
            .map_err(|e| invalid(&e.to_string()))?;

        Ok(Self {
            canonical: canonicalize_name(&name),
            name,
            extras,
            specifier,
            marker,
            raw: line.trim().to_string(),
        })
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}
