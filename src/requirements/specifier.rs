//! PEP 440 version specifiers.
//!
//! A [`SpecifierSet`] is the comma-separated constraint attached to a
//! requirement (`>=1.0,<2`). It answers whether a candidate release is
//! allowed, which is what the version oracle filters on.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use super::version::Version;
use crate::error::{FloorError, Result};

static SPECIFIER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(~=|===|==|!=|<=|>=|<|>)\s*([^\s,;]+)\s*$")
        .expect("SPECIFIER_REGEX must compile")
});

/// Comparison operator of a single specifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Compatible,
    Equal,
    NotEqual,
    LessEqual,
    GreaterEqual,
    Less,
    Greater,
    Arbitrary,
}

impl Operator {
    fn from_token(token: &str) -> Option<Self> {
        Some(match token {
            "~=" => Self::Compatible,
            "==" => Self::Equal,
            "!=" => Self::NotEqual,
            "<=" => Self::LessEqual,
            ">=" => Self::GreaterEqual,
            "<" => Self::Less,
            ">" => Self::Greater,
            "===" => Self::Arbitrary,
            _ => return None,
        })
    }

    fn as_str(&self) -> &'static str {
        match self {
            Self::Compatible => "~=",
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::LessEqual => "<=",
            Self::GreaterEqual => ">=",
            Self::Less => "<",
            Self::Greater => ">",
            Self::Arbitrary => "===",
        }
    }
}

/// One `operator version` clause.
#[derive(Debug, Clone)]
pub struct Specifier {
    operator: Operator,
    text: String,
    version: Option<Version>,
    wildcard: bool,
}

impl Specifier {
    /// The operator.
    pub fn operator(&self) -> Operator {
        self.operator
    }

    /// The parsed version, absent only for `===` clauses.
    pub fn version(&self) -> Option<&Version> {
        self.version.as_ref()
    }

    /// Whether this is an `==X.*` / `!=X.*` prefix clause.
    pub fn is_wildcard(&self) -> bool {
        self.wildcard
    }

    /// Whether `candidate` satisfies this clause.
    pub fn contains(&self, candidate: &Version) -> bool {
        let Some(spec) = &self.version else {
            return candidate.to_string().eq_ignore_ascii_case(&self.text);
        };

        match self.operator {
            Operator::Compatible => {
                let prefix = &spec.release()[..spec.release().len() - 1];
                candidate.without_local() >= *spec && prefix_match(candidate, spec.epoch(), prefix)
            }
            Operator::Equal if self.wildcard => {
                prefix_match(candidate, spec.epoch(), spec.release())
            }
            Operator::NotEqual if self.wildcard => {
                !prefix_match(candidate, spec.epoch(), spec.release())
            }
            Operator::Equal => exact_match(candidate, spec),
            Operator::NotEqual => !exact_match(candidate, spec),
            Operator::LessEqual => candidate.without_local() <= *spec,
            Operator::GreaterEqual => candidate.without_local() >= *spec,
            Operator::Less => {
                // `<2.0` excludes 2.0 pre-releases unless the bound is one.
                *candidate < *spec
                    && (spec.is_prerelease()
                        || !candidate.is_prerelease()
                        || candidate.base() != spec.base())
            }
            Operator::Greater => {
                let candidate = candidate.without_local();
                // `>1.0` excludes 1.0 post-releases unless the bound is one.
                candidate > *spec
                    && (spec.is_postrelease()
                        || !candidate.is_postrelease()
                        || candidate.base() != spec.base())
            }
            Operator::Arbitrary => false,
        }
    }
}

fn exact_match(candidate: &Version, spec: &Version) -> bool {
    if spec.has_local() {
        candidate == spec
    } else {
        candidate.without_local() == *spec
    }
}

fn prefix_match(candidate: &Version, epoch: u64, prefix: &[u64]) -> bool {
    if candidate.epoch() != epoch {
        return false;
    }
    let release = candidate.release();
    prefix
        .iter()
        .enumerate()
        .all(|(i, want)| release.get(i).copied().unwrap_or(0) == *want)
}

impl FromStr for Specifier {
    type Err = FloorError;

    fn from_str(input: &str) -> Result<Self> {
        let invalid = || FloorError::InvalidSpecifier {
            input: input.trim().to_string(),
        };
        let caps = SPECIFIER_REGEX.captures(input).ok_or_else(invalid)?;
        let operator = Operator::from_token(&caps[1]).ok_or_else(invalid)?;
        let text = caps[2].to_string();

        if operator == Operator::Arbitrary {
            return Ok(Self {
                operator,
                text,
                version: None,
                wildcard: false,
            });
        }

        let (version_text, wildcard) = match text.strip_suffix(".*") {
            Some(stripped) => (stripped, true),
            None => (text.as_str(), false),
        };
        if wildcard && !matches!(operator, Operator::Equal | Operator::NotEqual) {
            return Err(invalid());
        }

        let version: Version = version_text.parse().map_err(|_| invalid())?;
        if operator == Operator::Compatible && version.release().len() < 2 {
            return Err(invalid());
        }

        Ok(Self {
            operator,
            text,
            version: Some(version),
            wildcard,
        })
    }
}

impl fmt::Display for Specifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.operator.as_str(), self.text)
    }
}

/// A conjunction of specifiers. The empty set allows everything.
#[derive(Debug, Clone, Default)]
pub struct SpecifierSet {
    specifiers: Vec<Specifier>,
}

impl SpecifierSet {
    /// A set with no constraints.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether the set has no clauses.
    pub fn is_empty(&self) -> bool {
        self.specifiers.is_empty()
    }

    /// The individual clauses.
    pub fn iter(&self) -> impl Iterator<Item = &Specifier> {
        self.specifiers.iter()
    }

    /// Whether a clause names a pre-release, which opts the set into them.
    pub fn mentions_prerelease(&self) -> bool {
        self.specifiers.iter().any(|s| {
            s.operator != Operator::NotEqual
                && s.version.as_ref().is_some_and(|v| v.is_prerelease())
        })
    }

    /// Whether the set pins one exact version (`==X` without a wildcard).
    pub fn is_pinned(&self) -> bool {
        self.exact_pin().is_some()
    }

    /// The exact pinned version, if any.
    pub fn exact_pin(&self) -> Option<&Version> {
        self.specifiers
            .iter()
            .find(|s| s.operator == Operator::Equal && !s.wildcard)
            .and_then(|s| s.version.as_ref())
    }

    /// The highest declared lower bound (`>=`, `>`, `~=`, `==`).
    pub fn lower_bound(&self) -> Option<&Version> {
        self.specifiers
            .iter()
            .filter(|s| {
                matches!(
                    s.operator,
                    Operator::GreaterEqual | Operator::Greater | Operator::Compatible
                ) || (s.operator == Operator::Equal && !s.wildcard)
            })
            .filter_map(|s| s.version.as_ref())
            .max()
    }

    /// Whether `candidate` satisfies every clause.
    ///
    /// Pre-releases are rejected unless `prereleases` is set or a clause
    /// explicitly names one.
    pub fn contains(&self, candidate: &Version, prereleases: bool) -> bool {
        if candidate.is_prerelease() && !prereleases && !self.mentions_prerelease() {
            return false;
        }
        self.specifiers.iter().all(|s| s.contains(candidate))
    }
}

impl FromStr for SpecifierSet {
    type Err = FloorError;

    fn from_str(input: &str) -> Result<Self> {
        let specifiers = input
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(str::parse)
            .collect::<Result<Vec<Specifier>>>()?;
        Ok(Self { specifiers })
    }
}

impl fmt::Display for SpecifierSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.specifiers.iter().map(|s| s.to_string()).collect();
        write!(f, "{}", parts.join(","))
    }
}
