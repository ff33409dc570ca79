//! Partition of declared dependencies into fixed and variable sets.
//!
//! Fixed requirements come from requirements manifests and are installed
//! as-is in every trial. Variable requirements come from the project's
//! packaging metadata and are the ones whose floors get searched. A name
//! present in both is variable only.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use super::manifest::{find_manifests, read_manifest, ManifestEntry};
use super::metadata::{read_project_metadata, MetadataSource, ProjectMetadata};
use super::requirement::Requirement;
use crate::error::{FloorError, Result};

/// Requirements installed unchanged in every trial.
#[derive(Debug, Clone, Default)]
pub struct FixedSet {
    requirements: BTreeMap<String, Requirement>,
    directives: Vec<String>,
}

impl FixedSet {
    /// Create an empty fixed set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a manifest entry, collapsing duplicates.
    ///
    /// For one name the newest exact pin wins, an exact pin beats an
    /// unpinned requirement, and otherwise the first entry seen is kept.
    pub fn insert(&mut self, entry: ManifestEntry) {
        match entry {
            ManifestEntry::Directive(line) => {
                if !self.directives.contains(&line) {
                    self.directives.push(line);
                }
            }
            ManifestEntry::Requirement(req) => {
                let key = req.canonical_name().to_string();
                let replace = match self.requirements.get(&key) {
                    None => true,
                    Some(current) => match (current.pinned_version(), req.pinned_version()) {
                        (Some(old), Some(new)) => new > old,
                        (None, Some(_)) => true,
                        _ => false,
                    },
                };
                if replace {
                    self.requirements.insert(key, req);
                }
            }
        }
    }

    /// Drop a requirement by canonical name.
    pub fn remove(&mut self, canonical_name: &str) -> Option<Requirement> {
        self.requirements.remove(canonical_name)
    }

    /// Look up a requirement by canonical name.
    pub fn get(&self, canonical_name: &str) -> Option<&Requirement> {
        self.requirements.get(canonical_name)
    }

    /// Named requirements, sorted by canonical name.
    pub fn requirements(&self) -> impl Iterator<Item = &Requirement> {
        self.requirements.values()
    }

    /// Directive lines in first-seen order.
    pub fn directives(&self) -> &[String] {
        &self.directives
    }

    /// Number of requirements plus directives.
    pub fn len(&self) -> usize {
        self.requirements.len() + self.directives.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Installer arguments: named requirements first, then directives.
    pub fn install_lines(&self) -> Vec<String> {
        self.requirements
            .values()
            .map(|r| r.install_line(None))
            .chain(self.directives.iter().cloned())
            .collect()
    }
}

/// Result of classifying a project's dependencies.
#[derive(Debug, Clone, Default)]
pub struct Classification {
    /// Environmental scaffolding, pinned.
    pub fixed: FixedSet,
    /// Dependencies under test, in declaration order.
    pub variable: Vec<Requirement>,
}

/// Classify manifest entries and declared requirements.
pub fn classify<I>(fixed_entries: I, declared: Vec<Requirement>) -> Classification
where
    I: IntoIterator<Item = ManifestEntry>,
{
    let mut fixed = FixedSet::new();
    for entry in fixed_entries {
        fixed.insert(entry);
    }

    let mut seen = HashSet::new();
    let mut variable = Vec::new();
    for req in declared {
        if req.is_extra_only() {
            tracing::debug!("Skipping optional requirement {}", req);
            continue;
        }
        if !seen.insert(req.canonical_name().to_string()) {
            tracing::debug!("Ignoring duplicate declaration {}", req);
            continue;
        }
        if let Some(shadowed) = fixed.remove(req.canonical_name()) {
            tracing::debug!("{} is under test; dropping fixed {}", req.name(), shadowed);
        }
        variable.push(req);
    }

    Classification { fixed, variable }
}

/// A classified project, with where each half came from.
#[derive(Debug, Clone)]
pub struct ProjectRequirements {
    pub classification: Classification,
    pub manifests: Vec<PathBuf>,
    pub metadata_source: MetadataSource,
}

/// Read manifests matching `patterns` and the project's metadata, then
/// classify them.
///
/// `build_metadata` is asked only when no file declares the dependencies
/// statically.
pub fn classify_project<F>(
    root: &Path,
    patterns: &[String],
    build_metadata: F,
) -> Result<ProjectRequirements>
where
    F: FnOnce(&Path) -> Result<ProjectMetadata>,
{
    let manifests = find_manifests(root, patterns)?;
    let mut entries = Vec::new();
    for path in &manifests {
        entries.extend(read_manifest(path)?);
    }

    let metadata = match read_project_metadata(root) {
        Err(FloorError::MetadataNotFound { .. }) => build_metadata(root)?,
        other => other?,
    };
    let classification = classify(entries, metadata.requirements);

    Ok(ProjectRequirements {
        classification,
        manifests,
        metadata_source: metadata.source,
    })
}
