//! Requirement parsing and classification.
//!
//! # Modules
//!
//! - [`version`] - PEP 440 versions and their ordering
//! - [`specifier`] - Version constraints (`>=1.0,<2`)
//! - [`requirement`] - PEP 508 requirement lines and name canonicalization
//! - [`manifest`] - Requirements files and glob discovery
//! - [`metadata`] - The project's declared install requirements
//! - [`classifier`] - Fixed/variable partition

pub mod classifier;
pub mod manifest;
pub mod metadata;
pub mod requirement;
pub mod specifier;
pub mod version;

pub use classifier::{classify, classify_project, Classification, FixedSet, ProjectRequirements};
pub use manifest::{find_manifests, parse_manifest, read_manifest, ManifestEntry};
pub use metadata::{metadata_from_core, read_project_metadata, MetadataSource, ProjectMetadata};
pub use requirement::{canonicalize_name, is_pip_directive, Requirement};
pub use specifier::{Operator, Specifier, SpecifierSet};
pub use version::{PreKind, Version};
