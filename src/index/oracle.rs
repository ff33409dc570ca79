//! Candidate version lists.

use super::VersionSource;
use crate::error::Result;
use crate::requirements::{SpecifierSet, Version};

/// Turns raw index listings into the ascending candidate list searched for
/// one dependency.
pub struct VersionOracle<S> {
    source: S,
    prereleases: bool,
}

impl<S: VersionSource> VersionOracle<S> {
    /// Create an oracle over `source`. Pre-releases are excluded unless
    /// `prereleases` is set or a specifier names one.
    pub fn new(source: S, prereleases: bool) -> Self {
        Self {
            source,
            prereleases,
        }
    }

    /// Known releases of `name`, ascending.
    ///
    /// With `extend` the declared `specifier` is ignored so the search can
    /// walk below a declared floor or an `==` pin.
    pub fn versions(
        &self,
        name: &str,
        specifier: &SpecifierSet,
        extend: bool,
    ) -> Result<Vec<Version>> {
        let releases = self.source.releases(name)?;
        let total = releases.len();

        let mut versions: Vec<Version> = if extend {
            let allow_pre = self.prereleases;
            releases
                .into_iter()
                .filter(|v| allow_pre || !v.is_prerelease())
                .collect()
        } else {
            releases
                .into_iter()
                .filter(|v| specifier.contains(v, self.prereleases))
                .collect()
        };
        versions.sort();
        versions.dedup();

        tracing::info!("Fetched {}: {}/{} allowed", name, versions.len(), total);
        Ok(versions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FloorError;

    struct StaticSource(Vec<&'static str>);

    impl VersionSource for StaticSource {
        fn releases(&self, name: &str) -> Result<Vec<Version>> {
            if name == "missing" {
                return Err(FloorError::PackageNotFound {
                    name: name.to_string(),
                });
            }
            Ok(self.0.iter().map(|s| s.parse().unwrap()).collect())
        }
    }

    fn oracle(prereleases: bool) -> VersionOracle<StaticSource> {
        VersionOracle::new(
            StaticSource(vec!["2.0", "1.0", "1.2", "2.1b1", "1.1", "1.0.0", "0.9"]),
            prereleases,
        )
    }

    fn listed(versions: Vec<Version>) -> Vec<String> {
        versions.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn sorted_and_filtered_by_specifier() {
        let specs: SpecifierSet = ">=1.0,<2".parse().unwrap();
        let versions = oracle(false).versions("pkg", &specs, false).unwrap();
        assert_eq!(listed(versions), vec!["1.0", "1.1", "1.2"]);
    }

    #[test]
    fn no_specifier_lists_all_final_releases() {
        let versions = oracle(false)
            .versions("pkg", &SpecifierSet::empty(), false)
            .unwrap();
        assert_eq!(listed(versions), vec!["0.9", "1.0", "1.1", "1.2", "2.0"]);
    }

    #[test]
    fn prereleases_when_requested() {
        let versions = oracle(true)
            .versions("pkg", &SpecifierSet::empty(), false)
            .unwrap();
        assert_eq!(listed(versions).last().map(String::as_str), Some("2.1b1"));
    }

    #[test]
    fn extend_ignores_pin() {
        let specs: SpecifierSet = "==1.2".parse().unwrap();
        let pinned = oracle(false).versions("pkg", &specs, false).unwrap();
        assert_eq!(listed(pinned), vec!["1.2"]);

        let extended = oracle(false).versions("pkg", &specs, true).unwrap();
        assert_eq!(listed(extended), vec!["0.9", "1.0", "1.1", "1.2", "2.0"]);
    }

    #[test]
    fn unknown_name_propagates() {
        let err = oracle(false)
            .versions("missing", &SpecifierSet::empty(), false)
            .unwrap_err();
        assert!(matches!(err, FloorError::PackageNotFound { .. }));
    }
}
