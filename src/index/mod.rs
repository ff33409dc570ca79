//! Package index access and the version oracle.
//!
//! - [`pypi`] - JSON API client for a PyPI-compatible index
//! - [`oracle`] - Ordered, filtered candidate lists per dependency

pub mod oracle;
pub mod pypi;

pub use oracle::VersionOracle;
pub use pypi::{PypiClient, DEFAULT_INDEX_URL};

use crate::error::Result;
use crate::requirements::Version;

/// Something that knows which releases exist for a package.
pub trait VersionSource {
    /// All installable releases of `name`, in any order.
    ///
    /// Fails with [`crate::FloorError::PackageNotFound`] when the index does
    /// not know the name.
    fn releases(&self, name: &str) -> Result<Vec<Version>>;
}
