//! Resolved package manifests.

use crate::requirement::Requirement;
use crate::version::Version;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The (name, version) identity of a package within a resolution run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PackageKey {
    /// Package name.
    pub name: String,
    /// Concrete version.
    pub version: Version,
}

impl fmt::Display for PackageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.version)
    }
}

/// A fully resolved package manifest.
///
/// Immutable once constructed; the manifest cache owns the canonical copy and
/// hands out shared references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    /// Package name.
    pub name: String,
    /// Concrete version.
    pub version: Version,
    /// Declared dependency requirements.
    pub dependencies: Vec<Requirement>,
}

impl Package {
    /// Create a package manifest.
    #[must_use]
    pub const fn new(name: String, version: Version, dependencies: Vec<Requirement>) -> Self {
        Self {
            name,
            version,
            dependencies,
        }
    }

    /// The (name, version) key for this package.
    #[must_use]
    pub fn key(&self) -> PackageKey {
        PackageKey {
            name: self.name.clone(),
            version: self.version.clone(),
        }
    }
}

impl fmt::Display for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_identifies_name_and_version() {
        let pkg = Package::new(
            "lodash".into(),
            Version::Npm(semver::Version::parse("4.17.0").unwrap()),
            vec![],
        );
        let key = pkg.key();
        assert_eq!(key.to_string(), "lodash@4.17.0");
        assert_eq!(key, pkg.key());
    }
}
