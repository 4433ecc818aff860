//! Caller-supplied exact-version overrides.
//!
//! A resolutions map forces a package name to one exact version, taking
//! precedence over whatever formula any manifest in the graph declares for
//! that name. The rewrite must run at every level of the traversal, not only
//! at the root: any name anywhere in the graph may be overridden.

use crate::requirement::{Requirement, VersionSpec};
use crate::version::Version;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// Map from package name to a forced exact version.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Resolutions {
    forced: AHashMap<String, Version>,
}

impl Resolutions {
    /// An empty override set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Force `name` to exactly `version`.
    pub fn force(&mut self, name: impl Into<String>, version: Version) {
        self.forced.insert(name.into(), version);
    }

    /// The forced version for `name`, if any.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Version> {
        self.forced.get(name)
    }

    /// Rewrite a requirement: if its name is overridden, the override replaces
    /// the constraint entirely; otherwise the requirement passes through.
    #[must_use]
    pub fn rewrite(&self, requirement: Requirement) -> Requirement {
        match self.forced.get(&requirement.name) {
            Some(version) => Requirement {
                name: requirement.name,
                spec: VersionSpec::Exact(version.clone()),
            },
            None => requirement,
        }
    }

    /// Whether any overrides are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.forced.is_empty()
    }
}

impl FromIterator<(String, Version)> for Resolutions {
    fn from_iter<I: IntoIterator<Item = (String, Version)>>(iter: I) -> Self {
        Self {
            forced: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn npm(s: &str) -> Version {
        Version::Npm(semver::Version::parse(s).unwrap())
    }

    #[test]
    fn rewrite_replaces_constraint_entirely() {
        let mut resolutions = Resolutions::new();
        resolutions.force("react", npm("16.0.0"));

        let req = Requirement::parse("react", "^17.0.0").unwrap();
        let rewritten = resolutions.rewrite(req);
        assert_eq!(rewritten.spec, VersionSpec::Exact(npm("16.0.0")));
    }

    #[test]
    fn survives_a_serde_round_trip() {
        let mut resolutions = Resolutions::new();
        resolutions.force("react", npm("16.0.0"));

        let json = serde_json::to_string(&resolutions).unwrap();
        let restored: Resolutions = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.get("react"), Some(&npm("16.0.0")));
    }

    #[test]
    fn rewrite_passes_through_other_names() {
        let mut resolutions = Resolutions::new();
        resolutions.force("react", npm("16.0.0"));

        let req = Requirement::parse("lodash", "^4.17.0").unwrap();
        let rewritten = resolutions.rewrite(req.clone());
        assert_eq!(rewritten, req);
    }
}
