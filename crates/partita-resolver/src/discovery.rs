//! Candidate version discovery.
//!
//! Turns a requirement into the concrete versions that could satisfy it.
//! Registry formulas produce every matching published version; pinned
//! sources produce exactly one candidate; unresolvable source kinds are
//! rejected here, before the solver ever runs.

use crate::types::{ResolveError, Result};
use partita_core::{Requirement, SourceSpec, Version, VersionSpec, opam_name};
use partita_registry::Registries;
use tracing::debug;

/// How strongly a candidate should be preferred within its package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CandidateRank {
    /// Position in the registry's ascending version list; higher is newer.
    Registry(u32),
    /// An exact pin; there is nothing to rank against.
    Pinned,
}

/// One version that could satisfy a requirement.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// The concrete version.
    pub version: Version,
    /// Preference rank.
    pub rank: CandidateRank,
}

/// Discovers candidates for requirements across all backends.
#[derive(Debug)]
pub struct VersionDiscovery {
    registries: Registries,
}

impl VersionDiscovery {
    /// Create a discovery layer over the given backends.
    #[must_use]
    pub const fn new(registries: Registries) -> Self {
        Self { registries }
    }

    /// All candidates satisfying `requirement`, oldest first.
    ///
    /// An empty result means the package exists but nothing matches; the
    /// solver turns that into an unsatisfiable outcome. An unknown package
    /// or an unresolvable source kind is an error here.
    ///
    /// # Errors
    /// Returns an error if the registry fails, the package is unknown, or
    /// the requirement's source kind cannot be resolved.
    pub async fn candidates(&self, requirement: &Requirement) -> Result<Vec<Candidate>> {
        match &requirement.spec {
            VersionSpec::Npm(formula) => {
                let versions = self
                    .registries
                    .npm
                    .versions(&requirement.name)
                    .await
                    .map_err(|e| ResolveError::registry(requirement, e))?;
                Ok(Self::rank_matching(versions, |v| formula.matches(v), Version::Npm))
            }
            VersionSpec::Opam(formula) => {
                let versions = self
                    .registries
                    .opam
                    .versions(opam_name(&requirement.name))
                    .await
                    .map_err(|e| ResolveError::registry(requirement, e))?;
                Ok(Self::rank_matching(versions, |v| formula.matches(v), Version::Opam))
            }
            VersionSpec::Exact(version) => Ok(vec![Candidate {
                version: version.clone(),
                rank: CandidateRank::Pinned,
            }]),
            VersionSpec::Source(spec) => self.source_candidate(requirement, spec),
        }
    }

    fn source_candidate(
        &self,
        requirement: &Requirement,
        spec: &SourceSpec,
    ) -> Result<Vec<Candidate>> {
        match spec {
            SourceSpec::Github {
                reference: Some(_), ..
            }
            | SourceSpec::LocalPath(_) => Ok(vec![Candidate {
                version: Version::Source(spec.clone()),
                rank: CandidateRank::Pinned,
            }]),
            SourceSpec::Github {
                reference: None, ..
            } => Err(ResolveError::UnsupportedSpec {
                requirement: requirement.to_string(),
                reason: "github sources must pin a commit, tag, or branch".to_string(),
            }),
            SourceSpec::Git(_) | SourceSpec::Archive(_) | SourceSpec::NoSource => {
                Err(ResolveError::UnsupportedSpec {
                    requirement: requirement.to_string(),
                    reason: format!("source kind '{spec}' cannot be resolved"),
                })
            }
        }
    }

    /// Rank matching versions by their position in the full ascending list.
    fn rank_matching(
        versions: Vec<semver::Version>,
        matches: impl Fn(&semver::Version) -> bool,
        wrap: impl Fn(semver::Version) -> Version,
    ) -> Vec<Candidate> {
        let candidates: Vec<Candidate> = versions
            .into_iter()
            .enumerate()
            .filter(|(_, v)| matches(v))
            .map(|(index, v)| Candidate {
                version: wrap(v),
                rank: CandidateRank::Registry(u32::try_from(index).unwrap_or(u32::MAX)),
            })
            .collect();
        debug!(count = candidates.len(), "candidates discovered");
        candidates
    }

    /// Shared access to the underlying backends.
    #[must_use]
    pub const fn registries(&self) -> &Registries {
        &self.registries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use partita_core::Package;
    use partita_registry::MemoryRegistry;
    use std::sync::Arc;

    fn npm_pkg(name: &str, version: &str) -> Package {
        Package::new(
            name.to_string(),
            Version::Npm(semver::Version::parse(version).unwrap()),
            vec![],
        )
    }

    fn discovery_with(registry: &Arc<MemoryRegistry>) -> VersionDiscovery {
        VersionDiscovery::new(Registries::in_memory(Arc::clone(registry)))
    }

    #[tokio::test]
    async fn npm_candidates_filter_by_formula_and_keep_registry_rank() {
        let registry = Arc::new(MemoryRegistry::new());
        registry.add_npm(npm_pkg("lodash", "3.0.0"));
        registry.add_npm(npm_pkg("lodash", "4.17.0"));
        registry.add_npm(npm_pkg("lodash", "4.17.1"));

        let discovery = discovery_with(&registry);
        let req = Requirement::parse("lodash", "^4.0.0").unwrap();
        let candidates = discovery.candidates(&req).await.unwrap();

        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].rank, CandidateRank::Registry(1));
        assert_eq!(candidates[1].rank, CandidateRank::Registry(2));
        assert_eq!(candidates[1].version.to_string(), "4.17.1");
    }

    #[tokio::test]
    async fn no_matching_version_yields_empty_not_error() {
        let registry = Arc::new(MemoryRegistry::new());
        registry.add_npm(npm_pkg("bar", "1.0.0"));

        let discovery = discovery_with(&registry);
        let req = Requirement::parse("bar", "^99.0.0").unwrap();
        let candidates = discovery.candidates(&req).await.unwrap();
        assert!(candidates.is_empty());
    }

    #[tokio::test]
    async fn unknown_package_is_an_error() {
        let registry = Arc::new(MemoryRegistry::new());
        let discovery = discovery_with(&registry);
        let req = Requirement::parse("ghost", "^1.0.0").unwrap();
        let err = discovery.candidates(&req).await.unwrap_err();
        assert!(matches!(err, ResolveError::Registry { .. }));
        assert!(err.to_string().contains("ghost@^1.0.0"));
    }

    #[tokio::test]
    async fn pinned_github_is_a_single_candidate() {
        let registry = Arc::new(MemoryRegistry::new());
        let discovery = discovery_with(&registry);
        let req = Requirement::parse("fastify", "github:fastify/fastify#abc123").unwrap();
        let candidates = discovery.candidates(&req).await.unwrap();

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].rank, CandidateRank::Pinned);
        assert!(candidates[0].version.is_source());
    }

    #[tokio::test]
    async fn refless_github_is_rejected_before_solving() {
        let registry = Arc::new(MemoryRegistry::new());
        let discovery = discovery_with(&registry);
        let req = Requirement::parse("foo", "github:user/repo").unwrap();
        let err = discovery.candidates(&req).await.unwrap_err();
        assert!(matches!(err, ResolveError::UnsupportedSpec { .. }));
    }

    #[tokio::test]
    async fn opam_candidates_use_unscoped_name() {
        let registry = Arc::new(MemoryRegistry::new());
        registry.add_opam(Package::new(
            "@opam/dune".into(),
            Version::Opam(semver::Version::parse("2.9.1").unwrap()),
            vec![],
        ));

        let discovery = discovery_with(&registry);
        let req = Requirement::parse("@opam/dune", "*").unwrap();
        let candidates = discovery.candidates(&req).await.unwrap();
        assert_eq!(candidates.len(), 1);
        assert!(matches!(candidates[0].version, Version::Opam(_)));
    }
}
