//! Candidate universe construction.
//!
//! The universe is everything the solver is allowed to know: every candidate
//! package version reachable from the root requirements, each with its
//! dependency constraints already translated to solver IDs. Construction is
//! a deduplicated depth-first traversal; a package's dependencies are always
//! visited (and their candidates registered) before the package's own record
//! is built, so constraint translation never sees an unknown requirement.
//! Any discovery or fetch failure aborts the build with the requirement that
//! caused it.

use crate::cache::ManifestCache;
use crate::discovery::{CandidateRank, VersionDiscovery};
use crate::ids::VersionIdMap;
use crate::types::{ResolveError, Result};
use partita_core::{AHashMap, AHashSet, Package, PackageKey, Requirement, Resolutions};
use std::sync::Arc;
use tracing::{debug, trace};
use version_ranges::Ranges;

/// One candidate of a package, in the per-name preference index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandidateEntry {
    /// Solver ID of this candidate.
    pub id: u32,
    /// Preference rank within the package.
    pub rank: CandidateRank,
}

/// A registered package with solver-ready dependency constraints.
#[derive(Debug)]
pub struct SolverRecord {
    /// The package manifest.
    pub package: Arc<Package>,
    /// Dependency name to the set of candidate IDs that satisfy it.
    pub dependencies: Vec<(String, Ranges<u32>)>,
}

/// The complete candidate universe for one resolution run.
#[derive(Debug)]
pub struct Universe {
    records: AHashMap<u32, SolverRecord>,
    candidates: AHashMap<String, Vec<CandidateEntry>>,
    ids: VersionIdMap,
    root_id: u32,
    root_name: String,
}

impl Universe {
    /// The record behind a solver ID.
    #[must_use]
    pub fn record(&self, id: u32) -> Option<&SolverRecord> {
        self.records.get(&id)
    }

    /// All candidates of `name`, in discovery order.
    #[must_use]
    pub fn candidates_of(&self, name: &str) -> &[CandidateEntry] {
        self.candidates.get(name).map_or(&[], Vec::as_slice)
    }

    /// The ID map used during construction.
    #[must_use]
    pub const fn ids(&self) -> &VersionIdMap {
        &self.ids
    }

    /// Solver ID of the synthetic root.
    #[must_use]
    pub const fn root_id(&self) -> u32 {
        self.root_id
    }

    /// Name of the synthetic root.
    #[must_use]
    pub fn root_name(&self) -> &str {
        &self.root_name
    }

    /// Number of registered packages, root included.
    #[must_use]
    pub fn package_count(&self) -> usize {
        self.records.len()
    }
}

enum Frame {
    /// Discover candidates for a requirement and descend into new packages.
    Visit(Requirement),
    /// Build the solver record for a package whose dependencies are done.
    Register(Arc<Package>),
}

/// Builds a [`Universe`] from a synthetic root package.
#[derive(Debug)]
pub struct UniverseBuilder<'a> {
    cache: &'a ManifestCache,
    discovery: &'a VersionDiscovery,
    resolutions: &'a Resolutions,
}

impl<'a> UniverseBuilder<'a> {
    /// Create a builder over the given collaborators.
    #[must_use]
    pub const fn new(
        cache: &'a ManifestCache,
        discovery: &'a VersionDiscovery,
        resolutions: &'a Resolutions,
    ) -> Self {
        Self {
            cache,
            discovery,
            resolutions,
        }
    }

    /// Build the universe reachable from `root`.
    ///
    /// # Errors
    /// Fails fast on the first discovery or fetch error, naming the
    /// requirement that caused it.
    pub async fn build(&self, root: Package) -> Result<Universe> {
        let root = Arc::new(root);
        let root_name = root.name.clone();

        let mut ids = VersionIdMap::new();
        let mut records: AHashMap<u32, SolverRecord> = AHashMap::new();
        let mut candidates: AHashMap<String, Vec<CandidateEntry>> = AHashMap::new();
        // Requirement to the candidate IDs that satisfy it.
        let mut memo: AHashMap<Requirement, Vec<u32>> = AHashMap::new();
        let mut seen: AHashSet<PackageKey> = AHashSet::new();

        let root_id = ids.id_for(&root.key());
        seen.insert(root.key());

        let mut stack: Vec<Frame> = vec![Frame::Register(Arc::clone(&root))];
        for dep in root.dependencies.iter().rev() {
            stack.push(Frame::Visit(dep.clone()));
        }

        while let Some(frame) = stack.pop() {
            match frame {
                Frame::Visit(requirement) => {
                    let requirement = self.resolutions.rewrite(requirement);
                    if memo.contains_key(&requirement) {
                        continue;
                    }
                    // The root name is reserved for the synthetic root; the
                    // solver identifies packages by name, so a dependency
                    // reusing it would collide with the root's record.
                    if requirement.name == root_name {
                        return Err(ResolveError::UnsupportedSpec {
                            requirement: requirement.to_string(),
                            reason: format!(
                                "requirement name collides with the resolution root '{root_name}'"
                            ),
                        });
                    }
                    trace!(requirement = %requirement, "visiting requirement");

                    let discovered = self.discovery.candidates(&requirement).await?;
                    let mut id_list = Vec::with_capacity(discovered.len());
                    for candidate in discovered {
                        let key = PackageKey {
                            name: requirement.name.clone(),
                            version: candidate.version,
                        };
                        let id = ids.id_for(&key);
                        id_list.push(id);

                        let per_name = candidates.entry(key.name.clone()).or_default();
                        if !per_name.iter().any(|entry| entry.id == id) {
                            per_name.push(CandidateEntry {
                                id,
                                rank: candidate.rank,
                            });
                        }

                        if seen.insert(key.clone()) {
                            let package = self.cache.fetch(&key.name, &key.version).await?;
                            stack.push(Frame::Register(Arc::clone(&package)));
                            for dep in package.dependencies.iter().rev() {
                                stack.push(Frame::Visit(dep.clone()));
                            }
                        }
                    }
                    memo.insert(requirement, id_list);
                }
                Frame::Register(package) => {
                    let id = ids.id_for(&package.key());
                    let mut dependencies = Vec::with_capacity(package.dependencies.len());
                    for dep in &package.dependencies {
                        let rewritten = self.resolutions.rewrite(dep.clone());
                        let candidate_ids =
                            memo.get(&rewritten).ok_or_else(|| ResolveError::Internal {
                                message: format!("requirement {rewritten} registered out of order"),
                            })?;
                        dependencies.push((rewritten.name, ids_to_ranges(candidate_ids)));
                    }
                    trace!(package = %package, id, "registering package");
                    records.insert(
                        id,
                        SolverRecord {
                            package,
                            dependencies,
                        },
                    );
                }
            }
        }

        debug!(
            packages = records.len(),
            names = candidates.len(),
            "universe built"
        );
        Ok(Universe {
            records,
            candidates,
            ids,
            root_id,
            root_name,
        })
    }
}

/// The union of singleton ranges over a list of candidate IDs.
fn ids_to_ranges(ids: &[u32]) -> Ranges<u32> {
    let mut ranges = Ranges::empty();
    for &id in ids {
        ranges = ranges.union(&Ranges::singleton(id));
    }
    ranges
}

#[cfg(test)]
mod tests {
    use super::*;
    use partita_core::{SourceSpec, Version};
    use partita_registry::{MemoryRegistry, Registries};
    use std::sync::atomic::Ordering;

    fn npm_version(s: &str) -> Version {
        Version::Npm(semver::Version::parse(s).unwrap())
    }

    fn npm_pkg(name: &str, version: &str, deps: &[(&str, &str)]) -> Package {
        let dependencies = deps
            .iter()
            .map(|(n, s)| Requirement::parse(n, s).unwrap())
            .collect();
        Package::new(name.to_string(), npm_version(version), dependencies)
    }

    fn root_pkg(deps: &[(&str, &str)]) -> Package {
        let dependencies = deps
            .iter()
            .map(|(n, s)| Requirement::parse(n, s).unwrap())
            .collect();
        Package::new(
            "root".to_string(),
            Version::Source(SourceSpec::NoSource),
            dependencies,
        )
    }

    struct Fixture {
        registry: Arc<MemoryRegistry>,
        cache: ManifestCache,
        discovery: VersionDiscovery,
    }

    impl Fixture {
        fn new(registry: Arc<MemoryRegistry>) -> Self {
            let registries = Registries::in_memory(Arc::clone(&registry));
            Self {
                registry,
                cache: ManifestCache::new(registries.clone()),
                discovery: VersionDiscovery::new(registries),
            }
        }

        async fn build(&self, root: Package, resolutions: &Resolutions) -> Result<Universe> {
            UniverseBuilder::new(&self.cache, &self.discovery, resolutions)
                .build(root)
                .await
        }
    }

    #[tokio::test]
    async fn diamond_dependency_is_registered_once() {
        let registry = Arc::new(MemoryRegistry::new());
        registry.add_npm(npm_pkg("lodash", "4.17.0", &[]));
        registry.add_npm(npm_pkg("a", "1.0.0", &[("lodash", "^4.17.0")]));
        registry.add_npm(npm_pkg("b", "1.0.0", &[("lodash", "^4.17.0")]));
        let fixture = Fixture::new(registry);

        let universe = fixture
            .build(
                root_pkg(&[("a", "^1.0.0"), ("b", "^1.0.0")]),
                &Resolutions::new(),
            )
            .await
            .unwrap();

        // root + a + b + lodash, lodash exactly once
        assert_eq!(universe.package_count(), 4);
        assert_eq!(universe.candidates_of("lodash").len(), 1);
        assert_eq!(
            fixture.registry.stats.npm_manifests.load(Ordering::Relaxed),
            3
        );
    }

    #[tokio::test]
    async fn dependencies_are_translated_to_candidate_ids() {
        let registry = Arc::new(MemoryRegistry::new());
        registry.add_npm(npm_pkg("lodash", "4.17.0", &[]));
        registry.add_npm(npm_pkg("lodash", "4.17.1", &[]));
        registry.add_npm(npm_pkg("a", "1.0.0", &[("lodash", "^4.17.0")]));
        let fixture = Fixture::new(registry);

        let universe = fixture
            .build(root_pkg(&[("a", "^1.0.0")]), &Resolutions::new())
            .await
            .unwrap();

        let a_id = universe.candidates_of("a")[0].id;
        let record = universe.record(a_id).unwrap();
        assert_eq!(record.dependencies.len(), 1);
        let (dep_name, ranges) = &record.dependencies[0];
        assert_eq!(dep_name, "lodash");
        for entry in universe.candidates_of("lodash") {
            assert!(ranges.contains(&entry.id));
        }
    }

    #[tokio::test]
    async fn resolutions_rewrite_applies_at_every_level() {
        let registry = Arc::new(MemoryRegistry::new());
        registry.add_npm(npm_pkg("react", "16.0.0", &[]));
        registry.add_npm(npm_pkg("react", "17.0.0", &[]));
        registry.add_npm(npm_pkg("mid", "1.0.0", &[("react", "^17.0.0")]));
        let fixture = Fixture::new(registry);

        let mut resolutions = Resolutions::new();
        resolutions.force("react", npm_version("16.0.0"));

        let universe = fixture
            .build(root_pkg(&[("mid", "^1.0.0")]), &resolutions)
            .await
            .unwrap();

        // The override replaces the ^17 constraint deep in the graph.
        let entries = universe.candidates_of("react");
        assert_eq!(entries.len(), 1);
        let key = universe.ids().key_for(entries[0].id).unwrap();
        assert_eq!(key.version, npm_version("16.0.0"));
    }

    #[tokio::test]
    async fn unknown_package_fails_the_whole_build() {
        let registry = Arc::new(MemoryRegistry::new());
        registry.add_npm(npm_pkg("a", "1.0.0", &[("ghost", "^1.0.0")]));
        let fixture = Fixture::new(registry);

        let err = fixture
            .build(root_pkg(&[("a", "^1.0.0")]), &Resolutions::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ResolveError::Registry { .. }));
    }

    #[tokio::test]
    async fn dependency_cycles_terminate() {
        let registry = Arc::new(MemoryRegistry::new());
        registry.add_npm(npm_pkg("a", "1.0.0", &[("b", "^1.0.0")]));
        registry.add_npm(npm_pkg("b", "1.0.0", &[("a", "^1.0.0")]));
        let fixture = Fixture::new(registry);

        let universe = fixture
            .build(root_pkg(&[("a", "^1.0.0")]), &Resolutions::new())
            .await
            .unwrap();
        assert_eq!(universe.package_count(), 3);
    }
}
