//! The resolution engine facade.

use crate::cache::{ManifestCache, ManifestCacheStats};
use crate::discovery::VersionDiscovery;
use crate::solver;
use crate::types::{Resolution, ResolveError, Result};
use crate::universe::UniverseBuilder;
use partita_config::Config;
use partita_core::{AHashSet, Package, PackageKey, Requirement, Resolutions, SourceSpec, Version};
use partita_registry::Registries;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info};

/// Counters for one resolver's lifetime.
#[derive(Debug, Default)]
pub struct ResolverStats {
    /// Resolution runs started.
    pub runs: AtomicU64,
    /// Runs that produced a solution.
    pub solutions: AtomicU64,
    /// Runs where no solution existed within budget.
    pub no_solution: AtomicU64,
    /// Packages registered across all universes built.
    pub packages_registered: AtomicU64,
}

/// Resolves requirement sets into consistent package selections.
///
/// One resolver owns one manifest cache; repeated runs against the same
/// resolver reuse every manifest already fetched.
#[derive(Debug)]
pub struct Resolver {
    cache: ManifestCache,
    discovery: VersionDiscovery,
    config: Config,
    stats: Arc<ResolverStats>,
}

impl Resolver {
    /// Create a resolver over the given backends.
    #[must_use]
    pub fn new(registries: Registries, config: Config) -> Self {
        Self {
            cache: ManifestCache::new(registries.clone()),
            discovery: VersionDiscovery::new(registries),
            config,
            stats: Arc::new(ResolverStats::default()),
        }
    }

    /// Resolve `requirements` into a consistent selection.
    ///
    /// Returns `Ok(None)` when no consistent selection exists within the
    /// solver budget. An empty requirement set resolves to an empty
    /// selection without touching any registry or the solver.
    ///
    /// # Errors
    /// Returns an error if the candidate universe cannot be built: registry
    /// failures, unknown packages, or unresolvable source kinds.
    pub async fn resolve(
        &self,
        root_name: &str,
        requirements: &[Requirement],
        resolutions: &Resolutions,
    ) -> Result<Option<Resolution>> {
        self.resolve_with(root_name, requirements, resolutions, &[])
            .await
    }

    /// Like [`resolve`](Self::resolve), additionally preferring versions
    /// from `previous` when the strategy is `greatestOverlap`.
    ///
    /// # Errors
    /// Same as [`resolve`](Self::resolve).
    pub async fn resolve_with(
        &self,
        root_name: &str,
        requirements: &[Requirement],
        resolutions: &Resolutions,
        previous: &[PackageKey],
    ) -> Result<Option<Resolution>> {
        if requirements.is_empty() {
            debug!("no requirements, resolution is trivially empty");
            return Ok(Some(Resolution::default()));
        }

        self.stats.runs.fetch_add(1, Ordering::Relaxed);
        info!(
            root = %root_name,
            requirements = requirements.len(),
            strategy = %self.config.strategy,
            "resolving"
        );

        let root = Package::new(
            root_name.to_string(),
            Version::Source(SourceSpec::NoSource),
            requirements.to_vec(),
        );
        let universe = UniverseBuilder::new(&self.cache, &self.discovery, resolutions)
            .build(root)
            .await?;
        let universe = Arc::new(universe);
        self.stats
            .packages_registered
            .fetch_add(universe.package_count() as u64, Ordering::Relaxed);

        let preferred: AHashSet<u32> = previous
            .iter()
            .filter_map(|key| universe.ids().get(key))
            .collect();

        let Some(ids) = solver::solve(
            Arc::clone(&universe),
            self.config.strategy,
            preferred,
            self.config.solver_timeout,
        )
        .await?
        else {
            self.stats.no_solution.fetch_add(1, Ordering::Relaxed);
            return Ok(None);
        };

        let mut packages = Vec::with_capacity(ids.len());
        for id in ids {
            let record = universe.record(id).ok_or_else(|| {
                let key = universe.ids().key_for(id);
                ResolveError::MissingPackage {
                    name: key.map_or_else(|| format!("#{id}"), |k| k.name.clone()),
                    version: key.map_or_else(String::new, |k| k.version.to_string()),
                }
            })?;
            packages.push(record.package.as_ref().clone());
        }
        packages.sort_by(|a, b| a.name.cmp(&b.name));

        self.stats.solutions.fetch_add(1, Ordering::Relaxed);
        info!(selected = packages.len(), "resolution complete");
        Ok(Some(Resolution { packages }))
    }

    /// Resolver counters.
    #[must_use]
    pub fn stats(&self) -> &ResolverStats {
        &self.stats
    }

    /// Manifest cache counters.
    #[must_use]
    pub fn cache_stats(&self) -> &ManifestCacheStats {
        self.cache.stats()
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }
}
