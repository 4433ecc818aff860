//! Compute-once manifest cache.
//!
//! Each `(name, version)` manifest is fetched at most once per resolver.
//! Concurrent requests for the same key share the in-flight fetch, and a
//! failed fetch is shared with every waiter rather than retried blindly.

use crate::types::{ResolveError, Result};
use moka::future::Cache;
use partita_core::{Package, PackageKey, SourceSpec, Version, opam_name};
use partita_registry::Registries;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::trace;

/// Manifest cache statistics.
#[derive(Debug, Default)]
pub struct ManifestCacheStats {
    /// Manifest fetches that actually hit a backend.
    pub fetches: AtomicU64,
    /// Lookups served, cached or not.
    pub lookups: AtomicU64,
}

/// Write-once cache of fetched manifests.
pub struct ManifestCache {
    registries: Registries,
    cache: Cache<PackageKey, Arc<Package>>,
    stats: Arc<ManifestCacheStats>,
}

impl std::fmt::Debug for ManifestCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManifestCache")
            .field("entries", &self.cache.entry_count())
            .finish()
    }
}

impl ManifestCache {
    /// Create a cache over the given backends.
    #[must_use]
    pub fn new(registries: Registries) -> Self {
        Self {
            registries,
            cache: Cache::new(100_000),
            stats: Arc::new(ManifestCacheStats::default()),
        }
    }

    /// The manifest of `name` at `version`, fetching on first request.
    ///
    /// # Errors
    /// Returns an error if the backend fetch fails or the version's source
    /// kind cannot be fetched from anywhere.
    pub async fn fetch(&self, name: &str, version: &Version) -> Result<Arc<Package>> {
        self.stats.lookups.fetch_add(1, Ordering::Relaxed);
        let key = PackageKey {
            name: name.to_string(),
            version: version.clone(),
        };
        self.cache
            .try_get_with(key.clone(), self.fetch_uncached(key.clone()))
            .await
            .map_err(|e: Arc<ResolveError>| (*e).clone())
    }

    /// Cache statistics.
    #[must_use]
    pub fn stats(&self) -> &ManifestCacheStats {
        &self.stats
    }

    async fn fetch_uncached(&self, key: PackageKey) -> Result<Arc<Package>> {
        self.stats.fetches.fetch_add(1, Ordering::Relaxed);
        trace!(package = %key, "fetching manifest");

        let package = match &key.version {
            Version::Npm(v) => self
                .registries
                .npm
                .manifest(&key.name, v)
                .await
                .map_err(|e| ResolveError::registry(&key, e))?,
            Version::Opam(v) => self
                .registries
                .opam
                .manifest(opam_name(&key.name), v)
                .await
                .map_err(|e| ResolveError::registry(&key, e))?,
            Version::Source(SourceSpec::Github {
                user,
                repo,
                reference: Some(reference),
            }) => self
                .registries
                .source
                .manifest(&key.name, user, repo, reference)
                .await
                .map_err(|e| ResolveError::registry(&key, e))?,
            Version::Source(SourceSpec::LocalPath(path)) => self
                .registries
                .local
                .manifest(&key.name, path)
                .await
                .map_err(|e| ResolveError::registry(&key, e))?,
            Version::Source(spec) => {
                return Err(ResolveError::UnsupportedSpec {
                    requirement: key.to_string(),
                    reason: format!("cannot fetch a manifest for source '{spec}'"),
                });
            }
        };

        Ok(Arc::new(package))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use partita_registry::MemoryRegistry;

    fn npm_version(s: &str) -> Version {
        Version::Npm(semver::Version::parse(s).unwrap())
    }

    fn cache_with(registry: &Arc<MemoryRegistry>) -> ManifestCache {
        ManifestCache::new(Registries::in_memory(Arc::clone(registry)))
    }

    #[tokio::test]
    async fn fetches_each_key_once() {
        let registry = Arc::new(MemoryRegistry::new());
        registry.add_npm(Package::new("lodash".into(), npm_version("4.17.0"), vec![]));
        let cache = cache_with(&registry);

        let first = cache.fetch("lodash", &npm_version("4.17.0")).await.unwrap();
        let second = cache.fetch("lodash", &npm_version("4.17.0")).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(registry.stats.npm_manifests.load(Ordering::Relaxed), 1);
        assert_eq!(cache.stats().lookups.load(Ordering::Relaxed), 2);
        assert_eq!(cache.stats().fetches.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn concurrent_fetches_share_one_backend_call() {
        let registry = Arc::new(MemoryRegistry::new());
        registry.add_npm(Package::new("react".into(), npm_version("17.0.2"), vec![]));
        let cache = Arc::new(cache_with(&registry));

        let tasks: Vec<_> = (0..16)
            .map(|_| {
                let cache = Arc::clone(&cache);
                tokio::spawn(async move { cache.fetch("react", &npm_version("17.0.2")).await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        assert_eq!(registry.stats.npm_manifests.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn unsupported_source_kind_is_rejected() {
        let registry = Arc::new(MemoryRegistry::new());
        let cache = cache_with(&registry);

        let version = Version::Source(SourceSpec::Github {
            user: "user".into(),
            repo: "repo".into(),
            reference: None,
        });
        let err = cache.fetch("foo", &version).await.unwrap_err();
        assert!(matches!(err, ResolveError::UnsupportedSpec { .. }));
    }

    #[tokio::test]
    async fn opam_fetch_strips_the_scope() {
        let registry = Arc::new(MemoryRegistry::new());
        registry.add_opam(Package::new(
            "@opam/dune".into(),
            Version::Opam(semver::Version::parse("2.9.1").unwrap()),
            vec![],
        ));
        let cache = cache_with(&registry);

        let pkg = cache
            .fetch(
                "@opam/dune",
                &Version::Opam(semver::Version::parse("2.9.1").unwrap()),
            )
            .await
            .unwrap();
        assert_eq!(pkg.name, "@opam/dune");
    }
}
