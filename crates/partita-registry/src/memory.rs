//! In-memory registry fake.
//!
//! Implements every backend trait over plain maps, counting fetches so
//! callers can assert on how often they hit the registry. Used by resolver
//! tests; never talks to the network.

use crate::error::{RegistryError, Result};
use crate::github::SourceHost;
use crate::npm::NpmRegistry;
use crate::opam::OpamRegistry;
use async_trait::async_trait;
use partita_core::{AHashMap, OPAM_SCOPE, Package};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Fetch counters for the fake registry.
#[derive(Debug, Default)]
pub struct MemoryStats {
    /// npm version listings served.
    pub npm_version_lists: AtomicU64,
    /// npm manifests served.
    pub npm_manifests: AtomicU64,
    /// opam version listings served.
    pub opam_version_lists: AtomicU64,
    /// opam manifests served.
    pub opam_manifests: AtomicU64,
    /// Source-host manifests served.
    pub source_manifests: AtomicU64,
}

impl MemoryStats {
    /// Total manifest fetches across all backends.
    #[must_use]
    pub fn total_manifests(&self) -> u64 {
        self.npm_manifests.load(Ordering::Relaxed)
            + self.opam_manifests.load(Ordering::Relaxed)
            + self.source_manifests.load(Ordering::Relaxed)
    }
}

/// In-memory implementation of all registry backends.
#[derive(Debug, Default)]
pub struct MemoryRegistry {
    npm: RwLock<AHashMap<String, BTreeMap<semver::Version, Package>>>,
    opam: RwLock<AHashMap<String, BTreeMap<semver::Version, Package>>>,
    sources: RwLock<AHashMap<(String, String, String), Package>>,
    /// Fetch counters.
    pub stats: MemoryStats,
}

impl MemoryRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish an npm package. The package version must be an npm version.
    pub fn add_npm(&self, package: Package) {
        if let Some(version) = package.version.semver().cloned() {
            self.npm
                .write()
                .entry(package.name.clone())
                .or_default()
                .insert(version, package);
        }
    }

    /// Publish an opam package under its plain (unscoped) name.
    pub fn add_opam(&self, package: Package) {
        let plain = package
            .name
            .strip_prefix(OPAM_SCOPE)
            .unwrap_or(&package.name)
            .to_string();
        if let Some(version) = package.version.semver().cloned() {
            self.opam
                .write()
                .entry(plain)
                .or_default()
                .insert(version, package);
        }
    }

    /// Publish a source-hosted package at a pinned reference.
    pub fn add_source(&self, user: &str, repo: &str, reference: &str, package: Package) {
        self.sources.write().insert(
            (user.to_string(), repo.to_string(), reference.to_string()),
            package,
        );
    }
}

#[async_trait]
impl NpmRegistry for MemoryRegistry {
    async fn versions(&self, name: &str) -> Result<Vec<semver::Version>> {
        self.stats.npm_version_lists.fetch_add(1, Ordering::Relaxed);
        let npm = self.npm.read();
        let entry = npm.get(name).ok_or_else(|| RegistryError::PackageNotFound {
            name: name.to_string(),
        })?;
        Ok(entry.keys().cloned().collect())
    }

    async fn manifest(&self, name: &str, version: &semver::Version) -> Result<Package> {
        self.stats.npm_manifests.fetch_add(1, Ordering::Relaxed);
        let npm = self.npm.read();
        let entry = npm.get(name).ok_or_else(|| RegistryError::PackageNotFound {
            name: name.to_string(),
        })?;
        entry
            .get(version)
            .cloned()
            .ok_or_else(|| RegistryError::VersionNotFound {
                name: name.to_string(),
                version: version.to_string(),
            })
    }
}

#[async_trait]
impl OpamRegistry for MemoryRegistry {
    async fn versions(&self, name: &str) -> Result<Vec<semver::Version>> {
        self.stats
            .opam_version_lists
            .fetch_add(1, Ordering::Relaxed);
        let opam = self.opam.read();
        let entry = opam
            .get(name)
            .ok_or_else(|| RegistryError::PackageNotFound {
                name: format!("{OPAM_SCOPE}{name}"),
            })?;
        Ok(entry.keys().cloned().collect())
    }

    async fn manifest(&self, name: &str, version: &semver::Version) -> Result<Package> {
        self.stats.opam_manifests.fetch_add(1, Ordering::Relaxed);
        let opam = self.opam.read();
        let entry = opam
            .get(name)
            .ok_or_else(|| RegistryError::PackageNotFound {
                name: format!("{OPAM_SCOPE}{name}"),
            })?;
        entry
            .get(version)
            .cloned()
            .ok_or_else(|| RegistryError::VersionNotFound {
                name: format!("{OPAM_SCOPE}{name}"),
                version: version.to_string(),
            })
    }
}

#[async_trait]
impl SourceHost for MemoryRegistry {
    async fn manifest(
        &self,
        _name: &str,
        user: &str,
        repo: &str,
        reference: &str,
    ) -> Result<Package> {
        self.stats.source_manifests.fetch_add(1, Ordering::Relaxed);
        let key = (user.to_string(), repo.to_string(), reference.to_string());
        self.sources
            .read()
            .get(&key)
            .cloned()
            .ok_or_else(|| RegistryError::PackageNotFound {
                name: format!("github:{user}/{repo}#{reference}"),
            })
    }
}
