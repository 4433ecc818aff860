//! opam registry client.
//!
//! The opam side is two-step: a per-package index lists known versions, and
//! each version's manifest is fetched separately. Names here are the plain
//! opam names; the returned packages carry the `@opam/` scope so they share
//! one namespace with npm packages downstream.

use crate::client::HttpClient;
use crate::error::{RegistryError, Result};
use crate::manifest::RawManifest;
use async_trait::async_trait;
use moka::future::Cache;
use partita_core::{OPAM_SCOPE, Version};
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;
use tracing::debug;
use url::Url;

/// Read access to an opam-style registry.
#[async_trait]
pub trait OpamRegistry: Send + Sync + fmt::Debug {
    /// All published versions of the plain opam name `name`, ascending.
    async fn versions(&self, name: &str) -> Result<Vec<semver::Version>>;

    /// The manifest of `name` at exactly `version`, scoped under `@opam/`.
    async fn manifest(&self, name: &str, version: &semver::Version)
    -> Result<partita_core::Package>;
}

/// Per-package index entry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OpamIndexEntry {
    /// Known version strings.
    #[serde(default)]
    pub versions: Vec<String>,
}

/// HTTP-backed opam registry client.
pub struct HttpOpamRegistry {
    base: Url,
    http: Arc<HttpClient>,
    index: Cache<String, Arc<Vec<semver::Version>>>,
}

impl fmt::Debug for HttpOpamRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpOpamRegistry")
            .field("base", &self.base)
            .finish()
    }
}

impl HttpOpamRegistry {
    /// Create a client against `base`.
    #[must_use]
    pub fn new(base: Url, http: Arc<HttpClient>) -> Self {
        Self {
            base,
            http,
            index: Cache::new(10_000),
        }
    }

    fn url(&self, segments: &str) -> Result<Url> {
        self.base
            .join(segments)
            .map_err(|e| RegistryError::InvalidUrl {
                url: format!("{}/{segments}", self.base),
                message: e.to_string(),
            })
    }
}

#[async_trait]
impl OpamRegistry for HttpOpamRegistry {
    async fn versions(&self, name: &str) -> Result<Vec<semver::Version>> {
        let url = self.url(&format!("packages/{name}"))?;
        let versions = self
            .index
            .try_get_with(name.to_string(), async {
                debug!(package = %name, "fetching opam index entry");
                let entry: OpamIndexEntry = match self.http.get_json(&url).await {
                    Ok(entry) => entry,
                    Err(RegistryError::Network {
                        status: Some(404), ..
                    }) => {
                        return Err(RegistryError::PackageNotFound {
                            name: format!("{OPAM_SCOPE}{name}"),
                        });
                    }
                    Err(e) => return Err(e),
                };
                let mut versions: Vec<semver::Version> = entry
                    .versions
                    .iter()
                    .filter_map(|v| semver::Version::parse(v).ok())
                    .collect();
                versions.sort();
                Ok(Arc::new(versions))
            })
            .await
            .map_err(|e: Arc<RegistryError>| (*e).clone())?;
        Ok(versions.as_ref().clone())
    }

    async fn manifest(
        &self,
        name: &str,
        version: &semver::Version,
    ) -> Result<partita_core::Package> {
        let scoped = format!("{OPAM_SCOPE}{name}");
        let url = self.url(&format!("packages/{name}/{version}"))?;
        debug!(package = %scoped, version = %version, "fetching opam manifest");
        let raw: RawManifest = match self.http.get_json(&url).await {
            Ok(raw) => raw,
            Err(RegistryError::Network {
                status: Some(404), ..
            }) => {
                return Err(RegistryError::VersionNotFound {
                    name: scoped,
                    version: version.to_string(),
                });
            }
            Err(e) => return Err(e),
        };
        raw.into_package(&scoped, Version::Opam(version.clone()))
    }
}
