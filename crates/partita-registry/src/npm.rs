//! npm registry client.
//!
//! Version listings and manifests both come out of the packument (the
//! per-package document the registry serves at `/{name}`), so one fetch
//! serves every version of a package. Packuments are cached and concurrent
//! fetches of the same package are deduplicated.

use crate::client::HttpClient;
use crate::error::{RegistryError, Result};
use crate::manifest::RawManifest;
use async_trait::async_trait;
use moka::future::Cache;
use partita_core::Version;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;
use url::Url;

/// Read access to an npm-style registry.
#[async_trait]
pub trait NpmRegistry: Send + Sync + fmt::Debug {
    /// All published versions of `name`, ascending.
    async fn versions(&self, name: &str) -> Result<Vec<semver::Version>>;

    /// The manifest of `name` at exactly `version`.
    async fn manifest(&self, name: &str, version: &semver::Version)
    -> Result<partita_core::Package>;
}

/// A packument: every version's manifest under one document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Packument {
    /// Version string to manifest body.
    #[serde(default)]
    pub versions: BTreeMap<String, RawManifest>,
}

/// HTTP-backed npm registry client.
pub struct HttpNpmRegistry {
    base: Url,
    http: Arc<HttpClient>,
    packuments: Cache<String, Arc<Packument>>,
}

impl fmt::Debug for HttpNpmRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpNpmRegistry")
            .field("base", &self.base)
            .finish()
    }
}

impl HttpNpmRegistry {
    /// Create a client against `base`.
    #[must_use]
    pub fn new(base: Url, http: Arc<HttpClient>) -> Self {
        Self {
            base,
            http,
            packuments: Cache::new(10_000),
        }
    }

    fn packument_url(&self, name: &str) -> Result<Url> {
        // Scoped names keep the slash percent-encoded in the registry path.
        let encoded = name.replace('/', "%2F");
        self.base
            .join(&encoded)
            .map_err(|e| RegistryError::InvalidUrl {
                url: format!("{}/{name}", self.base),
                message: e.to_string(),
            })
    }

    async fn packument(&self, name: &str) -> Result<Arc<Packument>> {
        let url = self.packument_url(name)?;
        self.packuments
            .try_get_with(name.to_string(), async {
                debug!(package = %name, "fetching packument");
                let packument: Packument = match self.http.get_json(&url).await {
                    Ok(p) => p,
                    Err(RegistryError::Network {
                        status: Some(404), ..
                    }) => {
                        return Err(RegistryError::PackageNotFound {
                            name: name.to_string(),
                        });
                    }
                    Err(e) => return Err(e),
                };
                Ok(Arc::new(packument))
            })
            .await
            .map_err(|e: Arc<RegistryError>| (*e).clone())
    }
}

#[async_trait]
impl NpmRegistry for HttpNpmRegistry {
    async fn versions(&self, name: &str) -> Result<Vec<semver::Version>> {
        let packument = self.packument(name).await?;
        let mut versions: Vec<semver::Version> = packument
            .versions
            .keys()
            .filter_map(|v| semver::Version::parse(v).ok())
            .collect();
        versions.sort();
        Ok(versions)
    }

    async fn manifest(
        &self,
        name: &str,
        version: &semver::Version,
    ) -> Result<partita_core::Package> {
        let packument = self.packument(name).await?;
        let raw = packument.versions.get(&version.to_string()).ok_or_else(|| {
            RegistryError::VersionNotFound {
                name: name.to_string(),
                version: version.to_string(),
            }
        })?;
        raw.clone().into_package(name, Version::Npm(version.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn registry_with(server: &MockServer) -> HttpNpmRegistry {
        let base = Url::parse(&server.uri()).unwrap();
        HttpNpmRegistry::new(base, Arc::new(HttpClient::new().unwrap()))
    }

    #[tokio::test]
    async fn versions_are_sorted_ascending() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/lodash"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "versions": {
                    "4.17.0": {"version": "4.17.0"},
                    "1.0.0": {"version": "1.0.0"},
                    "2.4.1": {"version": "2.4.1"}
                }
            })))
            .mount(&server)
            .await;

        let registry = registry_with(&server).await;
        let versions = registry.versions("lodash").await.unwrap();
        let strings: Vec<String> = versions.iter().map(ToString::to_string).collect();
        assert_eq!(strings, vec!["1.0.0", "2.4.1", "4.17.0"]);
    }

    #[tokio::test]
    async fn packument_is_fetched_once_for_versions_and_manifest() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/react"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "versions": {
                    "17.0.2": {
                        "version": "17.0.2",
                        "dependencies": {"object-assign": "^4.1.1"}
                    }
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let registry = registry_with(&server).await;
        registry.versions("react").await.unwrap();
        let pkg = registry
            .manifest("react", &semver::Version::parse("17.0.2").unwrap())
            .await
            .unwrap();
        assert_eq!(pkg.name, "react");
        assert_eq!(pkg.dependencies.len(), 1);
    }

    #[tokio::test]
    async fn missing_package_maps_to_package_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/no-such-package"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let registry = registry_with(&server).await;
        let err = registry.versions("no-such-package").await.unwrap_err();
        assert!(matches!(err, RegistryError::PackageNotFound { .. }));
    }

    #[tokio::test]
    async fn missing_version_maps_to_version_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/lodash"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "versions": {"4.17.0": {"version": "4.17.0"}}
            })))
            .mount(&server)
            .await;

        let registry = registry_with(&server).await;
        let err = registry
            .manifest("lodash", &semver::Version::parse("9.9.9").unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::VersionNotFound { .. }));
    }
}
