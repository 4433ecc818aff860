//! Manifest fetching from pinned GitHub sources.

use crate::client::HttpClient;
use crate::error::{RegistryError, Result};
use crate::manifest::RawManifest;
use async_trait::async_trait;
use partita_core::{SourceSpec, Version};
use std::fmt;
use std::sync::Arc;
use tracing::debug;
use url::Url;

/// Read access to manifests hosted in pinned source repositories.
#[async_trait]
pub trait SourceHost: Send + Sync + fmt::Debug {
    /// The manifest of `name` at `user/repo` pinned to `reference`.
    async fn manifest(
        &self,
        name: &str,
        user: &str,
        repo: &str,
        reference: &str,
    ) -> Result<partita_core::Package>;
}

/// Fetches `package.json` from raw.githubusercontent.com-style hosts.
pub struct GithubHost {
    base: Url,
    http: Arc<HttpClient>,
}

impl fmt::Debug for GithubHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GithubHost").field("base", &self.base).finish()
    }
}

impl GithubHost {
    /// Create a host client against `base`.
    #[must_use]
    pub fn new(base: Url, http: Arc<HttpClient>) -> Self {
        Self { base, http }
    }
}

#[async_trait]
impl SourceHost for GithubHost {
    async fn manifest(
        &self,
        name: &str,
        user: &str,
        repo: &str,
        reference: &str,
    ) -> Result<partita_core::Package> {
        let path = format!("{user}/{repo}/{reference}/package.json");
        let url = self.base.join(&path).map_err(|e| RegistryError::InvalidUrl {
            url: format!("{}/{path}", self.base),
            message: e.to_string(),
        })?;

        debug!(package = %name, user = %user, repo = %repo, reference = %reference, "fetching source manifest");
        let raw: RawManifest = match self.http.get_json(&url).await {
            Ok(raw) => raw,
            Err(RegistryError::Network {
                status: Some(404), ..
            }) => {
                return Err(RegistryError::PackageNotFound {
                    name: format!("github:{user}/{repo}#{reference}"),
                });
            }
            Err(e) => return Err(e),
        };

        let version = Version::Source(SourceSpec::Github {
            user: user.to_string(),
            repo: repo.to_string(),
            reference: Some(reference.to_string()),
        });
        raw.into_package(name, version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn fetches_manifest_at_pinned_reference() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/acme/widgets/abc123/package.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "widgets",
                "dependencies": {"react": "^17.0.0"}
            })))
            .mount(&server)
            .await;

        let host = GithubHost::new(
            Url::parse(&server.uri()).unwrap(),
            Arc::new(HttpClient::new().unwrap()),
        );
        let pkg = host
            .manifest("example", "acme", "widgets", "abc123")
            .await
            .unwrap();
        assert_eq!(pkg.name, "example");
        assert_eq!(
            pkg.version.to_string(),
            "github:acme/widgets#abc123"
        );
        assert_eq!(pkg.dependencies.len(), 1);
    }

    #[tokio::test]
    async fn missing_repo_maps_to_package_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ghost/repo/main/package.json"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let host = GithubHost::new(
            Url::parse(&server.uri()).unwrap(),
            Arc::new(HttpClient::new().unwrap()),
        );
        let err = host.manifest("x", "ghost", "repo", "main").await.unwrap_err();
        assert!(matches!(err, RegistryError::PackageNotFound { .. }));
    }
}
