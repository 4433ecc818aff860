//! Manifest loading from local path sources.

use crate::error::{RegistryError, Result};
use crate::manifest::RawManifest;
use partita_core::{SourceSpec, Version};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Loads manifests for path-pinned packages off the local filesystem.
#[derive(Debug, Default)]
pub struct LocalSource {
    /// Directory relative paths resolve against; defaults to the process cwd.
    root: Option<PathBuf>,
}

impl LocalSource {
    /// Create a source resolving relative paths against the process cwd.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a source resolving relative paths against `root`.
    #[must_use]
    pub fn rooted_at(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        match (&self.root, path.is_absolute()) {
            (Some(root), false) => root.join(path),
            _ => path.to_path_buf(),
        }
    }

    /// The manifest of `name` at the package directory `path`.
    ///
    /// # Errors
    /// Returns an error if the directory has no readable `package.json` or
    /// the manifest fails to normalize.
    pub async fn manifest(&self, name: &str, path: &Path) -> Result<partita_core::Package> {
        let manifest_path = self.resolve(path).join("package.json");
        debug!(package = %name, path = %manifest_path.display(), "reading local manifest");

        let content = match tokio::fs::read(&manifest_path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(RegistryError::PackageNotFound {
                    name: format!("path:{}", path.display()),
                });
            }
            Err(e) => {
                return Err(RegistryError::Io {
                    path: manifest_path.display().to_string(),
                    message: e.to_string(),
                });
            }
        };

        let raw: RawManifest =
            serde_json::from_slice(&content).map_err(|e| RegistryError::InvalidManifest {
                package: name.to_string(),
                message: e.to_string(),
            })?;

        let version = Version::Source(SourceSpec::LocalPath(path.to_path_buf()));
        raw.into_package(name, version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reads_manifest_from_package_directory() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(
            dir.path().join("package.json"),
            r#"{"name": "my-lib", "dependencies": {"lodash": "^4.0.0"}}"#,
        )
        .await
        .unwrap();

        let source = LocalSource::new();
        let pkg = source.manifest("my-lib", dir.path()).await.unwrap();
        assert_eq!(pkg.name, "my-lib");
        assert!(pkg.version.is_source());
        assert_eq!(pkg.dependencies.len(), 1);
    }

    #[tokio::test]
    async fn missing_directory_maps_to_package_not_found() {
        let source = LocalSource::new();
        let err = source
            .manifest("ghost", Path::new("/no/such/partita/dir"))
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::PackageNotFound { .. }));
    }
}
