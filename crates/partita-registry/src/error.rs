//! Registry client errors.
//!
//! Errors are `Clone` so they can be shared across concurrent waiters of a
//! deduplicated fetch; underlying causes are captured as messages.

use thiserror::Error;

/// Errors raised by registry and source-host clients.
#[derive(Debug, Clone, Error)]
pub enum RegistryError {
    /// A network request failed.
    #[error("request to {url} failed: {message}")]
    Network {
        /// Request URL.
        url: String,
        /// Failure message.
        message: String,
        /// HTTP status code, when the server responded.
        status: Option<u16>,
    },

    /// A URL could not be constructed.
    #[error("invalid URL {url}: {message}")]
    InvalidUrl {
        /// The offending URL.
        url: String,
        /// Parser message.
        message: String,
    },

    /// The registry has no package under this name.
    #[error("package '{name}' not found")]
    PackageNotFound {
        /// Requested package name.
        name: String,
    },

    /// The registry knows the package but not this version.
    #[error("version {version} of '{name}' not found")]
    VersionNotFound {
        /// Package name.
        name: String,
        /// Requested version.
        version: String,
    },

    /// A fetched manifest could not be decoded or normalized.
    #[error("invalid manifest for {package}: {message}")]
    InvalidManifest {
        /// The package the manifest belongs to.
        package: String,
        /// What was wrong with it.
        message: String,
    },

    /// A local filesystem read failed.
    #[error("cannot read {path}: {message}")]
    Io {
        /// Path that failed.
        path: String,
        /// Underlying message.
        message: String,
    },

    /// Client construction or configuration failed.
    #[error("invalid client configuration: {message}")]
    InvalidConfig {
        /// What was wrong.
        message: String,
    },
}

impl RegistryError {
    /// Whether retrying the request might succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::Network { status, .. } => match status {
                Some(code) => *code >= 500 || *code == 429,
                // Timeouts and connection failures carry no status.
                None => true,
            },
            _ => false,
        }
    }
}

/// Result type for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;
