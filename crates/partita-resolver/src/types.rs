//! Resolution results and resolver errors.

use partita_core::Package;
use partita_registry::RegistryError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A complete, consistent package selection.
///
/// One entry per package name, sorted by name. The synthetic root is never
/// included.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    /// Selected packages with their full manifests.
    pub packages: Vec<Package>,
}

impl Resolution {
    /// Whether nothing was selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// The selected package under `name`, if any.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Package> {
        self.packages.iter().find(|p| p.name == name)
    }
}

/// Errors raised while constructing the candidate universe or mapping the
/// solver's answer back to packages.
///
/// "No solution exists" is not an error; it surfaces as `Ok(None)` from the
/// resolver. Errors here mean the question could not even be posed.
#[derive(Debug, Clone, Error)]
pub enum ResolveError {
    /// A registry operation failed while processing a requirement.
    #[error("while resolving {requirement}: {source}")]
    Registry {
        /// The requirement being processed, as a breadcrumb.
        requirement: String,
        /// The underlying registry failure.
        #[source]
        source: RegistryError,
    },

    /// A requirement's source kind cannot be resolved.
    #[error("unsupported requirement {requirement}: {reason}")]
    UnsupportedSpec {
        /// The offending requirement.
        requirement: String,
        /// Why it cannot be resolved.
        reason: String,
    },

    /// The solver selected a package the universe has no record of.
    #[error("solver selected unknown package {name}@{version}")]
    MissingPackage {
        /// Package name.
        name: String,
        /// Selected version.
        version: String,
    },

    /// An internal invariant was broken.
    #[error("internal resolver error: {message}")]
    Internal {
        /// What went wrong.
        message: String,
    },
}

impl ResolveError {
    pub(crate) fn registry(requirement: impl ToString, source: RegistryError) -> Self {
        Self::Registry {
            requirement: requirement.to_string(),
            source,
        }
    }
}

/// Result type for resolver operations.
pub type Result<T> = std::result::Result<T, ResolveError>;
