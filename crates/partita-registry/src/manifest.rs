//! Raw manifest decoding and normalization.
//!
//! Registries hand back loosely structured JSON manifests; normalization
//! turns them into the strict [`Package`] model, parsing every dependency
//! entry through the requirement grammar.

use crate::error::{RegistryError, Result};
use partita_core::{Package, Requirement, Version};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A manifest as decoded from registry JSON.
///
/// Unknown fields are ignored; dependency entries keep their declaration
/// source order stable via the sorted map.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawManifest {
    /// Declared package name, when present.
    pub name: Option<String>,
    /// Declared version string, when present.
    pub version: Option<String>,
    /// Declared dependencies, name to constraint string.
    pub dependencies: BTreeMap<String, String>,
}

impl RawManifest {
    /// Normalize into a [`Package`] under a known identity.
    ///
    /// The identity comes from the requirement that led here, not from the
    /// manifest body: a registry response for `name@version` is trusted to be
    /// that package even if the body declares something else.
    ///
    /// # Errors
    /// Returns an error if any dependency entry fails to parse.
    pub fn into_package(self, name: &str, version: Version) -> Result<Package> {
        let mut dependencies = Vec::with_capacity(self.dependencies.len());
        for (dep_name, constraint) in self.dependencies {
            let requirement =
                Requirement::parse(&dep_name, &constraint).map_err(|e| {
                    RegistryError::InvalidManifest {
                        package: format!("{name}@{version}"),
                        message: format!("dependency '{dep_name}': {e}"),
                    }
                })?;
            dependencies.push(requirement);
        }
        Ok(Package::new(name.to_string(), version, dependencies))
    }
}
