//! Registry and source-host clients for the Partita dependency resolver.
//!
//! Each package source gets its own backend behind a trait seam:
//! - npm-style registries ([`NpmRegistry`], packument-based)
//! - opam-style registries ([`OpamRegistry`], index plus per-version fetch)
//! - pinned GitHub sources ([`SourceHost`])
//! - local path sources ([`LocalSource`])
//!
//! All HTTP traffic goes through one shared [`HttpClient`] with retry and
//! statistics. [`MemoryRegistry`] is an in-memory fake of the trait seams
//! for tests.

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod error;
pub mod github;
pub mod local;
pub mod manifest;
pub mod memory;
pub mod npm;
pub mod opam;

pub use client::{HttpClient, HttpClientConfig, HttpClientStats};
pub use error::{RegistryError, Result};
pub use github::{GithubHost, SourceHost};
pub use local::LocalSource;
pub use manifest::RawManifest;
pub use memory::{MemoryRegistry, MemoryStats};
pub use npm::{HttpNpmRegistry, NpmRegistry, Packument};
pub use opam::{HttpOpamRegistry, OpamRegistry};

use partita_config::Config;
use std::sync::Arc;

/// Every backend the resolver needs, bundled.
#[derive(Debug, Clone)]
pub struct Registries {
    /// npm registry backend.
    pub npm: Arc<dyn NpmRegistry>,
    /// opam registry backend.
    pub opam: Arc<dyn OpamRegistry>,
    /// Pinned source host backend.
    pub source: Arc<dyn SourceHost>,
    /// Local path source.
    pub local: Arc<LocalSource>,
}

impl Registries {
    /// Build HTTP-backed registries from configuration.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn from_config(config: &Config) -> Result<Self> {
        let http = Arc::new(HttpClient::with_config(HttpClientConfig {
            max_retries: config.http_retries as usize,
            ..HttpClientConfig::default()
        })?);

        Ok(Self {
            npm: Arc::new(HttpNpmRegistry::new(
                config.npm_registry_url.clone(),
                Arc::clone(&http),
            )),
            opam: Arc::new(HttpOpamRegistry::new(
                config.opam_registry_url.clone(),
                Arc::clone(&http),
            )),
            source: Arc::new(GithubHost::new(
                config.github_raw_url.clone(),
                Arc::clone(&http),
            )),
            local: Arc::new(LocalSource::new()),
        })
    }

    /// Build registries where every backend is the same in-memory fake.
    #[must_use]
    pub fn in_memory(registry: Arc<MemoryRegistry>) -> Self {
        Self {
            npm: Arc::clone(&registry) as Arc<dyn NpmRegistry>,
            opam: Arc::clone(&registry) as Arc<dyn OpamRegistry>,
            source: registry as Arc<dyn SourceHost>,
            local: Arc::new(LocalSource::new()),
        }
    }
}
