//! Resolver configuration types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

use crate::error::ConfigError;

/// Default npm registry endpoint.
pub const DEFAULT_NPM_REGISTRY: &str = "https://registry.npmjs.org";

/// Default opam registry endpoint.
pub const DEFAULT_OPAM_REGISTRY: &str = "https://opam.ocaml.org";

/// Default host for fetching manifests out of pinned GitHub sources.
pub const DEFAULT_GITHUB_RAW: &str = "https://raw.githubusercontent.com";

/// Default solver wall-clock budget, in seconds.
pub const DEFAULT_SOLVER_TIMEOUT_SECS: u64 = 5;

/// Candidate ordering strategy handed to the solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SolveStrategy {
    /// Prefer the highest-ranked candidate of each package.
    #[default]
    #[serde(rename = "initial")]
    Initial,
    /// Prefer versions already present in a previous installation, then rank.
    #[serde(rename = "greatestOverlap")]
    GreatestOverlap,
}

impl SolveStrategy {
    /// The wire name of this strategy.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Initial => "initial",
            Self::GreatestOverlap => "greatestOverlap",
        }
    }
}

impl FromStr for SolveStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "initial" => Ok(Self::Initial),
            "greatestOverlap" => Ok(Self::GreatestOverlap),
            other => Err(ConfigError::Invalid {
                key: "strategy".to_string(),
                message: format!("unknown strategy '{other}', expected 'initial' or 'greatestOverlap'"),
            }),
        }
    }
}

impl fmt::Display for SolveStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fully resolved configuration handed to the resolver.
#[derive(Debug, Clone)]
pub struct Config {
    /// npm registry base URL.
    pub npm_registry_url: Url,
    /// opam registry base URL.
    pub opam_registry_url: Url,
    /// Base URL for raw manifest fetches from pinned GitHub sources.
    pub github_raw_url: Url,
    /// Optional on-disk cache directory for registry payloads.
    pub cache_dir: Option<PathBuf>,
    /// Solver wall-clock budget.
    pub solver_timeout: Duration,
    /// Candidate ordering strategy.
    pub strategy: SolveStrategy,
    /// Maximum retry attempts for transient HTTP failures.
    pub http_retries: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            npm_registry_url: Url::parse(DEFAULT_NPM_REGISTRY).expect("default URL is valid"),
            opam_registry_url: Url::parse(DEFAULT_OPAM_REGISTRY).expect("default URL is valid"),
            github_raw_url: Url::parse(DEFAULT_GITHUB_RAW).expect("default URL is valid"),
            cache_dir: None,
            solver_timeout: Duration::from_secs(DEFAULT_SOLVER_TIMEOUT_SECS),
            strategy: SolveStrategy::default(),
            http_retries: 2,
        }
    }
}

/// On-disk configuration file shape (`partita.json`).
///
/// All fields are optional; anything absent falls back to defaults or
/// environment overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct FileConfig {
    /// npm registry base URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub npm_registry: Option<String>,

    /// opam registry base URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opam_registry: Option<String>,

    /// Base URL for raw GitHub manifest fetches.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github_raw: Option<String>,

    /// On-disk cache directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<PathBuf>,

    /// Solver timeout in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solver_timeout: Option<u64>,

    /// Candidate ordering strategy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<SolveStrategy>,

    /// Maximum retry attempts for transient HTTP failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_retries: Option<u32>,
}
