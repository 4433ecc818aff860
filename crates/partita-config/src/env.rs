//! Environment variable overrides.

use std::path::PathBuf;

/// Well-known environment variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartitaEnvVar {
    /// `PARTITA_NPM_REGISTRY` - npm registry base URL.
    NpmRegistry,
    /// `PARTITA_OPAM_REGISTRY` - opam registry base URL.
    OpamRegistry,
    /// `PARTITA_GITHUB_RAW` - raw GitHub manifest host.
    GithubRaw,
    /// `PARTITA_CACHE_DIR` - on-disk cache directory.
    CacheDir,
    /// `PARTITA_SOLVER_TIMEOUT` - solver timeout in seconds.
    SolverTimeout,
    /// `PARTITA_STRATEGY` - candidate ordering strategy.
    Strategy,
    /// `PARTITA_HTTP_RETRIES` - max retry attempts for transient failures.
    HttpRetries,
}

impl PartitaEnvVar {
    /// The environment variable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NpmRegistry => "PARTITA_NPM_REGISTRY",
            Self::OpamRegistry => "PARTITA_OPAM_REGISTRY",
            Self::GithubRaw => "PARTITA_GITHUB_RAW",
            Self::CacheDir => "PARTITA_CACHE_DIR",
            Self::SolverTimeout => "PARTITA_SOLVER_TIMEOUT",
            Self::Strategy => "PARTITA_STRATEGY",
            Self::HttpRetries => "PARTITA_HTTP_RETRIES",
        }
    }

    /// The value from the environment, if set.
    #[must_use]
    pub fn get(self) -> Option<String> {
        std::env::var(self.as_str()).ok()
    }

    /// The value parsed as an unsigned integer.
    #[must_use]
    pub fn as_u64(self) -> Option<u64> {
        self.get().and_then(|v| v.parse().ok())
    }

    /// The value as a path.
    #[must_use]
    pub fn as_path(self) -> Option<PathBuf> {
        self.get().map(PathBuf::from)
    }
}

/// Snapshot of environment overrides.
#[derive(Debug, Clone, Default)]
pub struct EnvOverrides {
    /// npm registry base URL.
    pub npm_registry: Option<String>,
    /// opam registry base URL.
    pub opam_registry: Option<String>,
    /// Raw GitHub manifest host.
    pub github_raw: Option<String>,
    /// On-disk cache directory.
    pub cache_dir: Option<PathBuf>,
    /// Solver timeout in seconds.
    pub solver_timeout: Option<u64>,
    /// Candidate ordering strategy.
    pub strategy: Option<String>,
    /// Max retry attempts for transient failures.
    pub http_retries: Option<u64>,
}

impl EnvOverrides {
    /// Read overrides from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            npm_registry: PartitaEnvVar::NpmRegistry.get(),
            opam_registry: PartitaEnvVar::OpamRegistry.get(),
            github_raw: PartitaEnvVar::GithubRaw.get(),
            cache_dir: PartitaEnvVar::CacheDir.as_path(),
            solver_timeout: PartitaEnvVar::SolverTimeout.as_u64(),
            strategy: PartitaEnvVar::Strategy.get(),
            http_retries: PartitaEnvVar::HttpRetries.as_u64(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_var_names() {
        assert_eq!(PartitaEnvVar::NpmRegistry.as_str(), "PARTITA_NPM_REGISTRY");
        assert_eq!(PartitaEnvVar::SolverTimeout.as_str(), "PARTITA_SOLVER_TIMEOUT");
        assert_eq!(PartitaEnvVar::Strategy.as_str(), "PARTITA_STRATEGY");
    }
}
