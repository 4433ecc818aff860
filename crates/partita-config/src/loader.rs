//! Configuration loading with layered merging.
//!
//! Precedence, lowest to highest: built-in defaults, `partita.json` in the
//! project directory, `PARTITA_*` environment variables.

use crate::env::EnvOverrides;
use crate::error::{ConfigError, Result};
use crate::types::{Config, FileConfig, SolveStrategy};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Name of the project-local configuration file.
pub const CONFIG_FILE_NAME: &str = "partita.json";

/// Loads and merges configuration for a project directory.
#[derive(Debug)]
pub struct ConfigLoader {
    project_dir: PathBuf,
    env: EnvOverrides,
}

impl ConfigLoader {
    /// Create a loader rooted at `project_dir`, snapshotting the environment.
    #[must_use]
    pub fn new(project_dir: impl Into<PathBuf>) -> Self {
        Self {
            project_dir: project_dir.into(),
            env: EnvOverrides::from_env(),
        }
    }

    /// Create a loader with explicit environment overrides, for tests.
    #[must_use]
    pub fn with_env(project_dir: impl Into<PathBuf>, env: EnvOverrides) -> Self {
        Self {
            project_dir: project_dir.into(),
            env,
        }
    }

    /// Path to the project configuration file.
    #[must_use]
    pub fn config_path(&self) -> PathBuf {
        self.project_dir.join(CONFIG_FILE_NAME)
    }

    /// Load, merge, and validate configuration.
    ///
    /// # Errors
    /// Returns an error if the config file exists but is unreadable or
    /// invalid, or if a merged value fails validation.
    pub fn load(&self) -> Result<Config> {
        let mut config = Config::default();

        if let Some(file) = self.load_file()? {
            apply_file(&mut config, &file)?;
        }
        self.apply_env(&mut config)?;

        Ok(config)
    }

    fn load_file(&self) -> Result<Option<FileConfig>> {
        let path = self.config_path();
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::Io {
            path: path.clone(),
            message: e.to_string(),
        })?;
        let file = serde_json::from_str(&content).map_err(|e| ConfigError::Parse {
            path,
            message: e.to_string(),
        })?;
        Ok(Some(file))
    }

    fn apply_env(&self, config: &mut Config) -> Result<()> {
        if let Some(ref raw) = self.env.npm_registry {
            config.npm_registry_url = parse_url("PARTITA_NPM_REGISTRY", raw)?;
        }
        if let Some(ref raw) = self.env.opam_registry {
            config.opam_registry_url = parse_url("PARTITA_OPAM_REGISTRY", raw)?;
        }
        if let Some(ref raw) = self.env.github_raw {
            config.github_raw_url = parse_url("PARTITA_GITHUB_RAW", raw)?;
        }
        if let Some(ref dir) = self.env.cache_dir {
            config.cache_dir = Some(self.resolve_path(dir));
        }
        if let Some(secs) = self.env.solver_timeout {
            config.solver_timeout = Duration::from_secs(secs);
        }
        if let Some(ref raw) = self.env.strategy {
            config.strategy = raw.parse().map_err(|_| ConfigError::Invalid {
                key: "PARTITA_STRATEGY".to_string(),
                message: format!("unknown strategy '{raw}'"),
            })?;
        }
        if let Some(retries) = self.env.http_retries {
            config.http_retries = u32::try_from(retries).map_err(|_| ConfigError::Invalid {
                key: "PARTITA_HTTP_RETRIES".to_string(),
                message: format!("value {retries} out of range"),
            })?;
        }
        Ok(())
    }

    fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project_dir.join(path)
        }
    }

    /// The project directory this loader is rooted at.
    #[must_use]
    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }
}

fn apply_file(config: &mut Config, file: &FileConfig) -> Result<()> {
    if let Some(ref raw) = file.npm_registry {
        config.npm_registry_url = parse_url("npm-registry", raw)?;
    }
    if let Some(ref raw) = file.opam_registry {
        config.opam_registry_url = parse_url("opam-registry", raw)?;
    }
    if let Some(ref raw) = file.github_raw {
        config.github_raw_url = parse_url("github-raw", raw)?;
    }
    if let Some(ref dir) = file.cache_dir {
        config.cache_dir = Some(dir.clone());
    }
    if let Some(secs) = file.solver_timeout {
        config.solver_timeout = Duration::from_secs(secs);
    }
    if let Some(strategy) = file.strategy {
        config.strategy = strategy;
    }
    if let Some(retries) = file.http_retries {
        config.http_retries = retries;
    }
    Ok(())
}

fn parse_url(key: &str, raw: &str) -> Result<Url> {
    Url::parse(raw).map_err(|e| ConfigError::Invalid {
        key: key.to_string(),
        message: e.to_string(),
    })
}
