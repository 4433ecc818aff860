//! Configuration errors.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("cannot read config file {path}: {message}")]
    Io {
        /// File path.
        path: PathBuf,
        /// Underlying message.
        message: String,
    },

    /// The configuration file is not valid JSON.
    #[error("invalid config file {path}: {message}")]
    Parse {
        /// File path.
        path: PathBuf,
        /// Parser message.
        message: String,
    },

    /// A field failed validation.
    #[error("invalid config value for '{key}': {message}")]
    Invalid {
        /// Configuration key.
        key: String,
        /// What went wrong.
        message: String,
    },
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
