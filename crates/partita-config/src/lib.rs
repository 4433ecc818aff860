//! Configuration for the Partita dependency resolver.
//!
//! Configuration merges three layers, lowest to highest precedence:
//! built-in defaults, a project-local `partita.json`, and `PARTITA_*`
//! environment variables.

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod env;
pub mod error;
pub mod loader;
pub mod types;

pub use env::{EnvOverrides, PartitaEnvVar};
pub use error::{ConfigError, Result};
pub use loader::{CONFIG_FILE_NAME, ConfigLoader};
pub use types::{Config, FileConfig, SolveStrategy};
