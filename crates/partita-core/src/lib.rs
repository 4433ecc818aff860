//! Core types for the Partita dependency resolver.
//!
//! This crate provides the foundational data model shared by the registry
//! clients and the resolution engine:
//! - Version identities across source kinds ([`Version`], [`SourceSpec`])
//! - DNF version formulas ([`VersionFormula`])
//! - Requirements and the requirement grammar ([`Requirement`], [`VersionSpec`])
//! - Package manifests ([`Package`], [`PackageKey`])
//! - Exact-version overrides ([`Resolutions`])

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
mod formula;
mod package;
mod requirement;
mod resolutions;
mod version;

pub use error::ParseError;
pub use formula::VersionFormula;
pub use package::{Package, PackageKey};
pub use requirement::{Requirement, VersionSpec};
pub use resolutions::Resolutions;
pub use version::{OPAM_SCOPE, SourceSpec, Version, opam_name};

// Re-export commonly used collection types
pub use ahash::{AHashMap, AHashSet};
