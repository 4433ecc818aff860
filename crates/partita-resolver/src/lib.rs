//! The Partita dependency resolution engine.
//!
//! Resolution runs in four phases:
//! 1. Discovery: each requirement becomes a list of concrete candidate
//!    versions ([`VersionDiscovery`]), with manifests fetched at most once
//!    through the compute-once [`ManifestCache`].
//! 2. Universe construction: a deduplicated depth-first traversal registers
//!    every reachable candidate and translates dependency constraints to
//!    integer candidate IDs ([`UniverseBuilder`], [`VersionIdMap`]).
//! 3. Solving: the universe is handed to an external combinatorial solver
//!    under a wall-clock budget, with candidate ordering controlled by
//!    [`SolveStrategy`].
//! 4. Mapping: selected IDs come back through the ID map and the cache into
//!    a sorted [`Resolution`].

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod cache;
pub mod discovery;
pub mod ids;
pub mod resolver;
pub mod solver;
pub mod types;
pub mod universe;

pub use cache::{ManifestCache, ManifestCacheStats};
pub use discovery::{Candidate, CandidateRank, VersionDiscovery};
pub use ids::VersionIdMap;
pub use partita_config::SolveStrategy;
pub use resolver::{Resolver, ResolverStats};
pub use solver::{SolverInterrupt, UniverseProvider};
pub use types::{Resolution, ResolveError, Result};
pub use universe::{CandidateEntry, SolverRecord, Universe, UniverseBuilder};
