//! Delegation to the combinatorial solver.
//!
//! The solver only ever sees package names, integer candidate IDs, and
//! ranges over those IDs; everything about versions, sources, and registries
//! stays on this side of the seam. The solver runs on a blocking thread
//! under a wall-clock deadline checked on every version choice. Conflicts
//! and timeouts both come back as "no solution".

use crate::types::{ResolveError, Result};
use crate::universe::{CandidateEntry, Universe};
use partita_config::SolveStrategy;
use partita_core::AHashSet;
use pubgrub::{
    Dependencies, DependencyConstraints, DependencyProvider, PackageResolutionStatistics,
    PubGrubError, resolve,
};
use std::cmp::Reverse;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};
use version_ranges::Ranges;

/// Reasons the provider aborts the solver from the inside.
#[derive(Debug, Clone)]
pub enum SolverInterrupt {
    /// The wall-clock budget ran out.
    Timeout,
}

impl fmt::Display for SolverInterrupt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => write!(f, "solver timed out"),
        }
    }
}

impl std::error::Error for SolverInterrupt {}

/// Dependency provider over a built [`Universe`].
pub struct UniverseProvider {
    universe: Arc<Universe>,
    strategy: SolveStrategy,
    /// Candidate IDs present in a previous installation.
    preferred: AHashSet<u32>,
    deadline: Instant,
}

impl fmt::Debug for UniverseProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UniverseProvider")
            .field("strategy", &self.strategy)
            .field("preferred", &self.preferred.len())
            .finish_non_exhaustive()
    }
}

impl UniverseProvider {
    /// Create a provider with a deadline.
    #[must_use]
    pub fn new(
        universe: Arc<Universe>,
        strategy: SolveStrategy,
        preferred: AHashSet<u32>,
        deadline: Instant,
    ) -> Self {
        Self {
            universe,
            strategy,
            preferred,
            deadline,
        }
    }

    /// Order candidates by strategy, most preferred first.
    fn order(&self, entries: &mut Vec<&CandidateEntry>) {
        match self.strategy {
            SolveStrategy::Initial => {
                entries.sort_by(|a, b| b.rank.cmp(&a.rank));
            }
            SolveStrategy::GreatestOverlap => {
                entries.sort_by(|a, b| {
                    let a_kept = self.preferred.contains(&a.id);
                    let b_kept = self.preferred.contains(&b.id);
                    b_kept.cmp(&a_kept).then_with(|| b.rank.cmp(&a.rank))
                });
            }
        }
    }
}

impl DependencyProvider for UniverseProvider {
    type P = String;
    type V = u32;
    type VS = Ranges<u32>;
    type M = String;
    type Err = SolverInterrupt;
    type Priority = Reverse<usize>;

    fn prioritize(
        &self,
        package: &String,
        range: &Ranges<u32>,
        _stats: &PackageResolutionStatistics,
    ) -> Reverse<usize> {
        // Fewest in-range candidates first.
        let count = self
            .universe
            .candidates_of(package)
            .iter()
            .filter(|entry| range.contains(&entry.id))
            .count();
        Reverse(count)
    }

    fn choose_version(
        &self,
        package: &String,
        range: &Ranges<u32>,
    ) -> std::result::Result<Option<u32>, SolverInterrupt> {
        if Instant::now() >= self.deadline {
            return Err(SolverInterrupt::Timeout);
        }

        // Universe construction rejects requirements naming the root, so the
        // root name can only ever mean the synthetic root itself here.
        if package == self.universe.root_name() {
            let root = self.universe.root_id();
            return Ok(range.contains(&root).then_some(root));
        }

        let mut entries: Vec<&CandidateEntry> = self
            .universe
            .candidates_of(package)
            .iter()
            .filter(|entry| range.contains(&entry.id))
            .collect();
        self.order(&mut entries);

        trace!(package = %package, candidates = entries.len(), "choosing version");
        Ok(entries.first().map(|entry| entry.id))
    }

    fn get_dependencies(
        &self,
        package: &String,
        version: &u32,
    ) -> std::result::Result<Dependencies<String, Ranges<u32>, String>, SolverInterrupt> {
        let Some(record) = self.universe.record(*version) else {
            warn!(package = %package, id = version, "no record for chosen candidate");
            return Ok(Dependencies::Unavailable(
                "candidate missing from universe".to_string(),
            ));
        };

        let mut constraints: DependencyConstraints<String, Ranges<u32>> =
            DependencyConstraints::default();
        for (name, ranges) in &record.dependencies {
            constraints.insert(name.clone(), ranges.clone());
        }
        Ok(Dependencies::Available(constraints))
    }
}

/// Run the solver over `universe`, returning the selected candidate IDs.
///
/// `Ok(None)` covers both a genuine conflict and a timeout; the caller
/// cannot distinguish them and is not meant to.
///
/// # Errors
/// Returns an error only if the blocking task fails to run.
pub async fn solve(
    universe: Arc<Universe>,
    strategy: SolveStrategy,
    preferred: AHashSet<u32>,
    timeout: Duration,
) -> Result<Option<Vec<u32>>> {
    let root_name = universe.root_name().to_string();
    let root_id = universe.root_id();
    let provider = UniverseProvider::new(universe, strategy, preferred, Instant::now() + timeout);

    let outcome = tokio::task::spawn_blocking(move || {
        match resolve(&provider, root_name.clone(), root_id) {
            Ok(selected) => {
                let ids: Vec<u32> = selected
                    .into_iter()
                    .filter(|(name, _)| *name != root_name)
                    .map(|(_, id)| id)
                    .collect();
                Some(ids)
            }
            Err(PubGrubError::NoSolution(_)) => {
                debug!("no solution exists");
                None
            }
            Err(PubGrubError::ErrorChoosingVersion { package, source }) => {
                debug!(package = %package, reason = %source, "solver interrupted");
                None
            }
            Err(e) => {
                warn!(error = %e, "solver failed");
                None
            }
        }
    })
    .await
    .map_err(|e| ResolveError::Internal {
        message: format!("solver task failed: {e}"),
    })?;

    Ok(outcome)
}
