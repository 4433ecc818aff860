//! Disjunctive-normal-form version formulas.
//!
//! A formula is a disjunction of semver requirements: `^1.0 || >=2.1, <3`.
//! Each disjunct is itself a conjunction (semver's comma syntax), so the
//! whole formula is in DNF. A version satisfies the formula when any
//! disjunct accepts it.

use crate::error::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A DNF version formula over registry semantic versions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VersionFormula {
    disjuncts: Vec<semver::VersionReq>,
}

impl VersionFormula {
    /// Parse a formula, splitting disjuncts on `||`.
    ///
    /// # Errors
    /// Returns [`ParseError::InvalidFormula`] if any disjunct is not a valid
    /// semver requirement.
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        let disjuncts = input
            .split("||")
            .map(str::trim)
            .map(|part| {
                semver::VersionReq::parse(part).map_err(|source| ParseError::InvalidFormula {
                    formula: input.to_string(),
                    message: source.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { disjuncts })
    }

    /// A formula matching exactly one version.
    #[must_use]
    pub fn exact(version: &semver::Version) -> Self {
        Self {
            disjuncts: vec![semver::VersionReq {
                comparators: vec![semver::Comparator {
                    op: semver::Op::Exact,
                    major: version.major,
                    minor: Some(version.minor),
                    patch: Some(version.patch),
                    pre: version.pre.clone(),
                }],
            }],
        }
    }

    /// A formula matching any version.
    #[must_use]
    pub fn any() -> Self {
        Self {
            disjuncts: vec![semver::VersionReq::STAR],
        }
    }

    /// Whether the version satisfies any disjunct.
    #[must_use]
    pub fn matches(&self, version: &semver::Version) -> bool {
        self.disjuncts.iter().any(|req| req.matches(version))
    }
}

impl FromStr for VersionFormula {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for VersionFormula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for req in &self.disjuncts {
            if !first {
                write!(f, " || ")?;
            }
            write!(f, "{req}")?;
            first = false;
        }
        Ok(())
    }
}
