//! Version identities across the supported package sources.
//!
//! A [`Version`] identifies one concrete release of a package. Registry
//! versions (`Npm`, `Opam`) carry a semantic version and order within their
//! own kind; source versions are exact pins (a commit, a path) and have no
//! ordering at all. Cross-kind comparison is intentionally undefined: the
//! resolver only ever compares versions of the same kind.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::path::PathBuf;
use url::Url;

/// Prefix used to address opam packages from npm-style manifests.
pub const OPAM_SCOPE: &str = "@opam/";

/// An exact source reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceSpec {
    /// A GitHub repository at an optional commit/tag/branch reference.
    ///
    /// A missing reference is representable (the requirement grammar accepts
    /// it) but not resolvable; discovery rejects it with `UnsupportedSpec`.
    Github {
        /// Repository owner.
        user: String,
        /// Repository name.
        repo: String,
        /// Pinned reference (commit, tag, or branch).
        reference: Option<String>,
    },
    /// A bare git URL. Recognized but not resolvable.
    Git(Url),
    /// A local filesystem path. Resolved by an external collaborator, not here.
    LocalPath(PathBuf),
    /// A remote archive URL. Recognized but not resolvable.
    Archive(Url),
    /// No source at all. Used for synthetic packages (the solver root).
    NoSource,
}

impl fmt::Display for SourceSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Github {
                user,
                repo,
                reference: Some(r),
            } => write!(f, "github:{user}/{repo}#{r}"),
            Self::Github {
                user,
                repo,
                reference: None,
            } => write!(f, "github:{user}/{repo}"),
            Self::Git(url) => write!(f, "git:{url}"),
            Self::LocalPath(path) => write!(f, "path:{}", path.display()),
            Self::Archive(url) => write!(f, "archive:{url}"),
            Self::NoSource => write!(f, "no-source"),
        }
    }
}

/// A concrete package version, tagged by its source kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Version {
    /// An npm registry release.
    Npm(semver::Version),
    /// An opam registry release.
    Opam(semver::Version),
    /// An exact source pin.
    Source(SourceSpec),
}

impl Version {
    /// The semantic version, if this is a registry version.
    #[must_use]
    pub fn semver(&self) -> Option<&semver::Version> {
        match self {
            Self::Npm(v) | Self::Opam(v) => Some(v),
            Self::Source(_) => None,
        }
    }

    /// Whether this version is a source pin rather than a registry release.
    #[must_use]
    pub const fn is_source(&self) -> bool {
        matches!(self, Self::Source(_))
    }
}

impl PartialOrd for Version {
    /// Total order within a source kind only; `None` across kinds.
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Npm(a), Self::Npm(b)) | (Self::Opam(a), Self::Opam(b)) => Some(a.cmp(b)),
            (Self::Source(a), Self::Source(b)) if a == b => Some(Ordering::Equal),
            _ => None,
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Npm(v) | Self::Opam(v) => write!(f, "{v}"),
            Self::Source(spec) => write!(f, "{spec}"),
        }
    }
}

/// Strip the opam scope prefix from an npm-style alias, if present.
///
/// `@opam/lwt` becomes `lwt`; names without the prefix pass through unchanged.
#[must_use]
pub fn opam_name(name: &str) -> &str {
    name.strip_prefix(OPAM_SCOPE).unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sv(s: &str) -> semver::Version {
        semver::Version::parse(s).unwrap()
    }

    #[test]
    fn orders_within_npm_kind() {
        let a = Version::Npm(sv("1.2.3"));
        let b = Version::Npm(sv("1.10.0"));
        assert!(a < b);
    }

    #[test]
    fn no_order_across_kinds() {
        let a = Version::Npm(sv("1.0.0"));
        let b = Version::Opam(sv("1.0.0"));
        assert_eq!(a.partial_cmp(&b), None);
        assert_ne!(a, b);
    }

    #[test]
    fn source_versions_compare_by_equality_only() {
        let pin = Version::Source(SourceSpec::Github {
            user: "fastify".into(),
            repo: "fastify".into(),
            reference: Some("abc123".into()),
        });
        assert_eq!(pin.partial_cmp(&pin), Some(Ordering::Equal));

        let other = Version::Source(SourceSpec::NoSource);
        assert_eq!(pin.partial_cmp(&other), None);
    }

    #[test]
    fn display_round_trip_readable() {
        let v = Version::Source(SourceSpec::Github {
            user: "ocsigen".into(),
            repo: "lwt".into(),
            reference: Some("5.7.0".into()),
        });
        assert_eq!(v.to_string(), "github:ocsigen/lwt#5.7.0");
        assert_eq!(Version::Npm(sv("4.17.0")).to_string(), "4.17.0");
    }

    #[test]
    fn opam_name_strips_scope() {
        assert_eq!(opam_name("@opam/lwt"), "lwt");
        assert_eq!(opam_name("lwt"), "lwt");
    }
}
