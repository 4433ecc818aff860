//! Requirements: named requests for a version.
//!
//! A requirement pairs a package name with either a registry formula or an
//! exact source reference. The grammar accepted here is wider than what the
//! resolver can satisfy: bare git URLs, archives, and ref-less GitHub
//! references parse fine and are rejected later, at discovery time, so the
//! caller gets a precise error naming the requirement.

use crate::error::ParseError;
use crate::formula::VersionFormula;
use crate::version::{OPAM_SCOPE, SourceSpec, Version};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use url::Url;

/// The constraint half of a requirement.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VersionSpec {
    /// An npm registry formula.
    Npm(VersionFormula),
    /// An opam registry formula.
    Opam(VersionFormula),
    /// An exact source reference.
    Source(SourceSpec),
    /// An exact forced version. Produced by resolutions rewriting; never
    /// parsed from a manifest.
    Exact(Version),
}

/// A named version request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Requirement {
    /// Package name as written in the requesting manifest.
    pub name: String,
    /// The constraint.
    pub spec: VersionSpec,
}

impl Requirement {
    /// Create a requirement from parts.
    #[must_use]
    pub const fn new(name: String, spec: VersionSpec) -> Self {
        Self { name, spec }
    }

    /// Parse a requirement from a manifest dependency entry.
    ///
    /// Dispatch on the spec string:
    /// - `github:user/repo#ref` / `github:user/repo` → GitHub source
    /// - `git:<url>` or `git+<scheme>://...` → bare git source
    /// - `path:<p>`, `file:<p>`, `./...`, `../...` → local path
    /// - `archive:<url>` → archive source
    /// - names under `@opam/` → opam formula
    /// - anything else → npm formula
    ///
    /// # Errors
    /// Returns [`ParseError`] when the spec is recognized but malformed.
    pub fn parse(name: &str, spec: &str) -> Result<Self, ParseError> {
        let spec = spec.trim();

        let version_spec = if let Some(rest) = spec.strip_prefix("github:") {
            VersionSpec::Source(parse_github(spec, rest)?)
        } else if let Some(rest) = spec.strip_prefix("git:") {
            VersionSpec::Source(SourceSpec::Git(parse_url(spec, rest)?))
        } else if spec.starts_with("git+") {
            let url = spec.trim_start_matches("git+");
            VersionSpec::Source(SourceSpec::Git(parse_url(spec, url)?))
        } else if let Some(rest) = spec.strip_prefix("path:").or_else(|| spec.strip_prefix("file:"))
        {
            VersionSpec::Source(SourceSpec::LocalPath(PathBuf::from(rest)))
        } else if spec.starts_with("./") || spec.starts_with("../") {
            VersionSpec::Source(SourceSpec::LocalPath(PathBuf::from(spec)))
        } else if let Some(rest) = spec.strip_prefix("archive:") {
            VersionSpec::Source(SourceSpec::Archive(parse_url(spec, rest)?))
        } else if name.starts_with(OPAM_SCOPE) {
            VersionSpec::Opam(VersionFormula::parse(spec)?)
        } else {
            VersionSpec::Npm(VersionFormula::parse(spec)?)
        };

        Ok(Self {
            name: name.to_string(),
            spec: version_spec,
        })
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.spec {
            VersionSpec::Npm(formula) | VersionSpec::Opam(formula) => {
                write!(f, "{}@{formula}", self.name)
            }
            VersionSpec::Source(source) => write!(f, "{}@{source}", self.name),
            VersionSpec::Exact(version) => write!(f, "{}@={version}", self.name),
        }
    }
}

fn parse_github(full: &str, rest: &str) -> Result<SourceSpec, ParseError> {
    let (repo_part, reference) = match rest.split_once('#') {
        Some((repo, r)) if !r.is_empty() => (repo, Some(r.to_string())),
        Some((repo, _)) => (repo, None),
        None => (rest, None),
    };
    let (user, repo) = repo_part
        .split_once('/')
        .filter(|(u, r)| !u.is_empty() && !r.is_empty() && !r.contains('/'))
        .ok_or_else(|| ParseError::InvalidSourceSpec {
            spec: full.to_string(),
            message: "expected github:user/repo[#ref]".to_string(),
        })?;
    Ok(SourceSpec::Github {
        user: user.to_string(),
        repo: repo.to_string(),
        reference,
    })
}

fn parse_url(full: &str, raw: &str) -> Result<Url, ParseError> {
    Url::parse(raw).map_err(|source| ParseError::InvalidSourceSpec {
        spec: full.to_string(),
        message: source.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_npm_formula() {
        let req = Requirement::parse("react", "^17.0.0").unwrap();
        assert!(matches!(req.spec, VersionSpec::Npm(_)));
    }

    #[test]
    fn parses_opam_scoped_name_as_opam_formula() {
        let req = Requirement::parse("@opam/lwt", ">=5.0").unwrap();
        assert!(matches!(req.spec, VersionSpec::Opam(_)));
        assert_eq!(req.name, "@opam/lwt");
    }

    #[test]
    fn parses_github_with_ref() {
        let req = Requirement::parse("fastify", "github:fastify/fastify#v4.0.0").unwrap();
        assert_eq!(
            req.spec,
            VersionSpec::Source(SourceSpec::Github {
                user: "fastify".into(),
                repo: "fastify".into(),
                reference: Some("v4.0.0".into()),
            })
        );
    }

    #[test]
    fn parses_github_without_ref() {
        let req = Requirement::parse("foo", "github:user/repo").unwrap();
        assert_eq!(
            req.spec,
            VersionSpec::Source(SourceSpec::Github {
                user: "user".into(),
                repo: "repo".into(),
                reference: None,
            })
        );
    }

    #[test]
    fn rejects_malformed_github() {
        assert!(Requirement::parse("foo", "github:no-slash").is_err());
        assert!(Requirement::parse("foo", "github:/repo").is_err());
    }

    #[test]
    fn parses_local_path() {
        let req = Requirement::parse("local-dep", "./vendor/local-dep").unwrap();
        assert!(matches!(
            req.spec,
            VersionSpec::Source(SourceSpec::LocalPath(_))
        ));

        let req = Requirement::parse("other", "path:/srv/pkgs/other").unwrap();
        assert!(matches!(
            req.spec,
            VersionSpec::Source(SourceSpec::LocalPath(_))
        ));
    }

    #[test]
    fn parses_git_and_archive_urls() {
        let req = Requirement::parse("x", "git+https://example.com/x.git").unwrap();
        assert!(matches!(req.spec, VersionSpec::Source(SourceSpec::Git(_))));

        let req = Requirement::parse("y", "archive:https://example.com/y-1.0.tgz").unwrap();
        assert!(matches!(
            req.spec,
            VersionSpec::Source(SourceSpec::Archive(_))
        ));
    }

    #[test]
    fn display_names_the_requirement() {
        let req = Requirement::parse("react", "^17.0.0").unwrap();
        assert_eq!(req.to_string(), "react@^17.0.0");
    }
}
