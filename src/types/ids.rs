//! Newtype wrappers for domain identifiers.
//!
//! These types prevent accidental mixing of different kinds of identifier (e.g., passing
//! a branch name where a commit SHA is expected) and make the code more self-documenting.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error returned when a string is not a valid 40-character hex SHA.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid SHA {0:?}: expected 40 hexadecimal characters")]
pub struct InvalidSha(pub String);

/// A git object SHA (40 hex characters).
///
/// Used for both commit and tree hashes; the remote treats them as opaque
/// content-addressed identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sha(String);

impl Sha {
    /// Parses and validates a SHA.
    ///
    /// Uppercase hex is accepted and normalized to lowercase.
    pub fn parse(s: impl AsRef<str>) -> Result<Self, InvalidSha> {
        let s = s.as_ref();
        if s.len() == 40 && s.bytes().all(|b| b.is_ascii_hexdigit()) {
            Ok(Sha(s.to_ascii_lowercase()))
        } else {
            Err(InvalidSha(s.to_string()))
        }
    }

    /// Returns the SHA as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns a short (7-character) version of the SHA for display.
    pub fn short(&self) -> &str {
        self.0.get(..7).unwrap_or(&self.0)
    }
}

impl fmt::Display for Sha {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Sha {
    type Err = InvalidSha;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Sha::parse(s)
    }
}

/// A repository identifier (owner/repo format).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoId {
    pub owner: String,
    pub repo: String,
}

impl RepoId {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        RepoId {
            owner: owner.into(),
            repo: repo.into(),
        }
    }

    /// Parses `owner/repo`, tolerating a leading `https://github.com/` and a
    /// trailing `.git`.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s
            .strip_prefix("https://github.com/")
            .or_else(|| s.strip_prefix("http://github.com/"))
            .or_else(|| s.strip_prefix("github.com/"))
            .unwrap_or(s);
        let s = s.trim_end_matches('/');
        let s = s.strip_suffix(".git").unwrap_or(s);

        let (owner, repo) = s.split_once('/')?;
        if owner.is_empty() || repo.is_empty() || repo.contains('/') {
            return None;
        }
        Some(RepoId::new(owner, repo))
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// A git reference name, stored without its leading `refs/` (e.g. `heads/main`).
///
/// This is the form the Git Data API uses in URL paths
/// (`/git/refs/heads/main`); [`RefName::full`] gives the `refs/...` form the
/// API expects in request bodies.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RefName(String);

impl RefName {
    /// Normalizes a user-supplied reference.
    ///
    /// `main`, `heads/main` and `refs/heads/main` all name the same branch.
    /// Anything already under another `refs/` namespace (e.g. `refs/tags/v1`)
    /// is kept as-is minus the `refs/` prefix.
    pub fn new(s: impl AsRef<str>) -> Self {
        let s = s.as_ref();
        if let Some(rest) = s.strip_prefix("refs/") {
            RefName(rest.to_string())
        } else if s.starts_with("heads/") {
            RefName(s.to_string())
        } else {
            RefName(format!("heads/{}", s))
        }
    }

    /// A branch reference (`heads/<name>`).
    pub fn branch(name: impl AsRef<str>) -> Self {
        RefName(format!("heads/{}", name.as_ref()))
    }

    /// Returns the reference without the `refs/` prefix.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the fully-qualified `refs/...` name.
    pub fn full(&self) -> String {
        format!("refs/{}", self.0)
    }

    /// Returns the branch name if this is a `heads/` reference.
    pub fn branch_name(&self) -> Option<&str> {
        self.0.strip_prefix("heads/")
    }

    /// Returns the name the merge endpoint accepts as `base`: the branch name
    /// for branches, the full name otherwise.
    pub fn merge_base_name(&self) -> String {
        match self.branch_name() {
            Some(branch) => branch.to_string(),
            None => self.full(),
        }
    }
}

impl fmt::Display for RefName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
