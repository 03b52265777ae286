//! Commit metadata as returned by and sent to the Git Data API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::Sha;

/// An author or committer identity with its timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Signature {
    pub name: String,
    pub email: String,
    pub date: DateTime<Utc>,
}

/// The parts of an existing commit the cherry-pick needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitData {
    /// The commit's own SHA.
    pub sha: Sha,
    /// The tree the commit points at.
    pub tree: Sha,
    /// Parent commit SHAs, in order.
    pub parents: Vec<Sha>,
    pub author: Signature,
    pub committer: Signature,
    pub message: String,
}

impl CommitData {
    /// Returns the single parent, or `None` for root and merge commits.
    pub fn single_parent(&self) -> Option<&Sha> {
        match self.parents.as_slice() {
            [parent] => Some(parent),
            _ => None,
        }
    }
}

/// The current tip of the sandbox ref.
///
/// Threaded from one synthesized commit to the next; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CherryPickHead {
    pub sha: Sha,
    pub tree: Sha,
}
