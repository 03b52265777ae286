//! GitHub Git Data API effect types.
//!
//! These types describe object-graph operations as data, without executing them.
//! The interpreter in [`crate::github`] executes them against the real API; tests
//! execute them against an in-memory fake.

use serde::{Deserialize, Serialize};

use crate::types::{CommitData, RefName, Sha, Signature};

/// A GitHub Git Data API effect.
///
/// Each variant describes one remote operation. Effects are repo-scoped:
/// the interpreter is constructed with a `RepoId`, so effects don't include it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GitHubEffect {
    // ─── Commits ──────────────────────────────────────────────────────────────
    /// Fetch a commit's metadata.
    GetCommit { sha: Sha },

    /// Create a commit object. Does not move any reference.
    CreateCommit {
        message: String,
        tree: Sha,
        parents: Vec<Sha>,
        author: Signature,
        committer: Signature,
    },

    /// Merge `head` into the branch `base`, advancing `base` to the merge commit.
    MergeBranches {
        base: RefName,
        head: Sha,
        commit_message: String,
    },

    // ─── References ───────────────────────────────────────────────────────────
    /// Read the commit a reference points at.
    GetRefHead { reference: RefName },

    /// Create a new reference. Never overwrites an existing one.
    CreateRef { reference: RefName, sha: Sha },

    /// Move a reference.
    ///
    /// With `force == false` the remote rejects the update unless `sha`
    /// descends from the reference's current head (fast-forward only).
    UpdateRef {
        reference: RefName,
        sha: Sha,
        force: bool,
    },

    /// Delete a reference.
    DeleteRef { reference: RefName },
}

impl GitHubEffect {
    /// Returns a short snake_case name for the effect, used in logs and errors.
    pub fn name(&self) -> &'static str {
        match self {
            GitHubEffect::GetCommit { .. } => "get_commit",
            GitHubEffect::CreateCommit { .. } => "create_commit",
            GitHubEffect::MergeBranches { .. } => "merge_branches",
            GitHubEffect::GetRefHead { .. } => "get_ref_head",
            GitHubEffect::CreateRef { .. } => "create_ref",
            GitHubEffect::UpdateRef { .. } => "update_ref",
            GitHubEffect::DeleteRef { .. } => "delete_ref",
        }
    }
}

// ─── Response Types ───────────────────────────────────────────────────────────

/// Response from a GitHub effect.
///
/// Outcomes the caller must be able to tell apart (a merge conflict, a
/// pre-existing reference, a rejected fast-forward) are responses rather than
/// interpreter errors, so callers can branch on them without knowing the
/// interpreter's error type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum GitHubResponse {
    /// Response to `GetCommit`.
    Commit(CommitData),

    /// Response to `CreateCommit`.
    CommitCreated { sha: Sha, tree: Sha },

    /// Response to `MergeBranches` when a merge commit was created.
    Merged { sha: Sha, tree: Sha },

    /// Response to `MergeBranches` when `head` is already contained in `base`.
    NothingToMerge,

    /// Response to `MergeBranches` when the changes cannot be combined.
    MergeConflict,

    /// Response to `GetRefHead`.
    RefHead(Sha),

    /// Response to `CreateRef`.
    RefCreated,

    /// Response to `CreateRef` when a reference with that name already exists.
    RefAlreadyExists,

    /// Response to `UpdateRef`.
    RefUpdated,

    /// Response to a non-forced `UpdateRef` that would not be a fast-forward.
    RefUpdateRejected,

    /// Response to `DeleteRef`.
    RefDeleted,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn effect_serializes_with_type_tag() {
        let effect = GitHubEffect::UpdateRef {
            reference: RefName::branch("main"),
            sha: Sha::parse("a".repeat(40)).unwrap(),
            force: false,
        };
        let json = serde_json::to_value(&effect).unwrap();
        assert_eq!(json["type"], "update_ref");
        assert_eq!(json["reference"], "heads/main");
        assert_eq!(json["force"], false);
    }

    #[test]
    fn response_serializes_with_data_tag() {
        let response = GitHubResponse::RefHead(Sha::parse("c".repeat(40)).unwrap());
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["type"], "ref_head");
        assert_eq!(json["data"], "c".repeat(40));
    }

    #[test]
    fn effect_names_are_distinct() {
        let sha = Sha::parse("a".repeat(40)).unwrap();
        let reference = RefName::branch("main");
        let effects = [
            GitHubEffect::GetCommit { sha: sha.clone() },
            GitHubEffect::MergeBranches {
                base: reference.clone(),
                head: sha.clone(),
                commit_message: String::new(),
            },
            GitHubEffect::GetRefHead {
                reference: reference.clone(),
            },
            GitHubEffect::CreateRef {
                reference: reference.clone(),
                sha: sha.clone(),
            },
            GitHubEffect::UpdateRef {
                reference: reference.clone(),
                sha,
                force: true,
            },
            GitHubEffect::DeleteRef { reference },
        ];
        let mut names: Vec<_> = effects.iter().map(GitHubEffect::name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), effects.len());
    }
}
