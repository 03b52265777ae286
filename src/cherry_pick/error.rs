//! Cherry-pick error taxonomy.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::types::{RefName, Sha};

/// The remote step that was in progress when an operation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// Reading the target ref's head (the atomicity anchor).
    GetTargetHead,
    /// Reading the tree of the target's head commit.
    GetTargetTree,
    /// Creating the sandbox ref.
    CreateSandbox,
    /// Fetching a source commit.
    GetCommit,
    /// Creating the sibling commit that repositions the sandbox.
    CreateSiblingCommit,
    /// Force-moving the sandbox to the sibling commit.
    ResetSandbox,
    /// Merging the source commit into the sandbox.
    Merge,
    /// Creating the single-parent replacement for the merge commit.
    CreateCherryPickedCommit,
    /// Force-moving the sandbox to the cherry-picked commit.
    AdvanceSandbox,
    /// Deleting the sandbox ref.
    DeleteSandbox,
    /// Fast-forwarding the target ref.
    UpdateTarget,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Step::GetTargetHead => "reading target head",
            Step::GetTargetTree => "reading target tree",
            Step::CreateSandbox => "creating sandbox ref",
            Step::GetCommit => "fetching commit",
            Step::CreateSiblingCommit => "creating sibling commit",
            Step::ResetSandbox => "resetting sandbox to sibling",
            Step::Merge => "merging commit into sandbox",
            Step::CreateCherryPickedCommit => "creating cherry-picked commit",
            Step::AdvanceSandbox => "advancing sandbox",
            Step::DeleteSandbox => "deleting sandbox ref",
            Step::UpdateTarget => "updating target ref",
        };
        f.write_str(s)
    }
}

/// Broad category of a [`CherryPickError`], for callers deciding what to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CherryPickErrorKind {
    /// A source commit cannot be cherry-picked, or the sandbox name is taken.
    Precondition,
    /// The remote could not combine a commit's changes with the sandbox.
    MergeConflict,
    /// The target ref moved between the initial snapshot and the publish.
    ConcurrentModification,
    /// The remote or the transport failed.
    Remote,
}

/// Errors from a cherry-pick operation.
///
/// Every variant leaves the target ref exactly where it was when the operation
/// started (or where a third party moved it).
#[derive(Debug, Error)]
pub enum CherryPickError<E> {
    /// A source commit is a root commit or a merge commit.
    #[error(
        "commit {commit} has {parents} parents; only commits with exactly one parent can be cherry-picked"
    )]
    NotSingleParent { commit: Sha, parents: usize },

    /// The remote reported a merge conflict.
    #[error("merge conflict while cherry-picking {commit}")]
    MergeConflict { commit: Sha },

    /// The remote reported the commit as already contained in the sandbox.
    #[error("nothing to merge: {commit} is already contained in the sandbox")]
    NothingToMerge { commit: Sha },

    /// The final fast-forward of the target was rejected.
    #[error("{target} moved away from {expected} during the cherry-pick; update is not a fast-forward")]
    ConcurrentModification { target: RefName, expected: Sha },

    /// A ref with the sandbox's name already exists.
    #[error("sandbox ref {sandbox} already exists")]
    SandboxExists { sandbox: RefName },

    /// The interpreter failed.
    #[error("{step} failed{}", commit_suffix(.commit))]
    Remote {
        step: Step,
        commit: Option<Sha>,
        #[source]
        source: E,
    },

    /// The interpreter answered with a response that does not match the effect.
    #[error("{step}: unexpected response {response}")]
    UnexpectedResponse { step: Step, response: String },
}

fn commit_suffix(commit: &Option<Sha>) -> String {
    match commit {
        Some(sha) => format!(" for commit {}", sha),
        None => String::new(),
    }
}

impl<E> CherryPickError<E> {
    /// Returns the category of this error.
    pub fn kind(&self) -> CherryPickErrorKind {
        match self {
            CherryPickError::NotSingleParent { .. } | CherryPickError::SandboxExists { .. } => {
                CherryPickErrorKind::Precondition
            }
            CherryPickError::MergeConflict { .. } | CherryPickError::NothingToMerge { .. } => {
                CherryPickErrorKind::MergeConflict
            }
            CherryPickError::ConcurrentModification { .. } => {
                CherryPickErrorKind::ConcurrentModification
            }
            CherryPickError::Remote { .. } | CherryPickError::UnexpectedResponse { .. } => {
                CherryPickErrorKind::Remote
            }
        }
    }

    /// Returns true if re-running the whole operation from a fresh snapshot may succeed.
    ///
    /// Only a lost race on the target ref qualifies; remote failures are reported
    /// as-is and left to the caller's own judgement.
    pub fn is_retriable(&self) -> bool {
        matches!(self.kind(), CherryPickErrorKind::ConcurrentModification)
    }

    /// Returns the step that failed, for errors raised by a remote call.
    pub fn step(&self) -> Option<Step> {
        match self {
            CherryPickError::Remote { step, .. }
            | CherryPickError::UnexpectedResponse { step, .. } => Some(*step),
            CherryPickError::MergeConflict { .. } | CherryPickError::NothingToMerge { .. } => {
                Some(Step::Merge)
            }
            CherryPickError::ConcurrentModification { .. } => Some(Step::UpdateTarget),
            CherryPickError::SandboxExists { .. } => Some(Step::CreateSandbox),
            CherryPickError::NotSingleParent { .. } => Some(Step::GetCommit),
        }
    }
}
