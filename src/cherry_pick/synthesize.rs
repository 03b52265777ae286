//! Synthesizes one cherry-picked commit on the sandbox.
//!
//! The remote has no "apply this commit's diff" primitive, only a merge. A plain
//! merge of the source commit would also drag in every ancestor the sandbox
//! lacks, so the sandbox is first repositioned onto a *sibling* of the source
//! commit: a commit with the sandbox's current tree whose parent is the source's
//! parent. Merging the source into that sibling yields exactly the source's
//! changes on top of the current tree. The merge commit is then replaced by a
//! single-parent commit on the previous sandbox head.
//!
//! ```text
//!   before:   head ──●                   parent ──● source
//!
//!   sibling:  parent ──● sibling (tree = head.tree)
//!   merge:    sibling ──● merge ◄── source
//!   result:   head ──● picked (tree = merge.tree, metadata = source)
//! ```

use crate::effects::GitHubInterpreter;
use crate::types::{CherryPickHead, CommitData, RefName, Sha};

use super::error::{CherryPickError, Step};
use super::events::{CherryPickEvent, EventSink};
use super::remote::{NewCommit, Remote};

/// Fetches a source commit and checks that it has exactly one parent.
///
/// Returns the commit together with that parent.
pub(crate) async fn fetch_source_commit<I: GitHubInterpreter>(
    remote: &Remote<'_, I>,
    sink: &dyn EventSink,
    sha: &Sha,
) -> Result<(CommitData, Sha), CherryPickError<I::Error>> {
    let commit = remote.get_commit(Step::GetCommit, sha).await?;
    let parent = commit
        .single_parent()
        .cloned()
        .ok_or_else(|| CherryPickError::NotSingleParent {
            commit: sha.clone(),
            parents: commit.parents.len(),
        })?;

    sink.record(CherryPickEvent::CommitFetched {
        commit: sha.clone(),
        parent: parent.clone(),
    });
    Ok((commit, parent))
}

/// Message of the throwaway sibling commit.
pub fn sibling_message(source: &Sha) -> String {
    format!("Sibling of {}", source)
}

/// Applies `source` on top of `head` within `sandbox`, returning the new head.
///
/// Only the sandbox ref moves. On return the sandbox points at the new commit and
/// the sibling and merge commits are unreachable.
pub(crate) async fn synthesize_commit<I: GitHubInterpreter>(
    remote: &Remote<'_, I>,
    sink: &dyn EventSink,
    sandbox: &RefName,
    source: &CommitData,
    parent: &Sha,
    head: CherryPickHead,
) -> Result<CherryPickHead, CherryPickError<I::Error>> {
    let sibling_msg = sibling_message(&source.sha);
    let sibling = remote
        .create_commit(
            Step::CreateSiblingCommit,
            &source.sha,
            NewCommit {
                message: &sibling_msg,
                tree: &head.tree,
                parent,
                author: &source.author,
                committer: &source.committer,
            },
        )
        .await?;
    remote
        .force_update(Step::ResetSandbox, &source.sha, sandbox, &sibling.sha)
        .await?;
    sink.record(CherryPickEvent::SiblingCreated {
        commit: source.sha.clone(),
        sibling: sibling.sha.clone(),
    });

    let merge = remote.merge(sandbox, &source.sha).await?;
    sink.record(CherryPickEvent::CommitMerged {
        commit: source.sha.clone(),
        merge: merge.sha.clone(),
        tree: merge.tree.clone(),
    });

    let picked = remote
        .create_commit(
            Step::CreateCherryPickedCommit,
            &source.sha,
            NewCommit {
                message: &source.message,
                tree: &merge.tree,
                parent: &head.sha,
                author: &source.author,
                committer: &source.committer,
            },
        )
        .await?;
    remote
        .force_update(Step::AdvanceSandbox, &source.sha, sandbox, &picked.sha)
        .await?;
    sink.record(CherryPickEvent::CommitCherryPicked {
        commit: source.sha.clone(),
        sha: picked.sha.clone(),
        tree: picked.tree.clone(),
    });

    Ok(picked)
}
