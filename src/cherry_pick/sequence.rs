//! Folds the commit synthesizer over the ordered commit list.

use crate::effects::GitHubInterpreter;
use crate::types::{CherryPickHead, CommitData, RefName, Sha};

use super::error::CherryPickError;
use super::events::EventSink;
use super::remote::Remote;
use super::synthesize::{fetch_source_commit, synthesize_commit};

/// A validated source commit and its only parent.
pub(crate) type SourceCommit = (CommitData, Sha);

/// Fetches every source commit and checks that each has exactly one parent.
///
/// Read-only; runs before the sandbox exists so a merge or root commit anywhere
/// in the list is rejected without writing to the remote.
pub(crate) async fn fetch_sources<I: GitHubInterpreter>(
    remote: &Remote<'_, I>,
    sink: &dyn EventSink,
    commits: &[Sha],
) -> Result<Vec<SourceCommit>, CherryPickError<I::Error>> {
    let mut sources = Vec::with_capacity(commits.len());
    for sha in commits {
        sources.push(fetch_source_commit(remote, sink, sha).await?);
    }
    Ok(sources)
}

/// Cherry-picks `sources` in order onto `start` within `sandbox`.
///
/// The first failure stops the fold and is returned; later commits are not
/// attempted and the sandbox is left wherever the last successful step put it.
///
/// Returns the SHA of the last synthesized commit, or `start.sha` for an empty list.
pub(crate) async fn cherry_pick_sequence<I: GitHubInterpreter>(
    remote: &Remote<'_, I>,
    sink: &dyn EventSink,
    sandbox: &RefName,
    sources: &[SourceCommit],
    start: CherryPickHead,
) -> Result<Sha, CherryPickError<I::Error>> {
    let mut head = start;
    for (source, parent) in sources {
        head = synthesize_commit(remote, sink, sandbox, source, parent, head).await?;
    }

    Ok(head.sha)
}
