//! Top-level cherry-pick orchestration.
//!
//! Snapshot the target head, do all the work on a sandbox ref, then publish with
//! a single fast-forward-only update of the target. The fast-forward check is the
//! only concurrency guard: if anyone moved the target since the snapshot, the
//! update is rejected and the target keeps their change.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::effects::GitHubInterpreter;
use crate::types::{CherryPickHead, RefName, Sha};

use super::error::{CherryPickError, Step};
use super::events::{CherryPickEvent, EventSink, NoopEventSink};
use super::remote::Remote;
use super::sandbox::{sandbox_ref_name, unique_sandbox_suffix, with_sandbox};
use super::sequence::{cherry_pick_sequence, fetch_sources};

/// What to cherry-pick and where.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CherryPickOptions {
    /// The ref to append the cherry-picked commits to.
    pub target: RefName,
    /// Source commits, applied in this order.
    pub commits: Vec<Sha>,
}

impl CherryPickOptions {
    pub fn new(target: RefName, commits: impl IntoIterator<Item = Sha>) -> Self {
        Self {
            target,
            commits: commits.into_iter().collect(),
        }
    }
}

/// Cherry-picks commits onto a ref using only remote object-graph operations.
///
/// The interpreter determines the repository; see [`crate::github::OctocrabClient`].
pub struct CherryPicker<I> {
    interpreter: I,
    sink: Box<dyn EventSink>,
    sandbox_suffix: Box<dyn Fn() -> String + Send + Sync>,
}

impl<I> CherryPicker<I> {
    /// Creates a cherry-picker that reports no events.
    pub fn new(interpreter: I) -> Self {
        Self {
            interpreter,
            sink: Box::new(NoopEventSink),
            sandbox_suffix: Box::new(unique_sandbox_suffix),
        }
    }

    /// Reports progress to `sink`.
    pub fn with_event_sink(mut self, sink: impl EventSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    /// Replaces the per-invocation sandbox name suffix (see [`unique_sandbox_suffix`]).
    ///
    /// A suffix that repeats makes concurrent or retried runs from the same
    /// target head collide on the sandbox name.
    pub fn with_sandbox_suffix(mut self, suffix: impl Fn() -> String + Send + Sync + 'static) -> Self {
        self.sandbox_suffix = Box::new(suffix);
        self
    }
}

impl<I: GitHubInterpreter> CherryPicker<I> {
    /// Appends one new commit per entry of `options.commits` to `options.target`.
    ///
    /// Returns the target's new head. On error the target ref is unchanged. An
    /// empty list still confirms the target has not moved since it was read.
    pub async fn cherry_pick(
        &self,
        options: &CherryPickOptions,
    ) -> Result<Sha, CherryPickError<I::Error>> {
        self.cherry_pick_with_intercept(options, |_| async {}).await
    }

    /// Like [`cherry_pick`](Self::cherry_pick), awaiting `intercept` with the
    /// initial target head right after it is read and before the sandbox exists.
    ///
    /// Test harnesses use this to move the target behind the operation's back.
    pub async fn cherry_pick_with_intercept<H, Fut>(
        &self,
        options: &CherryPickOptions,
        intercept: H,
    ) -> Result<Sha, CherryPickError<I::Error>>
    where
        H: FnOnce(Sha) -> Fut,
        Fut: Future<Output = ()>,
    {
        let remote = Remote::new(&self.interpreter);
        let sink = self.sink.as_ref();
        let target = &options.target;

        let initial_head = remote.ref_head(target).await?;
        sink.record(CherryPickEvent::InitialHead {
            target: target.clone(),
            sha: initial_head.clone(),
        });

        intercept(initial_head.clone()).await;

        let new_head = if options.commits.is_empty() {
            initial_head.clone()
        } else {
            let initial_commit = remote.get_commit(Step::GetTargetTree, &initial_head).await?;
            let start = CherryPickHead {
                sha: initial_head.clone(),
                tree: initial_commit.tree,
            };
            let validated = fetch_sources(&remote, sink, &options.commits).await?;

            let sandbox = sandbox_ref_name(target, &initial_head, &(self.sandbox_suffix)());
            let remote_ref = &remote;
            let sources = validated.as_slice();
            with_sandbox(&remote, sink, sandbox, &initial_head, |sandbox| async move {
                cherry_pick_sequence(remote_ref, sink, &sandbox, sources, start).await
            })
            .await?
        };

        // Also runs for an empty list, so a target that moved since the snapshot
        // is reported rather than returned stale.
        remote.fast_forward(target, &new_head, &initial_head).await?;
        sink.record(CherryPickEvent::TargetUpdated {
            target: target.clone(),
            from: initial_head,
            to: new_head.clone(),
        });

        Ok(new_head)
    }
}

impl<I> std::fmt::Debug for CherryPicker<I>
where
    I: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CherryPicker")
            .field("interpreter", &self.interpreter)
            .finish_non_exhaustive()
    }
}
