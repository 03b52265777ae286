//! Structured progress events emitted by the cherry-pick core.
//!
//! The core never logs on its own. Callers that want visibility inject an
//! [`EventSink`]; the default [`NoopEventSink`] discards everything.

use serde::Serialize;

use crate::types::{RefName, Sha};

/// A step of a cherry-pick that completed (or, for cleanup, failed).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CherryPickEvent {
    /// The target ref's head was captured.
    InitialHead { target: RefName, sha: Sha },

    /// The sandbox ref was created at the initial head.
    SandboxCreated { sandbox: RefName, sha: Sha },

    /// The sandbox ref was deleted.
    SandboxDeleted { sandbox: RefName },

    /// Deleting the sandbox ref failed; the ref is left behind.
    SandboxCleanupFailed { sandbox: RefName, error: String },

    /// A source commit was fetched and has a single parent.
    CommitFetched { commit: Sha, parent: Sha },

    /// The sandbox was moved to a sibling of the source commit.
    SiblingCreated { commit: Sha, sibling: Sha },

    /// The source commit was merged into the sandbox.
    CommitMerged { commit: Sha, merge: Sha, tree: Sha },

    /// The merge was collapsed into a single-parent commit.
    CommitCherryPicked { commit: Sha, sha: Sha, tree: Sha },

    /// The target ref was fast-forwarded.
    TargetUpdated { target: RefName, from: Sha, to: Sha },
}

/// Receives [`CherryPickEvent`]s as the operation progresses.
pub trait EventSink: Send + Sync {
    fn record(&self, event: CherryPickEvent);
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEventSink;

impl EventSink for NoopEventSink {
    fn record(&self, _event: CherryPickEvent) {}
}

/// Forwards events to `tracing`.
///
/// Intermediate steps are logged at `debug`, the publish at `info`, and a
/// leaked sandbox at `warn`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn record(&self, event: CherryPickEvent) {
        match event {
            CherryPickEvent::InitialHead { target, sha } => {
                tracing::debug!(%target, %sha, "Captured initial head");
            }
            CherryPickEvent::SandboxCreated { sandbox, sha } => {
                tracing::debug!(%sandbox, %sha, "Created sandbox ref");
            }
            CherryPickEvent::SandboxDeleted { sandbox } => {
                tracing::debug!(%sandbox, "Deleted sandbox ref");
            }
            CherryPickEvent::SandboxCleanupFailed { sandbox, error } => {
                tracing::warn!(%sandbox, %error, "Failed to delete sandbox ref; it must be removed by hand");
            }
            CherryPickEvent::CommitFetched { commit, parent } => {
                tracing::debug!(%commit, %parent, "Fetched source commit");
            }
            CherryPickEvent::SiblingCreated { commit, sibling } => {
                tracing::debug!(%commit, %sibling, "Repositioned sandbox on sibling commit");
            }
            CherryPickEvent::CommitMerged { commit, merge, tree } => {
                tracing::debug!(%commit, %merge, %tree, "Merged commit into sandbox");
            }
            CherryPickEvent::CommitCherryPicked { commit, sha, tree } => {
                tracing::debug!(%commit, %sha, %tree, "Cherry-picked commit");
            }
            CherryPickEvent::TargetUpdated { target, from, to } => {
                tracing::info!(%target, %from, %to, "Fast-forwarded target ref");
            }
        }
    }
}

impl<F> EventSink for F
where
    F: Fn(CherryPickEvent) + Send + Sync,
{
    fn record(&self, event: CherryPickEvent) {
        self(event)
    }
}
