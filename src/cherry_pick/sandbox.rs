//! Disposable reference that scopes all intermediate commits.
//!
//! The sandbox ref starts at the target's initial head, absorbs every
//! intermediate commit the cherry-pick creates, and is deleted whether the work
//! inside it succeeded or not. The target ref is never touched from here.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;

use crate::effects::GitHubInterpreter;
use crate::types::{RefName, Sha};

use super::error::CherryPickError;
use super::events::{CherryPickEvent, EventSink};
use super::remote::Remote;

/// Prefix that keeps sandbox branches apart from the caller's own branches.
pub const SANDBOX_PREFIX: &str = "cherry-pick-";

static SUFFIX_COUNTER: AtomicU64 = AtomicU64::new(0);

/// A suffix that differs between invocations: the current time in nanoseconds
/// plus a process-wide counter, both in hex.
///
/// An abandoned run's sandbox therefore never blocks a later run from the
/// same snapshot.
pub fn unique_sandbox_suffix() -> String {
    let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
    let count = SUFFIX_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{:x}{:x}", nanos, count)
}

/// Derives the sandbox ref for cherry-picking onto `target` from `initial_head`.
pub fn sandbox_ref_name(target: &RefName, initial_head: &Sha, suffix: &str) -> RefName {
    let base = target.branch_name().unwrap_or_else(|| target.as_str());
    RefName::branch(format!(
        "{}{}-{}-{}",
        SANDBOX_PREFIX,
        base,
        initial_head.short(),
        suffix
    ))
}

/// Creates `sandbox` at `initial_head`, runs `action` with it, then deletes it.
///
/// An existing ref named `sandbox` is never overwritten.
///
/// The action's result is returned unchanged once cleanup has run. If the action
/// succeeded but cleanup failed, the cleanup failure is returned instead. If
/// both failed, the action's error wins and the cleanup failure is reported to
/// the sink.
pub(crate) async fn with_sandbox<I, T, F, Fut>(
    remote: &Remote<'_, I>,
    sink: &dyn EventSink,
    sandbox: RefName,
    initial_head: &Sha,
    action: F,
) -> Result<T, CherryPickError<I::Error>>
where
    I: GitHubInterpreter,
    F: FnOnce(RefName) -> Fut,
    Fut: Future<Output = Result<T, CherryPickError<I::Error>>>,
{
    remote.create_sandbox(&sandbox, initial_head).await?;
    sink.record(CherryPickEvent::SandboxCreated {
        sandbox: sandbox.clone(),
        sha: initial_head.clone(),
    });

    let result = action(sandbox.clone()).await;

    match remote.delete_ref(&sandbox).await {
        Ok(()) => {
            sink.record(CherryPickEvent::SandboxDeleted { sandbox });
            result
        }
        Err(cleanup) => {
            sink.record(CherryPickEvent::SandboxCleanupFailed {
                sandbox,
                error: cleanup.to_string(),
            });
            match result {
                Ok(_) => Err(cleanup),
                Err(e) => Err(e),
            }
        }
    }
}
