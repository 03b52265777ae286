//! Atomic cherry-pick over a remote object graph.
//!
//! Emulates `git cherry-pick` without a working copy: every new commit is built
//! from remote commit, merge, and ref primitives. The operation is all-or-nothing
//! from the point of view of the target ref.
//!
//! # Flow
//!
//! 1. `publish`: read the target head (the snapshot every later check is
//!    relative to) and run the optional intercept hook
//! 2. `sequence`: fetch every source commit and reject any without exactly
//!    one parent, before anything is written
//! 3. `sandbox`: create a uniquely named throwaway ref at the snapshot
//! 4. `sequence`: run the `synthesize` step once per commit, threading the
//!    sandbox head
//! 5. `sandbox`: delete the throwaway ref, on every path
//! 6. `publish`: fast-forward the target to the final sandbox head (for an
//!    empty list, to the snapshot itself)
//!
//! # Limitations
//!
//! Cherry-picking a commit without its predecessors relies on the remote's
//! three-way merge against the commit's own parent. Where that merge can't
//! tell the commit's changes apart from its predecessors', the result may
//! differ from native `git cherry-pick`. Merge commits and root commits are
//! rejected.

mod error;
mod events;
mod publish;
mod remote;
mod sandbox;
mod sequence;
mod synthesize;


pub use error::{CherryPickError, CherryPickErrorKind, Step};
pub use events::{CherryPickEvent, EventSink, NoopEventSink, TracingEventSink};
pub use publish::{CherryPickOptions, CherryPicker};
pub use sandbox::{SANDBOX_PREFIX, sandbox_ref_name, unique_sandbox_suffix};
pub use synthesize::sibling_message;
