//! Core domain types for remote cherry-picking.
//!
//! Identifiers are newtypes so that commit SHAs, tree SHAs, and reference
//! names cannot be mixed up at call sites.

pub mod commit;
pub mod ids;

// Re-export commonly used types at the module level
pub use commit::{CherryPickHead, CommitData, Signature};
pub use ids::{InvalidSha, RefName, RepoId, Sha};
