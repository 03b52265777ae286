//! GitHub Cherry-Pick - atomic cherry-picks onto a GitHub branch without a local clone.
//!
//! This library builds each cherry-picked commit from the Git Data API's commit, merge,
//! and ref primitives, and publishes the result with a single fast-forward update.

pub mod cherry_pick;
pub mod effects;
pub mod github;
pub mod types;

#[cfg(test)]
mod test_utils;
