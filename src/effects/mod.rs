//! Effects-as-data for the remote object graph.
//!
//! This module defines effect types that describe operations without executing them.
//! This enables:
//! - A cherry-pick core that is written against a small capability interface
//! - Testability via in-memory interpreters
//! - Logging/tracing of intended operations

pub mod github;
pub mod interpreter;

pub use github::{GitHubEffect, GitHubResponse};
pub use interpreter::GitHubInterpreter;
