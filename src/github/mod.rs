//! GitHub API client and effect interpreter.
//!
//! This module provides the implementation for executing Git Data API effects via the
//! octocrab library. It implements the `GitHubInterpreter` trait defined in the effects
//! module.
//!
//! Key features:
//! - Repository-scoped client, so effects never carry repository coordinates
//! - Distinguishes transient vs permanent errors without retrying either
//! - Conflicts and fast-forward rejections surface as responses, not errors

mod client;
mod error;
mod interpreter;

pub use client::OctocrabClient;
pub use error::{GitHubApiError, GitHubErrorKind};
pub use interpreter::{encode_ref_path, interpret_github_effect};
