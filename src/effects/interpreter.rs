//! Effect interpreter trait.
//!
//! The trait-based design enables:
//! - The octocrab-backed interpreter for production
//! - In-memory fakes for testing the cherry-pick core without a network

use std::future::Future;

use super::github::{GitHubEffect, GitHubResponse};

/// Interprets GitHub effects against a remote object graph.
///
/// Implementations are constructed with a `RepoId`, so all effects executed
/// through a single interpreter instance are scoped to that repository.
///
/// # Example (mock for testing)
///
/// ```ignore
/// struct FixedHead(Sha);
///
/// impl GitHubInterpreter for FixedHead {
///     type Error = String;
///
///     async fn interpret(&self, effect: GitHubEffect) -> Result<GitHubResponse, Self::Error> {
///         match effect {
///             GitHubEffect::GetRefHead { .. } => Ok(GitHubResponse::RefHead(self.0.clone())),
///             other => Err(format!("unexpected effect: {:?}", other)),
///         }
///     }
/// }
/// ```
pub trait GitHubInterpreter {
    /// The error type returned by this interpreter.
    type Error;

    /// Execute a GitHub effect and return its response.
    fn interpret(
        &self,
        effect: GitHubEffect,
    ) -> impl Future<Output = Result<GitHubResponse, Self::Error>> + Send;
}

impl<T: GitHubInterpreter + Sync> GitHubInterpreter for &T {
    type Error = T::Error;

    fn interpret(
        &self,
        effect: GitHubEffect,
    ) -> impl Future<Output = Result<GitHubResponse, Self::Error>> + Send {
        (**self).interpret(effect)
    }
}
