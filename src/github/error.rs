//! GitHub API error types.
//!
//! This module defines error types that distinguish between transient and permanent
//! GitHub API failures. Nothing in this crate retries; the kind is exposed so that
//! callers can decide whether re-running a whole cherry-pick is worthwhile:
//!
//! - **Transient** errors may succeed if the operation is repeated (5xx, rate limits,
//!   network failures)
//! - **Permanent** errors require human intervention (most 4xx)
//!
//! Outcomes the cherry-pick must branch on (merge conflicts, existing refs, rejected
//! fast-forwards) are not errors at this layer; the interpreter turns them into
//! `GitHubResponse` variants.

use std::fmt;
use thiserror::Error;

/// The kind of GitHub API error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GitHubErrorKind {
    /// Transient error - the same request may succeed later.
    ///
    /// Examples:
    /// - HTTP 5xx (server errors)
    /// - HTTP 429 (rate limited)
    /// - HTTP 403 with a rate limit message
    /// - Network timeouts
    Transient,

    /// Permanent error - requires human intervention.
    ///
    /// Examples:
    /// - HTTP 4xx (except rate limits)
    /// - Commit or reference not found (404, 422)
    /// - Authentication failures (401, 403 non-rate-limit)
    /// - Malformed responses
    Permanent,
}

impl GitHubErrorKind {
    /// Returns true if repeating the request could plausibly succeed.
    pub fn is_retriable(&self) -> bool {
        matches!(self, GitHubErrorKind::Transient)
    }
}

/// A GitHub API error with a transient/permanent categorization.
#[derive(Debug, Error)]
pub struct GitHubApiError {
    /// The kind of error.
    pub kind: GitHubErrorKind,

    /// The HTTP status code, if available.
    pub status_code: Option<u16>,

    /// A human-readable description of the error.
    pub message: String,

    /// The underlying octocrab error, if available.
    #[source]
    pub source: Option<octocrab::Error>,
}

impl fmt::Display for GitHubApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status_code {
            Some(code) => write!(f, "GitHub API error (HTTP {}): {}", code, self.message),
            None => write!(f, "GitHub API error: {}", self.message),
        }
    }
}

impl GitHubApiError {
    /// Creates a permanent error without an octocrab source.
    pub fn permanent_without_source(message: impl Into<String>) -> Self {
        Self {
            kind: GitHubErrorKind::Permanent,
            status_code: None,
            message: message.into(),
            source: None,
        }
    }

    /// Creates an error for an unexpected HTTP status on a successful transport round-trip.
    pub fn unexpected_status(status_code: u16, context: &str) -> Self {
        Self {
            kind: classify(Some(status_code), ""),
            status_code: Some(status_code),
            message: format!("unexpected status for {}", context),
            source: None,
        }
    }

    /// Categorizes an octocrab error.
    pub fn from_octocrab(err: octocrab::Error) -> Self {
        let status_code = status_code(&err);
        let message = error_message(&err);
        let kind = classify(status_code, &message);

        Self {
            kind,
            status_code,
            message,
            source: Some(err),
        }
    }

    /// Returns true if this error is retriable.
    pub fn is_retriable(&self) -> bool {
        self.kind.is_retriable()
    }
}

/// Extracts the HTTP status code from an octocrab error, if present.
///
/// API errors carry it directly. Other variants (transport, serialization) only
/// mention it in their message, if at all.
pub(crate) fn status_code(err: &octocrab::Error) -> Option<u16> {
    if let octocrab::Error::GitHub { source, .. } = err {
        return Some(source.status_code.as_u16());
    }
    status_code_from_message(&err.to_string())
}

/// Returns the GitHub-provided message for API errors, or the error's display text.
pub(crate) fn error_message(err: &octocrab::Error) -> String {
    match err {
        octocrab::Error::GitHub { source, .. } => source.message.clone(),
        other => other.to_string(),
    }
}

fn status_code_from_message(message: &str) -> Option<u16> {
    let idx = message.find("status: ")?;
    let digits: String = message[idx + 8..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

/// Decides whether a failure is transient from its status code and message.
///
/// This is a pure function extracted for testability.
pub(crate) fn classify(status_code: Option<u16>, message: &str) -> GitHubErrorKind {
    match status_code {
        Some(429) => GitHubErrorKind::Transient,
        Some(403) if is_rate_limit_error(message) => GitHubErrorKind::Transient,
        Some(code) if (500..600).contains(&code) => GitHubErrorKind::Transient,
        Some(_) => GitHubErrorKind::Permanent,
        None if is_network_error(message) => GitHubErrorKind::Transient,
        None => GitHubErrorKind::Permanent,
    }
}

/// Checks if an error message indicates a rate limit.
fn is_rate_limit_error(message: &str) -> bool {
    let message_lower = message.to_lowercase();
    message_lower.contains("rate limit")
        || message_lower.contains("api rate")
        || message_lower.contains("secondary rate")
        || message_lower.contains("abuse detection")
}

/// Checks if an error message indicates a network-level error.
fn is_network_error(message: &str) -> bool {
    let message_lower = message.to_lowercase();
    message_lower.contains("timeout")
        || message_lower.contains("connection")
        || message_lower.contains("network")
        || message_lower.contains("dns")
        || message_lower.contains("timed out")
}
