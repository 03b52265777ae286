//! GitHub effect interpreter using octocrab.
//!
//! This module implements the `GitHubInterpreter` trait, executing effects
//! against the GitHub Git Data API (`/git/commits`, `/git/refs`) and the
//! Merges API (`/merges`) via octocrab.
//!
//! Key implementation details:
//! - No retries: every failure is returned to the caller on first occurrence
//! - Merge conflicts (409), existing refs and rejected fast-forwards (422) are
//!   mapped to response variants, not errors
//! - Reference names are percent-encoded per path segment

use serde::{Deserialize, Serialize};

use crate::effects::{GitHubEffect, GitHubInterpreter, GitHubResponse};
use crate::types::{CommitData, RefName, Sha, Signature};

use super::client::OctocrabClient;
use super::error::{GitHubApiError, error_message};

// ─── Wire Types ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ShaObject {
    sha: String,
}

/// `GET /git/commits/{sha}` and `POST /git/commits` response body.
#[derive(Debug, Deserialize)]
struct GitCommitResponse {
    sha: String,
    tree: ShaObject,
    #[serde(default)]
    parents: Vec<ShaObject>,
    author: Signature,
    committer: Signature,
    message: String,
}

#[derive(Debug, Serialize)]
struct CreateCommitRequest<'a> {
    message: &'a str,
    tree: &'a str,
    parents: Vec<&'a str>,
    author: &'a Signature,
    committer: &'a Signature,
}

/// `POST /merges` response body (a full commit object).
#[derive(Debug, Deserialize)]
struct MergeResponse {
    sha: String,
    commit: MergeResponseCommit,
}

#[derive(Debug, Deserialize)]
struct MergeResponseCommit {
    tree: ShaObject,
}

#[derive(Debug, Serialize)]
struct MergeRequest<'a> {
    base: &'a str,
    head: &'a str,
    commit_message: &'a str,
}

/// `GET /git/ref/{ref}` response body.
#[derive(Debug, Deserialize)]
struct RefResponse {
    object: ShaObject,
}

#[derive(Debug, Serialize)]
struct CreateRefRequest<'a> {
    #[serde(rename = "ref")]
    reference: &'a str,
    sha: &'a str,
}

#[derive(Debug, Serialize)]
struct UpdateRefRequest<'a> {
    sha: &'a str,
    force: bool,
}

// ─── Interpreter Implementation ───────────────────────────────────────────────

impl GitHubInterpreter for OctocrabClient {
    type Error = GitHubApiError;

    async fn interpret(&self, effect: GitHubEffect) -> Result<GitHubResponse, Self::Error> {
        interpret_github_effect(self, effect).await
    }
}

/// Interprets a GitHub effect, executing it against the GitHub API.
///
/// Each effect is exactly one HTTP request.
pub async fn interpret_github_effect(
    client: &OctocrabClient,
    effect: GitHubEffect,
) -> Result<GitHubResponse, GitHubApiError> {
    tracing::debug!(repo = %client.repo(), effect = effect.name(), ?effect, "Executing GitHub effect");

    let result = match effect {
        GitHubEffect::GetCommit { sha } => get_commit(client, sha).await,
        GitHubEffect::CreateCommit {
            message,
            tree,
            parents,
            author,
            committer,
        } => create_commit(client, &message, &tree, &parents, &author, &committer).await,
        GitHubEffect::MergeBranches {
            base,
            head,
            commit_message,
        } => merge_branches(client, &base, &head, &commit_message).await,
        GitHubEffect::GetRefHead { reference } => get_ref_head(client, &reference).await,
        GitHubEffect::CreateRef { reference, sha } => create_ref(client, &reference, &sha).await,
        GitHubEffect::UpdateRef {
            reference,
            sha,
            force,
        } => update_ref(client, &reference, &sha, force).await,
        GitHubEffect::DeleteRef { reference } => delete_ref(client, &reference).await,
    };

    if let Err(e) = &result {
        tracing::debug!(repo = %client.repo(), error = %e, retriable = e.is_retriable(), "GitHub effect failed");
    }
    result
}

fn parse_sha(raw: &str, what: &str) -> Result<Sha, GitHubApiError> {
    Sha::parse(raw).map_err(|e| {
        GitHubApiError::permanent_without_source(format!("Invalid {} in response: {}", what, e))
    })
}

/// Percent-encodes each path segment of a reference, keeping the `/` separators.
///
/// This is a pure function extracted for testability.
pub fn encode_ref_path(reference: &RefName) -> String {
    reference
        .as_str()
        .split('/')
        .map(urlencoding::encode)
        .collect::<Vec<_>>()
        .join("/")
}

// ─── Commits ──────────────────────────────────────────────────────────────────

fn commit_from_response(response: GitCommitResponse) -> Result<CommitData, GitHubApiError> {
    let parents = response
        .parents
        .iter()
        .map(|p| parse_sha(&p.sha, "parent SHA"))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CommitData {
        sha: parse_sha(&response.sha, "commit SHA")?,
        tree: parse_sha(&response.tree.sha, "tree SHA")?,
        parents,
        author: response.author,
        committer: response.committer,
        message: response.message,
    })
}

async fn get_commit(client: &OctocrabClient, sha: Sha) -> Result<GitHubResponse, GitHubApiError> {
    let route = client.route(&format!("git/commits/{}", sha));
    let result: Result<GitCommitResponse, _> = client.inner().get(&route, None::<&()>).await;

    match result {
        Ok(response) => Ok(GitHubResponse::Commit(commit_from_response(response)?)),
        Err(e) => Err(GitHubApiError::from_octocrab(e)),
    }
}

async fn create_commit(
    client: &OctocrabClient,
    message: &str,
    tree: &Sha,
    parents: &[Sha],
    author: &Signature,
    committer: &Signature,
) -> Result<GitHubResponse, GitHubApiError> {
    let route = client.route("git/commits");
    let request = CreateCommitRequest {
        message,
        tree: tree.as_str(),
        parents: parents.iter().map(Sha::as_str).collect(),
        author,
        committer,
    };

    let result: Result<GitCommitResponse, _> = client.inner().post(&route, Some(&request)).await;

    match result {
        Ok(response) => Ok(GitHubResponse::CommitCreated {
            sha: parse_sha(&response.sha, "commit SHA")?,
            tree: parse_sha(&response.tree.sha, "tree SHA")?,
        }),
        Err(e) => Err(GitHubApiError::from_octocrab(e)),
    }
}

// ─── Merges ───────────────────────────────────────────────────────────────────

/// Maps the status of a `POST /merges` response to an outcome, if the status
/// alone determines it.
///
/// - 201: merge commit created (caller must read the body)
/// - 204: `head` is already contained in `base`
/// - 409: merge conflict
///
/// This is a pure function extracted for testability.
pub fn merge_outcome_for_status(status: u16) -> Option<GitHubResponse> {
    match status {
        204 => Some(GitHubResponse::NothingToMerge),
        409 => Some(GitHubResponse::MergeConflict),
        _ => None,
    }
}

async fn merge_branches(
    client: &OctocrabClient,
    base: &RefName,
    head: &Sha,
    commit_message: &str,
) -> Result<GitHubResponse, GitHubApiError> {
    let route = client.route("merges");
    let base_name = base.merge_base_name();
    let request = MergeRequest {
        base: &base_name,
        head: head.as_str(),
        commit_message,
    };

    // The typed `post` helper cannot represent the empty 204 body, so inspect the
    // raw response.
    let response = client
        .inner()
        ._post(route, Some(&request))
        .await
        .map_err(GitHubApiError::from_octocrab)?;

    if let Some(outcome) = merge_outcome_for_status(response.status().as_u16()) {
        return Ok(outcome);
    }

    let response = octocrab::map_github_error(response)
        .await
        .map_err(GitHubApiError::from_octocrab)?;
    let status = response.status().as_u16();
    if status != 201 {
        return Err(GitHubApiError::unexpected_status(status, "merge"));
    }

    let body = client
        .inner()
        .body_to_string(response)
        .await
        .map_err(GitHubApiError::from_octocrab)?;
    let merged: MergeResponse = serde_json::from_str(&body).map_err(|e| {
        GitHubApiError::permanent_without_source(format!("Invalid merge response: {}", e))
    })?;

    Ok(GitHubResponse::Merged {
        sha: parse_sha(&merged.sha, "merge commit SHA")?,
        tree: parse_sha(&merged.commit.tree.sha, "merge tree SHA")?,
    })
}

// ─── References ───────────────────────────────────────────────────────────────

/// Checks if an error message indicates that a created reference already exists.
///
/// This is a pure function extracted for testability.
pub fn is_ref_exists_error(message: &str) -> bool {
    message.to_lowercase().contains("reference already exists")
}

/// Checks if an error message indicates a rejected non-forced ref update.
///
/// GitHub answers HTTP 422 "Update is not a fast forward" when the new SHA does
/// not descend from the reference's current head.
///
/// This is a pure function extracted for testability.
pub fn is_not_fast_forward_error(message: &str) -> bool {
    message.to_lowercase().contains("not a fast forward")
}

async fn get_ref_head(
    client: &OctocrabClient,
    reference: &RefName,
) -> Result<GitHubResponse, GitHubApiError> {
    let route = client.route(&format!("git/ref/{}", encode_ref_path(reference)));
    let result: Result<RefResponse, _> = client.inner().get(&route, None::<&()>).await;

    match result {
        Ok(response) => Ok(GitHubResponse::RefHead(parse_sha(
            &response.object.sha,
            "ref target SHA",
        )?)),
        Err(e) => Err(GitHubApiError::from_octocrab(e)),
    }
}

async fn create_ref(
    client: &OctocrabClient,
    reference: &RefName,
    sha: &Sha,
) -> Result<GitHubResponse, GitHubApiError> {
    let route = client.route("git/refs");
    let full = reference.full();
    let request = CreateRefRequest {
        reference: &full,
        sha: sha.as_str(),
    };

    let result: Result<serde_json::Value, _> = client.inner().post(&route, Some(&request)).await;

    match result {
        Ok(_) => Ok(GitHubResponse::RefCreated),
        Err(e) if is_ref_exists_error(&error_message(&e)) => Ok(GitHubResponse::RefAlreadyExists),
        Err(e) => Err(GitHubApiError::from_octocrab(e)),
    }
}

async fn update_ref(
    client: &OctocrabClient,
    reference: &RefName,
    sha: &Sha,
    force: bool,
) -> Result<GitHubResponse, GitHubApiError> {
    let route = client.route(&format!("git/refs/{}", encode_ref_path(reference)));
    let request = UpdateRefRequest {
        sha: sha.as_str(),
        force,
    };

    let result: Result<serde_json::Value, _> = client.inner().patch(&route, Some(&request)).await;

    match result {
        Ok(_) => Ok(GitHubResponse::RefUpdated),
        Err(e) if !force && is_not_fast_forward_error(&error_message(&e)) => {
            Ok(GitHubResponse::RefUpdateRejected)
        }
        Err(e) => Err(GitHubApiError::from_octocrab(e)),
    }
}

async fn delete_ref(
    client: &OctocrabClient,
    reference: &RefName,
) -> Result<GitHubResponse, GitHubApiError> {
    let route = client.route(&format!("git/refs/{}", encode_ref_path(reference)));

    // 204 No Content on success, so skip body deserialization.
    let response = client
        .inner()
        ._delete(route, None::<&()>)
        .await
        .map_err(GitHubApiError::from_octocrab)?;
    octocrab::map_github_error(response)
        .await
        .map_err(GitHubApiError::from_octocrab)?;

    Ok(GitHubResponse::RefDeleted)
}
