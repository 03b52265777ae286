//! Typed wrappers over the effect interface.
//!
//! Each method issues exactly one effect, tags failures with the step that was in
//! progress, and turns the response variants the core must branch on into
//! [`CherryPickError`]s.

use crate::effects::{GitHubEffect, GitHubInterpreter, GitHubResponse};
use crate::types::{CherryPickHead, CommitData, RefName, Sha, Signature};

use super::error::{CherryPickError, Step};

/// Borrowed interpreter with cherry-pick-specific response handling.
pub(crate) struct Remote<'a, I> {
    interpreter: &'a I,
}

/// Fields of a commit to create.
pub(crate) struct NewCommit<'a> {
    pub message: &'a str,
    pub tree: &'a Sha,
    pub parent: &'a Sha,
    pub author: &'a Signature,
    pub committer: &'a Signature,
}

fn unexpected<E>(step: Step, response: GitHubResponse) -> CherryPickError<E> {
    CherryPickError::UnexpectedResponse {
        step,
        response: format!("{:?}", response),
    }
}

impl<'a, I: GitHubInterpreter> Remote<'a, I> {
    pub(crate) fn new(interpreter: &'a I) -> Self {
        Self { interpreter }
    }

    async fn call(
        &self,
        step: Step,
        commit: Option<&Sha>,
        effect: GitHubEffect,
    ) -> Result<GitHubResponse, CherryPickError<I::Error>> {
        self.interpreter
            .interpret(effect)
            .await
            .map_err(|source| CherryPickError::Remote {
                step,
                commit: commit.cloned(),
                source,
            })
    }

    pub(crate) async fn ref_head(&self, reference: &RefName) -> Result<Sha, CherryPickError<I::Error>> {
        let effect = GitHubEffect::GetRefHead {
            reference: reference.clone(),
        };
        match self.call(Step::GetTargetHead, None, effect).await? {
            GitHubResponse::RefHead(sha) => Ok(sha),
            other => Err(unexpected(Step::GetTargetHead, other)),
        }
    }

    pub(crate) async fn get_commit(
        &self,
        step: Step,
        sha: &Sha,
    ) -> Result<CommitData, CherryPickError<I::Error>> {
        let effect = GitHubEffect::GetCommit { sha: sha.clone() };
        match self.call(step, Some(sha), effect).await? {
            GitHubResponse::Commit(data) => Ok(data),
            other => Err(unexpected(step, other)),
        }
    }

    pub(crate) async fn create_commit(
        &self,
        step: Step,
        source: &Sha,
        commit: NewCommit<'_>,
    ) -> Result<CherryPickHead, CherryPickError<I::Error>> {
        let effect = GitHubEffect::CreateCommit {
            message: commit.message.to_string(),
            tree: commit.tree.clone(),
            parents: vec![commit.parent.clone()],
            author: commit.author.clone(),
            committer: commit.committer.clone(),
        };
        match self.call(step, Some(source), effect).await? {
            GitHubResponse::CommitCreated { sha, tree } => Ok(CherryPickHead { sha, tree }),
            other => Err(unexpected(step, other)),
        }
    }

    /// Merges `head` into `base`, returning the merge commit and its tree.
    pub(crate) async fn merge(
        &self,
        base: &RefName,
        head: &Sha,
    ) -> Result<CherryPickHead, CherryPickError<I::Error>> {
        let effect = GitHubEffect::MergeBranches {
            base: base.clone(),
            head: head.clone(),
            commit_message: format!("Merge {} into {}", head, base.full()),
        };
        match self.call(Step::Merge, Some(head), effect).await? {
            GitHubResponse::Merged { sha, tree } => Ok(CherryPickHead { sha, tree }),
            GitHubResponse::MergeConflict => Err(CherryPickError::MergeConflict {
                commit: head.clone(),
            }),
            GitHubResponse::NothingToMerge => Err(CherryPickError::NothingToMerge {
                commit: head.clone(),
            }),
            other => Err(unexpected(Step::Merge, other)),
        }
    }

    /// Creates the sandbox ref; an existing ref of that name is never overwritten.
    pub(crate) async fn create_sandbox(
        &self,
        sandbox: &RefName,
        sha: &Sha,
    ) -> Result<(), CherryPickError<I::Error>> {
        let effect = GitHubEffect::CreateRef {
            reference: sandbox.clone(),
            sha: sha.clone(),
        };
        match self.call(Step::CreateSandbox, None, effect).await? {
            GitHubResponse::RefCreated => Ok(()),
            GitHubResponse::RefAlreadyExists => Err(CherryPickError::SandboxExists {
                sandbox: sandbox.clone(),
            }),
            other => Err(unexpected(Step::CreateSandbox, other)),
        }
    }

    /// Unconditionally moves the sandbox ref.
    pub(crate) async fn force_update(
        &self,
        step: Step,
        source: &Sha,
        sandbox: &RefName,
        sha: &Sha,
    ) -> Result<(), CherryPickError<I::Error>> {
        let effect = GitHubEffect::UpdateRef {
            reference: sandbox.clone(),
            sha: sha.clone(),
            force: true,
        };
        match self.call(step, Some(source), effect).await? {
            GitHubResponse::RefUpdated => Ok(()),
            other => Err(unexpected(step, other)),
        }
    }

    /// Moves `target` to `sha`, failing if that is not a fast-forward from where
    /// the target currently is.
    pub(crate) async fn fast_forward(
        &self,
        target: &RefName,
        sha: &Sha,
        expected: &Sha,
    ) -> Result<(), CherryPickError<I::Error>> {
        let effect = GitHubEffect::UpdateRef {
            reference: target.clone(),
            sha: sha.clone(),
            force: false,
        };
        match self.call(Step::UpdateTarget, None, effect).await? {
            GitHubResponse::RefUpdated => Ok(()),
            GitHubResponse::RefUpdateRejected => Err(CherryPickError::ConcurrentModification {
                target: target.clone(),
                expected: expected.clone(),
            }),
            other => Err(unexpected(Step::UpdateTarget, other)),
        }
    }

    pub(crate) async fn delete_ref(&self, reference: &RefName) -> Result<(), CherryPickError<I::Error>> {
        let effect = GitHubEffect::DeleteRef {
            reference: reference.clone(),
        };
        match self.call(Step::DeleteSandbox, None, effect).await? {
            GitHubResponse::RefDeleted => Ok(()),
            other => Err(unexpected(Step::DeleteSandbox, other)),
        }
    }
}
