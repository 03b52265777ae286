//! Shared test utilities: an in-memory remote and arbitrary generators for
//! property-based testing.
//!
//! `FakeRemote` models just enough of a hosted object graph to exercise the
//! cherry-pick end to end: content-addressed commits and trees, a file-level
//! three-way merge that reports conflicts, and fast-forward-checked ref updates.
//! Trees are flat maps from path to file contents.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::future::Future;
use std::sync::Mutex;

use chrono::DateTime;
use proptest::prelude::*;
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::effects::{GitHubEffect, GitHubInterpreter, GitHubResponse};
use crate::types::{CommitData, RefName, Sha, Signature};

pub fn arb_sha() -> impl Strategy<Value = Sha> {
    "[0-9a-f]{40}".prop_map(|s| Sha::parse(s).unwrap())
}

pub fn arb_branch_name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9/-]{0,50}".prop_map(String::from)
}

/// File path to contents.
pub type Files = BTreeMap<String, String>;

/// Builds a [`Files`] map from literal pairs.
pub fn files(entries: &[(&str, &str)]) -> Files {
    entries
        .iter()
        .map(|(path, contents)| (path.to_string(), contents.to_string()))
        .collect()
}

/// A deterministic signature for `name`.
pub fn signature(name: &str) -> Signature {
    Signature {
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
        date: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
    }
}

fn hash(kind: &str, payload: &str) -> Sha {
    let mut hasher = Sha256::new();
    hasher.update(kind.as_bytes());
    hasher.update([0]);
    hasher.update(payload.as_bytes());
    let digest = hex::encode(hasher.finalize());
    Sha::parse(&digest[..40]).unwrap()
}

/// Errors the fake remote produces, mirroring the remote's 404/422 cases.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FakeRemoteError {
    #[error("no commit {0}")]
    UnknownCommit(Sha),
    #[error("no tree {0}")]
    UnknownTree(Sha),
    #[error("no ref {0}")]
    UnknownRef(RefName),
    #[error("injected failure of {0}")]
    Injected(&'static str),
}

#[derive(Default)]
struct State {
    commits: HashMap<Sha, CommitData>,
    trees: HashMap<Sha, Files>,
    refs: BTreeMap<RefName, Sha>,
    calls: Vec<GitHubEffect>,
    /// Effect name and zero-based occurrence to fail.
    failures: Vec<(&'static str, usize)>,
}

/// In-memory [`GitHubInterpreter`].
#[derive(Default)]
pub struct FakeRemote {
    state: Mutex<State>,
}

impl FakeRemote {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    // ─── Fixture Setup ────────────────────────────────────────────────────────

    /// Creates a commit with `contents` as its full tree and returns its SHA.
    pub fn commit(&self, parents: &[&Sha], contents: Files, message: &str, author: &str) -> Sha {
        let mut state = self.state();
        let tree = state.store_tree(contents);
        state.store_commit(
            tree,
            parents.iter().map(|p| (*p).clone()).collect(),
            message.to_string(),
            signature(author),
            signature(author),
        )
    }

    /// Creates a commit whose tree is its first parent's with `changes` applied.
    ///
    /// A `None` contents deletes the path.
    pub fn commit_change(
        &self,
        parent: &Sha,
        changes: &[(&str, Option<&str>)],
        message: &str,
        author: &str,
    ) -> Sha {
        let mut contents = self.files_at(parent);
        for (path, change) in changes {
            match change {
                Some(text) => contents.insert(path.to_string(), text.to_string()),
                None => contents.remove(*path),
            };
        }
        self.commit(&[parent], contents, message, author)
    }

    pub fn set_ref(&self, reference: &RefName, sha: &Sha) {
        self.state().refs.insert(reference.clone(), sha.clone());
    }

    /// Fails the `occurrence`-th (zero-based) call of the named effect.
    pub fn fail_on(&self, effect: &'static str, occurrence: usize) {
        self.state().failures.push((effect, occurrence));
    }

    // ─── Inspection ───────────────────────────────────────────────────────────

    pub fn ref_head(&self, reference: &RefName) -> Option<Sha> {
        self.state().refs.get(reference).cloned()
    }

    pub fn refs(&self) -> Vec<RefName> {
        self.state().refs.keys().cloned().collect()
    }

    pub fn commit_data(&self, sha: &Sha) -> CommitData {
        self.state().commits[sha].clone()
    }

    pub fn files_at(&self, commit: &Sha) -> Files {
        let state = self.state();
        state.trees[&state.commits[commit].tree].clone()
    }

    /// First-parent history from `sha` back to the root, newest first.
    pub fn history(&self, sha: &Sha) -> Vec<CommitData> {
        let state = self.state();
        let mut out = Vec::new();
        let mut cursor = Some(sha.clone());
        while let Some(current) = cursor {
            let commit = state.commits[&current].clone();
            cursor = commit.parents.first().cloned();
            out.push(commit);
        }
        out
    }

    pub fn calls(&self) -> Vec<GitHubEffect> {
        self.state().calls.clone()
    }

    pub fn call_names(&self) -> Vec<&'static str> {
        self.state().calls.iter().map(GitHubEffect::name).collect()
    }

    pub fn count_calls(&self, name: &str) -> usize {
        self.state()
            .calls
            .iter()
            .filter(|effect| effect.name() == name)
            .count()
    }

    fn apply(&self, effect: GitHubEffect) -> Result<GitHubResponse, FakeRemoteError> {
        let mut state = self.state();
        let name = effect.name();
        let occurrence = state.calls.iter().filter(|e| e.name() == name).count();
        state.calls.push(effect.clone());
        if state.failures.contains(&(name, occurrence)) {
            return Err(FakeRemoteError::Injected(name));
        }
        state.apply(effect)
    }
}

impl State {
    fn store_tree(&mut self, contents: Files) -> Sha {
        let payload = serde_json::to_string(&contents).unwrap();
        let sha = hash("tree", &payload);
        self.trees.insert(sha.clone(), contents);
        sha
    }

    fn store_commit(
        &mut self,
        tree: Sha,
        parents: Vec<Sha>,
        message: String,
        author: Signature,
        committer: Signature,
    ) -> Sha {
        let payload = serde_json::json!({
            "tree": tree,
            "parents": parents,
            "message": message,
            "author": author,
            "committer": committer,
        })
        .to_string();
        let sha = hash("commit", &payload);
        self.commits.insert(
            sha.clone(),
            CommitData {
                sha: sha.clone(),
                tree,
                parents,
                author,
                committer,
                message,
            },
        );
        sha
    }

    fn commit(&self, sha: &Sha) -> Result<&CommitData, FakeRemoteError> {
        self.commits
            .get(sha)
            .ok_or_else(|| FakeRemoteError::UnknownCommit(sha.clone()))
    }

    fn ref_head(&self, reference: &RefName) -> Result<Sha, FakeRemoteError> {
        self.refs
            .get(reference)
            .cloned()
            .ok_or_else(|| FakeRemoteError::UnknownRef(reference.clone()))
    }

    /// All commits reachable from `sha`, including itself.
    fn ancestors(&self, sha: &Sha) -> HashSet<Sha> {
        let mut seen = HashSet::new();
        let mut stack = vec![sha.clone()];
        while let Some(current) = stack.pop() {
            if !seen.insert(current.clone()) {
                continue;
            }
            if let Some(commit) = self.commits.get(&current) {
                stack.extend(commit.parents.iter().cloned());
            }
        }
        seen
    }

    /// The first ancestor of `head` (breadth-first) that is also an ancestor of `base`.
    fn merge_base(&self, base: &Sha, head: &Sha) -> Option<Sha> {
        let base_ancestors = self.ancestors(base);
        let mut queue = VecDeque::from([head.clone()]);
        let mut seen = HashSet::new();
        while let Some(current) = queue.pop_front() {
            if base_ancestors.contains(&current) {
                return Some(current);
            }
            if !seen.insert(current.clone()) {
                continue;
            }
            if let Some(commit) = self.commits.get(&current) {
                queue.extend(commit.parents.iter().cloned());
            }
        }
        None
    }

    fn tree_of(&self, commit: &Sha) -> Result<Files, FakeRemoteError> {
        let tree = &self.commit(commit)?.tree;
        self.trees
            .get(tree)
            .cloned()
            .ok_or_else(|| FakeRemoteError::UnknownTree(tree.clone()))
    }

    fn apply(&mut self, effect: GitHubEffect) -> Result<GitHubResponse, FakeRemoteError> {
        match effect {
            GitHubEffect::GetCommit { sha } => Ok(GitHubResponse::Commit(self.commit(&sha)?.clone())),
            GitHubEffect::CreateCommit {
                message,
                tree,
                parents,
                author,
                committer,
            } => {
                if !self.trees.contains_key(&tree) {
                    return Err(FakeRemoteError::UnknownTree(tree));
                }
                for parent in &parents {
                    self.commit(parent)?;
                }
                let sha = self.store_commit(tree.clone(), parents, message, author, committer);
                Ok(GitHubResponse::CommitCreated { sha, tree })
            }
            GitHubEffect::MergeBranches {
                base,
                head,
                commit_message,
            } => {
                let base_head = self.ref_head(&base)?;
                self.commit(&head)?;
                if self.ancestors(&base_head).contains(&head) {
                    return Ok(GitHubResponse::NothingToMerge);
                }
                let ancestor = match self.merge_base(&base_head, &head) {
                    Some(sha) => self.tree_of(&sha)?,
                    None => Files::new(),
                };
                let ours = self.tree_of(&base_head)?;
                let theirs = self.tree_of(&head)?;
                let Some(merged) = three_way_merge(&ancestor, &ours, &theirs) else {
                    return Ok(GitHubResponse::MergeConflict);
                };
                let tree = self.store_tree(merged);
                let sha = self.store_commit(
                    tree.clone(),
                    vec![base_head, head],
                    commit_message,
                    signature("GitHub"),
                    signature("GitHub"),
                );
                self.refs.insert(base, sha.clone());
                Ok(GitHubResponse::Merged { sha, tree })
            }
            GitHubEffect::GetRefHead { reference } => {
                Ok(GitHubResponse::RefHead(self.ref_head(&reference)?))
            }
            GitHubEffect::CreateRef { reference, sha } => {
                if self.refs.contains_key(&reference) {
                    return Ok(GitHubResponse::RefAlreadyExists);
                }
                self.commit(&sha)?;
                self.refs.insert(reference, sha);
                Ok(GitHubResponse::RefCreated)
            }
            GitHubEffect::UpdateRef {
                reference,
                sha,
                force,
            } => {
                let current = self.ref_head(&reference)?;
                self.commit(&sha)?;
                if !force && !self.ancestors(&sha).contains(&current) {
                    return Ok(GitHubResponse::RefUpdateRejected);
                }
                self.refs.insert(reference, sha);
                Ok(GitHubResponse::RefUpdated)
            }
            GitHubEffect::DeleteRef { reference } => match self.refs.remove(&reference) {
                Some(_) => Ok(GitHubResponse::RefDeleted),
                None => Err(FakeRemoteError::UnknownRef(reference)),
            },
        }
    }
}

/// File-level three-way merge. Returns `None` if any path changed differently
/// on both sides.
pub fn three_way_merge(ancestor: &Files, ours: &Files, theirs: &Files) -> Option<Files> {
    let paths: std::collections::BTreeSet<&String> = ancestor
        .keys()
        .chain(ours.keys())
        .chain(theirs.keys())
        .collect();

    let mut merged = Files::new();
    for path in paths {
        let base = ancestor.get(path);
        let o = ours.get(path);
        let t = theirs.get(path);
        let resolved = if o == t || t == base {
            o
        } else if o == base {
            t
        } else {
            return None;
        };
        if let Some(contents) = resolved {
            merged.insert(path.clone(), contents.clone());
        }
    }
    Some(merged)
}

impl GitHubInterpreter for FakeRemote {
    type Error = FakeRemoteError;

    fn interpret(
        &self,
        effect: GitHubEffect,
    ) -> impl Future<Output = Result<GitHubResponse, Self::Error>> + Send {
        let result = self.apply(effect);
        async move { result }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_way_merge_takes_one_sided_changes() {
        let base = files(&[("a", "1"), ("b", "1")]);
        let ours = files(&[("a", "2"), ("b", "1")]);
        let theirs = files(&[("a", "1"), ("b", "1"), ("c", "new")]);
        assert_eq!(
            three_way_merge(&base, &ours, &theirs),
            Some(files(&[("a", "2"), ("b", "1"), ("c", "new")]))
        );
    }

    #[test]
    fn three_way_merge_detects_conflicts() {
        let base = files(&[("a", "1")]);
        let ours = files(&[("a", "2")]);
        let theirs = files(&[("a", "3")]);
        assert_eq!(three_way_merge(&base, &ours, &theirs), None);
    }

    #[test]
    fn three_way_merge_applies_deletions() {
        let base = files(&[("a", "1"), ("b", "1")]);
        let ours = files(&[("a", "1"), ("b", "1")]);
        let theirs = files(&[("a", "1")]);
        assert_eq!(
            three_way_merge(&base, &ours, &theirs),
            Some(files(&[("a", "1")]))
        );
    }

    #[test]
    fn identical_commits_share_a_sha() {
        let remote = FakeRemote::new();
        let a = remote.commit(&[], files(&[("a", "1")]), "root", "Ada");
        let b = remote.commit(&[], files(&[("a", "1")]), "root", "Ada");
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn non_forced_update_requires_descendant() {
        let remote = FakeRemote::new();
        let main = RefName::branch("main");
        let a = remote.commit(&[], files(&[("a", "1")]), "A", "Ada");
        let b = remote.commit_change(&a, &[("a", Some("2"))], "B", "Ada");
        let c = remote.commit_change(&a, &[("a", Some("3"))], "C", "Ada");
        remote.set_ref(&main, &b);

        let response = remote
            .interpret(GitHubEffect::UpdateRef {
                reference: main.clone(),
                sha: c.clone(),
                force: false,
            })
            .await
            .unwrap();
        assert_eq!(response, GitHubResponse::RefUpdateRejected);
        assert_eq!(remote.ref_head(&main), Some(b));

        let response = remote
            .interpret(GitHubEffect::UpdateRef {
                reference: main.clone(),
                sha: c.clone(),
                force: true,
            })
            .await
            .unwrap();
        assert_eq!(response, GitHubResponse::RefUpdated);
        assert_eq!(remote.ref_head(&main), Some(c));
    }

    #[tokio::test]
    async fn injected_failures_hit_the_requested_occurrence() {
        let remote = FakeRemote::new();
        let a = remote.commit(&[], files(&[("a", "1")]), "A", "Ada");
        remote.fail_on("get_commit", 1);

        let first = remote.interpret(GitHubEffect::GetCommit { sha: a.clone() }).await;
        let second = remote.interpret(GitHubEffect::GetCommit { sha: a.clone() }).await;
        let third = remote.interpret(GitHubEffect::GetCommit { sha: a }).await;

        assert!(first.is_ok());
        assert_eq!(second, Err(FakeRemoteError::Injected("get_commit")));
        assert!(third.is_ok());
    }
}
