//! Test doubles shared by the core unit tests

use crate::git::{BackendError, CommitInfo, GitOps, UndoMode, VersionControlBackend};
use crate::snapshot::ChangeKind;
use std::cell::RefCell;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

type Tree = BTreeMap<String, String>;

#[derive(Default)]
struct State {
    head: Tree,
    index: Tree,
    worktree: Tree,
    commits: Vec<(CommitInfo, Tree)>,
    failing_diffs: HashSet<String>,
    fail_commits: bool,
}

/// In-memory backend with git-like head/index/worktree semantics
pub struct MemoryBackend {
    root: PathBuf,
    state: RefCell<State>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self {
            root: PathBuf::from("/memory-repo"),
            state: RefCell::new(State::default()),
        }
    }

    /// Write files and commit them as-is
    pub fn commit_files(&self, files: &[(&str, &str)]) {
        for (path, content) in files {
            self.write(path, content);
            self.stage_now(path);
        }
        self.commit("initial").unwrap();
    }

    pub fn write(&self, path: &str, content: &str) {
        self.state
            .borrow_mut()
            .worktree
            .insert(path.to_string(), content.to_string());
    }

    pub fn remove(&self, path: &str) {
        self.state.borrow_mut().worktree.remove(path);
    }

    /// `git add` a single path right away
    pub fn stage_now(&self, path: &str) {
        self.stage(&[path.to_string()]).unwrap();
    }

    pub fn fail_diff_for(&self, path: &str) {
        self.state.borrow_mut().failing_diffs.insert(path.to_string());
    }

    pub fn fail_commits(&self) {
        self.state.borrow_mut().fail_commits = true;
    }

    pub fn commit_count(&self) -> usize {
        self.state.borrow().commits.len()
    }

    /// Commit messages, oldest first
    pub fn messages(&self) -> Vec<String> {
        self.state
            .borrow()
            .commits
            .iter()
            .map(|(info, _)| info.message.clone())
            .collect()
    }

    /// Files in the tree of the latest commit
    pub fn head_files(&self) -> Vec<String> {
        self.state.borrow().head.keys().cloned().collect()
    }

    /// Files of the commit at `position` (0 = oldest)
    pub fn commit_files_at(&self, position: usize) -> Vec<String> {
        let state = self.state.borrow();
        let (_, tree) = &state.commits[position];
        let parent = position
            .checked_sub(1)
            .map(|p| state.commits[p].1.clone())
            .unwrap_or_default();
        changed_between(&parent, tree)
            .into_iter()
            .map(|(path, _)| path)
            .collect()
    }

    pub fn staged_paths(&self) -> Vec<String> {
        self.staged_changes()
            .unwrap()
            .into_iter()
            .map(|(p, _)| p)
            .collect()
    }
}

fn changed_between(from: &Tree, to: &Tree) -> Vec<(String, ChangeKind)> {
    let mut changes = Vec::new();
    for (path, content) in to {
        match from.get(path) {
            None => changes.push((path.clone(), ChangeKind::Added)),
            Some(old) if old != content => changes.push((path.clone(), ChangeKind::Modified)),
            _ => {}
        }
    }
    for path in from.keys() {
        if !to.contains_key(path) {
            changes.push((path.clone(), ChangeKind::Deleted));
        }
    }
    changes.sort_by(|a, b| a.0.cmp(&b.0));
    changes
}

impl VersionControlBackend for MemoryBackend {
    fn root(&self) -> &Path {
        &self.root
    }

    fn has_commits(&self) -> bool {
        !self.state.borrow().commits.is_empty()
    }

    fn staged_changes(&self) -> Result<Vec<(String, ChangeKind)>, BackendError> {
        let state = self.state.borrow();
        Ok(changed_between(&state.head, &state.index))
    }

    fn unstaged_changes(&self) -> Result<Vec<(String, ChangeKind)>, BackendError> {
        let state = self.state.borrow();
        let tracked: Tree = state
            .worktree
            .iter()
            .filter(|(p, _)| state.index.contains_key(*p))
            .map(|(p, c)| (p.clone(), c.clone()))
            .collect();
        Ok(changed_between(&state.index, &tracked))
    }

    fn untracked_files(&self) -> Result<Vec<String>, BackendError> {
        let state = self.state.borrow();
        Ok(state
            .worktree
            .keys()
            .filter(|p| !state.index.contains_key(*p))
            .cloned()
            .collect())
    }

    fn diff(&self, path: &str) -> Result<String, BackendError> {
        let state = self.state.borrow();
        if state.failing_diffs.contains(path) {
            return Err(BackendError::CommandFailed {
                command: "diff".to_string(),
                stderr: format!("cannot read {path}"),
            });
        }
        let old = state.head.get(path).cloned().unwrap_or_default();
        let new = state.worktree.get(path).cloned().unwrap_or_default();
        Ok(format!("--- a/{path}\n+++ b/{path}\n-{old}\n+{new}"))
    }

    fn reset_index(&self) -> Result<(), BackendError> {
        let mut state = self.state.borrow_mut();
        state.index = state.head.clone();
        Ok(())
    }

    fn stage(&self, paths: &[String]) -> Result<(), BackendError> {
        let mut state = self.state.borrow_mut();
        let missing: Vec<String> = paths
            .iter()
            .filter(|p| !state.worktree.contains_key(*p) && !state.index.contains_key(*p))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(BackendError::MissingPaths(missing));
        }

        for path in paths {
            match state.worktree.get(path).cloned() {
                Some(content) => {
                    state.index.insert(path.clone(), content);
                }
                None => {
                    state.index.remove(path);
                }
            }
        }
        Ok(())
    }

    fn commit(&self, message: &str) -> Result<String, BackendError> {
        let mut state = self.state.borrow_mut();
        if state.fail_commits {
            return Err(BackendError::CommandFailed {
                command: "commit".to_string(),
                stderr: "hook rejected commit".to_string(),
            });
        }
        if state.index == state.head {
            return Err(BackendError::NothingToCommit);
        }

        let hash = format!("c{:06x}", state.commits.len() + 1);
        let info = CommitInfo {
            hash: hash.clone(),
            message: message.to_string(),
            author: "Test".to_string(),
            date: "2024-01-01T00:00:00+00:00".to_string(),
        };
        state.head = state.index.clone();
        let tree = state.head.clone();
        state.commits.push((info, tree));
        Ok(hash)
    }

    fn last_commit(&self) -> Result<Option<CommitInfo>, BackendError> {
        Ok(self
            .state
            .borrow()
            .commits
            .last()
            .map(|(info, _)| info.clone()))
    }

    fn undo_last_commit(&self, mode: UndoMode) -> Result<(), BackendError> {
        let mut state = self.state.borrow_mut();
        if state.commits.is_empty() {
            return Err(BackendError::CommandFailed {
                command: "reset".to_string(),
                stderr: "no commits".to_string(),
            });
        }
        if state.commits.len() == 1 && mode == UndoMode::Discard {
            return Err(BackendError::RootCommitDiscard);
        }

        state.commits.pop();
        let parent = state
            .commits
            .last()
            .map(|(_, tree)| tree.clone())
            .unwrap_or_default();

        match mode {
            UndoMode::KeepStaged => {}
            UndoMode::KeepUnstaged => state.index = parent.clone(),
            UndoMode::Discard => {
                let old_index = std::mem::take(&mut state.index);
                for path in old_index.keys() {
                    match parent.get(path) {
                        Some(content) => {
                            state.worktree.insert(path.clone(), content.clone());
                        }
                        None => {
                            state.worktree.remove(path);
                        }
                    }
                }
                state.index = parent.clone();
            }
        }
        state.head = parent;
        Ok(())
    }
}

// ============================================================================
// Real repositories
// ============================================================================

/// Throwaway git repository; `init` returns `None` when git is unavailable
pub struct TestRepo {
    dir: TempDir,
}

impl TestRepo {
    pub fn init() -> Option<Self> {
        let available = Command::new("git")
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false);
        if !available {
            return None;
        }

        let repo = Self {
            dir: tempfile::tempdir().ok()?,
        };
        repo.git(&["init", "-q"]);
        repo.git(&["config", "user.name", "Test"]);
        repo.git(&["config", "user.email", "test@example.com"]);
        repo.git(&["config", "commit.gpgsign", "false"]);
        Some(repo)
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn write(&self, path: &str, content: &str) {
        let full = self.dir.path().join(path);
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(full, content).unwrap();
    }

    pub fn remove(&self, path: &str) {
        std::fs::remove_file(self.dir.path().join(path)).unwrap();
    }

    /// Run git in the repository, panicking on failure
    pub fn git(&self, args: &[&str]) -> String {
        let output = Command::new("git")
            .args(args)
            .current_dir(self.dir.path())
            .output()
            .unwrap();
        assert!(
            output.status.success(),
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }

    pub fn commit_all(&self, message: &str) {
        self.git(&["add", "-A"]);
        self.git(&["commit", "-q", "-m", message]);
    }

    pub fn ops(&self) -> GitOps {
        GitOps::new(self.dir.path()).unwrap()
    }

    /// Number of commits reachable from HEAD
    pub fn commit_count(&self) -> usize {
        let output = Command::new("git")
            .args(["rev-list", "--count", "HEAD"])
            .current_dir(self.dir.path())
            .output()
            .unwrap();
        String::from_utf8_lossy(&output.stdout)
            .trim()
            .parse()
            .unwrap_or(0)
    }
}
