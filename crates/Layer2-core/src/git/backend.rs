//! Version-control backend abstraction

use crate::snapshot::ChangeKind;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Not a git repository: {0}")]
    NotARepository(PathBuf),

    #[error("git {command} failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    #[error("No changes staged for commit")]
    NothingToCommit,

    #[error("Paths no longer exist: {}", .0.join(", "))]
    MissingPaths(Vec<String>),

    #[error("Cannot discard the root commit: there is no parent to reset to")]
    RootCommitDiscard,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BackendError {
    /// Corrective hint shown next to the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            BackendError::NotARepository(_) => {
                Some("Run uncommit from inside a git repository (or `git init` first).")
            }
            BackendError::Io(_) => Some("Make sure `git` is installed and on your PATH."),
            BackendError::MissingPaths(_) => {
                Some("The working tree changed since the plan was made. Run 'uncommit suggest' again.")
            }
            BackendError::RootCommitDiscard => Some("Use --soft or the default mode instead."),
            _ => None,
        }
    }
}

// ============================================================================
// Types
// ============================================================================

/// A commit from history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitInfo {
    /// Short commit hash
    pub hash: String,

    /// First line of the commit message
    pub message: String,

    /// Author name
    pub author: String,

    /// Commit date (ISO-8601)
    pub date: String,
}

/// What happens to the changes of an undone commit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UndoMode {
    /// Changes stay in the index (`reset --soft`)
    KeepStaged,

    /// Changes stay in the working tree only (`reset --mixed`)
    #[default]
    KeepUnstaged,

    /// Changes are thrown away (`reset --hard`)
    Discard,
}

impl UndoMode {
    pub fn reset_flag(&self) -> &'static str {
        match self {
            UndoMode::KeepStaged => "--soft",
            UndoMode::KeepUnstaged => "--mixed",
            UndoMode::Discard => "--hard",
        }
    }
}

// ============================================================================
// Backend Trait
// ============================================================================

/// Version-control operations the workflow depends on.
///
/// All paths are repository-relative with `/` separators.
pub trait VersionControlBackend {
    /// Repository root directory
    fn root(&self) -> &Path;

    /// Whether HEAD points at a commit
    fn has_commits(&self) -> bool;

    /// Changes recorded in the index relative to HEAD
    fn staged_changes(&self) -> Result<Vec<(String, ChangeKind)>, BackendError>;

    /// Changes to tracked files not yet in the index
    fn unstaged_changes(&self) -> Result<Vec<(String, ChangeKind)>, BackendError>;

    /// Files not tracked and not ignored
    fn untracked_files(&self) -> Result<Vec<String>, BackendError>;

    /// Diff of one file against the last commit (or `/dev/null` when untracked)
    fn diff(&self, path: &str) -> Result<String, BackendError>;

    /// Make the index match the last commit
    fn reset_index(&self) -> Result<(), BackendError>;

    /// Stage exactly these paths (deleted files stage as deletions)
    fn stage(&self, paths: &[String]) -> Result<(), BackendError>;

    /// Commit the index, returning the short hash
    fn commit(&self, message: &str) -> Result<String, BackendError>;

    /// Most recent commit, `None` on an unborn branch
    fn last_commit(&self) -> Result<Option<CommitInfo>, BackendError>;

    /// Move HEAD back by one commit
    fn undo_last_commit(&self, mode: UndoMode) -> Result<(), BackendError>;
}
