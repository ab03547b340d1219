//! Git Operations
//!
//! `VersionControlBackend` backed by the `git` command line.

use super::backend::{BackendError, CommitInfo, UndoMode, VersionControlBackend};
use crate::snapshot::ChangeKind;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tracing::{debug, info};

/// Field separator for `git log --format`
const FIELD_SEP: char = '\u{1f}';

// ============================================================================
// Git Operations
// ============================================================================

/// Git operations handler
#[derive(Debug, Clone)]
pub struct GitOps {
    /// Repository root directory
    root: PathBuf,
}

impl GitOps {
    /// Open the repository containing `path`
    pub fn new(path: impl AsRef<Path>) -> Result<Self, BackendError> {
        let path = path.as_ref();
        let root = Self::find_git_root(path)?;
        debug!("Opened repository at {}", root.display());
        Ok(Self { root })
    }

    /// Find the git repository root
    fn find_git_root(path: &Path) -> Result<PathBuf, BackendError> {
        let start = std::fs::canonicalize(path)
            .map_err(|_| BackendError::NotARepository(path.to_path_buf()))?;
        let mut current = if start.is_file() {
            start.parent().map(Path::to_path_buf).unwrap_or(start)
        } else {
            start
        };

        loop {
            if current.join(".git").exists() {
                return Ok(current);
            }

            if let Some(parent) = current.parent() {
                current = parent.to_path_buf();
            } else {
                return Err(BackendError::NotARepository(path.to_path_buf()));
            }
        }
    }

    fn command(&self, args: &[&str]) -> Result<Output, BackendError> {
        Ok(Command::new("git")
            .args(args)
            .current_dir(&self.root)
            .output()?)
    }

    /// Run a git command, failing on a non-zero exit
    fn run_git(&self, args: &[&str]) -> Result<String, BackendError> {
        let output = self.command(args)?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).trim_end().to_string())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(BackendError::CommandFailed {
                command: args.first().copied().unwrap_or_default().to_string(),
                stderr: stderr.trim().to_string(),
            })
        }
    }

    fn name_status(&self, args: &[&str]) -> Result<Vec<(String, ChangeKind)>, BackendError> {
        let output = self.run_git(args)?;
        Ok(parse_name_status(&output))
    }

    fn is_tracked(&self, path: &str) -> bool {
        self.run_git(&["ls-files", "--error-unmatch", "--", path])
            .is_ok()
    }

    fn has_parent_commit(&self) -> bool {
        self.run_git(&["rev-parse", "--verify", "-q", "HEAD~1"]).is_ok()
    }

    /// Empty the index entirely (used when there is no HEAD to reset to)
    fn clear_index(&self) -> Result<(), BackendError> {
        self.run_git(&["rm", "--cached", "-r", "-q", "--ignore-unmatch", "."])?;
        Ok(())
    }
}

impl VersionControlBackend for GitOps {
    fn root(&self) -> &Path {
        &self.root
    }

    fn has_commits(&self) -> bool {
        self.run_git(&["rev-parse", "--verify", "-q", "HEAD"]).is_ok()
    }

    fn staged_changes(&self) -> Result<Vec<(String, ChangeKind)>, BackendError> {
        // On an unborn branch `diff --cached` compares against the empty tree
        self.name_status(&["diff", "--cached", "--name-status", "-M", "-z"])
    }

    fn unstaged_changes(&self) -> Result<Vec<(String, ChangeKind)>, BackendError> {
        self.name_status(&["diff", "--name-status", "-z"])
    }

    fn untracked_files(&self) -> Result<Vec<String>, BackendError> {
        let output = self.run_git(&["ls-files", "--others", "--exclude-standard", "-z"])?;
        Ok(output
            .split('\0')
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect())
    }

    fn diff(&self, path: &str) -> Result<String, BackendError> {
        let diff = if self.has_commits() {
            self.run_git(&["diff", "HEAD", "--", path])?
        } else {
            self.run_git(&["diff", "--cached", "--", path])?
        };
        if !diff.is_empty() {
            return Ok(diff);
        }

        // Untracked file: `--no-index` exits with 1 when the files differ
        let output = self.command(&["diff", "--no-index", "--", "/dev/null", path])?;
        match output.status.code() {
            Some(0) | Some(1) => Ok(String::from_utf8_lossy(&output.stdout).trim_end().to_string()),
            _ => Err(BackendError::CommandFailed {
                command: "diff".to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }),
        }
    }

    fn reset_index(&self) -> Result<(), BackendError> {
        if self.has_commits() {
            self.run_git(&["reset", "-q"])?;
        } else {
            self.clear_index()?;
        }
        Ok(())
    }

    fn stage(&self, paths: &[String]) -> Result<(), BackendError> {
        let mut args = vec!["add", "-A", "--"];
        args.extend(paths.iter().map(String::as_str));

        match self.run_git(&args) {
            Ok(_) => Ok(()),
            Err(e) => {
                let missing: Vec<String> = paths
                    .iter()
                    .filter(|p| !self.root.join(p.as_str()).exists() && !self.is_tracked(p))
                    .cloned()
                    .collect();
                if missing.is_empty() {
                    Err(e)
                } else {
                    Err(BackendError::MissingPaths(missing))
                }
            }
        }
    }

    fn commit(&self, message: &str) -> Result<String, BackendError> {
        // `--quiet` exits 1 when something is staged
        if self.run_git(&["diff", "--cached", "--quiet"]).is_ok() {
            return Err(BackendError::NothingToCommit);
        }

        self.run_git(&["commit", "-q", "-m", message])?;
        let hash = self.run_git(&["rev-parse", "--short=7", "HEAD"])?;

        info!("Created commit: {}", hash);
        Ok(hash)
    }

    fn last_commit(&self) -> Result<Option<CommitInfo>, BackendError> {
        if !self.has_commits() {
            return Ok(None);
        }
        let format = "--format=%h%x1f%an%x1f%aI%x1f%s";
        let output = self.run_git(&["log", "-1", "--abbrev=7", format])?;
        Ok(parse_log_line(&output))
    }

    fn undo_last_commit(&self, mode: UndoMode) -> Result<(), BackendError> {
        if self.has_parent_commit() {
            self.run_git(&["reset", "-q", mode.reset_flag(), "HEAD~1"])?;
            return Ok(());
        }

        // Root commit: drop the branch ref and return to an unborn state
        match mode {
            UndoMode::Discard => return Err(BackendError::RootCommitDiscard),
            UndoMode::KeepStaged => {
                self.run_git(&["update-ref", "-d", "HEAD"])?;
            }
            UndoMode::KeepUnstaged => {
                self.run_git(&["update-ref", "-d", "HEAD"])?;
                self.clear_index()?;
            }
        }
        Ok(())
    }
}

// ============================================================================
// Parsing
// ============================================================================

/// Parse `git diff --name-status -z` output
fn parse_name_status(output: &str) -> Vec<(String, ChangeKind)> {
    let mut tokens = output.split('\0').filter(|t| !t.is_empty());
    let mut entries = Vec::new();

    while let Some(status) = tokens.next() {
        let kind = match status.chars().next() {
            Some('A') => ChangeKind::Added,
            Some('D') => ChangeKind::Deleted,
            Some('R') => ChangeKind::Renamed,
            // Copies show up as a new file at the destination
            Some('C') => ChangeKind::Added,
            _ => ChangeKind::Modified,
        };

        // Renames and copies carry `old\0new`
        let from = match status.chars().next() {
            Some('R') | Some('C') => tokens.next(),
            _ => None,
        };

        match tokens.next() {
            Some(path) => entries.push((path.to_string(), kind)),
            None => break,
        }

        // A rename source must be staged with its destination or the
        // deletion is left behind
        if kind == ChangeKind::Renamed {
            if let Some(from) = from {
                entries.push((from.to_string(), ChangeKind::Deleted));
            }
        }
    }

    entries
}

fn parse_log_line(line: &str) -> Option<CommitInfo> {
    let parts: Vec<&str> = line.splitn(4, FIELD_SEP).collect();
    if parts.len() != 4 {
        return None;
    }
    Some(CommitInfo {
        hash: parts[0].to_string(),
        author: parts[1].to_string(),
        date: parts[2].to_string(),
        message: parts[3].to_string(),
    })
}

// ============================================================================
// Tests
// ============================================================================
