//! Commit execution
//!
//! Applies plan groups against the live backend one at a time. A group is
//! removed from the plan (and the plan re-persisted) only after its commit
//! succeeded, so an interrupted run can always be resumed from the store.

use crate::git::{BackendError, CommitInfo, UndoMode, VersionControlBackend};
use crate::plan::SuggestionPlan;
use crate::store::PlanStore;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

// ============================================================================
// Types
// ============================================================================

/// Outcome of one applied group
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitResult {
    pub index: u32,
    /// Message actually used for the commit
    pub message: String,
    pub hash: String,
}

#[derive(Debug, Error)]
pub enum ExecuteError {
    #[error("Group {index} not found. Available groups: {}", format_indices(.available))]
    GroupNotFound { index: u32, available: Vec<u32> },

    #[error("Failed to reset the index: {0}")]
    Reset(#[source] BackendError),

    #[error("Failed to stage {}: {source}", .paths.join(", "))]
    Stage {
        paths: Vec<String>,
        #[source]
        source: BackendError,
    },

    #[error("Failed to commit: {0}")]
    Commit(#[source] BackendError),

    #[error("No commits to undo")]
    NoCommit,

    #[error("Failed to undo last commit: {0}")]
    Undo(#[source] BackendError),
}

impl ExecuteError {
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            ExecuteError::GroupNotFound { .. } => {
                Some("Run 'uncommit status' to see the remaining groups.")
            }
            ExecuteError::Stage { source, .. } => source.hint().or(Some(
                "The working tree changed since the plan was made. Run 'uncommit suggest' again.",
            )),
            ExecuteError::Commit(BackendError::NothingToCommit) => {
                Some("The group's changes may already be committed. Run 'uncommit suggest' again.")
            }
            ExecuteError::Reset(e) | ExecuteError::Commit(e) | ExecuteError::Undo(e) => e.hint(),
            ExecuteError::NoCommit => None,
        }
    }
}

/// `apply_all` stopped before the plan was exhausted
#[derive(Debug, Error)]
#[error("Stopped at group {index} after {} commit(s): {source}", .committed.len())]
pub struct PartialApply {
    /// Groups committed before the failure
    pub committed: Vec<CommitResult>,
    /// Group that failed
    pub index: u32,
    #[source]
    pub source: ExecuteError,
}

fn format_indices(indices: &[u32]) -> String {
    if indices.is_empty() {
        return "none".to_string();
    }
    indices
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

// ============================================================================
// Executor
// ============================================================================

/// Applies groups of a plan, keeping the store in step
pub struct CommitExecutor<'a, B: ?Sized> {
    backend: &'a B,
    store: &'a PlanStore,
}

impl<'a, B> CommitExecutor<'a, B>
where
    B: VersionControlBackend + ?Sized,
{
    pub fn new(backend: &'a B, store: &'a PlanStore) -> Self {
        Self { backend, store }
    }

    /// Commit one group, optionally with a different message.
    ///
    /// On failure the plan and the store are left untouched.
    pub fn apply_group(
        &self,
        plan: &mut SuggestionPlan,
        index: u32,
        message_override: Option<&str>,
    ) -> Result<CommitResult, ExecuteError> {
        let group = plan
            .group(index)
            .ok_or_else(|| ExecuteError::GroupNotFound {
                index,
                available: plan.indices(),
            })?;

        let message = message_override
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(&group.message)
            .to_string();
        let files = group.files.clone();
        debug!(index, files = files.len(), "Applying group");

        self.backend.reset_index().map_err(ExecuteError::Reset)?;

        if let Err(source) = self.backend.stage(&files) {
            self.restore_index();
            let paths = match &source {
                BackendError::MissingPaths(missing) => missing.clone(),
                _ => files,
            };
            return Err(ExecuteError::Stage { paths, source });
        }

        let hash = match self.backend.commit(&message) {
            Ok(hash) => hash,
            Err(e) => {
                self.restore_index();
                return Err(ExecuteError::Commit(e));
            }
        };

        plan.remove_group(index);
        if plan.is_empty() {
            self.store.clear();
        } else {
            self.store.save(plan);
        }

        info!("Committed group {} as {}", index, hash);
        Ok(CommitResult {
            index,
            message,
            hash,
        })
    }

    /// Commit every remaining group in index order, stopping at the first failure
    pub fn apply_all(&self, plan: &mut SuggestionPlan) -> Result<Vec<CommitResult>, PartialApply> {
        let mut committed = Vec::new();
        for index in plan.indices() {
            match self.apply_group(plan, index, None) {
                Ok(result) => committed.push(result),
                Err(source) => {
                    return Err(PartialApply {
                        committed,
                        index,
                        source,
                    })
                }
            }
        }
        Ok(committed)
    }

    fn restore_index(&self) {
        if let Err(e) = self.backend.reset_index() {
            warn!("Could not reset the index after a failed group: {}", e);
        }
    }
}

/// Undo the most recent commit, returning what was undone
pub fn undo_last_commit<B>(backend: &B, mode: UndoMode) -> Result<CommitInfo, ExecuteError>
where
    B: VersionControlBackend + ?Sized,
{
    let last = backend
        .last_commit()
        .map_err(ExecuteError::Undo)?
        .ok_or(ExecuteError::NoCommit)?;

    backend.undo_last_commit(mode).map_err(ExecuteError::Undo)?;
    info!("Undid commit {} ({:?})", last.hash, mode);
    Ok(last)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{validate, Proposal, ProposedGroup};
    use crate::snapshot::{collect, ChangeKind};
    use crate::testing::{MemoryBackend, TestRepo};
    use tempfile::tempdir;

    /// Backend with a.py modified, b.md added and c.txt modified
    fn backend() -> MemoryBackend {
        let backend = MemoryBackend::new();
        backend.commit_files(&[("a.py", "1"), ("c.txt", "1")]);
        backend.write("a.py", "2");
        backend.write("b.md", "doc");
        backend.write("c.txt", "2");
        backend
    }

    fn plan_for(backend: &MemoryBackend, groups: Vec<ProposedGroup>) -> SuggestionPlan {
        let snapshot = collect(backend).unwrap();
        validate(
            &snapshot,
            Proposal {
                groups,
                warnings: None,
            },
        )
        .unwrap()
    }

    fn three_groups(backend: &MemoryBackend) -> SuggestionPlan {
        plan_for(
            backend,
            vec![
                ProposedGroup::new(1, "fix: a", ["a.py"]),
                ProposedGroup::new(2, "docs: b", ["b.md"]),
                ProposedGroup::new(3, "chore: c", ["c.txt"]),
            ],
        )
    }

    #[test]
    fn test_apply_group_commits_exactly_its_files() {
        let dir = tempdir().unwrap();
        let store = PlanStore::new(dir.path());
        let backend = backend();
        // stray staged change that must not leak into the commit
        backend.stage_now("c.txt");
        let mut plan = three_groups(&backend);
        store.save(&plan);

        let executor = CommitExecutor::new(&backend, &store);
        let result = executor.apply_group(&mut plan, 1, None).unwrap();

        assert_eq!(result.index, 1);
        assert_eq!(result.message, "fix: a");
        assert_eq!(backend.commit_files_at(1), vec!["a.py"]);
        assert_eq!(plan.indices(), vec![2, 3]);
        assert_eq!(store.load().unwrap().indices(), vec![2, 3]);
    }

    #[test]
    fn test_apply_group_message_override() {
        let dir = tempdir().unwrap();
        let store = PlanStore::new(dir.path());
        let backend = backend();
        let mut plan = three_groups(&backend);

        let executor = CommitExecutor::new(&backend, &store);
        let result = executor
            .apply_group(&mut plan, 2, Some("docs: better words"))
            .unwrap();
        assert_eq!(result.message, "docs: better words");
        assert_eq!(backend.messages().last().unwrap(), "docs: better words");

        // blank override falls back to the planned message
        let result = executor.apply_group(&mut plan, 3, Some("  ")).unwrap();
        assert_eq!(result.message, "chore: c");
    }

    #[test]
    fn test_apply_group_not_found() {
        let dir = tempdir().unwrap();
        let store = PlanStore::new(dir.path());
        let backend = backend();
        let mut plan = three_groups(&backend);

        let executor = CommitExecutor::new(&backend, &store);
        let err = executor.apply_group(&mut plan, 9, None).unwrap_err();
        match err {
            ExecuteError::GroupNotFound { index, available } => {
                assert_eq!(index, 9);
                assert_eq!(available, vec![1, 2, 3]);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(backend.commit_count(), 1);
    }

    #[test]
    fn test_apply_same_group_twice() {
        let dir = tempdir().unwrap();
        let store = PlanStore::new(dir.path());
        let backend = backend();
        let mut plan = three_groups(&backend);

        let executor = CommitExecutor::new(&backend, &store);
        executor.apply_group(&mut plan, 1, None).unwrap();
        let err = executor.apply_group(&mut plan, 1, None).unwrap_err();

        assert!(matches!(err, ExecuteError::GroupNotFound { index: 1, .. }));
        assert_eq!(backend.commit_count(), 2);
    }

    #[test]
    fn test_apply_all_stops_at_deleted_file() {
        let dir = tempdir().unwrap();
        let store = PlanStore::new(dir.path());
        let backend = backend();
        let mut plan = three_groups(&backend);
        store.save(&plan);

        // b.md was never committed, so it vanishes entirely
        backend.remove("b.md");

        let executor = CommitExecutor::new(&backend, &store);
        let partial = executor.apply_all(&mut plan).unwrap_err();

        assert_eq!(partial.committed.len(), 1);
        assert_eq!(partial.committed[0].index, 1);
        assert_eq!(partial.index, 2);
        match &partial.source {
            ExecuteError::Stage { paths, .. } => assert_eq!(paths, &vec!["b.md".to_string()]),
            other => panic!("unexpected error: {other}"),
        }

        assert_eq!(plan.indices(), vec![2, 3]);
        assert_eq!(store.load().unwrap().indices(), vec![2, 3]);
        assert!(backend.staged_paths().is_empty());
    }

    #[test]
    fn test_apply_all_clears_store() {
        let dir = tempdir().unwrap();
        let store = PlanStore::new(dir.path());
        let backend = backend();
        let mut plan = three_groups(&backend);
        store.save(&plan);

        let executor = CommitExecutor::new(&backend, &store);
        let results = executor.apply_all(&mut plan).unwrap();

        assert_eq!(
            results.iter().map(|r| r.index).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert_eq!(
            backend.messages(),
            vec!["initial", "fix: a", "docs: b", "chore: c"]
        );
        assert!(plan.is_empty());
        assert!(!store.exists());
        assert!(collect(&backend).unwrap().is_empty());
    }

    #[test]
    fn test_commit_failure_leaves_plan() {
        let dir = tempdir().unwrap();
        let store = PlanStore::new(dir.path());
        let backend = backend();
        let mut plan = three_groups(&backend);
        store.save(&plan);
        backend.fail_commits();

        let executor = CommitExecutor::new(&backend, &store);
        let err = executor.apply_group(&mut plan, 1, None).unwrap_err();

        assert!(matches!(err, ExecuteError::Commit(_)));
        assert_eq!(plan.indices(), vec![1, 2, 3]);
        assert_eq!(store.load().unwrap().indices(), vec![1, 2, 3]);
        assert!(backend.staged_paths().is_empty());
    }

    #[test]
    fn test_group_with_deletion() {
        let dir = tempdir().unwrap();
        let store = PlanStore::new(dir.path());
        let backend = MemoryBackend::new();
        backend.commit_files(&[("old.rs", "x"), ("keep.rs", "y")]);
        backend.remove("old.rs");

        let mut plan = plan_for(
            &backend,
            vec![ProposedGroup::new(1, "refactor: drop old", ["old.rs"])],
        );
        let executor = CommitExecutor::new(&backend, &store);
        executor.apply_group(&mut plan, 1, None).unwrap();
        assert_eq!(backend.head_files(), vec!["keep.rs"]);
    }

    #[test]
    fn test_undo_modes() {
        let backend = backend();
        backend.stage_now("a.py");
        backend.commit("fix: a").unwrap();

        let undone = undo_last_commit(&backend, UndoMode::KeepStaged).unwrap();
        assert_eq!(undone.message, "fix: a");
        assert_eq!(backend.staged_paths(), vec!["a.py"]);

        backend.commit("fix: a").unwrap();
        undo_last_commit(&backend, UndoMode::KeepUnstaged).unwrap();
        assert!(backend.staged_paths().is_empty());
        assert!(collect(&backend).unwrap().contains("a.py"));

        backend.stage_now("a.py");
        backend.commit("fix: a").unwrap();
        undo_last_commit(&backend, UndoMode::Discard).unwrap();
        assert!(!collect(&backend).unwrap().contains("a.py"));
    }

    #[test]
    fn test_undo_without_commits() {
        let backend = MemoryBackend::new();
        assert!(matches!(
            undo_last_commit(&backend, UndoMode::default()),
            Err(ExecuteError::NoCommit)
        ));
    }

    #[test]
    fn test_apply_all_against_git() {
        let Some(repo) = TestRepo::init() else { return };
        repo.write("a.py", "print(1)\n");
        repo.commit_all("initial");
        repo.write("a.py", "print(2)\n");
        repo.write("docs/b.md", "# b\n");

        let git = repo.ops();
        let store = PlanStore::new(repo.path());
        let mut plan = plan_for_git(&git);
        store.save(&plan);

        let executor = CommitExecutor::new(&git, &store);
        let results = executor.apply_all(&mut plan).unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(repo.commit_count(), 3);
        assert!(!store.exists());
        assert!(collect(&git).unwrap().is_empty());
        assert_eq!(repo.git(&["log", "-1", "--format=%s"]), "docs: add b");
    }

    #[test]
    fn test_apply_on_unborn_branch_then_undo() {
        let Some(repo) = TestRepo::init() else { return };
        repo.write("a.py", "print(1)\n");
        repo.write("docs/b.md", "# b\n");

        let git = repo.ops();
        let store = PlanStore::new(repo.path());
        let mut plan = plan_for_git(&git);

        let executor = CommitExecutor::new(&git, &store);
        executor.apply_group(&mut plan, 1, None).unwrap();
        assert_eq!(repo.commit_count(), 1);
        assert_eq!(repo.git(&["ls-files"]), "a.py");

        let undone = undo_last_commit(&git, UndoMode::KeepUnstaged).unwrap();
        assert_eq!(undone.message, "fix: a");
        assert!(!git.has_commits());
        assert_eq!(collect(&git).unwrap().len(), 2);
    }

    #[test]
    fn test_apply_staged_rename_against_git() {
        let Some(repo) = TestRepo::init() else { return };
        repo.write("old.py", "print(1)\n");
        repo.write("keep.py", "print(2)\n");
        repo.commit_all("initial");
        repo.git(&["mv", "old.py", "new.py"]);

        let git = repo.ops();
        let snapshot = collect(&git).unwrap();
        let kinds: Vec<_> = snapshot.iter().map(|r| (r.path(), r.kind())).collect();
        assert_eq!(
            kinds,
            vec![("new.py", ChangeKind::Renamed), ("old.py", ChangeKind::Deleted)]
        );

        let store = PlanStore::new(repo.path());
        let mut plan = validate(
            &snapshot,
            Proposal {
                groups: vec![ProposedGroup::new(
                    1,
                    "refactor: rename old",
                    ["new.py", "old.py"],
                )],
                warnings: None,
            },
        )
        .unwrap();

        let executor = CommitExecutor::new(&git, &store);
        executor.apply_all(&mut plan).unwrap();

        assert!(collect(&git).unwrap().is_empty());
        assert_eq!(
            repo.git(&["ls-tree", "--name-only", "HEAD"]),
            "keep.py\nnew.py"
        );
    }

    fn plan_for_git(git: &crate::git::GitOps) -> SuggestionPlan {
        let snapshot = collect(git).unwrap();
        validate(
            &snapshot,
            Proposal {
                groups: vec![
                    ProposedGroup::new(1, "fix: a", ["a.py"]),
                    ProposedGroup::new(2, "docs: add b", ["docs/b.md"]),
                ],
                warnings: None,
            },
        )
        .unwrap()
    }
}
