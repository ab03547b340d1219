//! Change snapshot collection
//!
//! Reads the backend once and produces an ordered, path-unique list of
//! uncommitted changes. Sources are merged in priority order: staged,
//! unstaged, untracked. The first source to mention a path decides its kind.

use crate::git::{BackendError, VersionControlBackend};
use crate::store::is_internal_path;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, warn};

/// Upper bound on diff text per file, in characters
pub const MAX_DIFF_CHARS: usize = 2000;

/// Appended to a diff cut at `MAX_DIFF_CHARS`
pub const TRUNCATION_MARKER: &str = "\n... [truncated]";

/// Stands in for a diff that could not be read
pub const DIFF_UNAVAILABLE: &str = "[diff unavailable]";

// ============================================================================
// Types
// ============================================================================

/// Kind of change to a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Added,
    Modified,
    Deleted,
    Renamed,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Added => "added",
            ChangeKind::Modified => "modified",
            ChangeKind::Deleted => "deleted",
            ChangeKind::Renamed => "renamed",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One uncommitted file change
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeRecord {
    path: String,
    #[serde(rename = "status")]
    kind: ChangeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    diff: Option<String>,
}

impl ChangeRecord {
    pub fn new(path: impl Into<String>, kind: ChangeKind) -> Self {
        Self {
            path: path.into(),
            kind,
            diff: None,
        }
    }

    pub fn with_diff(mut self, diff: impl Into<String>) -> Self {
        self.diff = Some(diff.into());
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn kind(&self) -> ChangeKind {
        self.kind
    }

    pub fn diff(&self) -> Option<&str> {
        self.diff.as_deref()
    }
}

/// Uncommitted changes as of one workflow cycle
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChangeSnapshot {
    records: Vec<ChangeRecord>,
}

impl ChangeSnapshot {
    /// Build from records; later records with an already-seen path are dropped
    pub fn from_records(records: impl IntoIterator<Item = ChangeRecord>) -> Self {
        let mut seen = HashSet::new();
        let records = records
            .into_iter()
            .filter(|r| !r.path.is_empty() && seen.insert(r.path.clone()))
            .collect();
        Self { records }
    }

    pub fn records(&self) -> &[ChangeRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChangeRecord> {
        self.records.iter()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.path.as_str())
    }

    pub fn get(&self, path: &str) -> Option<&ChangeRecord> {
        self.records.iter().find(|r| r.path == path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ============================================================================
// Collection
// ============================================================================

/// Collect all uncommitted changes with their (bounded) diffs
pub fn collect<B>(backend: &B) -> Result<ChangeSnapshot, BackendError>
where
    B: VersionControlBackend + ?Sized,
{
    let entries = gather(backend)?;
    let records = entries.into_iter().map(|(path, kind)| {
        let diff = match backend.diff(&path) {
            Ok(diff) => truncate_diff(diff),
            Err(e) => {
                warn!("Diff unavailable for {}: {}", path, e);
                DIFF_UNAVAILABLE.to_string()
            }
        };
        ChangeRecord::new(path, kind).with_diff(diff)
    });
    Ok(ChangeSnapshot::from_records(records))
}

/// Collect changed paths and kinds without reading any diff
pub fn collect_paths<B>(backend: &B) -> Result<ChangeSnapshot, BackendError>
where
    B: VersionControlBackend + ?Sized,
{
    let entries = gather(backend)?;
    Ok(ChangeSnapshot::from_records(
        entries
            .into_iter()
            .map(|(path, kind)| ChangeRecord::new(path, kind)),
    ))
}

fn gather<B>(backend: &B) -> Result<Vec<(String, ChangeKind)>, BackendError>
where
    B: VersionControlBackend + ?Sized,
{
    let staged = backend.staged_changes()?;
    let unstaged = backend.unstaged_changes()?;
    let untracked = backend.untracked_files()?;
    debug!(
        staged = staged.len(),
        unstaged = unstaged.len(),
        untracked = untracked.len(),
        "Collected change sources"
    );

    let mut seen = HashSet::new();
    let mut entries = Vec::new();
    let sources = staged
        .into_iter()
        .chain(unstaged)
        .chain(untracked.into_iter().map(|p| (p, ChangeKind::Added)));

    for (path, kind) in sources {
        if is_internal_path(&path) {
            continue;
        }
        if seen.insert(path.clone()) {
            entries.push((path, kind));
        }
    }

    Ok(entries)
}

/// Cut a diff to `MAX_DIFF_CHARS` characters, marking the cut
pub fn truncate_diff(diff: String) -> String {
    match diff.char_indices().nth(MAX_DIFF_CHARS) {
        Some((cut, _)) => {
            let mut truncated = diff[..cut].to_string();
            truncated.push_str(TRUNCATION_MARKER);
            truncated
        }
        None => diff,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MemoryBackend, TestRepo};

    #[test]
    fn test_truncate_short_diff_untouched() {
        let diff = "+line\n".to_string();
        assert_eq!(truncate_diff(diff.clone()), diff);

        let exact = "x".repeat(MAX_DIFF_CHARS);
        assert_eq!(truncate_diff(exact.clone()), exact);
    }

    #[test]
    fn test_truncate_long_diff() {
        let diff = "é".repeat(MAX_DIFF_CHARS + 10);
        let truncated = truncate_diff(diff);
        assert!(truncated.ends_with(TRUNCATION_MARKER));
        let body = truncated.strip_suffix(TRUNCATION_MARKER).unwrap();
        assert_eq!(body.chars().count(), MAX_DIFF_CHARS);
    }

    #[test]
    fn test_snapshot_dedup_keeps_first() {
        let snapshot = ChangeSnapshot::from_records(vec![
            ChangeRecord::new("a.py", ChangeKind::Modified),
            ChangeRecord::new("a.py", ChangeKind::Added),
            ChangeRecord::new("b.md", ChangeKind::Added),
        ]);
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.get("a.py").unwrap().kind(), ChangeKind::Modified);
        assert_eq!(snapshot.paths().collect::<Vec<_>>(), vec!["a.py", "b.md"]);
    }

    #[test]
    fn test_collect_merges_sources() {
        let backend = MemoryBackend::new();
        backend.commit_files(&[("a.py", "1"), ("c.txt", "1")]);
        // staged then modified again
        backend.write("a.py", "2");
        backend.stage_now("a.py");
        backend.write("a.py", "3");
        backend.write("c.txt", "2");
        backend.write("b.md", "new");

        let snapshot = collect(&backend).unwrap();
        let kinds: Vec<_> = snapshot.iter().map(|r| (r.path(), r.kind())).collect();
        assert_eq!(
            kinds,
            vec![
                ("a.py", ChangeKind::Modified),
                ("c.txt", ChangeKind::Modified),
                ("b.md", ChangeKind::Added),
            ]
        );
        assert!(snapshot.iter().all(|r| r.diff().is_some()));
    }

    #[test]
    fn test_collect_diff_failure_uses_sentinel() {
        let backend = MemoryBackend::new();
        backend.write("a.py", "x");
        backend.write("b.py", "y");
        backend.fail_diff_for("b.py");

        let snapshot = collect(&backend).unwrap();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.get("b.py").unwrap().diff(), Some(DIFF_UNAVAILABLE));
        assert_ne!(snapshot.get("a.py").unwrap().diff(), Some(DIFF_UNAVAILABLE));
    }

    #[test]
    fn test_collect_skips_internal_files() {
        let backend = MemoryBackend::new();
        backend.write(crate::store::PLAN_FILE_NAME, "{}");
        backend.write(".uncommit/areas/root.md", "doc");
        backend.write("real.rs", "fn main() {}");

        let snapshot = collect_paths(&backend).unwrap();
        assert_eq!(snapshot.paths().collect::<Vec<_>>(), vec!["real.rs"]);
        assert!(snapshot.get("real.rs").unwrap().diff().is_none());
    }

    #[test]
    fn test_collect_against_git() {
        let Some(repo) = TestRepo::init() else { return };
        repo.write("a.py", "print(1)\n");
        repo.commit_all("initial");

        repo.write("a.py", "print(2)\n");
        repo.git(&["add", "a.py"]);
        repo.write("a.py", "print(3)\n");
        repo.write("b.md", "# doc\n");

        let snapshot = collect(&repo.ops()).unwrap();
        let kinds: Vec<_> = snapshot.iter().map(|r| (r.path(), r.kind())).collect();
        assert_eq!(
            kinds,
            vec![("a.py", ChangeKind::Modified), ("b.md", ChangeKind::Added)]
        );
        assert!(snapshot.get("a.py").unwrap().diff().unwrap().contains("print(3)"));
    }
}
