//! Partition validator
//!
//! The only gate between a suggester's output and a persisted plan.
//! Checks run in a fixed order and stop at the first failure.

use super::{CommitGroup, Proposal, ProposedGroup, SuggestionPlan};
use crate::snapshot::ChangeSnapshot;
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// `position` is 1-based within the proposal
    #[error("Group #{position} has no files")]
    EmptyGroup { position: usize },

    #[error("Group #{position} has an empty commit message")]
    EmptyMessage { position: usize },

    #[error("Group {group} references a file with no uncommitted changes: {path}")]
    UnknownFile { path: String, group: u32 },

    #[error("File {path} is assigned to both group {first} and group {second}")]
    DuplicateAssignment { path: String, first: u32, second: u32 },

    #[error("Files not assigned to any group: {}", .missing.join(", "))]
    IncompleteCoverage { missing: Vec<String> },
}

/// Validate `proposal` against `snapshot`, producing an ordered plan.
///
/// Missing, non-positive or repeated indices are not an error: the groups
/// are renumbered 1..=n in proposal order instead.
pub fn validate(
    snapshot: &ChangeSnapshot,
    proposal: Proposal,
) -> Result<SuggestionPlan, ValidationError> {
    let Proposal { groups, warnings } = proposal;

    // 1. structure
    for (i, group) in groups.iter().enumerate() {
        if group.files.is_empty() {
            return Err(ValidationError::EmptyGroup { position: i + 1 });
        }
        if group.message.trim().is_empty() {
            return Err(ValidationError::EmptyMessage { position: i + 1 });
        }
    }

    let indices = usable_indices(&groups);
    let label = |position: usize| -> u32 {
        match &indices {
            Some(indices) => indices[position],
            None => (position + 1) as u32,
        }
    };
    let files: Vec<Vec<String>> = groups.iter().map(|g| normalized_files(&g.files)).collect();

    // 2. every file known
    for (i, group_files) in files.iter().enumerate() {
        if let Some(path) = group_files.iter().find(|p| !snapshot.contains(p)) {
            return Err(ValidationError::UnknownFile {
                path: path.clone(),
                group: label(i),
            });
        }
    }

    // 3. no file in two groups
    let mut owner: HashMap<&str, u32> = HashMap::new();
    for (i, group_files) in files.iter().enumerate() {
        for path in group_files {
            if let Some(first) = owner.insert(path.as_str(), label(i)) {
                return Err(ValidationError::DuplicateAssignment {
                    path: path.clone(),
                    first,
                    second: label(i),
                });
            }
        }
    }

    // 4. every snapshot path covered
    let missing: Vec<String> = snapshot
        .paths()
        .filter(|p| !owner.contains_key(p))
        .map(str::to_string)
        .collect();
    if !missing.is_empty() {
        return Err(ValidationError::IncompleteCoverage { missing });
    }

    // 5. indices
    if indices.is_none() && !groups.is_empty() {
        debug!("Renumbering {} proposed groups in proposal order", groups.len());
    }
    let mut plan_groups: Vec<CommitGroup> = groups
        .into_iter()
        .zip(files)
        .enumerate()
        .map(|(i, (group, files))| CommitGroup {
            index: label(i),
            message: group.message.trim().to_string(),
            commit_type: group.commit_type.trim().to_string(),
            files,
            reasoning: group.reasoning,
        })
        .collect();
    plan_groups.sort_by_key(|g| g.index);

    let warnings = warnings.filter(|w| !w.is_empty());
    Ok(SuggestionPlan::from_validated(plan_groups, warnings))
}

/// Proposed indices when all are positive and distinct
fn usable_indices(groups: &[ProposedGroup]) -> Option<Vec<u32>> {
    let mut seen = HashSet::new();
    groups
        .iter()
        .map(|g| {
            let index = u32::try_from(g.index?).ok().filter(|i| *i > 0)?;
            seen.insert(index).then_some(index)
        })
        .collect()
}

/// Strip a leading `./` and drop repeats within one group
fn normalized_files(files: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    files
        .iter()
        .map(|f| f.strip_prefix("./").unwrap_or(f).to_string())
        .filter(|f| seen.insert(f.clone()))
        .collect()
}
