//! Commit plans
//!
//! A `SuggestionPlan` can only be created by [`validate`], which checks an
//! untrusted `Proposal` against the snapshot it was made for. After that the
//! plan only shrinks, one applied group at a time.

mod validate;

pub use validate::{validate, ValidationError};

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// ============================================================================
// Proposal (untrusted input)
// ============================================================================

/// Candidate partition as returned by a suggester, before validation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub groups: Vec<ProposedGroup>,

    #[serde(default)]
    pub warnings: Option<Vec<String>>,
}

/// One candidate group; every field may be missing or wrong
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposedGroup {
    #[serde(default)]
    pub index: Option<i64>,

    #[serde(default)]
    pub message: String,

    #[serde(default, rename = "type")]
    pub commit_type: String,

    #[serde(default)]
    pub files: Vec<String>,

    #[serde(default)]
    pub reasoning: String,
}

impl ProposedGroup {
    pub fn new<I, S>(index: i64, message: impl Into<String>, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            index: Some(index),
            message: message.into(),
            files: files.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn with_type(mut self, commit_type: impl Into<String>) -> Self {
        self.commit_type = commit_type.into();
        self
    }

    pub fn with_reasoning(mut self, reasoning: impl Into<String>) -> Self {
        self.reasoning = reasoning.into();
        self
    }
}

// ============================================================================
// Validated plan
// ============================================================================

/// One commit to make
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitGroup {
    /// Apply order, 1-based
    pub index: u32,

    pub message: String,

    /// Conventional commit type (feat, fix, docs, ...)
    #[serde(rename = "type")]
    pub commit_type: String,

    pub files: Vec<String>,

    /// Why these files belong together (advisory)
    pub reasoning: String,
}

/// Validated partition of a snapshot into ordered commit groups
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionPlan {
    groups: Vec<CommitGroup>,

    #[serde(default)]
    warnings: Option<Vec<String>>,
}

impl SuggestionPlan {
    /// Plan with nothing to commit
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn from_validated(groups: Vec<CommitGroup>, warnings: Option<Vec<String>>) -> Self {
        Self { groups, warnings }
    }

    /// Remaining groups in apply order
    pub fn groups(&self) -> &[CommitGroup] {
        &self.groups
    }

    pub fn warnings(&self) -> &[String] {
        self.warnings.as_deref().unwrap_or_default()
    }

    pub fn group(&self, index: u32) -> Option<&CommitGroup> {
        self.groups.iter().find(|g| g.index == index)
    }

    pub fn indices(&self) -> Vec<u32> {
        self.groups.iter().map(|g| g.index).collect()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Remove an applied group
    pub(crate) fn remove_group(&mut self, index: u32) -> Option<CommitGroup> {
        let pos = self.groups.iter().position(|g| g.index == index)?;
        Some(self.groups.remove(pos))
    }

    /// Structural check for plans read back from disk.
    ///
    /// Indices strictly ascending and positive, every group with a message
    /// and at least one file, no file in two groups.
    pub fn is_well_formed(&self) -> bool {
        let mut seen = HashSet::new();
        let mut last_index = 0;
        for group in &self.groups {
            if group.index <= last_index
                || group.files.is_empty()
                || group.message.trim().is_empty()
            {
                return false;
            }
            last_index = group.index;
            if !group.files.iter().all(|f| !f.is_empty() && seen.insert(f.as_str())) {
                return false;
            }
        }
        true
    }
}
