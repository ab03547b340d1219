//! # uncommit-core
//!
//! The grouping-and-commit workflow:
//!
//! ```text
//!   VersionControlBackend ──► snapshot::collect ──► ChangeSnapshot
//!                                                       │
//!                         Suggester::propose ◄──────────┤
//!                                 │                     │
//!                                 ▼                     ▼
//!                          Proposal ──► plan::validate ──► SuggestionPlan
//!                                                              │
//!                                          PlanStore ◄─────────┤
//!                                              │               │
//!                                              ▼               ▼
//!                                        CommitExecutor (stage, commit, shrink, persist)
//! ```
//!
//! - `git`: backend trait and the `git` command-line implementation
//! - `snapshot`: change collection with dedup and diff truncation
//! - `plan`: plan types and the partition validator
//! - `store`: best-effort plan persistence
//! - `executor`: applying groups, undoing the last commit
//! - `suggest`: the `Suggester` capability and its error taxonomy
//! - `orchestrator`: one suggestion cycle end-to-end
//! - `context`: per-area documentation cache with fingerprint staleness

pub mod context;
pub mod executor;
pub mod git;
pub mod orchestrator;
pub mod plan;
pub mod snapshot;
pub mod store;
pub mod suggest;

#[cfg(test)]
pub(crate) mod testing;

pub use executor::{undo_last_commit, CommitExecutor, CommitResult, ExecuteError, PartialApply};
pub use git::{BackendError, CommitInfo, GitOps, UndoMode, VersionControlBackend};
pub use orchestrator::{run_cycle, CycleError, CycleOptions, CycleOutcome};
pub use plan::{validate, CommitGroup, Proposal, ProposedGroup, SuggestionPlan, ValidationError};
pub use snapshot::{collect, ChangeKind, ChangeRecord, ChangeSnapshot};
pub use store::{PlanStore, PLAN_FILE_NAME};
pub use suggest::{FailureKind, Suggester, SuggesterError};
