//! Git Integration Module
//!
//! - `backend`: the `VersionControlBackend` trait the workflow is written against
//! - `ops`: `GitOps`, the implementation that shells out to the `git` binary

pub mod backend;
pub mod ops;

pub use backend::{BackendError, CommitInfo, UndoMode, VersionControlBackend};
pub use ops::GitOps;
