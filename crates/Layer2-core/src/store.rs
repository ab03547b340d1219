//! Plan persistence
//!
//! At most one plan per repository, kept in `.uncommit_cache.json` at the
//! repository root. Persistence is best-effort: a failed write only loses the
//! cache, and anything unreadable on load is treated as "no plan".

use crate::plan::SuggestionPlan;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uncommit_foundation::JsonStore;

/// Plan cache file, relative to the repository root
pub const PLAN_FILE_NAME: &str = ".uncommit_cache.json";

/// Directory for per-repository state (area docs)
pub const STATE_DIR: &str = ".uncommit";

/// Whether a repository-relative path belongs to uncommit's own state
pub fn is_internal_path(path: &str) -> bool {
    let path = path.strip_prefix("./").unwrap_or(path);
    path == PLAN_FILE_NAME
        || path.strip_prefix(PLAN_FILE_NAME) == Some(".tmp")
        || path == STATE_DIR
        || path.starts_with(&format!("{STATE_DIR}/"))
}

/// Stores the current plan of one repository
#[derive(Debug, Clone)]
pub struct PlanStore {
    store: JsonStore,
}

impl PlanStore {
    pub fn new(repo_root: impl Into<PathBuf>) -> Self {
        Self {
            store: JsonStore::new(repo_root),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.store.file_path(PLAN_FILE_NAME)
    }

    pub fn repo_root(&self) -> &Path {
        self.store.base_dir()
    }

    /// Replace the stored plan. Failures are logged, never returned.
    pub fn save(&self, plan: &SuggestionPlan) {
        match self.store.save(PLAN_FILE_NAME, plan) {
            Ok(()) => debug!(groups = plan.len(), "Plan saved"),
            Err(e) => warn!("Could not save plan: {}", e),
        }
    }

    /// Stored plan, `None` when missing, unreadable or malformed
    pub fn load(&self) -> Option<SuggestionPlan> {
        let plan: SuggestionPlan = match self.store.load_optional(PLAN_FILE_NAME) {
            Ok(plan) => plan?,
            Err(e) => {
                debug!("Ignoring unreadable plan: {}", e);
                return None;
            }
        };

        if plan.is_well_formed() {
            Some(plan)
        } else {
            debug!("Ignoring malformed plan at {}", self.path().display());
            None
        }
    }

    /// Remove the stored plan; no-op when there is none
    pub fn clear(&self) {
        if let Err(e) = self.store.remove(PLAN_FILE_NAME) {
            warn!("Could not remove plan: {}", e);
        }
    }

    pub fn exists(&self) -> bool {
        self.store.exists(PLAN_FILE_NAME)
    }
}
