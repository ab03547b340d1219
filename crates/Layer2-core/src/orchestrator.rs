//! Suggestion cycle: snapshot, propose, validate, store

use crate::git::{BackendError, VersionControlBackend};
use crate::plan::{validate, SuggestionPlan, ValidationError};
use crate::snapshot::{collect, ChangeSnapshot};
use crate::store::PlanStore;
use crate::suggest::{Suggester, SuggesterError};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, Default)]
pub struct CycleOptions {
    /// Validate but do not persist the plan
    pub dry_run: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Nothing uncommitted; the suggester was not called
    NoChanges,
    Planned(SuggestionPlan),
}

impl CycleOutcome {
    pub fn into_plan(self) -> SuggestionPlan {
        match self {
            CycleOutcome::NoChanges => SuggestionPlan::empty(),
            CycleOutcome::Planned(plan) => plan,
        }
    }
}

#[derive(Debug, Error)]
pub enum CycleError {
    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Suggester(#[from] SuggesterError),

    #[error("Suggested grouping rejected: {0}")]
    Validation(#[from] ValidationError),
}

impl CycleError {
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            CycleError::Backend(e) => e.hint(),
            CycleError::Suggester(e) => e.hint(),
            CycleError::Validation(_) => {
                Some("The model's grouping was inconsistent. Run 'uncommit suggest' again.")
            }
        }
    }
}

/// Run one full cycle against the backend's current state
pub async fn run_cycle<S, B>(
    suggester: &S,
    backend: &B,
    store: &PlanStore,
    options: CycleOptions,
) -> Result<CycleOutcome, CycleError>
where
    S: Suggester + ?Sized,
    B: VersionControlBackend + ?Sized,
{
    let snapshot = collect(backend)?;
    plan_snapshot(suggester, &snapshot, store, options).await
}

/// Propose, validate and (unless dry-run) store a plan for `snapshot`
pub async fn plan_snapshot<S>(
    suggester: &S,
    snapshot: &ChangeSnapshot,
    store: &PlanStore,
    options: CycleOptions,
) -> Result<CycleOutcome, CycleError>
where
    S: Suggester + ?Sized,
{
    if snapshot.is_empty() {
        debug!("No uncommitted changes, skipping suggester");
        return Ok(CycleOutcome::NoChanges);
    }

    debug!(files = snapshot.len(), "Requesting grouping");
    let proposal = suggester.propose(snapshot).await?;
    let plan = validate(snapshot, proposal)?;

    if options.dry_run {
        debug!("Dry run, plan not saved");
    } else {
        store.save(&plan);
    }
    info!("Planned {} commit group(s)", plan.len());
    Ok(CycleOutcome::Planned(plan))
}
