//! Command implementations

use crate::render;
use crate::spinner::Spinner;
use anyhow::{anyhow, bail, Result};
use crossterm::style::Color;
use serde::Serialize;
use std::io::{self, BufRead, Write};
use tracing::debug;
use uncommit_agent::{AreaDocWriter, CommitAgent};
use uncommit_core::context::AreaIndex;
use uncommit_core::orchestrator::plan_snapshot;
use uncommit_core::snapshot::collect_paths;
use uncommit_core::{
    collect, undo_last_commit, ChangeSnapshot, CommitExecutor, CycleOptions, CycleOutcome,
    ExecuteError, GitOps, PlanStore, UndoMode, VersionControlBackend,
};
use uncommit_foundation::Config;
use uncommit_provider::GeminiProvider;

const NO_CHANGES: &str = "No uncommitted changes found";

// ============================================================================
// Helpers
// ============================================================================

fn open_repo() -> Result<GitOps> {
    let cwd = std::env::current_dir()?;
    Ok(GitOps::new(cwd)?)
}

/// Config with the CLI model override applied
fn load_config(model: Option<String>) -> Config {
    let config = Config::load().with_model(model);
    debug!(model = %config.model, has_key = config.has_api_key(), "Loaded config");
    config
}

#[derive(Debug, Serialize)]
struct FileEntry<'a> {
    path: &'a str,
    status: &'a str,
}

#[derive(Debug, Serialize)]
struct AnalyzeOutput<'a> {
    files: Vec<FileEntry<'a>>,
    count: usize,
}

fn analyze_json(snapshot: &ChangeSnapshot) -> Result<String> {
    let output = AnalyzeOutput {
        files: snapshot
            .iter()
            .map(|r| FileEntry {
                path: r.path(),
                status: r.kind().as_str(),
            })
            .collect(),
        count: snapshot.len(),
    };
    Ok(serde_json::to_string_pretty(&output)?)
}

fn no_changes_json() -> String {
    serde_json::json!({ "groups": [], "message": NO_CHANGES }).to_string()
}

fn undo_mode(soft: bool, hard: bool) -> Result<UndoMode> {
    match (soft, hard) {
        (true, true) => bail!("Cannot use both --soft and --hard"),
        (true, false) => Ok(UndoMode::KeepStaged),
        (false, true) => Ok(UndoMode::Discard),
        (false, false) => Ok(UndoMode::KeepUnstaged),
    }
}

/// Whether an answer to a y/N prompt is a yes
fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

fn confirm(question: &str) -> Result<bool> {
    print!("\n{} [y/N] ", question);
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(is_yes(&answer))
}

// ============================================================================
// Commands
// ============================================================================

/// `uncommit analyze`
pub fn analyze(json: bool) -> Result<()> {
    let backend = open_repo()?;
    let snapshot = collect_paths(&backend)?;

    if json {
        println!("{}", analyze_json(&snapshot)?);
    } else if snapshot.is_empty() {
        render::colored(Color::Yellow, &format!("{}.", NO_CHANGES));
    } else {
        render::changes(&snapshot);
    }
    Ok(())
}

/// `uncommit suggest`
pub async fn suggest(dry_run: bool, model: Option<String>, json: bool) -> Result<()> {
    let config = load_config(model);
    let provider = GeminiProvider::from_config(&config)?;

    let backend = open_repo()?;
    let store = PlanStore::new(backend.root());
    let snapshot = collect(&backend)?;

    if snapshot.is_empty() {
        if json {
            println!("{}", no_changes_json());
            return Ok(());
        }
        bail!(NO_CHANGES);
    }

    let index = AreaIndex::new(backend.root());
    let areas = index.areas_for(snapshot.paths());
    let area_context = index.fresh_context(&areas);
    debug!(
        areas = areas.len(),
        with_context = area_context.is_some(),
        "Resolved areas"
    );

    let agent = CommitAgent::new(provider).with_area_context(area_context);
    let spinner = if json {
        Spinner::disabled()
    } else {
        Spinner::start(format!("Analyzing {} changed files...", snapshot.len()))
    };
    let outcome = plan_snapshot(&agent, &snapshot, &store, CycleOptions { dry_run }).await;
    spinner.stop();

    let plan = match outcome? {
        CycleOutcome::NoChanges => bail!(NO_CHANGES),
        CycleOutcome::Planned(plan) => plan,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
    } else {
        println!();
        render::plan(&plan);
        if dry_run {
            render::dim("Dry run: plan not cached.");
        }
    }
    Ok(())
}

/// `uncommit commit`
pub fn commit(index: Option<u32>, all: bool, message: Option<String>) -> Result<()> {
    let backend = open_repo()?;
    let store = PlanStore::new(backend.root());

    let mut plan = store
        .load()
        .ok_or_else(|| anyhow!("No suggestions cached. Run 'uncommit suggest' first."))?;

    let executor = CommitExecutor::new(&backend, &store);
    if all {
        match executor.apply_all(&mut plan) {
            Ok(results) => results.iter().for_each(render::committed),
            Err(partial) => {
                partial.committed.iter().for_each(render::committed);
                return Err(partial.into());
            }
        }
    } else {
        let index = index.ok_or_else(|| anyhow!("Please specify a group index or use --all"))?;
        let result = executor.apply_group(&mut plan, index, message.as_deref())?;
        render::committed(&result);
    }

    if plan.is_empty() {
        println!();
        render::colored(Color::Green, "All groups committed!");
    }
    Ok(())
}

/// `uncommit status`
pub fn status() -> Result<()> {
    let backend = open_repo()?;
    let store = PlanStore::new(backend.root());

    match store.load() {
        None => render::colored(
            Color::Yellow,
            "No cached suggestions. Run 'uncommit suggest' first.",
        ),
        Some(plan) if plan.is_empty() => {
            store.clear();
            render::colored(
                Color::Yellow,
                "All groups have been committed. Run 'uncommit suggest' to analyze new changes.",
            );
        }
        Some(plan) => render::plan(&plan),
    }
    Ok(())
}

/// `uncommit undo`
pub fn undo(soft: bool, hard: bool, yes: bool) -> Result<()> {
    let mode = undo_mode(soft, hard)?;
    let backend = open_repo()?;
    let last = backend.last_commit()?.ok_or(ExecuteError::NoCommit)?;

    println!();
    render::colored(
        Color::Yellow,
        &format!("Last commit: {} {}", last.hash, last.message),
    );
    match mode {
        UndoMode::Discard => render::colored(
            Color::Red,
            "⚠ WARNING: --hard will PERMANENTLY DISCARD all changes!",
        ),
        UndoMode::KeepStaged => render::dim("Changes will be kept staged (ready to commit)."),
        UndoMode::KeepUnstaged => {
            render::dim("Changes will be kept in your working directory (unstaged).")
        }
    }

    if !yes && !confirm("Undo this commit?")? {
        render::dim("Cancelled.");
        return Ok(());
    }

    let undone = undo_last_commit(&backend, mode)?;
    render::success(&format!("Undone: {} ({})", undone.message, undone.hash));
    match mode {
        UndoMode::KeepStaged => render::dim("Changes are staged. Use 'git commit' to recommit."),
        UndoMode::KeepUnstaged => {
            render::dim("Changes are unstaged. Use 'uncommit suggest' to re-analyze.")
        }
        UndoMode::Discard => {}
    }
    Ok(())
}

/// `uncommit clear`
pub fn clear() -> Result<()> {
    let backend = open_repo()?;
    PlanStore::new(backend.root()).clear();
    render::success("Cached suggestions cleared");
    Ok(())
}

/// `uncommit context`
pub async fn context(refresh: bool) -> Result<()> {
    let backend = open_repo()?;
    let snapshot = collect_paths(&backend)?;
    let index = AreaIndex::new(backend.root());
    let areas = index.areas_for(snapshot.paths());

    if areas.is_empty() {
        render::colored(Color::Yellow, &format!("{}.", NO_CHANGES));
        return Ok(());
    }

    if refresh {
        let provider = GeminiProvider::from_config(&load_config(None))?;
        let writer = AreaDocWriter::new(&provider, &index);

        let spinner = Spinner::start(format!("Documenting {} area(s)...", areas.len()));
        let refreshed = writer.refresh_stale(&areas).await;
        spinner.stop();

        let refreshed = refreshed?;
        if refreshed.is_empty() {
            render::success("All area docs are up to date");
        } else {
            for area in &refreshed {
                render::success(&format!("Documented area {}", area.name));
            }
        }
        println!();
    }

    render::areas(&index.status(&areas));
    Ok(())
}
