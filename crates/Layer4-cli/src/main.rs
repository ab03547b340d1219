//! uncommit CLI - Main entry point

mod commands;
mod render;
mod spinner;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uncommit_core::{BackendError, CycleError, ExecuteError, PartialApply, SuggesterError};
use uncommit_provider::ProviderError;

/// uncommit - group your uncommitted changes into clean commits
#[derive(Parser, Debug)]
#[command(name = "uncommit")]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help = true)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List uncommitted changes
    Analyze {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },
    /// Ask the model to group changes into commits
    Suggest {
        /// Preview without caching the plan
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Override the configured model
        #[arg(short, long)]
        model: Option<String>,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },
    /// Commit one cached group, or all of them
    Commit {
        /// Group index (1-based)
        index: Option<u32>,

        /// Commit every remaining group in order
        #[arg(short, long)]
        all: bool,

        /// Override the commit message
        #[arg(short, long, conflicts_with = "all")]
        message: Option<String>,
    },
    /// Show the cached plan
    Status,
    /// Undo the last commit (changes are kept unstaged by default)
    Undo {
        /// Keep the changes staged
        #[arg(long, conflicts_with = "hard")]
        soft: bool,

        /// Discard the changes completely
        #[arg(long)]
        hard: bool,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Remove the cached plan
    Clear,
    /// Show which areas of the codebase the changes touch
    Context {
        /// Regenerate stale area docs
        #[arg(long)]
        refresh: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.debug { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    if let Err(e) = run(args.command).await {
        render::error(&e.to_string());
        if let Some(hint) = hint_for(&e) {
            render::hint(hint);
        }
        std::process::exit(1);
    }
}

async fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Analyze { json } => commands::analyze(json),
        Command::Suggest {
            dry_run,
            model,
            json,
        } => commands::suggest(dry_run, model, json).await,
        Command::Commit {
            index,
            all,
            message,
        } => commands::commit(index, all, message),
        Command::Status => commands::status(),
        Command::Undo { soft, hard, yes } => commands::undo(soft, hard, yes),
        Command::Clear => commands::clear(),
        Command::Context { refresh } => commands::context(refresh).await,
    }
}

/// Corrective hint for the first error in the chain that has one
fn hint_for(err: &anyhow::Error) -> Option<&'static str> {
    err.chain().find_map(|cause| {
        if let Some(e) = cause.downcast_ref::<CycleError>() {
            e.hint()
        } else if let Some(e) = cause.downcast_ref::<PartialApply>() {
            e.source.hint()
        } else if let Some(e) = cause.downcast_ref::<ExecuteError>() {
            e.hint()
        } else if let Some(e) = cause.downcast_ref::<SuggesterError>() {
            e.hint()
        } else if let Some(e) = cause.downcast_ref::<BackendError>() {
            e.hint()
        } else if let Some(e) = cause.downcast_ref::<ProviderError>() {
            uncommit_agent::failure_kind(e).hint()
        } else {
            None
        }
    })
}
