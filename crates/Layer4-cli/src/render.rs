//! Terminal output helpers

use crossterm::{
    execute,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor},
};
use std::io::{self, Write};
use uncommit_core::context::AreaStatus;
use uncommit_core::{ChangeKind, ChangeSnapshot, CommitResult, SuggestionPlan};

/// Color for a conventional commit type
pub fn type_color(commit_type: &str) -> Color {
    match commit_type {
        "feat" | "perf" => Color::Green,
        "fix" => Color::Red,
        "refactor" | "build" => Color::Yellow,
        "docs" => Color::Blue,
        "chore" | "ci" => Color::Magenta,
        "style" => Color::Cyan,
        _ => Color::White,
    }
}

pub fn kind_color(kind: ChangeKind) -> Color {
    match kind {
        ChangeKind::Added => Color::Green,
        ChangeKind::Modified => Color::Yellow,
        ChangeKind::Deleted => Color::Red,
        ChangeKind::Renamed => Color::Blue,
    }
}

/// Print `text` in `color` followed by a newline
pub fn colored(color: Color, text: &str) {
    let mut stdout = io::stdout();
    let _ = execute!(
        stdout,
        SetForegroundColor(color),
        Print(text),
        ResetColor,
        Print("\n")
    );
}

pub fn dim(text: &str) {
    let mut stdout = io::stdout();
    let _ = execute!(
        stdout,
        SetAttribute(Attribute::Dim),
        Print(text),
        SetAttribute(Attribute::Reset),
        Print("\n")
    );
}

pub fn success(message: &str) {
    let mut stdout = io::stdout();
    let _ = execute!(
        stdout,
        SetForegroundColor(Color::Green),
        Print("✓ "),
        ResetColor,
        Print(message),
        Print("\n")
    );
}

pub fn error(message: &str) {
    let mut stderr = io::stderr();
    let _ = execute!(
        stderr,
        SetForegroundColor(Color::Red),
        Print("✗ "),
        ResetColor,
        Print(message),
        Print("\n")
    );
}

pub fn hint(text: &str) {
    let mut stderr = io::stderr();
    let _ = execute!(
        stderr,
        SetAttribute(Attribute::Dim),
        Print(format!("  {}\n", text)),
        SetAttribute(Attribute::Reset)
    );
}

/// Table of changed files
pub fn changes(snapshot: &ChangeSnapshot) {
    let mut stdout = io::stdout();
    let _ = execute!(
        stdout,
        SetAttribute(Attribute::Bold),
        Print(format!("Uncommitted changes ({} files)\n", snapshot.len())),
        SetAttribute(Attribute::Reset)
    );

    for record in snapshot.iter() {
        let _ = execute!(
            stdout,
            Print("  "),
            SetForegroundColor(kind_color(record.kind())),
            Print(format!("{:<10}", record.kind().as_str())),
            ResetColor,
            Print(format!("{}\n", record.path()))
        );
    }
    let _ = stdout.flush();
}

/// Proposed commits with their files, reasoning and warnings
pub fn plan(plan: &SuggestionPlan) {
    let mut stdout = io::stdout();
    let _ = execute!(
        stdout,
        SetForegroundColor(Color::Blue),
        Print("📦 "),
        ResetColor,
        SetAttribute(Attribute::Bold),
        Print("Proposed Commits\n\n"),
        SetAttribute(Attribute::Reset)
    );

    for group in plan.groups() {
        let _ = execute!(
            stdout,
            SetAttribute(Attribute::Bold),
            Print(format!("  [{}] ", group.index)),
            SetAttribute(Attribute::Reset),
            SetForegroundColor(type_color(&group.commit_type)),
            Print(&group.message),
            ResetColor,
            Print("\n")
        );
        for file in &group.files {
            let _ = execute!(stdout, Print(format!("      └─ {}\n", file)));
        }
        if !group.reasoning.is_empty() {
            dim(&format!("      Reason: {}", group.reasoning));
        }
        let _ = execute!(stdout, Print("\n"));
    }

    if !plan.warnings().is_empty() {
        colored(Color::Yellow, "⚠ Warnings:");
        for warning in plan.warnings() {
            let _ = execute!(stdout, Print(format!("  • {}\n", warning)));
        }
        let _ = execute!(stdout, Print("\n"));
    }

    dim("Use 'uncommit commit <index>' to commit a group, or 'uncommit commit --all' for all.");
}

pub fn committed(result: &CommitResult) {
    let mut stdout = io::stdout();
    let _ = execute!(
        stdout,
        SetForegroundColor(Color::Green),
        Print("✓ "),
        ResetColor,
        Print(format!("Committed: {} (", result.message)),
        SetForegroundColor(Color::Cyan),
        Print(&result.hash),
        ResetColor,
        Print(")\n")
    );
}

/// One line per area with its doc freshness
pub fn areas(statuses: &[AreaStatus]) {
    let mut stdout = io::stdout();
    for status in statuses {
        let (color, label) = if status.fresh {
            (Color::Green, "fresh")
        } else {
            (Color::Yellow, "stale")
        };
        let _ = execute!(
            stdout,
            Print(format!("  {:<24}", status.area.name)),
            SetForegroundColor(color),
            Print(format!("{:<7}", label)),
            ResetColor,
            Print(format!("{} files\n", status.files))
        );
    }
}
