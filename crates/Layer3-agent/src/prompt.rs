//! Prompt construction for commit grouping

use uncommit_core::ChangeSnapshot;

/// Instructions sent as the system prompt
pub const SYSTEM_PROMPT: &str = r#"You are a senior engineer who turns a pile of uncommitted changes into a clean series of commits.

Steps:
1. Read every changed file and its diff.
2. Group files that belong to the same change: one feature, one fix, one refactor.
3. Order the groups so that no commit depends on a later one.
4. Write a conventional commit message for each group.
5. Check that every changed file appears in exactly one group.

Rules:
- Every changed file MUST be in exactly one group. Do not invent paths.
- Messages use the form type(scope): subject, imperative mood, subject at most 50 characters.
- Allowed types: feat, fix, refactor, docs, chore, style, test, perf, ci, build.

Reply with ONLY a JSON object of this shape:

{
  "groups": [
    {
      "index": 1,
      "message": "fix(utils): correct rounding in format_price",
      "type": "fix",
      "files": ["src/utils/format.py"],
      "reasoning": "Standalone bug fix"
    }
  ],
  "warnings": null
}

- index: 1-based commit order
- files: paths exactly as listed under "Changed Files"
- reasoning: one sentence on why the files belong together
- warnings: list of strings about anything ambiguous, or null"#;

/// User prompt describing the snapshot, optionally with area docs
pub fn build_prompt(snapshot: &ChangeSnapshot, area_context: Option<&str>) -> String {
    let file_list = snapshot
        .iter()
        .map(|r| format!("- {} ({})", r.path(), r.kind()))
        .collect::<Vec<_>>()
        .join("\n");

    let diffs = snapshot
        .iter()
        .map(|r| match r.diff() {
            Some(diff) => format!("### {}\n```diff\n{}\n```", r.path(), diff),
            None => format!("### {}\n(no diff)", r.path()),
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    let mut prompt = String::from(
        "Analyze these uncommitted git changes and group them into logical commits.\n\n",
    );
    if let Some(context) = area_context.filter(|c| !c.trim().is_empty()) {
        prompt.push_str("## Codebase Context\n");
        prompt.push_str(context);
        prompt.push_str("\n\n");
    }
    prompt.push_str("## Changed Files\n");
    prompt.push_str(&file_list);
    prompt.push_str("\n\n## Diffs\n");
    prompt.push_str(&diffs);
    prompt.push('\n');
    prompt
}
