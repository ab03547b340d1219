//! # uncommit-agent
//!
//! LLM-backed pieces of uncommit.
//!
//! - **CommitAgent**: a `Suggester` that renders the snapshot into a prompt,
//!   calls the provider and reads the JSON grouping out of the reply
//! - **AreaDocWriter**: generates the per-area docs cached by
//!   `uncommit_core::context::AreaIndex`
//!
//! ```ignore
//! let provider = GeminiProvider::from_config(&config)?;
//! let agent = CommitAgent::new(provider).with_area_context(context);
//! let outcome = run_cycle(&agent, &git, &store, CycleOptions::default()).await?;
//! ```

pub mod agent;
pub mod area;
pub mod prompt;
pub mod response;

#[cfg(test)]
pub(crate) mod testing;

pub use agent::{failure_kind, CommitAgent};
pub use area::AreaDocWriter;
pub use prompt::{build_prompt, SYSTEM_PROMPT};
pub use response::{extract_json, parse_proposal};
