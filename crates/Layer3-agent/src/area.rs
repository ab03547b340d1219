//! Area documentation generation
//!
//! Fills the `.uncommit/areas` cache kept by [`AreaIndex`] by asking the
//! provider to summarize a preview of each area's files.

use tracing::{debug, info, warn};
use uncommit_core::context::{Area, AreaIndex};
use uncommit_provider::{Message, Provider, ProviderError};

/// Files previewed per area
const MAX_PREVIEW_FILES: usize = 20;

/// Lines and chars kept from the top of each previewed file
const PREVIEW_LINES: usize = 10;
const PREVIEW_CHARS: usize = 500;

const AREA_SYSTEM_PROMPT: &str = "You write short, factual documentation for areas of a codebase. \
It is read by a tool that groups changes into commits, so focus on what each file is for.";

/// Generates and caches area docs
pub struct AreaDocWriter<'a, P: ?Sized> {
    provider: &'a P,
    index: &'a AreaIndex,
}

impl<'a, P: Provider + ?Sized> AreaDocWriter<'a, P> {
    pub fn new(provider: &'a P, index: &'a AreaIndex) -> Self {
        Self { provider, index }
    }

    /// Generate a doc for `area` and cache it
    pub async fn generate(&self, area: &Area) -> Result<String, ProviderError> {
        let files = self.index.area_files(area);
        let fingerprint = uncommit_core::context::fingerprint_of(&files);

        let doc = if files.is_empty() {
            format!("# Area: {}\n\nEmpty or non-existent area.", area.name)
        } else {
            let prompt = self.build_prompt(area, &files);
            debug!(area = %area.name, files = files.len(), "Generating area doc");
            self.provider
                .complete(vec![Message::user(prompt)], Some(AREA_SYSTEM_PROMPT.to_string()))
                .await?
                .content
        };

        if let Err(e) = self.index.save_doc(area, &doc, &fingerprint) {
            warn!("Could not cache doc for area {}: {}", area.name, e);
        }
        info!("Generated doc for area {}", area.name);
        Ok(doc)
    }

    /// Regenerate every stale area, stopping at the first provider failure
    pub async fn refresh_stale(&self, areas: &[Area]) -> Result<Vec<Area>, ProviderError> {
        let mut refreshed = Vec::new();
        for area in areas.iter().filter(|a| self.index.is_stale(a)) {
            self.generate(area).await?;
            refreshed.push(area.clone());
        }
        Ok(refreshed)
    }

    fn build_prompt(&self, area: &Area, files: &[String]) -> String {
        let previews = files
            .iter()
            .take(MAX_PREVIEW_FILES)
            .map(|file| {
                match std::fs::read_to_string(self.index.repo_root().join(file)) {
                    Ok(content) => format!("### {}\n```\n{}\n```", file, preview(&content)),
                    Err(_) => format!("### {}\n[unreadable]", file),
                }
            })
            .collect::<Vec<_>>()
            .join("\n\n");

        format!(
            "Analyze this codebase area and write concise documentation.\n\n\
             ## Area: {name}\n\n\
             ## Files in this area:\n{previews}\n\n\
             ## Task\n\
             Write a brief markdown document (50-100 lines max) starting with `# Area: {name}` and covering:\n\
             1. **Purpose**: what this area does, in 1-2 sentences\n\
             2. **Key Files**: the role of each file\n\
             3. **Patterns**: conventions used here\n\
             4. **Dependencies**: what this area uses or provides\n",
            name = area.name,
        )
    }
}

/// Top of a file, bounded in lines and chars
fn preview(content: &str) -> String {
    let head = content.lines().take(PREVIEW_LINES).collect::<Vec<_>>().join("\n");
    if head.chars().count() > PREVIEW_CHARS {
        let cut: String = head.chars().take(PREVIEW_CHARS).collect();
        format!("{cut}...")
    } else {
        head
    }
}
