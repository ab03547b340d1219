//! Commit grouping agent

use crate::prompt::{build_prompt, SYSTEM_PROMPT};
use crate::response::parse_proposal;
use async_trait::async_trait;
use tracing::{debug, info};
use uncommit_core::{ChangeSnapshot, FailureKind, Proposal, Suggester, SuggesterError};
use uncommit_provider::{Message, Provider, ProviderError};

/// `Suggester` backed by an LLM provider
pub struct CommitAgent<P> {
    provider: P,

    /// Area docs prepended to the prompt
    area_context: Option<String>,
}

impl<P: Provider> CommitAgent<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            area_context: None,
        }
    }

    pub fn with_area_context(mut self, context: Option<String>) -> Self {
        self.area_context = context;
        self
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }
}

#[async_trait]
impl<P: Provider> Suggester for CommitAgent<P> {
    async fn propose(&self, snapshot: &ChangeSnapshot) -> Result<Proposal, SuggesterError> {
        let prompt = build_prompt(snapshot, self.area_context.as_deref());
        debug!(
            model = %self.provider.model().id,
            prompt_chars = prompt.len(),
            "Requesting commit grouping"
        );

        let response = self
            .provider
            .complete(vec![Message::user(prompt)], Some(SYSTEM_PROMPT.to_string()))
            .await
            .map_err(transport_error)?;

        info!(
            "Model replied with {} chars ({} tokens)",
            response.content.len(),
            response.usage.total()
        );
        parse_proposal(&response.content)
    }
}

/// Coarse failure class of a provider error
pub fn failure_kind(err: &ProviderError) -> FailureKind {
    match err {
        ProviderError::Authentication(_) | ProviderError::NotConfigured(_) => FailureKind::Auth,
        ProviderError::RateLimited { .. } | ProviderError::QuotaExceeded(_) => {
            FailureKind::RateLimit
        }
        ProviderError::Network(_) => FailureKind::Network,
        ProviderError::ModelNotFound(_) => FailureKind::UnknownModel,
        other => FailureKind::classify(&other.to_string()),
    }
}

fn transport_error(err: ProviderError) -> SuggesterError {
    SuggesterError::Transport {
        kind: failure_kind(&err),
        message: err.to_string(),
    }
}
