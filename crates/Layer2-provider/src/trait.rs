//! Provider trait and common types

use crate::error::ProviderError;
use crate::Message;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Model a provider sends requests to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Model ID as sent to the API (e.g., "gemini-2.0-flash")
    pub id: String,

    /// Provider name (e.g., "gemini")
    pub provider: String,
}

impl ModelInfo {
    pub fn new(id: impl Into<String>, provider: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            provider: provider.into(),
        }
    }
}

/// Token usage of one call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl TokenUsage {
    pub fn total(&self) -> u32 {
        self.input_tokens + self.output_tokens
    }
}

/// Single-shot completion backend
#[async_trait]
pub trait Provider: Send + Sync {
    /// Model requests go to
    fn model(&self) -> &ModelInfo;

    /// Send messages and wait for the whole reply
    async fn complete(
        &self,
        messages: Vec<Message>,
        system_prompt: Option<String>,
    ) -> Result<ProviderResponse, ProviderError>;
}

/// Complete response from provider
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderResponse {
    /// Text content
    pub content: String,

    pub usage: TokenUsage,

    pub finish_reason: FinishReason,

    /// Model used
    pub model: String,
}

/// Reason for completion finishing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FinishReason {
    /// Completed naturally
    Stop,

    /// Hit max tokens limit
    MaxTokens,

    /// Content filtered
    ContentFilter,

    /// Unknown/other
    #[default]
    Other,
}
