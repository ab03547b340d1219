//! Provider double for agent tests

use async_trait::async_trait;
use std::sync::Mutex;
use uncommit_provider::{
    FinishReason, Message, ModelInfo, Provider, ProviderError, ProviderResponse, TokenUsage,
};

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub prompt: String,
    pub system: Option<String>,
}

/// Answers every call with the same canned reply
pub struct ScriptedProvider {
    reply: Result<String, ProviderError>,
    calls: Mutex<Vec<RecordedCall>>,
    model: ModelInfo,
}

impl ScriptedProvider {
    pub fn replying(text: &str) -> Self {
        Self::with_reply(Ok(text.to_string()))
    }

    pub fn failing(err: ProviderError) -> Self {
        Self::with_reply(Err(err))
    }

    fn with_reply(reply: Result<String, ProviderError>) -> Self {
        Self {
            reply,
            calls: Mutex::new(Vec::new()),
            model: ModelInfo::new("scripted", "test"),
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn model(&self) -> &ModelInfo {
        &self.model
    }

    async fn complete(
        &self,
        messages: Vec<Message>,
        system_prompt: Option<String>,
    ) -> Result<ProviderResponse, ProviderError> {
        let prompt = messages
            .into_iter()
            .map(|m| m.content)
            .collect::<Vec<_>>()
            .join("\n");
        self.calls.lock().unwrap().push(RecordedCall {
            prompt,
            system: system_prompt,
        });

        self.reply.clone().map(|content| ProviderResponse {
            content,
            usage: TokenUsage::default(),
            finish_reason: FinishReason::Stop,
            model: self.model.id.clone(),
        })
    }
}
