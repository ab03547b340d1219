//! Google Gemini provider (`generateContent`)

use crate::{
    error::ProviderError,
    r#trait::{FinishReason, ModelInfo, Provider, ProviderResponse, TokenUsage},
    Message,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use uncommit_foundation::config::{Config, API_KEY_ENV};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_TIMEOUT_SECS: u64 = 300;
const DEFAULT_MAX_TOKENS: u32 = 8192;

/// Google Gemini provider
pub struct GeminiProvider {
    client: Client,
    api_key: String,
    model_info: ModelInfo,
    max_tokens: u32,
    base_url: String,
}

impl GeminiProvider {
    /// Create a new Gemini provider
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        max_tokens: u32,
    ) -> Result<Self, ProviderError> {
        let model_id = model.into();
        Ok(Self {
            client: build_client(Duration::from_secs(DEFAULT_TIMEOUT_SECS))?,
            api_key: api_key.into(),
            model_info: Self::get_model_info(&model_id),
            max_tokens,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Create from loaded configuration; fails when no API key is set
    pub fn from_config(config: &Config) -> Result<Self, ProviderError> {
        let api_key = config
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| ProviderError::NotConfigured(format!("{} not set", API_KEY_ENV)))?;
        Self::new(api_key, &config.model, DEFAULT_MAX_TOKENS)
    }

    /// Point at a different API endpoint
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Resolve `-latest`/`-exp` aliases to the model ID sent to the API
    fn get_model_info(model_id: &str) -> ModelInfo {
        let id = match model_id {
            "gemini-2.0-flash-exp" => "gemini-2.0-flash",
            "gemini-1.5-pro-latest" => "gemini-1.5-pro",
            "gemini-1.5-flash-latest" => "gemini-1.5-flash",
            other => other,
        };
        ModelInfo::new(id, "gemini")
    }

    fn generate_url(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model_info.id)
    }

    fn build_request(&self, messages: &[Message], system_prompt: Option<&str>) -> GeminiRequest {
        let contents = messages
            .iter()
            .map(|msg| GeminiContent {
                role: "user".to_string(),
                parts: vec![GeminiPart::text(&msg.content)],
            })
            .collect();

        GeminiRequest {
            contents,
            system_instruction: system_prompt.map(|s| GeminiSystemInstruction {
                parts: vec![GeminiPart::text(s)],
            }),
            generation_config: Some(GeminiGenerationConfig {
                max_output_tokens: Some(self.max_tokens),
            }),
        }
    }

    fn parse_error_response(status: reqwest::StatusCode, body: &str) -> ProviderError {
        // Try to parse as JSON error
        if let Ok(error_response) = serde_json::from_str::<GeminiErrorResponse>(body) {
            let error = error_response.error;
            let message = error.message;

            return match error.status.as_deref() {
                Some("RESOURCE_EXHAUSTED") => {
                    if message.to_lowercase().contains("quota") {
                        ProviderError::QuotaExceeded(message)
                    } else {
                        ProviderError::RateLimited {
                            retry_after_ms: None,
                        }
                    }
                }
                Some("INVALID_ARGUMENT") => {
                    if message.contains("API key") {
                        ProviderError::Authentication(message)
                    } else if message.contains("context") || message.contains("token") {
                        ProviderError::ContextLengthExceeded(message)
                    } else {
                        ProviderError::InvalidRequest(message)
                    }
                }
                Some("PERMISSION_DENIED") | Some("UNAUTHENTICATED") => {
                    ProviderError::Authentication(message)
                }
                Some("NOT_FOUND") => ProviderError::ModelNotFound(message),
                _ => ProviderError::from_http_status(status.as_u16(), &message),
            };
        }

        ProviderError::from_http_status(status.as_u16(), body)
    }
}

fn build_client(timeout: Duration) -> Result<Client, ProviderError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ProviderError::NotConfigured(format!("Failed to create HTTP client: {}", e)))
}

/// Turn a decoded `generateContent` reply into a response
fn parse_response(api_response: GeminiResponse, model: &str) -> Result<ProviderResponse, ProviderError> {
    let Some(candidate) = api_response.candidates.into_iter().next() else {
        return Err(match api_response.prompt_feedback.and_then(|f| f.block_reason) {
            Some(reason) => ProviderError::ContentFiltered(format!("prompt blocked ({})", reason)),
            None => ProviderError::InvalidResponse("No candidates in response".to_string()),
        });
    };

    let content: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    let finish_reason = match candidate.finish_reason.as_deref() {
        Some("STOP") => FinishReason::Stop,
        Some("MAX_TOKENS") => FinishReason::MaxTokens,
        Some("SAFETY") | Some("RECITATION") | Some("BLOCKLIST") => FinishReason::ContentFilter,
        _ => FinishReason::Other,
    };

    if content.trim().is_empty() {
        return Err(match finish_reason {
            FinishReason::ContentFilter => {
                ProviderError::ContentFiltered("response blocked by safety filters".to_string())
            }
            _ => ProviderError::InvalidResponse("Empty response".to_string()),
        });
    }

    let usage = api_response.usage_metadata.unwrap_or_default();
    Ok(ProviderResponse {
        content,
        usage: TokenUsage {
            input_tokens: usage.prompt_token_count.unwrap_or(0),
            output_tokens: usage.candidates_token_count.unwrap_or(0),
        },
        finish_reason,
        model: model.to_string(),
    })
}

#[async_trait]
impl Provider for GeminiProvider {
    fn model(&self) -> &ModelInfo {
        &self.model_info
    }

    async fn complete(
        &self,
        messages: Vec<Message>,
        system_prompt: Option<String>,
    ) -> Result<ProviderResponse, ProviderError> {
        if self.api_key.is_empty() {
            return Err(ProviderError::NotConfigured(format!("{} not set", API_KEY_ENV)));
        }

        let request = self.build_request(&messages, system_prompt.as_deref());
        debug!(model = %self.model_info.id, "Sending generateContent request");

        let response = self
            .client
            .post(self.generate_url())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(ProviderError::from_reqwest)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            debug!(status = status.as_u16(), "Gemini request failed");
            return Err(Self::parse_error_response(status, &body));
        }

        let api_response: GeminiResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        let parsed = parse_response(api_response, &self.model_info.id)?;
        debug!(
            input_tokens = parsed.usage.input_tokens,
            output_tokens = parsed.usage.output_tokens,
            "Gemini response received"
        );
        Ok(parsed)
    }
}

// ============================================================================
// Gemini API Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiSystemInstruction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GeminiGenerationConfig>,
}

#[derive(Debug, Serialize)]
struct GeminiSystemInstruction {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    role: String,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

/// Only text parts are used; other part kinds deserialize with `text: None`
#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

impl GeminiPart {
    fn text(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
        }
    }
}

// Response types
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    usage_metadata: Option<GeminiUsageMetadata>,
    #[serde(default)]
    prompt_feedback: Option<GeminiPromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsageMetadata {
    prompt_token_count: Option<u32>,
    candidates_token_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPromptFeedback {
    block_reason: Option<String>,
}

// Error types
#[derive(Debug, Deserialize)]
struct GeminiErrorResponse {
    error: GeminiError,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    message: String,
    status: Option<String>,
}
