//! # uncommit-provider
//!
//! LLM provider abstraction for uncommit.
//!
//! ## Features
//! - `Provider` trait for single-shot completions
//! - Google Gemini `generateContent` client
//! - HTTP status and body classification into `ProviderError`

pub mod error;
pub mod message;
pub mod providers;
pub mod r#trait;

// Core traits and types
pub use message::Message;
pub use r#trait::{FinishReason, ModelInfo, Provider, ProviderResponse, TokenUsage};

// Errors
pub use error::ProviderError;

// Provider implementations
pub use providers::gemini::GeminiProvider;
