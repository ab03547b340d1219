//! Suggester capability
//!
//! Anything that can turn a snapshot into a candidate partition. The output
//! is untrusted and always goes through [`crate::plan::validate`].

use crate::plan::Proposal;
use crate::snapshot::ChangeSnapshot;
use async_trait::async_trait;
use thiserror::Error;

/// Coarse class of a transport failure, used to pick a user hint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Auth,
    RateLimit,
    Network,
    UnknownModel,
    Other,
}

impl FailureKind {
    /// Classify a failure from its message alone
    pub fn classify(message: &str) -> Self {
        let msg = message.to_lowercase();
        let has = |needles: &[&str]| needles.iter().any(|n| msg.contains(n));

        if has(&["api key", "api_key", "unauthorized", "permission denied", "401", "403"]) {
            FailureKind::Auth
        } else if has(&["quota", "rate limit", "rate-limit", "limit exceeded", "resource_exhausted", "429"]) {
            FailureKind::RateLimit
        } else if msg.contains("model") && has(&["not found", "invalid", "not supported"]) {
            FailureKind::UnknownModel
        } else if has(&["network", "connection", "timeout", "timed out", "dns"]) {
            FailureKind::Network
        } else {
            FailureKind::Other
        }
    }

    pub fn hint(&self) -> Option<&'static str> {
        match self {
            FailureKind::Auth => Some(
                "Check your API key. Set GOOGLE_API_KEY in the environment, .env.local, \
                 or ~/.config/uncommit/config.toml",
            ),
            FailureKind::RateLimit => {
                Some("Rate limit or quota exceeded. Wait a minute and try again.")
            }
            FailureKind::Network => Some("Check your internet connection and try again."),
            FailureKind::UnknownModel => Some(
                "The model name may be wrong. Try --model gemini-2.0-flash or set UNCOMMIT_MODEL.",
            ),
            FailureKind::Other => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum SuggesterError {
    /// The reply could not be read as a partition
    #[error("Invalid response from model: {message}")]
    Format { message: String, raw: String },

    /// The suggester could not be reached or refused the request
    #[error("{message}")]
    Transport { kind: FailureKind, message: String },
}

impl SuggesterError {
    pub fn format(message: impl Into<String>, raw: impl Into<String>) -> Self {
        Self::Format {
            message: message.into(),
            raw: raw.into(),
        }
    }

    /// Transport failure classified from its message
    pub fn transport(message: impl Into<String>) -> Self {
        let message = message.into();
        Self::Transport {
            kind: FailureKind::classify(&message),
            message,
        }
    }

    pub fn hint(&self) -> Option<&'static str> {
        match self {
            SuggesterError::Format { .. } => {
                Some("The model returned something unexpected. Try again or use a different model.")
            }
            SuggesterError::Transport { kind, .. } => kind.hint(),
        }
    }
}

/// Proposes a grouping for a snapshot
#[async_trait]
pub trait Suggester: Send + Sync {
    async fn propose(&self, snapshot: &ChangeSnapshot) -> Result<Proposal, SuggesterError>;
}
