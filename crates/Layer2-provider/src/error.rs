//! Provider-specific error types

use thiserror::Error;

/// Errors that can occur during provider operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// API key is missing or invalid
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded{}", .retry_after_ms.map(|ms| format!(", retry after {}ms", ms)).unwrap_or_default())]
    RateLimited { retry_after_ms: Option<u64> },

    /// Quota exceeded
    #[error("Quota exceeded: {0}")]
    QuotaExceeded(String),

    /// Context length exceeded
    #[error("Context length exceeded: {0}")]
    ContextLengthExceeded(String),

    /// Content was filtered
    #[error("Content filtered: {0}")]
    ContentFiltered(String),

    /// Server error (5xx)
    #[error("Server error: {0}")]
    ServerError(String),

    /// Network error (connection failed, DNS, timeout)
    #[error("Network error: {0}")]
    Network(String),

    /// Invalid request (bad parameters)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Invalid response from API
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Model not found
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    /// Provider not configured
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    /// Unknown error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl ProviderError {
    /// Create from HTTP status code and body
    pub fn from_http_status(status: u16, body: &str) -> Self {
        match status {
            401 | 403 => ProviderError::Authentication(body.to_string()),
            429 => ProviderError::RateLimited {
                retry_after_ms: extract_retry_after(body),
            },
            400 => {
                let lower = body.to_lowercase();
                if lower.contains("api key") {
                    ProviderError::Authentication(body.to_string())
                } else if lower.contains("context") || lower.contains("too long") {
                    ProviderError::ContextLengthExceeded(body.to_string())
                } else {
                    ProviderError::InvalidRequest(body.to_string())
                }
            }
            404 => ProviderError::ModelNotFound(body.to_string()),
            500..=599 => ProviderError::ServerError(body.to_string()),
            _ => ProviderError::Unknown(format!("HTTP {}: {}", status, body)),
        }
    }

    /// Map a transport-level `reqwest` failure
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        let (timeout, connect, decode) = (err.is_timeout(), err.is_connect(), err.is_decode());
        let detail = error_chain(&err.without_url());

        if timeout {
            ProviderError::Network(format!("request timed out: {}", detail))
        } else if connect {
            ProviderError::Network(format!("connection failed: {}", detail))
        } else if decode {
            ProviderError::InvalidResponse(detail)
        } else {
            ProviderError::Network(detail)
        }
    }
}

/// Error message followed by its sources
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut parts = vec![err.to_string()];
    let mut source = err.source();
    while let Some(inner) = source {
        parts.push(inner.to_string());
        source = inner.source();
    }
    parts.join(": ")
}

/// Try to extract retry-after value from error body (in milliseconds)
fn extract_retry_after(body: &str) -> Option<u64> {
    if let Ok(json) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(secs) = json
            .get("error")
            .and_then(|e| e.get("retry_after"))
            .and_then(|v| v.as_f64())
        {
            return Some((secs * 1000.0) as u64);
        }
    }

    // Plain text, e.g. "retry in 12.5s"
    let idx = body.to_ascii_lowercase().find("retry")?;
    let num_str: String = body[idx..]
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    num_str.parse::<f64>().ok().map(|secs| (secs * 1000.0) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_http_status() {
        assert!(matches!(
            ProviderError::from_http_status(401, "nope"),
            ProviderError::Authentication(_)
        ));
        assert!(matches!(
            ProviderError::from_http_status(400, "API key not valid. Please pass a valid API key."),
            ProviderError::Authentication(_)
        ));
        assert!(matches!(
            ProviderError::from_http_status(404, "models/x is not found"),
            ProviderError::ModelNotFound(_)
        ));
        assert!(matches!(
            ProviderError::from_http_status(503, "overloaded"),
            ProviderError::ServerError(_)
        ));
        assert!(matches!(
            ProviderError::from_http_status(418, "teapot"),
            ProviderError::Unknown(_)
        ));
    }

    #[test]
    fn test_retry_after() {
        assert_eq!(
            ProviderError::from_http_status(429, r#"{"error":{"retry_after":2}}"#),
            ProviderError::RateLimited {
                retry_after_ms: Some(2000)
            }
        );
        assert_eq!(extract_retry_after("Please retry in 1.5s"), Some(1500));
        assert_eq!(extract_retry_after("slow down"), None);
    }
}
