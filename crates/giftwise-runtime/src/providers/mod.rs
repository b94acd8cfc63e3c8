//! LLM provider abstractions for giftwise-runtime.
//!
//! This module defines the trait for text-generation providers and the
//! Gemini implementation (behind the `gemini` feature).
//!
//! ## Security
//!
//! Providers hold their keys in [`ApiCredential`], which never prints the
//! secret through `Debug` or `Display`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

mod factory;
pub mod secrets;

#[cfg(feature = "gemini")]
mod gemini;

pub use factory::{ProviderFactory, ProviderRegistry};
pub use secrets::{ApiCredential, CredentialSource};

#[cfg(feature = "gemini")]
pub use gemini::{GeminiProvider, GeminiProviderFactory, GEMINI_API_KEY_ENV};

/// Substrings marking a provider failure as quota or rate-limit related.
const QUOTA_MARKERS: &[&str] = &["429", "quota", "rate limit"];

/// Errors from LLM providers.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    #[error("Rate limit exceeded, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    ParseError(String),

    #[error("Authentication failed")]
    AuthError,

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Empty response from provider")]
    EmptyResponse,
}

impl ProviderError {
    /// Whether the failure means the provider quota or rate limit was hit.
    ///
    /// Matches the `RateLimited` variant and any error whose message
    /// mentions `429`, `quota` or `rate limit`.
    pub fn is_quota_exceeded(&self) -> bool {
        if matches!(self, ProviderError::RateLimited { .. }) {
            return true;
        }
        let message = self.to_string().to_lowercase();
        QUOTA_MARKERS.iter().any(|marker| message.contains(marker))
    }

    /// Whether retrying the same request may succeed.
    ///
    /// Quota failures are not transient: they go to the fallback instead.
    pub fn is_transient(&self) -> bool {
        if self.is_quota_exceeded() {
            return false;
        }
        match self {
            ProviderError::HttpError(_) | ProviderError::Timeout(_) => true,
            ProviderError::ApiError { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Configuration for a completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    /// Model to use
    pub model: String,

    /// Maximum tokens to generate
    pub max_tokens: u32,

    /// Sampling temperature
    pub temperature: f32,

    /// Request timeout
    #[serde(with = "crate::config::duration_str")]
    pub timeout: Duration,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.0-flash".to_string(),
            max_tokens: 1024,
            temperature: 0.7,
            timeout: Duration::from_secs(15),
        }
    }
}

/// A chat message for LLM completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role: "system", "user", or "assistant"
    pub role: String,

    /// Message content
    pub content: String,
}

impl ChatMessage {
    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Response from an LLM completion.
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    /// Generated text
    pub content: String,

    /// Token usage
    pub usage: TokenUsage,

    /// Model used
    pub model: String,
}

/// Token usage from a completion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl TokenUsage {
    /// Total tokens used.
    pub fn total(&self) -> u32 {
        self.prompt_tokens + self.completion_tokens
    }
}

/// Provider abstraction allows swapping LLM backends.
///
/// Only the gift service calls providers; everything in `giftwise-core`
/// stays model-free.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Execute a completion.
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        config: &CompletionConfig,
    ) -> Result<CompletionResponse, ProviderError>;

    /// Check if provider is healthy.
    async fn health_check(&self) -> bool;

    /// Provider name, used as the circuit breaker key.
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_message_creation() {
        assert_eq!(ChatMessage::system("Be brief.").role, "system");
        assert_eq!(ChatMessage::user("Hello!").role, "user");
    }

    #[test]
    fn test_token_usage_total() {
        let usage = TokenUsage {
            prompt_tokens: 100,
            completion_tokens: 50,
        };
        assert_eq!(usage.total(), 150);
    }

    #[test]
    fn test_quota_classification() {
        assert!(ProviderError::RateLimited { retry_after: None }.is_quota_exceeded());
        assert!(ProviderError::ApiError {
            status: 429,
            message: "Too many requests".to_string()
        }
        .is_quota_exceeded());
        assert!(ProviderError::ApiError {
            status: 403,
            message: "You exceeded your current QUOTA".to_string()
        }
        .is_quota_exceeded());
        assert!(ProviderError::HttpError("Rate limit reached".to_string()).is_quota_exceeded());

        assert!(!ProviderError::AuthError.is_quota_exceeded());
        assert!(!ProviderError::ApiError {
            status: 500,
            message: "Internal".to_string()
        }
        .is_quota_exceeded());
    }

    #[test]
    fn test_transient_classification() {
        assert!(ProviderError::HttpError("connection reset".to_string()).is_transient());
        assert!(ProviderError::Timeout(Duration::from_secs(1)).is_transient());
        assert!(ProviderError::ApiError {
            status: 503,
            message: "Unavailable".to_string()
        }
        .is_transient());

        assert!(!ProviderError::RateLimited { retry_after: None }.is_transient());
        assert!(!ProviderError::AuthError.is_transient());
        assert!(!ProviderError::ApiError {
            status: 400,
            message: "Bad request".to_string()
        }
        .is_transient());
    }
}
