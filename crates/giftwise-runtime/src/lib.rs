//! # giftwise-runtime
//!
//! LLM-backed gift idea generation for Giftwise.
//!
//! This crate sends requests to a text-generation provider, hands the reply
//! to the normalizer in `giftwise-core`, and substitutes the deterministic
//! fallback when the provider is over quota or its circuit is open.
//!
//! ## Important
//!
//! `giftwise-core` never calls a model. Everything that touches the network
//! lives here, and the Gemini provider is only compiled with the `gemini`
//! feature.
//!
//! ## Example
//!
//! ```rust,ignore
//! use giftwise_core::GiftRequest;
//! use giftwise_runtime::{GiftService, ProviderRegistry, RuntimeConfig};
//!
//! let service = GiftService::from_config(RuntimeConfig::default(), &ProviderRegistry::with_defaults())?;
//! let response = service
//!     .generate(&GiftRequest::new("Birthday", ["Sports", "Cooking"]))
//!     .await?;
//! println!("{}", serde_json::to_string_pretty(&response)?);
//! ```

pub mod cache;
pub mod config;
pub mod prompts;
pub mod providers;
pub mod resilience;
pub mod service;

pub use cache::{CacheKey, IdeaCache};
pub use config::{CacheConfig, ConfigError, RuntimeConfig};
pub use prompts::build_gift_prompt;
pub use providers::{
    ApiCredential, ChatMessage, CompletionConfig, CompletionResponse, CredentialSource,
    LlmProvider, ProviderError, ProviderFactory, ProviderRegistry, TokenUsage,
};
pub use resilience::{CircuitBreaker, CircuitBreakerConfig, CircuitState, FallbackReason, RetryConfig};
pub use service::{GiftResponse, GiftService, GiftServiceBuilder, ServiceError};

#[cfg(feature = "gemini")]
pub use providers::{GeminiProvider, GeminiProviderFactory, GEMINI_API_KEY_ENV};
