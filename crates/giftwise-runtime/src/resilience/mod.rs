//! Resilience patterns for giftwise-runtime.
//!
//! This module provides:
//! - Circuit breaker per provider
//! - Retry with backoff for transient failures
//! - Fallback reasons reported with generated responses

mod circuit_breaker;
mod fallback;
mod retry;

pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
pub use fallback::FallbackReason;
pub use retry::{with_retry, RetryConfig};
