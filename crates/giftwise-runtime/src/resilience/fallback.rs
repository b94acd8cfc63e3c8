//! Why a response came from the deterministic fallback.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Reason the provider was bypassed in favor of generated ideas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    /// Provider reported a quota or rate limit
    QuotaExceeded,

    /// Circuit breaker is open for the provider
    CircuitOpen,
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackReason::QuotaExceeded => write!(f, "quota exceeded"),
            FallbackReason::CircuitOpen => write!(f, "circuit open"),
        }
    }
}
