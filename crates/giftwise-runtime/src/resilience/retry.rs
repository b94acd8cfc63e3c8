//! Retry with exponential backoff for transient provider failures.

use backon::{ExponentialBuilder, Retryable};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;

use crate::providers::ProviderError;

/// Retry configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Retries after the first attempt
    pub max_retries: usize,

    /// Delay before the first retry
    #[serde(with = "crate::config::duration_str")]
    pub min_delay: Duration,

    /// Upper bound on any single delay
    #[serde(with = "crate::config::duration_str")]
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            min_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(5),
        }
    }
}

impl RetryConfig {
    fn backoff(&self) -> ExponentialBuilder {
        ExponentialBuilder::default()
            .with_min_delay(self.min_delay)
            .with_max_delay(self.max_delay)
            .with_max_times(self.max_retries)
    }
}

/// Run `op`, retrying only errors for which [`ProviderError::is_transient`]
/// holds. Quota errors are returned on the first occurrence.
pub async fn with_retry<T, F, Fut>(
    config: &RetryConfig,
    provider: &str,
    op: F,
) -> Result<T, ProviderError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ProviderError>>,
{
    op.retry(config.backoff())
        .sleep(tokio::time::sleep)
        .when(ProviderError::is_transient)
        .notify(|err: &ProviderError, delay: Duration| {
            tracing::warn!(
                provider = %provider,
                error = %err,
                delay = ?delay,
                "Transient provider failure, retrying"
            );
        })
        .await
}
