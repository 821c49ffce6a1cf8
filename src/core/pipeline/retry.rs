//! Retry with exponential backoff
//!
//! Only errors that report [`OrderflowError::is_retryable`] are retried;
//! anything else is returned on the first failure.

use crate::config::RetryConfig;
use crate::domain::{OrderflowError, Result};
use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

/// Backoff settings for one retried operation
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the first attempt (0 = single attempt)
    pub max_retries: usize,

    /// Delay before the first retry
    pub initial_delay: Duration,

    /// Upper bound for any delay
    pub max_delay: Duration,

    /// Growth factor between consecutive delays
    pub backoff_multiplier: f64,

    /// Randomize each delay between half and all of its nominal value
    pub jitter: bool,
}

impl RetryPolicy {
    /// A policy that makes exactly one attempt
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            initial_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            backoff_multiplier: 1.0,
            jitter: false,
        }
    }

    /// Nominal delay before retry number `retry` (0-based)
    pub fn delay_for(&self, retry: usize) -> Duration {
        let factor = self.backoff_multiplier.powi(retry.min(i32::MAX as usize) as i32);
        let nominal_ms = self.initial_delay.as_millis() as f64 * factor;
        let capped_ms = nominal_ms.min(self.max_delay.as_millis() as f64);
        Duration::from_millis(capped_ms as u64)
    }

    fn jittered(&self, delay: Duration) -> Duration {
        let ms = delay.as_millis() as u64;
        if !self.jitter || ms < 2 {
            return delay;
        }
        Duration::from_millis(rand::thread_rng().gen_range(ms / 2..=ms))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            initial_delay: Duration::from_millis(config.initial_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
            backoff_multiplier: config.backoff_multiplier,
            jitter: config.jitter,
        }
    }
}

/// Run `operation` until it succeeds, fails permanently, or runs out of retries
///
/// `label` names the operation in log events.
///
/// # Errors
///
/// Returns the last error seen.
pub async fn retry_with_backoff<F, Fut, T>(
    policy: &RetryPolicy,
    label: &str,
    mut operation: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut retries = 0;

    loop {
        match operation().await {
            Ok(value) => {
                if retries > 0 {
                    tracing::info!(operation = label, retries, "Operation succeeded after retry");
                }
                return Ok(value);
            }
            Err(error) if should_retry(&error, retries, policy) => {
                let delay = policy.jittered(policy.delay_for(retries));
                retries += 1;
                crate::log_retry_attempt!(label, retries, policy.max_retries, delay, error);
                sleep(delay).await;
            }
            Err(error) => {
                if retries > 0 {
                    tracing::warn!(
                        operation = label,
                        retries,
                        error = %error,
                        "Operation failed after retries"
                    );
                }
                return Err(error);
            }
        }
    }
}

fn should_retry(error: &OrderflowError, retries: usize, policy: &RetryPolicy) -> bool {
    error.is_retryable() && retries < policy.max_retries
}
