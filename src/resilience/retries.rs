//! Retry logic.
//!
//! # Responsibilities
//! - Run each attempt under the timeout guard
//! - Wait `(attempt - 1) * base_delay` before every attempt after the first
//! - Stop immediately on permanent failures
//!
//! # Design Decisions
//! - Permanent failures propagate the original error, untouched
//! - Exhausted retries propagate the last error
//! - Purely local decision; no coordination with other callers

use std::future::Future;
use std::time::Duration;

use crate::config::PlatformProfile;
use crate::error::SyncError;
use crate::observability::metrics;
use crate::resilience::backoff::calculate_backoff;
use crate::resilience::timeouts::with_timeout;

/// Bounded retry with linear backoff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Backoff unit.
    pub base_delay: Duration,
    /// Deadline for each attempt.
    pub timeout: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration, timeout: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
            timeout,
        }
    }

    /// Build a policy from a resolved platform profile.
    pub fn from_profile(max_retries: u32, profile: &PlatformProfile) -> Self {
        Self::new(max_retries, profile.base_delay(), profile.timeout())
    }

    /// Total attempts this policy allows.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Run `op` until it succeeds, fails permanently, or attempts run out.
    pub async fn run<T, E, F, Fut>(&self, operation: &'static str, mut op: F) -> Result<T, SyncError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Into<SyncError>,
    {
        let max_attempts = self.max_attempts();
        let mut attempt = 0;

        loop {
            attempt += 1;

            let delay = calculate_backoff(attempt, self.base_delay);
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            let error = match with_timeout(self.timeout, op()).await {
                Ok(value) => {
                    if attempt > 1 {
                        tracing::info!(operation, attempt, "Store call succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(e) => e,
            };

            let class = error.class();
            if !class.is_retryable() {
                tracing::warn!(operation, attempt, error = %error, "Permanent failure, not retrying");
                return Err(error);
            }

            if attempt >= max_attempts {
                tracing::warn!(
                    operation,
                    attempts = attempt,
                    class = %class,
                    error = %error,
                    "Store call failed after all attempts"
                );
                return Err(error);
            }

            metrics::record_retry(operation, class);
            tracing::info!(
                operation,
                attempt,
                class = %class,
                next_delay = ?calculate_backoff(attempt + 1, self.base_delay),
                error = %error,
                "Attempt failed, retrying"
            );
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_profile(2, &PlatformProfile::default())
    }
}
