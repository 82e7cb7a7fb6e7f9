//! Bounded exponential-backoff retry
//!
//! The single place where flakiness of the remote capability is absorbed.
//! Each pipeline call is wrapped exactly once; nesting policies would
//! multiply the backoff.

use crate::error::InsightError;
use insight_capability::CapabilityError;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// Classifies errors as worth retrying
pub trait Transient {
    /// True if the same call may succeed when repeated
    fn is_transient(&self) -> bool;
}

impl Transient for CapabilityError {
    fn is_transient(&self) -> bool {
        CapabilityError::is_transient(self)
    }
}

impl Transient for InsightError {
    fn is_transient(&self) -> bool {
        self.is_retryable()
    }
}

/// Retry policy
///
/// Attempt `i` (0-based) that fails transiently is followed by a wait of
/// `initial_delay * 2^i`, as long as attempts remain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    /// Delay after the first failed attempt, in milliseconds
    pub initial_delay_ms: u64,
}

impl RetryPolicy {
    /// Create new policy
    #[inline]
    #[must_use]
    pub fn new(max_attempts: u32, initial_delay: Duration) -> Self {
        Self {
            max_attempts,
            initial_delay_ms: u64::try_from(initial_delay.as_millis()).unwrap_or(u64::MAX),
        }
    }

    /// Single attempt, no retries
    #[inline]
    #[must_use]
    pub fn no_retry() -> Self {
        Self::new(1, Duration::ZERO)
    }

    /// Attempts actually made (at least one)
    #[inline]
    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Wait after failed attempt `attempt_index` (0-based)
    #[must_use]
    pub fn delay_for(&self, attempt_index: u32) -> Duration {
        let factor = 2u32.checked_pow(attempt_index).unwrap_or(u32::MAX);
        Duration::from_millis(self.initial_delay_ms).saturating_mul(factor)
    }

    /// Run `operation` under this policy
    ///
    /// Non-transient errors are returned after the attempt that raised them;
    /// transient errors are returned once attempts are exhausted.
    pub async fn run<T, E, F, Fut>(&self, label: &str, mut operation: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Transient + Display,
    {
        let attempts = self.attempts();
        let mut attempt = 0;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    attempt += 1;
                    if !err.is_transient() {
                        tracing::debug!(operation = label, attempt, error = %err, "Fatal failure, not retrying");
                        return Err(err);
                    }
                    if attempt >= attempts {
                        tracing::warn!(operation = label, attempts, error = %err, "Retry budget exhausted");
                        return Err(err);
                    }
                    let delay = self.delay_for(attempt - 1);
                    tracing::warn!(
                        operation = label,
                        attempt,
                        max_attempts = attempts,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %err,
                        "Transient failure, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay_ms: 1000,
        }
    }
}
