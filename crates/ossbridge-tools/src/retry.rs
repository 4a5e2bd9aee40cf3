//! Bounded retry for storage writes.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// Upper bound on a single backoff pause, in seconds
pub const MAX_BACKOFF_SECS: f64 = 8.0;

/// Pause after failed attempt `attempt` (1-based): 1s, 2s, 4s, 8s, 8s, ...
#[inline]
pub fn backoff_delay(attempt: u32) -> Duration {
    let exponent = attempt.saturating_sub(1).min(16) as i32;
    Duration::from_secs_f64(2f64.powi(exponent).min(MAX_BACKOFF_SECS))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
        }
    }

    /// Run `operation` until it succeeds or the attempts run out.
    ///
    /// The error of the last attempt is returned. Dropping the returned future
    /// cancels any pending pause.
    pub async fn run<T, E, F, Fut>(&self, operation: &str, attempt_fn: F) -> Result<T, E>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        self.run_if(operation, |_| true, attempt_fn).await
    }

    /// Like [`run`](Self::run), but errors for which `retryable` is false
    /// are returned at once.
    pub async fn run_if<T, E, R, F, Fut>(
        &self,
        operation: &str,
        retryable: R,
        mut attempt_fn: F,
    ) -> Result<T, E>
    where
        R: Fn(&E) -> bool,
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let mut attempt = 1;
        loop {
            match attempt_fn(attempt).await {
                Ok(value) => {
                    if attempt > 1 {
                        tracing::info!(operation, attempt, "Succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(e) if attempt < self.max_attempts && retryable(&e) => {
                    let delay = backoff_delay(attempt);
                    tracing::warn!(
                        operation,
                        attempt,
                        max_attempts = self.max_attempts,
                        delay_secs = delay.as_secs_f64(),
                        error = %e,
                        "Attempt failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    tracing::error!(
                        operation,
                        attempt,
                        error = %e,
                        "All attempts failed"
                    );
                    return Err(e);
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(ossbridge_core::models::DEFAULT_MAX_RETRIES)
    }
}
