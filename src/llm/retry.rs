//! Shared retry policy for generation requests.
//!
//! One parameterized policy covers both the whole-document and chunked
//! paths: exponential backoff with jitter for transient failures, honoring
//! retry-after hints on rate limits. Oversize-payload and budget-exhausted
//! signals are never retried: the former switches strategy, the latter is
//! terminal.

use crate::defaults;
use crate::error::{PapercastError, Result};
use rand::Rng;
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries after the initial attempt.
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    /// Fractional jitter applied to each backoff delay (0.2 = ±20%).
    pub jitter: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: defaults::MAX_RETRIES,
            base_delay: Duration::from_millis(defaults::RETRY_BASE_DELAY_MS),
            max_delay: Duration::from_millis(defaults::RETRY_MAX_DELAY_MS),
            jitter: defaults::RETRY_JITTER,
        }
    }
}

impl RetryPolicy {
    /// Zero-delay policy for tests.
    #[doc(hidden)]
    pub fn immediate(max_retries: u32) -> Self {
        Self {
            max_retries,
            base_delay: Duration::from_millis(0),
            max_delay: Duration::from_millis(0),
            jitter: 0.0,
        }
    }

    /// Run `op` until it succeeds, fails terminally, or exhausts the retry
    /// ceiling. Exhaustion surfaces as a `Generation` error carrying the
    /// last failure, so callers see a transient-upstream category rather
    /// than the raw signal.
    pub async fn run<T, F, Fut>(&self, label: &str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut delay = self.base_delay;

        for attempt in 0..=self.max_retries {
            let err = match op().await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            match &err {
                PapercastError::BudgetExhausted { .. } | PapercastError::PayloadTooLarge => {
                    return Err(err);
                }
                PapercastError::RateLimited { retry_after } if attempt < self.max_retries => {
                    let wait = (*retry_after).unwrap_or_else(|| self.jittered(delay));
                    warn!(
                        %label,
                        attempt = attempt + 1,
                        wait_ms = wait.as_millis() as u64,
                        "rate limited; backing off"
                    );
                    tokio::time::sleep(wait).await;
                    delay = self.next_delay(delay);
                }
                _ if attempt < self.max_retries => {
                    let wait = self.jittered(delay);
                    warn!(
                        %label,
                        attempt = attempt + 1,
                        wait_ms = wait.as_millis() as u64,
                        error = %err,
                        "request failed; retrying"
                    );
                    tokio::time::sleep(wait).await;
                    delay = self.next_delay(delay);
                }
                _ => {
                    return Err(PapercastError::Generation {
                        message: format!(
                            "{label}: giving up after {} attempts: {err}",
                            self.max_retries + 1
                        ),
                    });
                }
            }
        }

        // The loop always returns from its final iteration.
        Err(PapercastError::Generation {
            message: format!("{label}: retry loop exited unexpectedly"),
        })
    }

    fn next_delay(&self, current: Duration) -> Duration {
        (current * 2).min(self.max_delay)
    }

    /// Apply ±jitter so concurrent chunk requests do not retry in lockstep.
    fn jittered(&self, delay: Duration) -> Duration {
        if self.jitter <= 0.0 || delay.is_zero() {
            return delay;
        }
        let factor = 1.0 + rand::rng().random_range(-self.jitter..=self.jitter);
        delay.mul_f64(factor.max(0.0))
    }
}
