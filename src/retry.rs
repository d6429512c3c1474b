//! Bounded retry with exponential backoff for provider calls.
//!
//! `backoff` drives the delays; the attempt budget is enforced here by
//! turning the last transient failure into a permanent one. Permanent
//! failures are never retried.

use std::future::Future;
use std::time::Duration;

use backoff::{ExponentialBackoff, ExponentialBackoffBuilder};
use tracing::debug;

use crate::provider::ProviderError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    initial_delay: Duration,
}

impl RetryPolicy {
    /// `max_attempts` counts the first call; zero is treated as one.
    pub fn new(max_attempts: u32, initial_delay: Duration) -> Self {
        Self { max_attempts: max_attempts.max(1), initial_delay }
    }

    /// A single attempt, no retries.
    pub fn once() -> Self {
        Self::new(1, Duration::ZERO)
    }

    fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoffBuilder::new()
            .with_initial_interval(self.initial_delay)
            .with_max_elapsed_time(None)
            .build()
    }
}

/// Run `op` until it succeeds, fails permanently, or the attempt budget of
/// `policy` is spent. The last error is returned on exhaustion.
pub async fn with_backoff<T, F, Fut>(policy: RetryPolicy, mut op: F) -> Result<T, ProviderError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ProviderError>>,
{
    let max_attempts = policy.max_attempts;
    let mut attempt = 0u32;

    backoff::future::retry(policy.backoff(), || {
        attempt += 1;
        let current = attempt;
        let call = op();
        async move {
            match call.await {
                Ok(value) => Ok(value),
                Err(e) if e.is_transient() && current < max_attempts => {
                    debug!(attempt = current, max_attempts, error = %e, "transient provider failure, backing off");
                    Err(backoff::Error::transient(e))
                }
                Err(e) => Err(backoff::Error::permanent(e)),
            }
        }
    })
    .await
}
