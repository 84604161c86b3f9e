//! Retry execution

use std::fmt::Display;
use std::future::Future;
use std::time::{Duration, Instant};

use super::error::RetryError;
use super::observer::{RetryObserver, TracingObserver};

/// Bounded retry with linear backoff
///
/// After failed attempt `n` (when attempts remain) the executor sleeps
/// `initial_delay * n`. There is no jitter and no error classification:
/// every error is retried until attempts run out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
}

impl RetryPolicy {
    pub const fn new(max_attempts: u32, initial_delay: Duration) -> Self {
        Self {
            max_attempts,
            initial_delay,
        }
    }

    /// Waiting for the in-container service to become active
    pub const fn service_ready() -> Self {
        Self::new(15, Duration::from_secs(2))
    }

    /// Waiting for system pods to be running
    pub const fn cluster_health() -> Self {
        Self::new(5, Duration::from_secs(2))
    }

    /// Delay after failed attempt `attempt` (1-indexed)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.initial_delay.saturating_mul(attempt)
    }
}

/// Retry `op` up to `max_attempts` times, logging through `tracing`
pub async fn retry<F, Fut, T, E>(
    op: F,
    max_attempts: u32,
    initial_delay: Duration,
) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    RetryExecutor::new(RetryPolicy::new(max_attempts, initial_delay))
        .execute(op)
        .await
}

/// Retry executor with a policy and an observer
pub struct RetryExecutor<O = TracingObserver> {
    policy: RetryPolicy,
    observer: O,
}

impl RetryExecutor<TracingObserver> {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            observer: TracingObserver::default(),
        }
    }
}

impl<O> RetryExecutor<O> {
    /// Replace the observer
    pub fn with_observer<O2>(self, observer: O2) -> RetryExecutor<O2> {
        RetryExecutor {
            policy: self.policy,
            observer,
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }
}

impl<O: RetryObserver> RetryExecutor<O> {
    /// Run `op` until it succeeds or the policy's attempts are used up
    pub async fn execute<F, Fut, T, E>(&self, mut op: F) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let start = Instant::now();
        let max_attempts = self.policy.max_attempts;

        for attempt in 1..=max_attempts {
            self.observer.on_attempt_start(attempt, max_attempts);

            match op().await {
                Ok(value) => {
                    self.observer.on_success(attempt, start.elapsed());
                    return Ok(value);
                }
                Err(err) if attempt >= max_attempts => {
                    self.observer.on_exhausted(attempt, &err);
                    return Err(RetryError::exhausted(attempt, err, start.elapsed()));
                }
                Err(err) => {
                    let delay = self.policy.delay_for(attempt);
                    self.observer.on_attempt_failed(attempt, &err, delay);
                    tokio::time::sleep(delay).await;
                }
            }
        }

        Err(RetryError::NotAttempted)
    }
}
