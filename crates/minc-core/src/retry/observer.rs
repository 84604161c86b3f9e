//! Hooks into a running retry loop

use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;

/// Callbacks fired by [`RetryExecutor`](super::RetryExecutor)
pub trait RetryObserver: Send + Sync {
    fn on_attempt_start(&self, attempt: u32, max_attempts: u32);

    /// Attempt `attempt` failed; the loop sleeps `delay` next
    fn on_attempt_failed(&self, attempt: u32, error: &dyn Display, delay: Duration);

    fn on_success(&self, attempt: u32, elapsed: Duration);

    /// The final attempt failed too
    fn on_exhausted(&self, attempts: u32, error: &dyn Display);
}

/// Logs readiness polling: failed polls at WARN, giving up at ERROR
#[derive(Debug, Clone)]
pub struct TracingObserver {
    operation: String,
}

impl TracingObserver {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
        }
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }
}

impl Default for TracingObserver {
    fn default() -> Self {
        Self::new("retry")
    }
}

impl RetryObserver for TracingObserver {
    fn on_attempt_start(&self, attempt: u32, max_attempts: u32) {
        tracing::debug!("{}: attempt {}/{}", self.operation, attempt, max_attempts);
    }

    fn on_attempt_failed(&self, attempt: u32, error: &dyn Display, delay: Duration) {
        tracing::warn!(
            attempt,
            "{} not ready yet ({}), checking again in {}s",
            self.operation,
            error,
            delay.as_secs()
        );
    }

    fn on_success(&self, attempt: u32, elapsed: Duration) {
        tracing::debug!(
            attempt,
            elapsed_ms = elapsed.as_millis() as u64,
            "{} succeeded",
            self.operation
        );
    }

    fn on_exhausted(&self, attempts: u32, error: &dyn Display) {
        tracing::error!(attempts, "giving up on {}: {}", self.operation, error);
    }
}

impl<T: RetryObserver + ?Sized> RetryObserver for Arc<T> {
    fn on_attempt_start(&self, attempt: u32, max_attempts: u32) {
        (**self).on_attempt_start(attempt, max_attempts)
    }

    fn on_attempt_failed(&self, attempt: u32, error: &dyn Display, delay: Duration) {
        (**self).on_attempt_failed(attempt, error, delay)
    }

    fn on_success(&self, attempt: u32, elapsed: Duration) {
        (**self).on_success(attempt, elapsed)
    }

    fn on_exhausted(&self, attempts: u32, error: &dyn Display) {
        (**self).on_exhausted(attempts, error)
    }
}

/// Records what the loop did
#[cfg(test)]
#[derive(Debug, Default)]
pub struct StatsObserver {
    starts: std::sync::atomic::AtomicU32,
    successes: std::sync::atomic::AtomicU32,
    exhaustions: std::sync::atomic::AtomicU32,
    delays: std::sync::Mutex<Vec<Duration>>,
}

#[cfg(test)]
impl StatsObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attempt_starts(&self) -> u32 {
        self.starts.load(std::sync::atomic::Ordering::SeqCst)
    }

    pub fn successes(&self) -> u32 {
        self.successes.load(std::sync::atomic::Ordering::SeqCst)
    }

    pub fn exhaustions(&self) -> u32 {
        self.exhaustions.load(std::sync::atomic::Ordering::SeqCst)
    }

    pub fn delays(&self) -> Vec<Duration> {
        self.delays.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl RetryObserver for StatsObserver {
    fn on_attempt_start(&self, _attempt: u32, _max_attempts: u32) {
        self.starts.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
    }

    fn on_attempt_failed(&self, _attempt: u32, _error: &dyn Display, delay: Duration) {
        self.delays.lock().unwrap().push(delay);
    }

    fn on_success(&self, _attempt: u32, _elapsed: Duration) {
        self.successes.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
    }

    fn on_exhausted(&self, _attempts: u32, _error: &dyn Display) {
        self.exhaustions.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
    }
}
