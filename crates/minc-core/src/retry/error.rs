//! Outcome of a retry loop that never succeeded

use std::error::Error;
use std::fmt;
use std::time::Duration;

/// Terminal failure of a retried operation
#[derive(Debug)]
pub enum RetryError<E> {
    /// Every attempt failed; `source` is the error of the final attempt
    Exhausted {
        attempts: u32,
        source: E,
        total_duration: Duration,
    },

    /// The policy allowed zero attempts, so the operation never ran
    NotAttempted,
}

impl<E: fmt::Display> fmt::Display for RetryError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetryError::Exhausted {
                attempts,
                source,
                total_duration,
            } => write!(
                f,
                "gave up after {} attempts ({:.0}s): {}",
                attempts,
                total_duration.as_secs_f64(),
                source
            ),
            RetryError::NotAttempted => write!(f, "operation was not attempted"),
        }
    }
}

impl<E: Error + 'static> Error for RetryError<E> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            RetryError::Exhausted { source, .. } => Some(source),
            RetryError::NotAttempted => None,
        }
    }
}

impl<E> RetryError<E> {
    pub fn exhausted(attempts: u32, source: E, total_duration: Duration) -> Self {
        RetryError::Exhausted {
            attempts,
            source,
            total_duration,
        }
    }

    /// Number of attempts made
    pub fn attempts(&self) -> u32 {
        match self {
            RetryError::Exhausted { attempts, .. } => *attempts,
            RetryError::NotAttempted => 0,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, RetryError::Exhausted { .. })
    }

    /// The last underlying error, if any attempt ran
    pub fn into_source(self) -> Option<E> {
        match self {
            RetryError::Exhausted { source, .. } => Some(source),
            RetryError::NotAttempted => None,
        }
    }
}
