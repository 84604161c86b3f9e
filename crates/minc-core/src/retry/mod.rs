//! Bounded retry with linear backoff
//!
//! Used to wait for asynchronous readiness: the in-container service
//! becoming active and the cluster's system pods reaching `Running`.
//!
//! # Example
//!
//! ```rust,no_run
//! use minc_core::retry::retry;
//! use std::time::Duration;
//!
//! async fn example() {
//!     let result = retry(
//!         || async { Ok::<_, std::io::Error>("ready") },
//!         5,
//!         Duration::from_secs(2),
//!     )
//!     .await;
//! }
//! ```

mod error;
mod executor;
mod observer;

pub use error::RetryError;
pub use executor::{retry, RetryExecutor, RetryPolicy};
pub use observer::{RetryObserver, TracingObserver};

#[cfg(test)]
pub(crate) use observer::StatsObserver;
