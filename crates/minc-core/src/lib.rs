//! Core library for minc
//!
//! Shared building blocks for running a single-node MicroShift cluster
//! inside a container:
//!
//! - [`constants`]: container, image and label names
//! - [`types`]: create requests, provider info and cluster status
//! - [`exec`]: external command execution
//! - [`retry`]: bounded retry with linear backoff
//! - [`settings`]: persisted user preferences
//! - [`error`]: the error taxonomy shared by every crate

pub mod constants;
pub mod error;
pub mod exec;
pub mod retry;
pub mod settings;
pub mod types;
pub mod utils;

pub use error::{Error, Requirement, Result};
pub use types::{ClusterStatus, ComponentState, CreateRequest, ProviderInfo};
