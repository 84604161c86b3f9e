//! Cluster lifecycle orchestration for minc
//!
//! Builds the create, delete, list, status and generate-kubeconfig
//! operations on top of the providers in `minc-providers`:
//!
//! - [`kubeconfig`]: merging cluster credentials into the user's kubeconfig
//! - [`health`]: checking that the cluster's system pods are running
//! - [`lifecycle`]: the operation pipelines
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use minc_cluster::{KubeHealthChecker, KubeconfigStore, Lifecycle};
//! use minc_core::CreateRequest;
//! use minc_providers::ProviderRegistry;
//!
//! let lifecycle = Lifecycle::new(
//!     ProviderRegistry::builtin(),
//!     KubeconfigStore::from_env()?,
//!     Arc::new(KubeHealthChecker::new()),
//! );
//! lifecycle.create(&CreateRequest::new("podman")).await?;
//! println!("{}", serde_json::to_string_pretty(&lifecycle.status("podman").await)?);
//! ```

pub mod health;
pub mod kubeconfig;
pub mod lifecycle;
pub mod progress;

pub use health::{HealthCheck, KubeHealthChecker};
pub use kubeconfig::{KubeConfig, KubeconfigStore};
pub use lifecycle::{Lifecycle, LifecycleError, Step};
pub use progress::{NoProgress, Progress};
