//! Container engine backends for minc
//!
//! A [`Provider`] realizes the container lifecycle of the single managed
//! MicroShift container against one container engine. Both supported
//! engines share the same implementation, [`EngineProvider`], and differ
//! only in their [`EngineAdapter`]:
//!
//! - [`PodmanEngine`] (rootful podman, through `sudo` on Linux)
//! - [`DockerEngine`]
//!
//! Backends are looked up by name through a [`ProviderRegistry`].

pub mod backend;
pub mod engine;
pub mod options;
pub mod registry;
pub mod traits;

pub use backend::EngineProvider;
pub use engine::{DockerEngine, EngineAdapter, PodmanEngine};
pub use registry::{ProviderFactory, ProviderRegistry};
pub use traits::Provider;
