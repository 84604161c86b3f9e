//! Provider registry
//!
//! Maps provider names to async factories. Resolution never fails on an
//! unknown or empty name; it falls back to the default provider instead.
//! Construction probes the engine, so resolving can still fail when the
//! engine is unreachable.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use tracing::{debug, warn};

use minc_core::constants::DEFAULT_PROVIDER;
use minc_core::exec::{CommandRunner, LocalRunner};
use minc_core::{Error, Result};

use crate::backend::EngineProvider;
use crate::engine::{DockerEngine, PodmanEngine};
use crate::traits::Provider;

/// Builds a provider that runs its commands through the given runner
pub type ProviderFactory = Arc<
    dyn Fn(Arc<dyn CommandRunner>) -> BoxFuture<'static, Result<Box<dyn Provider>>>
        + Send
        + Sync,
>;

/// Name to factory mapping, populated once at startup
#[derive(Clone)]
pub struct ProviderRegistry {
    factories: BTreeMap<String, ProviderFactory>,
    default: String,
    runner: Arc<dyn CommandRunner>,
}

impl ProviderRegistry {
    /// Empty registry whose providers run commands through `runner`
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            factories: BTreeMap::new(),
            default: DEFAULT_PROVIDER.to_string(),
            runner,
        }
    }

    /// Registry with podman and docker, running commands locally
    pub fn builtin() -> Self {
        Self::with_builtin(Arc::new(LocalRunner::new()))
    }

    /// Registry with podman and docker, running commands through `runner`
    pub fn with_builtin(runner: Arc<dyn CommandRunner>) -> Self {
        let mut registry = Self::new(runner);
        registry.register("podman", |runner| async move {
            let provider = EngineProvider::connect(PodmanEngine::new(), runner).await?;
            Ok::<Box<dyn Provider>, Error>(Box::new(provider))
        });
        registry.register("docker", |runner| async move {
            let provider = EngineProvider::connect(DockerEngine::new(), runner).await?;
            Ok::<Box<dyn Provider>, Error>(Box::new(provider))
        });
        registry
    }

    /// Register (or replace) a factory under `name`
    pub fn register<F, Fut>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(Arc<dyn CommandRunner>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Box<dyn Provider>>> + Send + 'static,
    {
        let factory: ProviderFactory = Arc::new(move |runner| factory(runner).boxed());
        self.factories.insert(name.into(), factory);
    }

    /// Name used when a lookup does not match any registered provider
    pub fn with_default(mut self, name: impl Into<String>) -> Self {
        self.default = name.into();
        self
    }

    pub fn default_name(&self) -> &str {
        &self.default
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// The name `resolve` will actually construct for `name`
    pub fn effective_name<'a>(&'a self, name: &'a str) -> &'a str {
        if self.contains(name) {
            name
        } else {
            &self.default
        }
    }

    /// Construct the provider registered under `name`
    pub async fn resolve(&self, name: &str) -> Result<Box<dyn Provider>> {
        let effective = self.effective_name(name);
        if effective != name {
            if name.is_empty() {
                debug!("No provider given, using {}", effective);
            } else {
                warn!("Unknown provider '{}', falling back to {}", name, effective);
            }
        }

        let factory = self
            .factories
            .get(effective)
            .ok_or_else(|| Error::UnknownProvider {
                name: name.to_string(),
                available: self.names().join(", "),
            })?;

        factory(Arc::clone(&self.runner)).await
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.names())
            .field("default", &self.default)
            .finish()
    }
}
