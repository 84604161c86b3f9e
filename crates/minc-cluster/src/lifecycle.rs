//! Cluster lifecycle orchestration
//!
//! Each operation is a linear pipeline over a resolved [`Provider`]. A step
//! failing aborts the pipeline and is reported with the step it happened in;
//! nothing already done is rolled back (run delete to clean up).
//!
//! ```text
//! create:              resolve → pull (unless present) → create/start
//!                      → wait for service (retried) → fetch kubeconfig
//!                      → merge kubeconfig → check health (retried)
//! delete:              resolve → delete container → remove kubeconfig entry
//! list:                resolve → list
//! status:              resolve → list → fetch kubeconfig → check health once
//! generate-kubeconfig: resolve → list → fetch kubeconfig → merge kubeconfig
//! ```

use std::sync::Arc;

use futures::future::BoxFuture;
use thiserror::Error;
use tracing::{info, info_span, Instrument};

use minc_core::retry::{RetryExecutor, RetryPolicy, TracingObserver};
use minc_core::utils::ensure_file_exists;
use minc_core::{ClusterStatus, ComponentState, CreateRequest};
use minc_providers::{Provider, ProviderRegistry};

use crate::health::HealthCheck;
use crate::kubeconfig::KubeconfigStore;
use crate::progress::{NoProgress, Progress};

/// Pipeline step an error happened in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    ValidateRequest,
    ResolveProvider,
    PullImage,
    CreateContainer,
    WaitForService,
    FetchKubeconfig,
    MergeKubeconfig,
    CheckClusterHealth,
    DeleteContainer,
    RemoveKubeconfigEntry,
    ListContainers,
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Step::ValidateRequest => "validate request",
            Step::ResolveProvider => "resolve provider",
            Step::PullImage => "pull image",
            Step::CreateContainer => "create container",
            Step::WaitForService => "wait for service",
            Step::FetchKubeconfig => "fetch kubeconfig",
            Step::MergeKubeconfig => "merge kubeconfig",
            Step::CheckClusterHealth => "check cluster health",
            Step::DeleteContainer => "delete container",
            Step::RemoveKubeconfigEntry => "remove kubeconfig entry",
            Step::ListContainers => "list containers",
        };
        write!(f, "{}", s)
    }
}

/// A lifecycle operation failed at `step`
#[derive(Debug, Error)]
#[error("failed to {step}: {source}")]
pub struct LifecycleError {
    pub step: Step,
    #[source]
    pub source: minc_core::Error,
}

impl LifecycleError {
    pub fn new(step: Step, source: minc_core::Error) -> Self {
        Self { step, source }
    }
}

/// Attach a [`Step`] to a core result
trait AtStep<T> {
    fn at(self, step: Step) -> Result<T, LifecycleError>;
}

impl<T> AtStep<T> for minc_core::Result<T> {
    fn at(self, step: Step) -> Result<T, LifecycleError> {
        self.map_err(|source| LifecycleError::new(step, source))
    }
}

/// Retry a readiness check under `policy`
///
/// A host requirement failure ends the loop at once and is returned as is.
async fn poll<'a, F>(policy: RetryPolicy, operation: &str, mut check: F) -> minc_core::Result<()>
where
    F: FnMut() -> BoxFuture<'a, minc_core::Result<()>>,
{
    RetryExecutor::new(policy)
        .with_observer(TracingObserver::new(operation))
        .execute(|| {
            let attempt = check();
            async move {
                match attempt.await {
                    Err(e) if e.is_precondition() => Ok(Err(e)),
                    other => other.map(Ok),
                }
            }
        })
        .await
        .map_err(|e| minc_core::Error::from_retry(operation, e))?
}

/// Sequences providers, kubeconfig reconciliation and health checks
pub struct Lifecycle {
    registry: ProviderRegistry,
    kubeconfig: KubeconfigStore,
    health: Arc<dyn HealthCheck>,
    progress: Arc<dyn Progress>,
    service_policy: RetryPolicy,
    health_policy: RetryPolicy,
}

impl Lifecycle {
    pub fn new(
        registry: ProviderRegistry,
        kubeconfig: KubeconfigStore,
        health: Arc<dyn HealthCheck>,
    ) -> Self {
        Self {
            registry,
            kubeconfig,
            health,
            progress: Arc::new(NoProgress),
            service_policy: RetryPolicy::service_ready(),
            health_policy: RetryPolicy::cluster_health(),
        }
    }

    /// Report phases to `progress`
    pub fn with_progress(mut self, progress: Arc<dyn Progress>) -> Self {
        self.progress = progress;
        self
    }

    /// Override how long to wait for the service and for cluster health
    pub fn with_retry_policies(mut self, service: RetryPolicy, health: RetryPolicy) -> Self {
        self.service_policy = service;
        self.health_policy = health;
        self
    }

    pub fn kubeconfig(&self) -> &KubeconfigStore {
        &self.kubeconfig
    }

    async fn resolve(&self, name: &str) -> Result<Box<dyn Provider>, LifecycleError> {
        self.registry.resolve(name).await.at(Step::ResolveProvider)
    }

    async fn wait_for_service(&self, provider: &dyn Provider) -> minc_core::Result<()> {
        poll(self.service_policy, "wait for microshift service", || {
            provider.wait_for_microshift_service()
        })
        .await
    }

    async fn wait_for_health(&self, kubeconfig: &[u8]) -> minc_core::Result<()> {
        poll(self.health_policy, "check cluster health", || {
            self.health.check(kubeconfig)
        })
        .await
    }

    /// Create (or start) the cluster and export its credentials
    pub async fn create(&self, req: &CreateRequest) -> Result<(), LifecycleError> {
        let span = info_span!("create", provider = %req.provider, version = %req.microshift_version);
        async {
            let result = self.create_steps(req).await;
            self.progress.finish();
            result
        }
        .instrument(span)
        .await
    }

    async fn create_steps(&self, req: &CreateRequest) -> Result<(), LifecycleError> {
        if let Some(path) = &req.microshift_config {
            ensure_file_exists("microshift config", path).at(Step::ValidateRequest)?;
        }
        if let Some(path) = &req.pull_secret {
            ensure_file_exists("pull secret", path).at(Step::ValidateRequest)?;
        }

        let provider = self.resolve(&req.provider).await?;
        let provider = provider.as_ref();
        let image = req.image();

        if provider.image_exists(&image).await {
            info!("Image {} already present", image);
        } else {
            self.progress.start(&format!("Pulling image {}", image));
            provider.pull_image(&image).await.at(Step::PullImage)?;
        }

        self.progress.start("Creating MicroShift container");
        provider.create(req).await.at(Step::CreateContainer)?;

        self.progress.start("Waiting for MicroShift service");
        self.wait_for_service(provider).await.at(Step::WaitForService)?;

        let bundle = provider.get_kubeconfig().await.at(Step::FetchKubeconfig)?;
        self.kubeconfig.merge(&bundle).at(Step::MergeKubeconfig)?;
        info!("Updated kubeconfig at {}", self.kubeconfig.path().display());

        self.progress.start("Waiting for cluster to be healthy");
        self.wait_for_health(&bundle).await.at(Step::CheckClusterHealth)?;

        info!("MicroShift cluster is ready");
        Ok(())
    }

    /// Remove the container and its kubeconfig entries
    pub async fn delete(&self, provider: &str) -> Result<(), LifecycleError> {
        let span = info_span!("delete", provider = %provider);
        async {
            let provider = self.resolve(provider).await?;

            self.progress.start("Deleting MicroShift container");
            let result = provider.delete().await.at(Step::DeleteContainer);
            self.progress.finish();
            result?;

            self.kubeconfig
                .remove_cluster()
                .at(Step::RemoveKubeconfigEntry)?;
            info!("MicroShift cluster deleted");
            Ok(())
        }
        .instrument(span)
        .await
    }

    /// Raw engine listing of the running container
    pub async fn list(&self, provider: &str) -> Result<Vec<u8>, LifecycleError> {
        let provider = self.resolve(provider).await?;
        provider.list().await.at(Step::ListContainers)
    }

    /// Aggregate container and API server state
    ///
    /// Never fails: the first failing stage is recorded in
    /// [`ClusterStatus::error`] and later stages are skipped.
    pub async fn status(&self, provider: &str) -> ClusterStatus {
        let mut status = ClusterStatus::default();

        let provider = match self.resolve(provider).await {
            Ok(provider) => provider,
            Err(e) => return status.with_error(e),
        };

        if let Err(e) = provider.list().await.at(Step::ListContainers) {
            return status.with_error(e);
        }
        status.container = ComponentState::Running;

        let bundle = match provider.get_kubeconfig().await.at(Step::FetchKubeconfig) {
            Ok(bundle) => bundle,
            Err(e) => return status.with_error(e),
        };

        if let Err(e) = self.health.check(&bundle).await.at(Step::CheckClusterHealth) {
            return status.with_error(e);
        }
        status.apiserver = ComponentState::Running;

        status
    }

    /// Merge the running cluster's credentials into the user's kubeconfig
    pub async fn generate_kubeconfig(&self, provider: &str) -> Result<(), LifecycleError> {
        let provider = self.resolve(provider).await?;
        provider.list().await.at(Step::ListContainers)?;

        let bundle = provider.get_kubeconfig().await.at(Step::FetchKubeconfig)?;
        self.kubeconfig.merge(&bundle).at(Step::MergeKubeconfig)?;
        info!("Updated kubeconfig at {}", self.kubeconfig.path().display());
        Ok(())
    }
}
