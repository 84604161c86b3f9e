//! Provider trait definitions

use async_trait::async_trait;
use minc_core::{CreateRequest, ProviderInfo, Result};

/// Lifecycle operations on the managed container
///
/// Every operation except [`name`](Provider::name) and
/// [`info`](Provider::info) re-checks the engine's [`ProviderInfo`] first and
/// fails with a precondition error, without issuing any further engine
/// command, unless the host runs cgroup v2 and the engine is rootful.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Get the provider name
    fn name(&self) -> &str;

    /// Query the engine for cgroup version and privilege mode
    async fn info(&self) -> Result<ProviderInfo>;

    /// Whether `image` is present locally; any failure counts as absent
    async fn image_exists(&self, image: &str) -> bool;

    /// Pull `image`
    async fn pull_image(&self, image: &str) -> Result<()>;

    /// Create and start the container, or start it if it already exists
    async fn create(&self, req: &CreateRequest) -> Result<()>;

    /// Check once whether the in-container service reports `active`
    ///
    /// Callers wait for readiness by wrapping this in a retry loop.
    async fn wait_for_microshift_service(&self) -> Result<()>;

    /// Read the admin kubeconfig from inside the container
    async fn get_kubeconfig(&self) -> Result<Vec<u8>>;

    /// Force-remove the container
    async fn delete(&self) -> Result<()>;

    /// Raw engine listing of the managed container
    ///
    /// Fails with a not-found error when no container exists and with a
    /// not-running error when it exists but is stopped.
    async fn list(&self) -> Result<Vec<u8>>;
}
