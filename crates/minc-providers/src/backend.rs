//! Engine-backed provider shared by every container engine

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use minc_core::constants::{CONTAINER_NAME, MICROSHIFT_SERVICE, RUNNING_MARKER};
use minc_core::exec::{CmdOutput, CommandRunner};
use minc_core::{CreateRequest, Error, ProviderInfo, Requirement, Result};

use crate::engine::EngineAdapter;
use crate::options;
use crate::traits::Provider;

/// [`Provider`] driving a container engine CLI through a [`CommandRunner`]
pub struct EngineProvider<E> {
    engine: E,
    runner: Arc<dyn CommandRunner>,
}

impl<E: EngineAdapter> EngineProvider<E> {
    /// Create a provider without probing the engine
    pub fn new(engine: E, runner: Arc<dyn CommandRunner>) -> Self {
        Self { engine, runner }
    }

    /// Create a provider, failing if the engine cannot report its info
    pub async fn connect(engine: E, runner: Arc<dyn CommandRunner>) -> Result<Self> {
        let provider = Self::new(engine, runner);
        let info = provider.info().await?;
        debug!(
            provider = provider.engine.name(),
            rootless = info.rootless,
            cgroup_v2 = info.cgroup_v2,
            "Probed container engine"
        );
        Ok(provider)
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    async fn run(&self, args: Vec<String>) -> Result<CmdOutput> {
        let cmd = self.engine.command(args);
        let output = self.runner.run(&cmd).await?;
        if !output.stdout.is_empty() {
            debug!("{}", String::from_utf8_lossy(&output.stdout).trim_end());
        }
        Ok(output)
    }

    /// Fetch fresh engine info and reject hosts minc cannot run on
    async fn ensure_supported(&self) -> Result<()> {
        let info = self.info().await?;
        check_requirements(self.engine.name(), &info)
    }

    async fn listing(&self) -> Result<Vec<u8>> {
        Ok(self.run(options::list_args()).await?.stdout)
    }
}

/// Cgroup v2 and rootful mode are both required
pub fn check_requirements(provider: &str, info: &ProviderInfo) -> Result<()> {
    if !info.cgroup_v2 {
        return Err(Error::precondition(provider, Requirement::CgroupV2));
    }
    if info.rootless {
        return Err(Error::precondition(provider, Requirement::Rootful));
    }
    Ok(())
}

/// Classify raw listing output
pub fn classify_listing(raw: Vec<u8>) -> Result<Vec<u8>> {
    let text = String::from_utf8_lossy(&raw);
    if text.trim().is_empty() {
        return Err(Error::ContainerNotFound {
            name: CONTAINER_NAME.to_string(),
        });
    }

    let running = text
        .split_whitespace()
        .any(|word| word.eq_ignore_ascii_case(RUNNING_MARKER));
    if !running {
        return Err(Error::ContainerNotRunning {
            name: CONTAINER_NAME.to_string(),
        });
    }

    Ok(raw)
}

#[async_trait]
impl<E: EngineAdapter> Provider for EngineProvider<E> {
    fn name(&self) -> &str {
        self.engine.name()
    }

    async fn info(&self) -> Result<ProviderInfo> {
        let output = self.run(options::info_args()).await?;
        self.engine.parse_info(&output.stdout)
    }

    async fn image_exists(&self, image: &str) -> bool {
        if self.ensure_supported().await.is_err() {
            return false;
        }
        let cmd = self.engine.command(self.engine.image_exists_args(image));
        self.runner.run(&cmd).await.is_ok()
    }

    async fn pull_image(&self, image: &str) -> Result<()> {
        self.ensure_supported().await?;
        info!("Pulling image {}", image);
        self.run(options::pull_args(image)).await?;
        Ok(())
    }

    async fn create(&self, req: &CreateRequest) -> Result<()> {
        self.ensure_supported().await?;

        let existing = self.listing().await?;
        if String::from_utf8_lossy(&existing).trim().is_empty() {
            info!("Creating container {}", CONTAINER_NAME);
            self.run(options::create_args(CONTAINER_NAME, req)).await?;
        } else {
            info!("Container {} already exists, starting it", CONTAINER_NAME);
        }

        self.run(options::start_args(CONTAINER_NAME)).await?;
        Ok(())
    }

    async fn wait_for_microshift_service(&self) -> Result<()> {
        self.ensure_supported().await?;

        let args = options::service_status_args(CONTAINER_NAME, MICROSHIFT_SERVICE);
        let state = match self.run(args).await {
            Ok(output) => String::from_utf8_lossy(&output.stdout).trim().to_string(),
            // systemctl exits non-zero for every state but active
            Err(Error::Command(err)) if err.is_exit() => {
                err.output_lossy()
            }
            Err(err) => return Err(err),
        };

        if state == "active" {
            Ok(())
        } else {
            Err(Error::ServiceInactive {
                service: MICROSHIFT_SERVICE.to_string(),
                state,
            })
        }
    }

    async fn get_kubeconfig(&self) -> Result<Vec<u8>> {
        self.ensure_supported().await?;
        Ok(self.run(options::kubeconfig_args(CONTAINER_NAME)).await?.stdout)
    }

    async fn delete(&self) -> Result<()> {
        self.ensure_supported().await?;
        info!("Removing container {}", CONTAINER_NAME);
        self.run(options::delete_args(CONTAINER_NAME)).await?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<u8>> {
        self.ensure_supported().await?;
        classify_listing(self.listing().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_requirements() {
        let ok = ProviderInfo {
            rootless: false,
            cgroup_v2: true,
        };
        assert!(check_requirements("podman", &ok).is_ok());

        let v1 = ProviderInfo {
            rootless: false,
            cgroup_v2: false,
        };
        assert_eq!(
            check_requirements("podman", &v1).unwrap_err().to_string(),
            "podman provider requires cgroup v2"
        );

        let rootless = ProviderInfo {
            rootless: true,
            cgroup_v2: true,
        };
        assert_eq!(
            check_requirements("docker", &rootless).unwrap_err().to_string(),
            "docker provider requires rootful mode"
        );
    }

    #[test]
    fn test_classify_listing() {
        assert!(matches!(
            classify_listing(Vec::new()),
            Err(Error::ContainerNotFound { .. })
        ));
        assert!(matches!(
            classify_listing(b"\n".to_vec()),
            Err(Error::ContainerNotFound { .. })
        ));
        assert!(matches!(
            classify_listing(b"microshift exited\n".to_vec()),
            Err(Error::ContainerNotRunning { .. })
        ));

        let raw = b"microshift running 127.0.0.1:6443->6443/tcp\n".to_vec();
        assert_eq!(classify_listing(raw.clone()).unwrap(), raw);
    }
}
