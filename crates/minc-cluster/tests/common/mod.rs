//! Common test helpers for minc-cluster integration tests
//!
//! - [`FakeProvider`]: in-memory provider recording the operations it served
//! - [`MockHealth`]: mockall double for the health check seam
//! - kubeconfig fixtures

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use minc_cluster::HealthCheck;
use minc_core::constants::CONTAINER_NAME;
use minc_core::exec::{Cmd, LocalRunner, RunError};
use minc_core::{CreateRequest, Error, ProviderInfo, Requirement, Result};
use minc_providers::{Provider, ProviderRegistry};

// ─── Health Mock ─────────────────────────────────────────────────────────────

mockall::mock! {
    pub Health {}

    #[async_trait]
    impl HealthCheck for Health {
        async fn check(&self, kubeconfig: &[u8]) -> Result<()>;
    }
}

pub fn unhealthy() -> Error {
    Error::Unhealthy {
        failures: vec!["pod router-1 in namespace openshift-ingress is not running. Current status: Pending".into()],
    }
}

// ─── Fake Provider ───────────────────────────────────────────────────────────

/// What the fake engine knows about the managed container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Container {
    Missing,
    Stopped,
    Running,
}

struct State {
    calls: Vec<String>,
    container: Container,
    image_present: bool,
    service_failures_left: u32,
    unmet: Option<Requirement>,
    failing: HashSet<&'static str>,
    kubeconfig: Vec<u8>,
}

/// In-memory [`Provider`]; clones share state
#[derive(Clone)]
pub struct FakeProvider {
    state: Arc<Mutex<State>>,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                calls: Vec::new(),
                container: Container::Missing,
                image_present: false,
                service_failures_left: 0,
                unmet: None,
                failing: HashSet::new(),
                kubeconfig: bundle("microshift", "admin", "microshift"),
            })),
        }
    }

    pub fn with_container(self, container: Container) -> Self {
        self.state.lock().unwrap().container = container;
        self
    }

    pub fn with_image_present(self) -> Self {
        self.state.lock().unwrap().image_present = true;
        self
    }

    /// The service reports inactive this many times before becoming active
    pub fn with_service_failures(self, count: u32) -> Self {
        self.state.lock().unwrap().service_failures_left = count;
        self
    }

    /// The service check reports that the host lacks `requirement`
    pub fn with_unmet_requirement(self, requirement: Requirement) -> Self {
        self.state.lock().unwrap().unmet = Some(requirement);
        self
    }

    /// Make `operation` fail with a command error
    pub fn failing(self, operation: &'static str) -> Self {
        self.state.lock().unwrap().failing.insert(operation);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn count(&self, operation: &str) -> usize {
        self.calls().iter().filter(|c| *c == operation).count()
    }

    fn enter(&self, operation: &'static str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(operation.to_string());
        if state.failing.contains(operation) {
            let cmd = Cmd::new("fake").arg(operation);
            return Err(RunError::exit(&cmd, Some(125), format!("{operation} exploded")).into());
        }
        Ok(())
    }
}

#[async_trait]
impl Provider for FakeProvider {
    fn name(&self) -> &str {
        "fake"
    }

    async fn info(&self) -> Result<ProviderInfo> {
        self.enter("info")?;
        Ok(ProviderInfo {
            rootless: false,
            cgroup_v2: true,
        })
    }

    async fn image_exists(&self, _image: &str) -> bool {
        self.enter("image_exists").is_ok() && self.state.lock().unwrap().image_present
    }

    async fn pull_image(&self, _image: &str) -> Result<()> {
        self.enter("pull_image")?;
        self.state.lock().unwrap().image_present = true;
        Ok(())
    }

    async fn create(&self, _req: &CreateRequest) -> Result<()> {
        self.enter("create")?;
        self.state.lock().unwrap().container = Container::Running;
        Ok(())
    }

    async fn wait_for_microshift_service(&self) -> Result<()> {
        self.enter("wait_for_microshift_service")?;
        let mut state = self.state.lock().unwrap();
        if let Some(requirement) = state.unmet {
            return Err(Error::precondition("fake", requirement));
        }
        if state.service_failures_left > 0 {
            state.service_failures_left -= 1;
            return Err(Error::ServiceInactive {
                service: "microshift".into(),
                state: "activating".into(),
            });
        }
        Ok(())
    }

    async fn get_kubeconfig(&self) -> Result<Vec<u8>> {
        self.enter("get_kubeconfig")?;
        Ok(self.state.lock().unwrap().kubeconfig.clone())
    }

    async fn delete(&self) -> Result<()> {
        self.enter("delete")?;
        self.state.lock().unwrap().container = Container::Missing;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<u8>> {
        self.enter("list")?;
        match self.state.lock().unwrap().container {
            Container::Missing => Err(Error::ContainerNotFound {
                name: CONTAINER_NAME.into(),
            }),
            Container::Stopped => Err(Error::ContainerNotRunning {
                name: CONTAINER_NAME.into(),
            }),
            Container::Running => Ok(b"microshift running 127.0.0.1:6443->6443/tcp\n".to_vec()),
        }
    }
}

/// Registry serving `fake` as its default, plus a `broken` provider whose
/// engine cannot be reached
pub fn registry(fake: &FakeProvider) -> ProviderRegistry {
    let mut registry = ProviderRegistry::new(Arc::new(LocalRunner::new())).with_default("fake");

    let fake = fake.clone();
    registry.register("fake", move |_runner| {
        let provider = fake.clone();
        async move { Ok::<Box<dyn Provider>, Error>(Box::new(provider)) }
    });
    registry.register("broken", |_runner| async {
        let cmd = Cmd::new("podman").args(["info", "--format", "json"]);
        Err::<Box<dyn Provider>, Error>(
            RunError::exit(&cmd, Some(125), "Cannot connect to Podman").into(),
        )
    });

    registry
}

// ─── Kubeconfig Fixtures ─────────────────────────────────────────────────────

/// A single-cluster kubeconfig
pub fn bundle(cluster: &str, user: &str, context: &str) -> Vec<u8> {
    format!(
        r#"apiVersion: v1
kind: Config
clusters:
- cluster:
    server: https://{cluster}.example:6443
  name: {cluster}
contexts:
- context:
    cluster: {cluster}
    user: {user}
  name: {context}
current-context: {context}
users:
- name: {user}
  user:
    token: {user}-token
"#
    )
    .into_bytes()
}

/// Same as [`bundle`] with a different server, to tell definitions apart
pub fn bundle_with_server(cluster: &str, server: &str) -> Vec<u8> {
    format!(
        r#"apiVersion: v1
kind: Config
clusters:
- cluster:
    server: {server}
  name: {cluster}
contexts: []
users: []
"#
    )
    .into_bytes()
}
