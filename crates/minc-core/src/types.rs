//! Data model shared by providers, the orchestrator and the CLI

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::constants::{
    DEFAULT_HTTPS_PORT, DEFAULT_HTTP_PORT, DEFAULT_MICROSHIFT_VERSION, DEFAULT_PROVIDER,
};

/// Input to a create operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CreateRequest {
    /// Backend name (e.g. "podman", "docker")
    pub provider: String,

    /// MicroShift version, used as the image tag prefix
    pub microshift_version: String,

    /// Custom MicroShift config file mounted into the container
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub microshift_config: Option<PathBuf>,

    /// Pull secret mounted into the container
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pull_secret: Option<PathBuf>,

    /// Host port for HTTP routes
    pub http_port: u16,

    /// Host port for HTTPS routes
    pub https_port: u16,
}

impl CreateRequest {
    /// Create a request for the given provider with default version and ports
    pub fn new(provider: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            microshift_version: DEFAULT_MICROSHIFT_VERSION.to_string(),
            microshift_config: None,
            pull_secret: None,
            http_port: DEFAULT_HTTP_PORT,
            https_port: DEFAULT_HTTPS_PORT,
        }
    }

    /// Set the MicroShift version
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.microshift_version = version.into();
        self
    }

    /// Mount a custom MicroShift config file
    pub fn with_microshift_config(mut self, path: impl Into<PathBuf>) -> Self {
        self.microshift_config = Some(path.into());
        self
    }

    /// Mount a pull secret
    pub fn with_pull_secret(mut self, path: impl Into<PathBuf>) -> Self {
        self.pull_secret = Some(path.into());
        self
    }

    /// Set the published HTTP and HTTPS host ports
    pub fn with_ports(mut self, http_port: u16, https_port: u16) -> Self {
        self.http_port = http_port;
        self.https_port = https_port;
        self
    }

    /// Image reference this request resolves to
    pub fn image(&self) -> String {
        crate::constants::microshift_image(&self.microshift_version)
    }
}

impl Default for CreateRequest {
    fn default() -> Self {
        Self::new(DEFAULT_PROVIDER)
    }
}

/// Host capabilities reported by a container engine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderInfo {
    /// Engine runs without elevated privileges
    pub rootless: bool,

    /// Host uses cgroup v2
    pub cgroup_v2: bool,
}

/// Running state of a cluster component
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentState {
    #[default]
    Stopped,
    Running,
}

impl std::fmt::Display for ComponentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ComponentState::Stopped => write!(f, "stopped"),
            ComponentState::Running => write!(f, "running"),
        }
    }
}

/// Aggregated cluster status; produced on demand, never persisted
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterStatus {
    /// Container state as reported by the engine
    pub container: ComponentState,

    /// API server state as observed through the health check
    pub apiserver: ComponentState,

    /// First error encountered while collecting the status
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ClusterStatus {
    /// Record an error; later stages are not evaluated after this
    pub fn with_error(mut self, error: impl std::fmt::Display) -> Self {
        self.error = Some(error.to_string());
        self
    }
}
