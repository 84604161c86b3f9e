//! Docker adapter

use serde::Deserialize;

use minc_core::{Error, ProviderInfo, Result};

use super::EngineAdapter;

const ROOTLESS_SECURITY_OPTION: &str = "name=rootless";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InfoResponse {
    #[serde(default)]
    cgroup_version: String,
    #[serde(default)]
    security_options: Option<Vec<String>>,
}

/// Docker engine
#[derive(Debug, Clone, Copy, Default)]
pub struct DockerEngine;

impl DockerEngine {
    pub fn new() -> Self {
        Self
    }
}

impl EngineAdapter for DockerEngine {
    fn name(&self) -> &'static str {
        "docker"
    }

    fn program(&self) -> &'static str {
        "docker"
    }

    fn parse_info(&self, raw: &[u8]) -> Result<ProviderInfo> {
        let info: InfoResponse =
            serde_json::from_slice(raw).map_err(|e| Error::ProviderInfo {
                provider: self.name().to_string(),
                message: e.to_string(),
            })?;

        let rootless = info
            .security_options
            .unwrap_or_default()
            .iter()
            .any(|opt| opt == ROOTLESS_SECURITY_OPTION);

        Ok(ProviderInfo {
            rootless,
            cgroup_v2: info.cgroup_version == "2",
        })
    }

    fn image_exists_args(&self, image: &str) -> Vec<String> {
        vec!["image".into(), "inspect".into(), image.into()]
    }
}
