//! Podman adapter

use serde::Deserialize;

use minc_core::exec::Cmd;
use minc_core::{Error, ProviderInfo, Result};

use super::EngineAdapter;

#[derive(Debug, Default, Deserialize)]
struct InfoResponse {
    #[serde(default)]
    host: HostInfo,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HostInfo {
    #[serde(default)]
    cgroup_version: String,
    #[serde(default)]
    security: SecurityInfo,
}

#[derive(Debug, Default, Deserialize)]
struct SecurityInfo {
    #[serde(default)]
    rootless: bool,
}

/// Rootful podman
///
/// On Linux every invocation goes through `sudo` so the engine runs rootful.
#[derive(Debug, Clone, Copy)]
pub struct PodmanEngine {
    sudo: bool,
}

impl PodmanEngine {
    pub fn new() -> Self {
        Self {
            sudo: cfg!(target_os = "linux"),
        }
    }

    /// Override whether commands are prefixed with `sudo`
    pub fn with_sudo(mut self, sudo: bool) -> Self {
        self.sudo = sudo;
        self
    }

    pub fn uses_sudo(&self) -> bool {
        self.sudo
    }
}

impl Default for PodmanEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineAdapter for PodmanEngine {
    fn name(&self) -> &'static str {
        "podman"
    }

    fn program(&self) -> &'static str {
        "podman"
    }

    fn command(&self, args: Vec<String>) -> Cmd {
        if self.sudo {
            Cmd::new("sudo").arg(self.program()).args(args)
        } else {
            Cmd::new(self.program()).args(args)
        }
    }

    fn parse_info(&self, raw: &[u8]) -> Result<ProviderInfo> {
        let info: InfoResponse =
            serde_json::from_slice(raw).map_err(|e| Error::ProviderInfo {
                provider: self.name().to_string(),
                message: e.to_string(),
            })?;

        Ok(ProviderInfo {
            rootless: info.host.security.rootless,
            cgroup_v2: info.host.cgroup_version == "v2",
        })
    }

    fn image_exists_args(&self, image: &str) -> Vec<String> {
        vec!["image".into(), "exists".into(), image.into()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_info_rootful_v2() {
        let raw = br#"{"host":{"cgroupVersion":"v2","security":{"rootless":false}},"store":{}}"#;
        let info = PodmanEngine::new().parse_info(raw).unwrap();
        assert!(info.cgroup_v2);
        assert!(!info.rootless);
    }

    #[test]
    fn test_parse_info_rootless_v1() {
        let raw = br#"{"host":{"cgroupVersion":"v1","security":{"rootless":true}}}"#;
        let info = PodmanEngine::new().parse_info(raw).unwrap();
        assert!(!info.cgroup_v2);
        assert!(info.rootless);
    }

    #[test]
    fn test_parse_info_garbage() {
        let err = PodmanEngine::new().parse_info(b"not json").unwrap_err();
        assert!(err.to_string().starts_with("failed to parse podman info"));
    }

    #[test]
    fn test_sudo_prefix() {
        let cmd = PodmanEngine::new()
            .with_sudo(true)
            .command(vec!["ps".into()]);
        assert_eq!(cmd.argv(), vec!["sudo", "podman", "ps"]);

        let cmd = PodmanEngine::new()
            .with_sudo(false)
            .command(vec!["ps".into()]);
        assert_eq!(cmd.argv(), vec!["podman", "ps"]);
    }

    #[test]
    fn test_default_sudo_follows_platform() {
        let engine = PodmanEngine::default();
        assert_eq!(engine.uses_sudo(), cfg!(target_os = "linux"));
        assert!(!engine.with_sudo(false).uses_sudo());
    }
}
