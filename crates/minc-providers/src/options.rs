//! Engine argument vectors
//!
//! Podman and docker accept the same syntax for everything minc issues,
//! except the image presence check which lives on the adapters.

use minc_core::constants::{
    kubeconfig_path_in_container, label_selector, API_SERVER_PORT, CONTAINER_HTTPS_PORT,
    CONTAINER_HTTP_PORT, HOST_NAME, HOST_STORAGE_MOUNT, MICROSHIFT_CONFIG_TARGET,
    PULL_SECRET_TARGET,
};
use minc_core::CreateRequest;

/// Format used for listing: name, state and published ports
pub const LIST_FORMAT: &str = "{{.Names}} {{.State}} {{.Ports}}";

/// Ports below this value are published on all interfaces
const PRIVILEGED_PORT_LIMIT: u16 = 1024;

fn to_args(args: &[&str]) -> Vec<String> {
    args.iter().map(|s| s.to_string()).collect()
}

pub fn info_args() -> Vec<String> {
    to_args(&["info", "--format", "json"])
}

pub fn pull_args(image: &str) -> Vec<String> {
    to_args(&["pull", image])
}

/// `-p` value for one port mapping
///
/// A host port below 1024 binds on all interfaces; anything else binds to
/// loopback only.
pub fn port_publish(host: u16, container: u16) -> String {
    if host < PRIVILEGED_PORT_LIMIT {
        format!("{}:{}", host, container)
    } else {
        format!("127.0.0.1:{}:{}", host, container)
    }
}

/// Arguments creating (but not starting) the managed container
pub fn create_args(name: &str, req: &CreateRequest) -> Vec<String> {
    let mut args = to_args(&[
        "create",
        "--hostname",
        HOST_NAME,
        "--label",
        &label_selector(),
        "--privileged",
        "-v",
        HOST_STORAGE_MOUNT,
    ]);

    if let Some(config) = &req.microshift_config {
        args.push("-v".into());
        args.push(format!(
            "{}:{}:ro",
            config.display(),
            MICROSHIFT_CONFIG_TARGET
        ));
    }

    if let Some(secret) = &req.pull_secret {
        args.push("-v".into());
        args.push(format!("{}:{}:ro", secret.display(), PULL_SECRET_TARGET));
    }

    for (host, container) in [
        (req.http_port, CONTAINER_HTTP_PORT),
        (req.https_port, CONTAINER_HTTPS_PORT),
        (API_SERVER_PORT, API_SERVER_PORT),
    ] {
        args.push("-p".into());
        args.push(port_publish(host, container));
    }

    args.push("--name".into());
    args.push(name.into());
    args.push(req.image());
    args
}

pub fn start_args(name: &str) -> Vec<String> {
    to_args(&["start", name])
}

pub fn service_status_args(name: &str, service: &str) -> Vec<String> {
    to_args(&["exec", name, "systemctl", "is-active", service])
}

pub fn kubeconfig_args(name: &str) -> Vec<String> {
    to_args(&["exec", name, "cat", &kubeconfig_path_in_container()])
}

pub fn delete_args(name: &str) -> Vec<String> {
    to_args(&["rm", "-f", name])
}

/// Lists every container carrying the managed label, stopped ones included
pub fn list_args() -> Vec<String> {
    to_args(&[
        "ps",
        "-a",
        "--filter",
        &format!("label={}", label_selector()),
        "--format",
        LIST_FORMAT,
    ])
}
