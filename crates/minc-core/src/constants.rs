//! Well-known names, paths and defaults
//!
//! minc manages exactly one cluster per host. The container, the cluster
//! entry in the user's kubeconfig and the label used to find the container
//! all derive from [`CONTAINER_NAME`].

/// Name of the managed container and of the cluster entry in kubeconfig
pub const CONTAINER_NAME: &str = "microshift";

/// Hostname given to the container; also part of the in-container kubeconfig path
pub const HOST_NAME: &str = "127.0.0.1.nip.io";

/// Label attached to the managed container
pub const LABEL_KEY: &str = "io.x-openshift.microshift.cluster";

/// Systemd unit that runs the cluster inside the container
pub const MICROSHIFT_SERVICE: &str = "microshift";

/// Default MicroShift (OKD) version
pub const DEFAULT_MICROSHIFT_VERSION: &str = "4.18.0-okd-scos.1";

/// Image registry host
pub const REGISTRY: &str = "quay.io";

/// Organisation within the registry
pub const REGISTRY_ORG: &str = "praveenkumar";

/// Image repository name
pub const IMAGE_NAME: &str = "microshift-okd";

/// Default provider when none is configured
pub const DEFAULT_PROVIDER: &str = "podman";

/// Default host port published for in-cluster HTTP routes
pub const DEFAULT_HTTP_PORT: u16 = 9080;

/// Default host port published for in-cluster HTTPS routes
pub const DEFAULT_HTTPS_PORT: u16 = 9443;

/// Kubernetes API server port (host and container)
pub const API_SERVER_PORT: u16 = 6443;

/// Router HTTP port inside the container
pub const CONTAINER_HTTP_PORT: u16 = 80;

/// Router HTTPS port inside the container
pub const CONTAINER_HTTPS_PORT: u16 = 443;

/// Host container storage shared read-only with the cluster's CRI-O
pub const HOST_STORAGE_MOUNT: &str = "/var/lib/containers/storage:/host-container:ro,rshared";

/// Where a custom MicroShift config file is mounted
pub const MICROSHIFT_CONFIG_TARGET: &str = "/etc/microshift/config.yaml";

/// Where a pull secret is mounted
pub const PULL_SECRET_TARGET: &str = "/etc/crio/openshift-pull-secret";

/// Word in the engine listing that marks a running container
pub const RUNNING_MARKER: &str = "running";

/// System namespaces polled by the cluster health check
pub const HEALTH_NAMESPACES: &[&str] = &[
    "kube-flannel",
    "kube-proxy",
    "kube-system",
    "openshift-dns",
    "openshift-ingress",
    "openshift-service-ca",
];

/// Registry path without tag, e.g. `quay.io/praveenkumar/microshift-okd`
pub fn image_registry() -> String {
    format!("{}/{}/{}", REGISTRY, REGISTRY_ORG, IMAGE_NAME)
}

/// Full image reference for a MicroShift version on this host's architecture
pub fn microshift_image(version: &str) -> String {
    format!("{}:{}-{}", image_registry(), version, image_arch())
}

/// Architecture suffix used by the published images
pub fn image_arch() -> &'static str {
    arch_suffix(std::env::consts::ARCH, cfg!(target_endian = "little"))
}

fn arch_suffix(arch: &'static str, little_endian: bool) -> &'static str {
    match arch {
        "x86_64" => "amd64",
        "aarch64" => "arm64",
        "powerpc64" if little_endian => "ppc64le",
        "powerpc64" => "ppc64",
        other => other,
    }
}

/// Admin kubeconfig path inside the container
pub fn kubeconfig_path_in_container() -> String {
    format!(
        "/var/lib/microshift/resources/kubeadmin/{}/kubeconfig",
        HOST_NAME
    )
}

/// Label filter value identifying the managed container
pub fn label_selector() -> String {
    format!("{}={}", LABEL_KEY, CONTAINER_NAME)
}
