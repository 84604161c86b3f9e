//! Cluster health check
//!
//! A cluster is healthy when every pod in each of the system namespaces
//! reports phase `Running`. All namespaces are checked on every call and
//! the failures of all of them are reported together.

use std::time::Duration;

use async_trait::async_trait;
use k8s_openapi::api::core::v1::Pod;
use kube::api::{Api, ListParams};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config, ResourceExt};
use tracing::debug;

use minc_core::constants::HEALTH_NAMESPACES;
use minc_core::{Error, Result};

const RUNNING_PHASE: &str = "Running";

/// Checks that a cluster is ready for use
#[async_trait]
pub trait HealthCheck: Send + Sync {
    /// Check once, using the credentials in `kubeconfig`
    async fn check(&self, kubeconfig: &[u8]) -> Result<()>;
}

/// Health check against the cluster API
#[derive(Debug, Clone)]
pub struct KubeHealthChecker {
    namespaces: Vec<String>,
    connect_timeout: Duration,
    read_timeout: Duration,
}

impl KubeHealthChecker {
    pub fn new() -> Self {
        Self {
            namespaces: HEALTH_NAMESPACES.iter().map(|s| s.to_string()).collect(),
            connect_timeout: Duration::from_secs(10),
            read_timeout: Duration::from_secs(30),
        }
    }

    /// Check these namespaces instead of the system ones
    pub fn with_namespaces<I, S>(mut self, namespaces: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.namespaces = namespaces.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_timeouts(mut self, connect: Duration, read: Duration) -> Self {
        self.connect_timeout = connect;
        self.read_timeout = read;
        self
    }

    pub fn namespaces(&self) -> &[String] {
        &self.namespaces
    }

    /// Build a short-lived client from kubeconfig bytes
    async fn client(&self, kubeconfig: &[u8]) -> Result<Client> {
        let text = std::str::from_utf8(kubeconfig)
            .map_err(|e| Error::InvalidKubeconfig(format!("invalid UTF-8: {e}")))?;
        let kubeconfig =
            Kubeconfig::from_yaml(text).map_err(|e| Error::InvalidKubeconfig(e.to_string()))?;

        let mut config = Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
            .await
            .map_err(|e| Error::Client(format!("failed to build config from kubeconfig: {e}")))?;
        config.connect_timeout = Some(self.connect_timeout);
        config.read_timeout = Some(self.read_timeout);

        Client::try_from(config)
            .map_err(|e| Error::Client(format!("failed to create Kubernetes client: {e}")))
    }
}

impl Default for KubeHealthChecker {
    fn default() -> Self {
        Self::new()
    }
}

/// Describe every pod in `namespace` that is not running
pub fn pod_failures(namespace: &str, pods: &[Pod]) -> Vec<String> {
    pods.iter()
        .filter_map(|pod| {
            let phase = pod
                .status
                .as_ref()
                .and_then(|s| s.phase.as_deref())
                .unwrap_or("Unknown");
            (phase != RUNNING_PHASE).then(|| {
                format!(
                    "pod {} in namespace {} is not running. Current status: {}",
                    pod.name_any(),
                    namespace,
                    phase
                )
            })
        })
        .collect()
}

/// Source of the pods in a namespace
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PodLister: Send + Sync {
    async fn list_pods(&self, namespace: &str) -> std::result::Result<Vec<Pod>, String>;
}

#[async_trait]
impl PodLister for Client {
    async fn list_pods(&self, namespace: &str) -> std::result::Result<Vec<Pod>, String> {
        let pods: Api<Pod> = Api::namespaced(self.clone(), namespace);
        pods.list(&ListParams::default())
            .await
            .map(|list| list.items)
            .map_err(|e| e.to_string())
    }
}

/// Check every namespace, collecting the failures of all of them
pub async fn check_namespaces(lister: &dyn PodLister, namespaces: &[String]) -> Result<()> {
    let mut failures = Vec::new();

    for namespace in namespaces {
        match lister.list_pods(namespace).await {
            Ok(pods) => {
                debug!(namespace = %namespace, pods = pods.len(), "Listed pods");
                failures.extend(pod_failures(namespace, &pods));
            }
            Err(e) => failures.push(format!(
                "failed to get pods in namespace {}: {}",
                namespace, e
            )),
        }
    }

    if failures.is_empty() {
        Ok(())
    } else {
        Err(Error::Unhealthy { failures })
    }
}

#[async_trait]
impl HealthCheck for KubeHealthChecker {
    async fn check(&self, kubeconfig: &[u8]) -> Result<()> {
        let client = self.client(kubeconfig).await?;
        check_namespaces(&client, &self.namespaces).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::api::core::v1::PodStatus;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

    fn pod(name: &str, phase: Option<&str>) -> Pod {
        Pod {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                ..Default::default()
            },
            status: Some(PodStatus {
                phase: phase.map(str::to_string),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_all_running() {
        let pods = vec![pod("dns-1", Some("Running")), pod("dns-2", Some("Running"))];
        assert!(pod_failures("openshift-dns", &pods).is_empty());
    }

    #[test]
    fn test_reports_every_pending_pod() {
        let pods = vec![
            pod("router-1", Some("Pending")),
            pod("router-2", Some("Running")),
            pod("router-3", None),
        ];

        let failures = pod_failures("openshift-ingress", &pods);

        assert_eq!(
            failures,
            vec![
                "pod router-1 in namespace openshift-ingress is not running. Current status: Pending",
                "pod router-3 in namespace openshift-ingress is not running. Current status: Unknown",
            ]
        );
    }

    #[test]
    fn test_empty_namespace_is_healthy() {
        assert!(pod_failures("kube-proxy", &[]).is_empty());
    }

    #[test]
    fn test_default_namespaces() {
        let checker = KubeHealthChecker::new();
        assert_eq!(checker.namespaces().len(), 6);
        assert_eq!(checker.namespaces()[0], "kube-flannel");

        let checker = checker.with_namespaces(["default"]);
        assert_eq!(checker.namespaces(), &["default".to_string()]);
    }

    fn namespaces(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_every_namespace_is_checked() {
        let mut lister = MockPodLister::new();
        lister
            .expect_list_pods()
            .times(3)
            .returning(|namespace| match namespace {
                "kube-flannel" => Ok(vec![pod("flannel-1", Some("Running"))]),
                "kube-system" => Err("connection reset by peer".to_string()),
                "openshift-dns" => Ok(vec![pod("dns-1", Some("Pending"))]),
                other => panic!("unexpected namespace {other}"),
            });

        let err = check_namespaces(
            &lister,
            &namespaces(&["kube-flannel", "kube-system", "openshift-dns"]),
        )
        .await
        .unwrap_err();

        match err {
            Error::Unhealthy { failures } => assert_eq!(
                failures,
                vec![
                    "failed to get pods in namespace kube-system: connection reset by peer",
                    "pod dns-1 in namespace openshift-dns is not running. Current status: Pending",
                ]
            ),
            other => panic!("expected Unhealthy, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_all_namespaces_running() {
        let mut lister = MockPodLister::new();
        lister
            .expect_list_pods()
            .times(2)
            .returning(|_| Ok(vec![pod("p", Some("Running"))]));

        check_namespaces(&lister, &namespaces(&["kube-proxy", "openshift-ingress"]))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_invalid_kubeconfig() {
        let err = KubeHealthChecker::new()
            .check(b"\xff\xfe")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidKubeconfig(_)));
    }
}
