//! Reconciling cluster credentials into the user's kubeconfig
//!
//! Entries are merged by name: anything the incoming bundle defines replaces
//! the entry of the same name in the user's file. The user's
//! `current-context` is only adopted from the incoming bundle when it is
//! empty. Fields minc does not interpret are carried through untouched.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml_ng::Value;
use tracing::{debug, warn};

use minc_core::constants::CONTAINER_NAME;
use minc_core::utils::kubeconfig_path;
use minc_core::{Error, Result};

/// A kubeconfig file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KubeConfig {
    #[serde(rename = "apiVersion", default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub clusters: Vec<NamedCluster>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub contexts: Vec<NamedContext>,

    #[serde(rename = "current-context", default, deserialize_with = "null_as_default")]
    pub current_context: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub users: Vec<NamedUser>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedCluster {
    pub name: String,
    #[serde(default)]
    pub cluster: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedUser {
    pub name: String,
    #[serde(default)]
    pub user: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedContext {
    pub name: String,
    #[serde(default)]
    pub context: ContextRef,
}

/// Cluster and user a context pairs together
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContextRef {
    #[serde(default)]
    pub cluster: String,

    #[serde(default)]
    pub user: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Entries keyed by name
trait Named {
    fn name(&self) -> &str;
}

impl Named for NamedCluster {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for NamedContext {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for NamedUser {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Replace same-named entries in place, append the rest
fn upsert<T: Named>(into: &mut Vec<T>, incoming: Vec<T>) {
    for entry in incoming {
        match into.iter_mut().find(|e| e.name() == entry.name()) {
            Some(existing) => *existing = entry,
            None => into.push(entry),
        }
    }
}

impl KubeConfig {
    /// Parse a kubeconfig from YAML bytes
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_yaml_ng::from_slice(bytes).map_err(|e| Error::InvalidKubeconfig(e.to_string()))
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    /// Merge `other` into `self`, last writer wins on names
    pub fn merge(&mut self, other: KubeConfig) {
        upsert(&mut self.clusters, other.clusters);
        upsert(&mut self.contexts, other.contexts);
        upsert(&mut self.users, other.users);

        if self.current_context.is_empty() {
            self.current_context = other.current_context;
        }
        if self.api_version.is_none() {
            self.api_version = other.api_version;
        }
        if self.kind.is_none() {
            self.kind = other.kind;
        }
    }

    /// Remove cluster `name` with every context bound to it and those
    /// contexts' users
    ///
    /// Returns false, leaving the config untouched, when no such cluster
    /// exists.
    pub fn remove_cluster(&mut self, name: &str) -> bool {
        let before = self.clusters.len();
        self.clusters.retain(|c| c.name != name);
        if self.clusters.len() == before {
            return false;
        }

        let (bound, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.contexts)
            .into_iter()
            .partition(|ctx| ctx.context.cluster == name);
        self.contexts = kept;

        for ctx in bound {
            self.users.retain(|u| u.name != ctx.context.user);
            if self.current_context == ctx.name {
                self.current_context.clear();
            }
        }

        true
    }

    pub fn cluster(&self, name: &str) -> Option<&NamedCluster> {
        self.clusters.iter().find(|c| c.name == name)
    }

    pub fn context(&self, name: &str) -> Option<&NamedContext> {
        self.contexts.iter().find(|c| c.name == name)
    }

    pub fn user(&self, name: &str) -> Option<&NamedUser> {
        self.users.iter().find(|u| u.name == name)
    }
}

#[cfg(unix)]
fn private_permissions() -> Option<std::fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(std::fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn private_permissions() -> Option<std::fs::Permissions> {
    None
}

/// The user's kubeconfig file
#[derive(Debug, Clone)]
pub struct KubeconfigStore {
    path: PathBuf,
}

impl KubeconfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `$KUBECONFIG` (first entry), else `~/.kube/config`
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(kubeconfig_path()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the file; a missing file reads as an empty config
    pub fn load(&self) -> Result<Option<KubeConfig>> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Error::kubeconfig(self.path.display(), e.to_string())),
        };

        KubeConfig::from_slice(&bytes)
            .map(Some)
            .map_err(|e| Error::kubeconfig(self.path.display(), e.to_string()))
    }

    /// Write atomically
    ///
    /// A symlinked file is written through to its target. An existing file
    /// keeps its permissions; a new one is readable by the owner only.
    pub fn save(&self, config: &KubeConfig) -> Result<()> {
        let to_kubeconfig_err = |e: &dyn std::fmt::Display| {
            Error::kubeconfig(self.path.display(), e.to_string())
        };

        let existing = std::fs::metadata(&self.path).ok();
        let target = match existing {
            Some(_) => std::fs::canonicalize(&self.path).map_err(|e| to_kubeconfig_err(&e))?,
            None => self.path.clone(),
        };

        let dir = match target.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir).map_err(|e| to_kubeconfig_err(&e))?;

        let yaml = config.to_yaml()?;
        let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(|e| to_kubeconfig_err(&e))?;
        tmp.write_all(yaml.as_bytes())
            .map_err(|e| to_kubeconfig_err(&e))?;

        let permissions = match existing {
            Some(metadata) => Some(metadata.permissions()),
            None => private_permissions(),
        };
        if let Some(permissions) = permissions {
            std::fs::set_permissions(tmp.path(), permissions)
                .map_err(|e| to_kubeconfig_err(&e))?;
        }

        tmp.persist(&target).map_err(|e| to_kubeconfig_err(&e.error))?;
        Ok(())
    }

    /// Merge a credential bundle into the file, creating it if needed
    ///
    /// An existing file that cannot be read or parsed is replaced by the
    /// bundle alone. An invalid bundle never touches the file.
    pub fn merge(&self, bundle: &[u8]) -> Result<()> {
        debug!("Updating kubeconfig at {}", self.path.display());

        let incoming = KubeConfig::from_slice(bundle)?;
        let mut config = match self.load() {
            Ok(existing) => existing.unwrap_or_default(),
            Err(e) => {
                warn!("Ignoring unreadable kubeconfig, starting from an empty one: {}", e);
                KubeConfig::default()
            }
        };
        config.merge(incoming);
        self.save(&config)
    }

    /// Remove the managed cluster and everything bound to it
    ///
    /// A missing file or a file without the cluster is left untouched. A
    /// file that cannot be parsed is an error and is not rewritten.
    pub fn remove_cluster(&self) -> Result<()> {
        debug!("Updating kubeconfig at {}", self.path.display());

        let Some(mut config) = self.load()? else {
            debug!("No kubeconfig at {}", self.path.display());
            return Ok(());
        };

        if !config.remove_cluster(CONTAINER_NAME) {
            debug!("cluster {} not found in kubeconfig", CONTAINER_NAME);
            return Ok(());
        }

        self.save(&config)?;
        debug!("Cluster {} removed from kubeconfig", CONTAINER_NAME);
        Ok(())
    }
}
