//! Error types for minc-core

use thiserror::Error;

use crate::exec::RunError;
use crate::retry::RetryError;

/// Result type alias using minc-core's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Host requirement a provider checks before touching the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    CgroupV2,
    Rootful,
}

impl std::fmt::Display for Requirement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Requirement::CgroupV2 => write!(f, "cgroup v2"),
            Requirement::Rootful => write!(f, "rootful mode"),
        }
    }
}

/// Core error types for minc
#[derive(Error, Debug)]
pub enum Error {
    /// The host does not satisfy a provider requirement; never retried
    #[error("{provider} provider requires {requirement}")]
    Precondition {
        provider: String,
        requirement: Requirement,
    },

    /// An external command failed
    #[error(transparent)]
    Command(#[from] RunError),

    /// No factory is registered for a provider name, not even the default
    #[error("unknown provider '{name}'. Available providers: {available}")]
    UnknownProvider { name: String, available: String },

    /// Engine info output could not be understood
    #[error("failed to parse {provider} info: {message}")]
    ProviderInfo { provider: String, message: String },

    /// No managed container exists
    #[error("no {name} containers found, use 'create' command to create it")]
    ContainerNotFound { name: String },

    /// The managed container exists but is not running
    #[error("{name} container is not running, use 'create' command to run it")]
    ContainerNotRunning { name: String },

    /// The in-container service reported a state other than active
    #[error("{service} service is not active (state: {state})")]
    ServiceInactive { service: String, state: String },

    /// Credential store could not be read, parsed or written
    #[error("kubeconfig error at {path}: {message}")]
    Kubeconfig { path: String, message: String },

    /// A credential bundle could not be parsed
    #[error("invalid kubeconfig: {0}")]
    InvalidKubeconfig(String),

    /// The cluster API client could not be built or a request failed
    #[error("cluster API error: {0}")]
    Client(String),

    /// One or more system namespaces have pods that are not running
    #[error("cluster is not healthy: {}", .failures.join("; "))]
    Unhealthy { failures: Vec<String> },

    /// A retried readiness check never succeeded
    #[error("{operation} did not succeed after {attempts} attempts: {source}")]
    RetryExhausted {
        operation: String,
        attempts: u32,
        #[source]
        source: Box<Error>,
    },

    /// A retried operation was configured with zero attempts
    #[error("{operation} was not attempted")]
    NotAttempted { operation: String },

    /// Unknown persisted setting
    #[error("unknown setting '{key}'. Valid settings: {valid}")]
    UnknownSetting { key: String, valid: String },

    /// Invalid value for a persisted setting
    #[error("invalid value '{value}' for setting '{key}': {reason}")]
    InvalidSetting {
        key: String,
        value: String,
        reason: String,
    },

    /// A user-supplied file does not exist
    #[error("{what} file does not exist: {path}")]
    FileNotFound { what: String, path: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),
}

impl Error {
    /// Create a precondition error
    pub fn precondition(provider: impl Into<String>, requirement: Requirement) -> Self {
        Self::Precondition {
            provider: provider.into(),
            requirement,
        }
    }

    /// Create a kubeconfig error for a path
    pub fn kubeconfig(path: impl std::fmt::Display, message: impl Into<String>) -> Self {
        Self::Kubeconfig {
            path: path.to_string(),
            message: message.into(),
        }
    }

    /// Create a missing-file error
    pub fn file_not_found(what: impl Into<String>, path: impl std::fmt::Display) -> Self {
        Self::FileNotFound {
            what: what.into(),
            path: path.to_string(),
        }
    }

    /// Convert a retry failure into a terminal error for `operation`
    pub fn from_retry(operation: impl Into<String>, err: RetryError<Error>) -> Self {
        let operation = operation.into();
        let attempts = err.attempts();
        match err.into_source() {
            Some(source) => Self::RetryExhausted {
                operation,
                attempts,
                source: Box::new(source),
            },
            None => Self::NotAttempted { operation },
        }
    }

    /// True for host requirement failures
    pub fn is_precondition(&self) -> bool {
        matches!(self, Error::Precondition { .. })
    }

    /// True when the managed container is missing or stopped
    pub fn is_not_running(&self) -> bool {
        matches!(
            self,
            Error::ContainerNotFound { .. } | Error::ContainerNotRunning { .. }
        )
    }
}
