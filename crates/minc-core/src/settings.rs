//! Persisted user preferences
//!
//! Stored as a flat JSON object at `<config dir>/minc/config.json`. Values
//! given on the command line take precedence over persisted ones, which take
//! precedence over the built-in defaults.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde_json::Value;
use tracing::debug;

use crate::constants::{
    DEFAULT_HTTPS_PORT, DEFAULT_HTTP_PORT, DEFAULT_MICROSHIFT_VERSION, DEFAULT_PROVIDER,
};
use crate::error::{Error, Result};

const APP_NAME: &str = "minc";
const CONFIG_FILE_NAME: &str = "config.json";

/// A setting minc knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SettingKey {
    Provider,
    LogLevel,
    MicroshiftVersion,
    MicroshiftConfig,
    PullSecret,
    HttpPort,
    HttpsPort,
}

impl SettingKey {
    pub const ALL: [SettingKey; 7] = [
        SettingKey::Provider,
        SettingKey::LogLevel,
        SettingKey::MicroshiftVersion,
        SettingKey::MicroshiftConfig,
        SettingKey::PullSecret,
        SettingKey::HttpPort,
        SettingKey::HttpsPort,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SettingKey::Provider => "provider",
            SettingKey::LogLevel => "log-level",
            SettingKey::MicroshiftVersion => "microshift-version",
            SettingKey::MicroshiftConfig => "microshift-config",
            SettingKey::PullSecret => "pull-secret",
            SettingKey::HttpPort => "http-port",
            SettingKey::HttpsPort => "https-port",
        }
    }

    /// Built-in default, if the setting has one
    pub fn default_value(&self) -> Option<String> {
        match self {
            SettingKey::Provider => Some(DEFAULT_PROVIDER.to_string()),
            SettingKey::LogLevel => Some("info".to_string()),
            SettingKey::MicroshiftVersion => Some(DEFAULT_MICROSHIFT_VERSION.to_string()),
            SettingKey::HttpPort => Some(DEFAULT_HTTP_PORT.to_string()),
            SettingKey::HttpsPort => Some(DEFAULT_HTTPS_PORT.to_string()),
            SettingKey::MicroshiftConfig | SettingKey::PullSecret => None,
        }
    }

    fn validate(&self, value: &str) -> Result<()> {
        match self {
            SettingKey::HttpPort | SettingKey::HttpsPort => {
                value
                    .parse::<u16>()
                    .map_err(|e| Error::InvalidSetting {
                        key: self.as_str().to_string(),
                        value: value.to_string(),
                        reason: e.to_string(),
                    })?;
                Ok(())
            }
            SettingKey::LogLevel => match value.to_lowercase().as_str() {
                "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
                _ => Err(Error::InvalidSetting {
                    key: self.as_str().to_string(),
                    value: value.to_string(),
                    reason: "expected one of trace, debug, info, warn, error".to_string(),
                }),
            },
            _ => Ok(()),
        }
    }

    fn valid_keys() -> String {
        Self::ALL
            .iter()
            .map(|k| k.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl std::fmt::Display for SettingKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SettingKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| Error::UnknownSetting {
                key: s.to_string(),
                valid: Self::valid_keys(),
            })
    }
}

/// Persisted settings file
#[derive(Debug, Clone)]
pub struct Settings {
    path: PathBuf,
    values: BTreeMap<String, Value>,
}

impl Settings {
    /// Location of the settings file for the current user
    pub fn default_path() -> Result<PathBuf> {
        let dir = dirs::config_dir().ok_or_else(|| {
            Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "could not determine user config directory",
            ))
        })?;
        Ok(dir.join(APP_NAME).join(CONFIG_FILE_NAME))
    }

    /// Load the current user's settings, creating an empty file if needed
    pub fn load() -> Result<Self> {
        Self::load_from(Self::default_path()?)
    }

    /// Load settings from `path`, creating an empty file if needed
    pub fn load_from(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if !path.exists() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, "{}")?;
            debug!("Created empty config file: {}", path.display());
        }

        let content = std::fs::read_to_string(&path)?;
        let values = if content.trim().is_empty() {
            BTreeMap::new()
        } else {
            serde_json::from_str(&content)?
        };

        Ok(Self { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persist the current values
    pub fn save(&self) -> Result<()> {
        let content = serde_json::to_string_pretty(&self.values)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }

    /// Explicitly set value of a known setting
    pub fn get_explicit(&self, key: SettingKey) -> Option<String> {
        self.values.get(key.as_str()).and_then(value_to_string)
    }

    /// Explicit value, falling back to the built-in default
    pub fn get(&self, key: SettingKey) -> Option<String> {
        self.get_explicit(key).or_else(|| key.default_value())
    }

    /// Validate, store and persist a setting
    pub fn set(&mut self, key: SettingKey, value: &str) -> Result<()> {
        key.validate(value)?;
        self.values
            .insert(key.as_str().to_string(), Value::String(value.to_string()));
        self.save()
    }

    /// Remove a setting; returns whether it was set
    pub fn unset(&mut self, key: &str) -> Result<bool> {
        let removed = self.values.remove(key).is_some();
        if removed {
            self.save()?;
        }
        Ok(removed)
    }

    /// Every explicitly set key with its value, sorted by key
    pub fn entries(&self) -> Vec<(String, String)> {
        self.values
            .iter()
            .map(|(k, v)| (k.clone(), value_to_string(v).unwrap_or_default()))
            .collect()
    }

    pub fn provider(&self) -> String {
        self.get(SettingKey::Provider)
            .unwrap_or_else(|| DEFAULT_PROVIDER.to_string())
    }

    pub fn log_level(&self) -> String {
        self.get(SettingKey::LogLevel)
            .unwrap_or_else(|| "info".to_string())
    }

    pub fn microshift_version(&self) -> String {
        self.get(SettingKey::MicroshiftVersion)
            .unwrap_or_else(|| DEFAULT_MICROSHIFT_VERSION.to_string())
    }

    pub fn microshift_config(&self) -> Option<PathBuf> {
        self.get_explicit(SettingKey::MicroshiftConfig)
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
    }

    pub fn pull_secret(&self) -> Option<PathBuf> {
        self.get_explicit(SettingKey::PullSecret)
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
    }

    pub fn http_port(&self) -> Result<u16> {
        self.port(SettingKey::HttpPort, DEFAULT_HTTP_PORT)
    }

    pub fn https_port(&self) -> Result<u16> {
        self.port(SettingKey::HttpsPort, DEFAULT_HTTPS_PORT)
    }

    fn port(&self, key: SettingKey, default: u16) -> Result<u16> {
        match self.get_explicit(key) {
            Some(value) => value.parse().map_err(|_| Error::InvalidSetting {
                key: key.as_str().to_string(),
                value,
                reason: "port must be an integer between 0 and 65535".to_string(),
            }),
            None => Ok(default),
        }
    }
}

fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn settings_in(dir: &TempDir) -> Settings {
        Settings::load_from(dir.path().join("minc").join("config.json")).unwrap()
    }

    #[test]
    fn test_load_creates_empty_file() {
        let dir = TempDir::new().unwrap();
        let settings = settings_in(&dir);

        assert!(settings.path().exists());
        assert_eq!(std::fs::read_to_string(settings.path()).unwrap(), "{}");
        assert!(settings.entries().is_empty());
    }

    #[test]
    fn test_defaults() {
        let dir = TempDir::new().unwrap();
        let settings = settings_in(&dir);

        assert_eq!(settings.provider(), "podman");
        assert_eq!(settings.log_level(), "info");
        assert_eq!(settings.microshift_version(), DEFAULT_MICROSHIFT_VERSION);
        assert_eq!(settings.http_port().unwrap(), 9080);
        assert_eq!(settings.https_port().unwrap(), 9443);
        assert!(settings.microshift_config().is_none());
        assert_eq!(settings.get(SettingKey::PullSecret), None);
    }

    #[test]
    fn test_set_persists() {
        let dir = TempDir::new().unwrap();
        let mut settings = settings_in(&dir);

        settings.set(SettingKey::Provider, "docker").unwrap();
        settings.set(SettingKey::HttpPort, "8080").unwrap();

        let reloaded = settings_in(&dir);
        assert_eq!(reloaded.provider(), "docker");
        assert_eq!(reloaded.http_port().unwrap(), 8080);
        assert_eq!(
            reloaded.entries(),
            vec![
                ("http-port".to_string(), "8080".to_string()),
                ("provider".to_string(), "docker".to_string()),
            ]
        );
    }

    #[test]
    fn test_set_rejects_bad_port() {
        let dir = TempDir::new().unwrap();
        let mut settings = settings_in(&dir);

        let err = settings.set(SettingKey::HttpsPort, "not-a-port").unwrap_err();
        assert!(matches!(err, Error::InvalidSetting { .. }));
        assert!(settings.get_explicit(SettingKey::HttpsPort).is_none());
    }

    #[test]
    fn test_set_rejects_bad_log_level() {
        let dir = TempDir::new().unwrap();
        let mut settings = settings_in(&dir);
        assert!(settings.set(SettingKey::LogLevel, "loud").is_err());
        assert!(settings.set(SettingKey::LogLevel, "DEBUG").is_ok());
    }

    #[test]
    fn test_unknown_key() {
        let err = "color".parse::<SettingKey>().unwrap_err();
        assert!(matches!(err, Error::UnknownSetting { .. }));
        assert!(err.to_string().contains("microshift-version"));
        assert_eq!(
            "https-port".parse::<SettingKey>().unwrap(),
            SettingKey::HttpsPort
        );
    }

    #[test]
    fn test_unset() {
        let dir = TempDir::new().unwrap();
        let mut settings = settings_in(&dir);
        settings.set(SettingKey::Provider, "docker").unwrap();

        assert!(settings.unset("provider").unwrap());
        assert!(!settings.unset("provider").unwrap());
        assert_eq!(settings_in(&dir).provider(), "podman");
    }

    #[test]
    fn test_numeric_values_are_accepted() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"http-port": 8000}"#).unwrap();

        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings.http_port().unwrap(), 8000);
    }
}
