//! CLI command implementations

pub mod config;
pub mod create;
pub mod delete;
pub mod kubeconfig;
pub mod list;
pub mod status;
pub mod version;

use std::sync::Arc;

use anyhow::{anyhow, Result};
use minc_cluster::{KubeHealthChecker, KubeconfigStore, Lifecycle};
use minc_core::settings::Settings;
use minc_providers::ProviderRegistry;
use owo_colors::OwoColorize;

use crate::output::Spinner;

/// Everything a command needs besides its own arguments
pub struct Context {
    provider_flag: Option<String>,
    settings: Settings,
    registry: ProviderRegistry,
}

impl Context {
    pub fn new(provider_flag: Option<String>, settings: Settings) -> Self {
        Self {
            provider_flag,
            settings,
            registry: ProviderRegistry::builtin(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn into_settings(self) -> Settings {
        self.settings
    }

    /// Provider from the flag, else the persisted setting, else the default
    pub fn provider(&self) -> String {
        self.provider_flag
            .clone()
            .unwrap_or_else(|| self.settings.provider())
    }

    /// Fail early with a readable message when the engine is not installed
    pub fn ensure_engine_installed(&self) -> Result<()> {
        let provider = self.provider();
        let engine = self.registry.effective_name(&provider);
        if which::which(engine).is_err() {
            eprintln!("{} {} is not installed", "Error:".red().bold(), engine);
            eprintln!();
            eprintln!(
                "Install it or pick another engine with {}",
                format!("minc --provider <{}>", self.registry.names().join("|")).cyan()
            );
            return Err(anyhow!("{} is not installed", engine));
        }
        Ok(())
    }

    /// Build the orchestrator; `progress` shows a spinner on terminals
    pub fn lifecycle(&self, progress: bool) -> Result<Lifecycle> {
        let lifecycle = Lifecycle::new(
            self.registry.clone(),
            KubeconfigStore::from_env()?,
            Arc::new(KubeHealthChecker::new()),
        );

        Ok(if progress {
            lifecycle.with_progress(Arc::new(Spinner::new()))
        } else {
            lifecycle
        })
    }
}
