//! CLI argument parsing with clap

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// minc - MicroShift in Container
#[derive(Parser, Debug)]
#[command(name = "minc")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Container engine to use (podman, docker)
    #[arg(short, long, global = true)]
    pub provider: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the MicroShift cluster
    Create(CreateArgs),

    /// List the MicroShift cluster
    List,

    /// Status of the MicroShift cluster
    Status,

    /// Delete the MicroShift cluster
    Delete,

    /// Write the cluster's credentials into your kubeconfig
    GenerateKubeconfig,

    /// Show version information
    Version(VersionArgs),

    /// Manage configuration for minc
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Args, Debug, Default)]
pub struct CreateArgs {
    /// MicroShift version to run
    #[arg(short = 'm', long)]
    pub microshift_version: Option<String>,

    /// Custom MicroShift config file
    #[arg(short = 'c', long)]
    pub microshift_config: Option<PathBuf>,

    /// Pull secret for images from authenticated registries
    #[arg(long)]
    pub pull_secret: Option<PathBuf>,

    /// Host port for HTTP routes
    #[arg(long)]
    pub http_port: Option<u16>,

    /// Host port for HTTPS routes
    #[arg(long)]
    pub https_port: Option<u16>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Set a configuration value
    Set {
        key: String,
        value: String,
    },

    /// Get a configuration value
    Get { key: String },

    /// Remove a configuration key
    Unset { key: String },

    /// View the config file
    View,
}
