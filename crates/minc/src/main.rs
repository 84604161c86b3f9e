//! minc CLI - MicroShift in Container
//!
//! This is the main entry point for the minc command-line interface.

mod cli;
mod commands;
mod output;

use anyhow::Result;
use clap::Parser;
use minc_core::settings::Settings;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::{Cli, Commands};
use commands::Context;

#[tokio::main]
async fn main() -> Result<()> {
    // Must happen before the cluster client opens any TLS connection
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    let cli = Cli::parse();
    let settings = Settings::load()?;

    init_tracing(cli.log_level.as_deref().unwrap_or(&settings.log_level()));

    let ctx = Context::new(cli.provider, settings);

    match cli.command {
        Commands::Create(args) => commands::create::run(args, &ctx).await,
        Commands::List => commands::list::run(&ctx).await,
        Commands::Status => commands::status::run(&ctx).await,
        Commands::Delete => commands::delete::run(&ctx).await,
        Commands::GenerateKubeconfig => commands::kubeconfig::run(&ctx).await,
        Commands::Version(args) => commands::version::run(args),
        Commands::Config(cmd) => commands::config::run(cmd, ctx),
    }
}

/// Map a user-supplied level to a filter directive; unknown levels mean info
fn level_directive(level: &str) -> &'static str {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => "trace",
        "debug" => "debug",
        "warn" | "warning" => "warn",
        "error" => "error",
        _ => "info",
    }
}

fn init_tracing(level: &str) {
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(EnvFilter::new(level_directive(level)))
        .init();
}
