//! Create command

use anyhow::Result;
use minc_core::settings::Settings;
use minc_core::CreateRequest;

use crate::cli::CreateArgs;
use crate::commands::Context;
use crate::output;

/// Resolve a create request: flag, then persisted setting, then default
pub fn build_request(args: CreateArgs, provider: String, settings: &Settings) -> Result<CreateRequest> {
    let mut req = CreateRequest::new(provider)
        .with_version(
            args.microshift_version
                .unwrap_or_else(|| settings.microshift_version()),
        )
        .with_ports(
            args.http_port.map(Ok).unwrap_or_else(|| settings.http_port())?,
            args.https_port.map(Ok).unwrap_or_else(|| settings.https_port())?,
        );

    if let Some(config) = args.microshift_config.or_else(|| settings.microshift_config()) {
        req = req.with_microshift_config(config);
    }
    if let Some(secret) = args.pull_secret.or_else(|| settings.pull_secret()) {
        req = req.with_pull_secret(secret);
    }

    Ok(req)
}

pub async fn run(args: CreateArgs, ctx: &Context) -> Result<()> {
    let req = build_request(args, ctx.provider(), ctx.settings())?;
    ctx.ensure_engine_installed()?;

    let lifecycle = ctx.lifecycle(true)?;
    lifecycle.create(&req).await?;

    output::success(&format!(
        "MicroShift {} cluster is running",
        req.microshift_version
    ));
    output::kv("Kubeconfig", &lifecycle.kubeconfig().path().display().to_string());
    output::kv("HTTP port", &req.http_port.to_string());
    output::kv("HTTPS port", &req.https_port.to_string());
    Ok(())
}
