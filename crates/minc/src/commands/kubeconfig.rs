//! Generate-kubeconfig command

use anyhow::Result;

use crate::commands::Context;
use crate::output;

pub async fn run(ctx: &Context) -> Result<()> {
    ctx.ensure_engine_installed()?;

    let lifecycle = ctx.lifecycle(false)?;
    lifecycle.generate_kubeconfig(&ctx.provider()).await?;

    output::success(&format!(
        "Kubeconfig updated at {}",
        lifecycle.kubeconfig().path().display()
    ));
    Ok(())
}
