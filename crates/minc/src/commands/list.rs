//! List command

use std::io::Write;

use anyhow::Result;

use crate::commands::Context;

pub async fn run(ctx: &Context) -> Result<()> {
    ctx.ensure_engine_installed()?;

    let raw = ctx.lifecycle(false)?.list(&ctx.provider()).await?;
    std::io::stdout().write_all(&raw)?;
    Ok(())
}
