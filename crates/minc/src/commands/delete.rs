//! Delete command

use anyhow::Result;

use crate::commands::Context;
use crate::output;

pub async fn run(ctx: &Context) -> Result<()> {
    ctx.ensure_engine_installed()?;

    let lifecycle = ctx.lifecycle(true)?;
    lifecycle.delete(&ctx.provider()).await?;

    output::success("MicroShift cluster deleted");
    Ok(())
}
