//! Status command
//!
//! Always prints a status document; failures end up in its `error` field.

use anyhow::Result;
use minc_cluster::Lifecycle;
use minc_core::ClusterStatus;

use crate::commands::Context;

pub async fn run(ctx: &Context) -> Result<()> {
    let status = collect(ctx.lifecycle(false), &ctx.provider()).await;
    println!("{}", serde_json::to_string_pretty(&status)?);
    Ok(())
}

/// Status of the cluster, or a default one carrying the setup failure
async fn collect(lifecycle: Result<Lifecycle>, provider: &str) -> ClusterStatus {
    match lifecycle {
        Ok(lifecycle) => lifecycle.status(provider).await,
        Err(e) => ClusterStatus::default().with_error(e),
    }
}
