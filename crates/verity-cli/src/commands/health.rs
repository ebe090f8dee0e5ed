use anyhow::Context;

use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;
use crate::output::view::HealthReport;

/// Handle `verity health`.
pub async fn handle(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let health = ctx
        .gateway
        .health()
        .await
        .context("Backend not reachable")?;

    let healthy = health.is_healthy();
    output(&HealthReport::from(health), flags.format)?;

    if !healthy {
        anyhow::bail!("backend is up but has no model loaded");
    }
    Ok(())
}
