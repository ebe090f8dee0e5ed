use anyhow::Context;
use verity_gateway::Gateway;

use crate::cli::GlobalFlags;
use crate::commands::shared::limit::nonzero_limit;
use crate::context::AppContext;
use crate::output::output;
use crate::output::view::history_rows;

pub async fn run(limit: Option<u32>, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let limit = nonzero_limit(limit, flags.limit, ctx.config.general.history_limit)?;

    let entries = ctx
        .gateway
        .list_history(limit)
        .await
        .context("History could not be loaded")?;
    tracing::debug!(entries = entries.len(), %limit, "history listed");

    output(&history_rows(&entries), flags.format)
}
