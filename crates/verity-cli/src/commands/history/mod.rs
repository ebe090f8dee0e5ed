mod delete;
mod list;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::HistoryCommands;
use crate::context::AppContext;

/// Handle `verity history`.
pub async fn handle(
    action: &HistoryCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        HistoryCommands::List { limit } => list::run(*limit, ctx, flags).await,
        HistoryCommands::Delete { key, text } => delete::run(key, *text, ctx, flags).await,
    }
}
