use anyhow::Context;
use verity_core::EntryKey;

use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;
use crate::output::view::DeleteReport;

pub async fn run(key: &str, by_text: bool, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let key = parse_key(key, by_text)?;

    let session = ctx.session()?;
    session.delete(&key).await.context("Failed to delete item")?;

    output(&DeleteReport::from(&key), flags.format)
}

fn parse_key(raw: &str, by_text: bool) -> anyhow::Result<EntryKey> {
    if raw.trim().is_empty() {
        anyhow::bail!("history key must not be empty");
    }
    Ok(if by_text {
        EntryKey::Text(raw.to_string())
    } else {
        EntryKey::Id(raw.trim().to_string())
    })
}
