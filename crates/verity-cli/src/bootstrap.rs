use anyhow::Context;
use verity_config::{ConfigOverrides, VerityConfig};

use crate::cli::GlobalFlags;

/// Load `.env`, then the layered config with command-line overrides on top.
pub fn load_config(flags: &GlobalFlags) -> anyhow::Result<VerityConfig> {
    load_dotenv()?;

    let overrides = overrides_from_flags(flags);
    let config = VerityConfig::load_with_overrides(&overrides)
        .context("failed to load verity configuration")?;

    tracing::debug!(
        base_url = %config.backend.base_url,
        timeout_ms = config.backend.timeout_ms,
        history_limit = config.general.history_limit,
        "configuration loaded"
    );
    Ok(config)
}

fn load_dotenv() -> anyhow::Result<()> {
    match dotenvy::dotenv() {
        Ok(path) => {
            tracing::debug!(path = %path.display(), "loaded dotenv file");
            Ok(())
        }
        Err(error) if error.not_found() => Ok(()),
        Err(error) => Err(error).context("failed to load .env file"),
    }
}

fn overrides_from_flags(flags: &GlobalFlags) -> ConfigOverrides {
    ConfigOverrides {
        base_url: flags.backend.clone(),
        timeout_ms: flags.timeout_ms,
    }
}
