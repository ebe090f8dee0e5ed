use std::num::NonZeroU32;

use anyhow::Context;
use verity_config::VerityConfig;
use verity_gateway::{GatewayConfig, HttpGateway};
use verity_session::{Session, SessionOptions};

/// Shared state for command handlers.
pub struct AppContext {
    pub config: VerityConfig,
    pub gateway: HttpGateway,
}

impl AppContext {
    pub fn init(config: VerityConfig) -> anyhow::Result<Self> {
        let gateway_config =
            GatewayConfig::new(&config.backend.base_url, config.backend.timeout())
                .context("invalid backend configuration")?;
        let gateway =
            HttpGateway::new(gateway_config).context("failed to build the HTTP client")?;

        Ok(Self { config, gateway })
    }

    /// Start a fresh session sharing this context's HTTP client.
    pub fn session(&self) -> anyhow::Result<Session<HttpGateway>> {
        Ok(Session::new(self.gateway.clone(), self.session_options()?))
    }

    fn session_options(&self) -> anyhow::Result<SessionOptions> {
        let history_limit = NonZeroU32::new(self.config.general.history_limit)
            .context("general.history_limit must be at least 1")?;
        Ok(SessionOptions {
            history_limit,
            request_timeout: self.config.backend.timeout(),
        })
    }
}
