//! General application configuration.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default history page size, matching the server's own default.
const fn default_history_limit() -> u32 {
    20
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct GeneralConfig {
    /// How many history entries to load at startup and on refresh.
    #[serde(default = "default_history_limit")]
    pub history_limit: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            history_limit: default_history_limit(),
        }
    }
}

impl GeneralConfig {
    /// Reject a zero history limit.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for `general.history_limit = 0`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.history_limit == 0 {
            return Err(ConfigError::invalid(
                "general.history_limit",
                "must be greater than zero",
            ));
        }
        Ok(())
    }
}
