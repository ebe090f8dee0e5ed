//! Remote classification backend configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::error::ConfigError;

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

/// Default per-request timeout in milliseconds.
const fn default_timeout_ms() -> u64 {
    10_000
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BackendConfig {
    /// Base URL of the prediction API (e.g., `http://localhost:8000`).
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl BackendConfig {
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Check that the base URL parses as an http(s) URL with a host, and that
    /// the timeout is non-zero.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let raw = self.base_url.trim();
        let url = Url::parse(raw).map_err(|e| {
            ConfigError::invalid("backend.base_url", format!("cannot parse '{raw}': {e}"))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::invalid(
                "backend.base_url",
                format!("expected http(s) URL, got '{raw}'"),
            ));
        }
        if url.host_str().is_none_or(str::is_empty) {
            return Err(ConfigError::invalid("backend.base_url", "missing host"));
        }
        if self.timeout_ms == 0 {
            return Err(ConfigError::invalid(
                "backend.timeout_ms",
                "must be greater than zero",
            ));
        }
        Ok(())
    }
}
