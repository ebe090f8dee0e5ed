//! # verity-config
//!
//! Layered configuration loading for Verity using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Explicit overrides (CLI flags such as `--backend`)
//! 2. Environment variables (`VERITY_*` prefix, `__` as separator)
//! 3. Project-level `.verity/config.toml`
//! 4. User-level `~/.config/verity/config.toml`
//! 5. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `VERITY_BACKEND__BASE_URL` -> `backend.base_url`,
//! `VERITY_GENERAL__HISTORY_LIMIT` -> `general.history_limit`, etc.
//!
//! # Usage
//!
//! ```no_run
//! use verity_config::VerityConfig;
//!
//! let config = VerityConfig::load_with_dotenv().expect("config");
//! println!("backend: {}", config.backend.base_url);
//! ```

mod backend;
mod error;
mod general;

pub use backend::BackendConfig;
pub use error::ConfigError;
pub use general::GeneralConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct VerityConfig {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub general: GeneralConfig,
}

/// Values that beat every other configuration source.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub base_url: Option<String>,
    pub timeout_ms: Option<u64>,
}

impl VerityConfig {
    /// Load configuration from all sources (TOML files + environment variables)
    /// and validate it.
    ///
    /// Does NOT call `dotenvy`; use [`Self::load_with_dotenv`] for `.env` support.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if extraction fails or a value is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with_overrides(&ConfigOverrides::default())
    }

    /// Load configuration with `.env` file support.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if extraction fails or a value is invalid.
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Load configuration with explicit overrides layered on top of everything.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if extraction fails or a value is invalid.
    pub fn load_with_overrides(overrides: &ConfigOverrides) -> Result<Self, ConfigError> {
        let mut figment = Self::figment();
        if let Some(base_url) = &overrides.base_url {
            figment = figment.merge(Serialized::default("backend.base_url", base_url));
        }
        if let Some(timeout_ms) = overrides.timeout_ms {
            figment = figment.merge(Serialized::default("backend.timeout_ms", timeout_ms));
        }
        Self::extract(&figment)
    }

    /// Extract and validate a config from an arbitrary figment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if extraction fails or a value is invalid.
    pub fn extract(figment: &Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate every section.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for the first invalid field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.backend.validate()?;
        self.general.validate()
    }

    /// Build the figment provider chain.
    ///
    /// This is public so tests can inspect the figment directly or add
    /// additional providers on top.
    #[must_use]
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Layer 1: User-global config
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        // Layer 2: Project-local config
        let local_path = PathBuf::from(".verity/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        // Layer 3: Environment variables
        figment.merge(Env::prefixed("VERITY_").split("__"))
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("verity").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = VerityConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.general.history_limit, 20);
        assert_eq!(config.backend.timeout_ms, 10_000);
    }

    #[test]
    fn figment_builds_without_files() {
        figment::Jail::expect_with(|_jail| {
            let config: VerityConfig = VerityConfig::figment().extract()?;
            assert_eq!(config.backend.base_url, "http://localhost:8000");
            Ok(())
        });
    }
}
