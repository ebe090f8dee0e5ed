//! # verity-gateway
//!
//! Request gateway for the Verity prediction API.
//!
//! Wraps every outbound call to the remote services behind one client and
//! normalizes failures into [`GatewayError`]:
//! - `POST /predict` classifies a text
//! - `GET /history?limit=n` lists past predictions, newest first
//! - `DELETE /history/{id}` or `DELETE /history?text=...` removes one
//! - `GET /health` reports model availability
//!
//! The gateway never touches local state. The [`Gateway`] trait is the seam
//! the session layer depends on, so tests can substitute an in-memory fake.

mod error;
mod health;
mod history;
mod http;
mod predict;
mod wire;

pub use error::{ErrorKind, GatewayError};

use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::num::NonZeroU32;
use std::time::Duration;
use verity_core::{EntryKey, HistoryEntry, NonEmptyText, PredictionResult};

// ── Types ──────────────────────────────────────────────────────────

/// Response from `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    /// `ok` when the service can serve predictions, `error` otherwise.
    pub status: String,
    /// Whether the classification model is loaded.
    pub model_loaded: bool,
    /// Registry version of the loaded model, if any.
    pub model_version: Option<String>,
}

impl HealthStatus {
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.status == "ok" && self.model_loaded
    }
}

// ── Contract ───────────────────────────────────────────────────────

/// Outbound operations the session layer relies on.
///
/// Implementations perform network I/O only and never mutate caller state.
pub trait Gateway {
    /// Classify `text`.
    fn predict(
        &self,
        text: &NonEmptyText,
    ) -> impl Future<Output = Result<PredictionResult, GatewayError>> + Send;

    /// List up to `limit` history entries in server order (newest first).
    fn list_history(
        &self,
        limit: NonZeroU32,
    ) -> impl Future<Output = Result<Vec<HistoryEntry>, GatewayError>> + Send;

    /// Delete the history entry (or entries, for a text key) addressed by `key`.
    ///
    /// A non-success status is a failure, even if nothing was deleted.
    fn delete_history(
        &self,
        key: &EntryKey,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send;
}

// ── Config ─────────────────────────────────────────────────────────

/// Immutable connection settings, fixed at gateway construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    base_url: Url,
    timeout: Duration,
}

impl GatewayConfig {
    /// Parse and normalize `base_url`.
    ///
    /// A trailing slash is added to the path so endpoints resolve beneath any
    /// path prefix (`http://host/api` → `http://host/api/predict`).
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidBaseUrl`] if the URL does not parse or
    /// is not an `http`/`https` base.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, GatewayError> {
        let invalid = |reason: String| GatewayError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason,
        };
        let mut url = Url::parse(base_url.trim()).map_err(|e| invalid(e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
        }
        if url.cannot_be_a_base() {
            return Err(invalid("cannot be a base URL".to_string()));
        }
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        url.set_query(None);
        url.set_fragment(None);
        Ok(Self {
            base_url: url,
            timeout,
        })
    }

    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Resolve a relative endpoint (e.g. `history?limit=20`) against the base.
    pub(crate) fn endpoint(&self, path: &str) -> Result<Url, GatewayError> {
        self.base_url
            .join(path)
            .map_err(|e| GatewayError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })
    }
}

// ── Client ─────────────────────────────────────────────────────────

/// reqwest-backed [`Gateway`] implementation.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    http: reqwest::Client,
    config: GatewayConfig,
}

impl HttpGateway {
    /// Build a client with the configured timeout applied to every request.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Http`] if the underlying `reqwest::Client`
    /// fails to build.
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("verity/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .build()?;
        Ok(Self { http, config })
    }

    #[must_use]
    pub const fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

impl Gateway for HttpGateway {
    async fn predict(&self, text: &NonEmptyText) -> Result<PredictionResult, GatewayError> {
        self.post_predict(text).await
    }

    async fn list_history(&self, limit: NonZeroU32) -> Result<Vec<HistoryEntry>, GatewayError> {
        self.get_history(limit).await
    }

    async fn delete_history(&self, key: &EntryKey) -> Result<(), GatewayError> {
        self.delete_entry(key).await
    }
}
