//! Wire shapes of the prediction API and their translation to core types.
//!
//! Two backend revisions are in the field:
//! - confidence as a raw fraction (`0.87`) or as a formatted token (`"87.0%"`)
//! - history rows with or without an `id` field
//!
//! Both are accepted here and converted to the canonical core shapes, so
//! nothing past the gateway sees ambiguous units or optional keys.

use serde::{Deserialize, Serialize};
use verity_core::{Confidence, EntryKey, HistoryEntry, Label, PredictionResult};

use crate::HealthStatus;
use crate::error::GatewayError;

#[derive(Debug, Serialize)]
pub(crate) struct PredictRequest<'a> {
    pub text: &'a str,
}

/// Confidence as either a number or a display string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum RawConfidence {
    Fraction(f64),
    Formatted(String),
}

impl RawConfidence {
    fn canonical(&self) -> Result<Confidence, GatewayError> {
        match self {
            Self::Fraction(value) => Confidence::from_fraction(*value),
            Self::Formatted(token) => token.parse(),
        }
        .map_err(|e| GatewayError::Decode(e.to_string()))
    }
}

/// Server identifiers are integers on the current backend; strings are
/// accepted too.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum RawId {
    Number(i64),
    Text(String),
}

impl RawId {
    fn into_key(self) -> EntryKey {
        match self {
            Self::Number(n) => EntryKey::Id(n.to_string()),
            Self::Text(s) => EntryKey::Id(s),
        }
    }
}

/// Model versions come from the model registry as strings or integers.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum RawVersion {
    Number(i64),
    Text(String),
}

impl RawVersion {
    fn into_string(self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s,
        }
    }
}

fn parse_label(raw: &str) -> Result<Label, GatewayError> {
    raw.parse().map_err(|e: verity_core::CoreError| GatewayError::Decode(e.to_string()))
}

#[derive(Debug, Deserialize)]
pub(crate) struct PredictResponse {
    label: String,
    confidence: RawConfidence,
    #[serde(default)]
    model_version: Option<RawVersion>,
}

impl TryFrom<PredictResponse> for PredictionResult {
    type Error = GatewayError;

    fn try_from(resp: PredictResponse) -> Result<Self, Self::Error> {
        Ok(Self {
            label: parse_label(&resp.label)?,
            confidence: resp.confidence.canonical()?,
            model_version: resp.model_version.map(RawVersion::into_string),
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct HistoryItem {
    #[serde(default)]
    id: Option<RawId>,
    text: String,
    label: String,
    confidence: RawConfidence,
}

impl TryFrom<HistoryItem> for HistoryEntry {
    type Error = GatewayError;

    fn try_from(item: HistoryItem) -> Result<Self, Self::Error> {
        if item.text.trim().is_empty() {
            return Err(GatewayError::Decode("history entry has empty text".to_string()));
        }
        let label = parse_label(&item.label)?;
        let confidence = item.confidence.canonical()?;
        let key = item
            .id
            .map_or_else(|| EntryKey::Text(item.text.clone()), RawId::into_key);
        Ok(Self {
            key,
            text: item.text,
            label,
            confidence,
        })
    }
}

/// Convert a list response, preserving server order.
pub(crate) fn history_entries(items: Vec<HistoryItem>) -> Result<Vec<HistoryEntry>, GatewayError> {
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            HistoryEntry::try_from(item).map_err(|e| match e {
                GatewayError::Decode(reason) => {
                    GatewayError::Decode(format!("history[{index}]: {reason}"))
                }
                other => other,
            })
        })
        .collect()
}

#[derive(Debug, Deserialize)]
pub(crate) struct HealthResponse {
    status: String,
    #[serde(default)]
    model_loaded: bool,
    #[serde(default)]
    model_version: Option<RawVersion>,
}

impl From<HealthResponse> for HealthStatus {
    fn from(resp: HealthResponse) -> Self {
        Self {
            status: resp.status,
            model_loaded: resp.model_loaded,
            model_version: resp.model_version.map(RawVersion::into_string),
        }
    }
}
