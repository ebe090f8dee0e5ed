//! Presentation shapes for predictions and history entries.

use serde::Serialize;
use verity_core::{EntryKey, HistoryEntry, PredictionResult};
use verity_gateway::HealthStatus;

/// The result panel shown after a successful prediction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionPanel {
    pub label: String,
    /// Fraction in `[0, 1]`.
    pub confidence: f64,
    /// Human form, e.g. `87.00%`.
    pub percent: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_version: Option<String>,
}

impl From<&PredictionResult> for PredictionPanel {
    fn from(result: &PredictionResult) -> Self {
        Self {
            label: result.label.to_string(),
            confidence: result.confidence.value(),
            percent: result.confidence.to_string(),
            model_version: result.model_version.clone(),
        }
    }
}

/// One history line. `#` is the 1-based position used by `/delete`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryRow {
    #[serde(rename = "#")]
    pub position: usize,
    pub id: Option<String>,
    pub text: String,
    pub label: String,
    pub confidence: String,
}

impl HistoryRow {
    #[must_use]
    pub fn from_entry(position: usize, entry: &HistoryEntry) -> Self {
        Self {
            position,
            id: match &entry.key {
                EntryKey::Id(id) => Some(id.clone()),
                EntryKey::Text(_) => None,
            },
            text: entry.text.clone(),
            label: entry.label.to_string(),
            confidence: entry.confidence.to_string(),
        }
    }
}

/// Number history entries from 1 in display order.
#[must_use]
pub fn history_rows(entries: &[HistoryEntry]) -> Vec<HistoryRow> {
    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| HistoryRow::from_entry(index + 1, entry))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteReport {
    pub deleted: String,
    pub by: &'static str,
}

impl From<&EntryKey> for DeleteReport {
    fn from(key: &EntryKey) -> Self {
        Self {
            deleted: key.as_str().to_string(),
            by: if key.is_durable() { "id" } else { "text" },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    pub status: String,
    pub model_loaded: bool,
    pub model_version: String,
}

impl From<HealthStatus> for HealthReport {
    fn from(health: HealthStatus) -> Self {
        Self {
            status: health.status,
            model_loaded: health.model_loaded,
            model_version: health.model_version.unwrap_or_else(|| "-".to_string()),
        }
    }
}
