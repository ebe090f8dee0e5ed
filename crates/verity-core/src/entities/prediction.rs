use serde::{Deserialize, Serialize};

use crate::confidence::Confidence;
use crate::entities::{EntryKey, HistoryEntry};
use crate::enums::Label;
use crate::text::NonEmptyText;

/// A classification returned by the prediction service.
///
/// `label` and `confidence` are always present together; there is no partial
/// result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub label: Label,
    pub confidence: Confidence,
    /// Registry version of the model that produced the label, when reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_version: Option<String>,
}

impl PredictionResult {
    #[must_use]
    pub const fn new(label: Label, confidence: Confidence) -> Self {
        Self {
            label,
            confidence,
            model_version: None,
        }
    }

    /// Build the history entry recorded for `text` after this result arrived.
    ///
    /// The predict response carries no server identifier, so the entry is
    /// keyed by its text until a later reconcile replaces it with the server's
    /// copy.
    #[must_use]
    pub fn to_history_entry(&self, text: &NonEmptyText) -> HistoryEntry {
        HistoryEntry {
            key: EntryKey::Text(text.as_str().to_string()),
            text: text.as_str().to_string(),
            label: self.label,
            confidence: self.confidence,
        }
    }
}
