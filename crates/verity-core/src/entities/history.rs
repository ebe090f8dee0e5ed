use serde::{Deserialize, Serialize};
use std::fmt;

use crate::confidence::Confidence;
use crate::enums::Label;

/// Identifier used to delete a history entry.
///
/// Backends that expose an `id` field get a durable key; older backends only
/// allow deleting by the submitted text, which is not unique.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum EntryKey {
    /// Server-assigned key. Numeric ids are kept in their decimal form.
    Id(String),
    /// The entry's text, used when the server exposes no key.
    Text(String),
}

impl EntryKey {
    #[must_use]
    pub const fn is_durable(&self) -> bool {
        matches!(self, Self::Id(_))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Id(value) | Self::Text(value) => value,
        }
    }
}

impl fmt::Display for EntryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "#{id}"),
            Self::Text(text) => write!(f, "{text:?}"),
        }
    }
}

/// A locally cached record of one past prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub key: EntryKey,
    pub text: String,
    pub label: Label,
    pub confidence: Confidence,
}

impl HistoryEntry {
    /// Whether a delete addressed to `key` covers this entry.
    ///
    /// A durable key matches only the entry carrying that key. A text key
    /// matches every entry with identical text, whatever its own key.
    #[must_use]
    pub fn matches(&self, key: &EntryKey) -> bool {
        match key {
            EntryKey::Id(_) => &self.key == key,
            EntryKey::Text(text) => &self.text == text,
        }
    }

    /// Whether `other` records the same prediction (same text and label).
    #[must_use]
    pub fn same_prediction(&self, other: &Self) -> bool {
        self.text == other.text && self.label == other.label
    }
}
