//! User-visible notifications raised by failed operations.

use std::fmt;
use verity_core::EntryKey;

/// A blocking notification naming the action that failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// A prediction could not be obtained.
    BackendUnreachable { detail: String },
    /// A history entry could not be deleted.
    DeleteFailed { key: EntryKey, detail: String },
    /// The history list could not be loaded or refreshed.
    HistoryUnavailable { detail: String },
}

impl Notice {
    #[must_use]
    pub const fn headline(&self) -> &'static str {
        match self {
            Self::BackendUnreachable { .. } => "Backend not reachable",
            Self::DeleteFailed { .. } => "Failed to delete item",
            Self::HistoryUnavailable { .. } => "History could not be loaded",
        }
    }

    #[must_use]
    pub fn detail(&self) -> &str {
        match self {
            Self::BackendUnreachable { detail }
            | Self::DeleteFailed { detail, .. }
            | Self::HistoryUnavailable { detail } => detail,
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.headline(), self.detail())
    }
}
