//! Cross-cutting error types for Verity.
//!
//! This module defines errors that can originate from any crate in the system.
//! Transport errors (`GatewayError`) and configuration errors (`ConfigError`)
//! live in their respective crates. The binary converges all of them through
//! `anyhow`.

use thiserror::Error;

use crate::enums::RequestPhase;

/// Errors that can be raised by any Verity crate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Submitted text is empty or whitespace-only.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A label string is not one of `FAKE` or `REAL`.
    #[error("Unrecognized label: {0:?}")]
    UnknownLabel(String),

    /// A confidence value cannot be expressed as a fraction in `[0, 1]`.
    #[error("Invalid confidence {value:?}: {reason}")]
    InvalidConfidence { value: String, reason: String },

    /// A request phase transition was attempted that is not allowed.
    #[error("Invalid phase transition from {from} to {to}")]
    InvalidTransition {
        from: RequestPhase,
        to: RequestPhase,
    },
}

impl CoreError {
    pub(crate) fn confidence(value: impl ToString, reason: &str) -> Self {
        Self::InvalidConfidence {
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}
