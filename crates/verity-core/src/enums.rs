//! Classification labels and the request lifecycle state machine.
//!
//! `Label` serializes in uppercase (`FAKE`/`REAL`) to match the wire format.
//! `RequestPhase` uses `snake_case` and provides `allowed_next_states()` so the
//! workflow can enforce valid transitions instead of juggling loading flags.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::CoreError;

// ---------------------------------------------------------------------------
// Label
// ---------------------------------------------------------------------------

/// Categorical output of the classification service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Label {
    Fake,
    Real,
}

impl Label {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fake => "FAKE",
            Self::Real => "REAL",
        }
    }

    /// `FAKE` is rendered as the failing verdict, `REAL` as the passing one.
    #[must_use]
    pub const fn is_fake(self) -> bool {
        matches!(self, Self::Fake)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Label {
    type Err = CoreError;

    /// Accepts `FAKE`/`REAL` in any ASCII case, ignoring surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("fake") {
            Ok(Self::Fake)
        } else if trimmed.eq_ignore_ascii_case("real") {
            Ok(Self::Real)
        } else {
            Err(CoreError::UnknownLabel(s.to_string()))
        }
    }
}

// ---------------------------------------------------------------------------
// RequestPhase
// ---------------------------------------------------------------------------

/// Lifecycle of the prediction request owned by a workflow.
///
/// ```text
/// idle ──submit──▶ submitting ──ok──▶ succeeded ──submit──▶ submitting
///                             ──err─▶ failed    ──submit──▶ submitting
/// ```
///
/// There is no terminal state; `succeeded` and `failed` accept the next
/// submission just like `idle`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestPhase {
    #[default]
    Idle,
    Submitting,
    Succeeded,
    Failed,
}

impl RequestPhase {
    /// Valid next states from the current state.
    #[must_use]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::Idle | Self::Succeeded | Self::Failed => &[Self::Submitting],
            Self::Submitting => &[Self::Succeeded, Self::Failed],
        }
    }

    /// Check whether transitioning to `next` is allowed.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    /// Validate a transition, returning the target phase when allowed.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidTransition`] when `next` is not reachable
    /// from `self`.
    pub fn transition_to(self, next: Self) -> Result<Self, CoreError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(CoreError::InvalidTransition {
                from: self,
                to: next,
            })
        }
    }

    /// Whether a new submission may start. False only while a request is in flight.
    #[must_use]
    pub const fn accepts_submit(self) -> bool {
        !matches!(self, Self::Submitting)
    }

    /// Whether the result panel is visible.
    #[must_use]
    pub const fn shows_result(self) -> bool {
        matches!(self, Self::Succeeded)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Submitting => "submitting",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for RequestPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
