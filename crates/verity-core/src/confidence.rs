//! Canonical confidence representation.
//!
//! Backends have reported confidence either as a raw fraction (`0.87`) or as a
//! pre-formatted percentage token (`"87.00%"`). Inside Verity a confidence is
//! always a fraction in `[0, 1]`; the string forms are accepted only through
//! [`FromStr`] at the gateway boundary.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::CoreError;

/// Self-reported certainty of the classifier, as a fraction in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Confidence(f64);

impl Confidence {
    /// Build a confidence from a raw fraction.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidConfidence`] when `value` is not finite or
    /// lies outside `[0, 1]`.
    pub fn from_fraction(value: f64) -> Result<Self, CoreError> {
        if !value.is_finite() {
            return Err(CoreError::confidence(value, "not a finite number"));
        }
        if !(0.0..=1.0).contains(&value) {
            return Err(CoreError::confidence(
                value,
                "fraction must lie within [0, 1]",
            ));
        }
        Ok(Self(value))
    }

    /// Build a confidence from a percentage in `[0, 100]`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidConfidence`] when `value` is not finite or
    /// lies outside `[0, 100]`.
    pub fn from_percent(value: f64) -> Result<Self, CoreError> {
        if !value.is_finite() || !(0.0..=100.0).contains(&value) {
            return Err(CoreError::confidence(
                value,
                "percentage must lie within [0, 100]",
            ));
        }
        Ok(Self(value / 100.0))
    }

    /// The fraction in `[0, 1]`.
    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }

    /// The same value on a `0..=100` scale, for bars and labels.
    #[must_use]
    pub fn percent(self) -> f64 {
        self.0 * 100.0
    }
}

impl TryFrom<f64> for Confidence {
    type Error = CoreError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::from_fraction(value)
    }
}

impl From<Confidence> for f64 {
    fn from(confidence: Confidence) -> Self {
        confidence.0
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}%", self.percent())
    }
}

impl FromStr for Confidence {
    type Err = CoreError;

    /// Parse either a percentage token (`"87.5%"`) or a bare fraction
    /// (`"0.875"`). A bare number above 1 is rejected: without a `%` suffix
    /// its unit is ambiguous.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Some(number) = trimmed.strip_suffix('%') {
            let value: f64 = number
                .trim()
                .parse()
                .map_err(|_| CoreError::confidence(s, "percentage is not numeric"))?;
            return Self::from_percent(value);
        }

        let value: f64 = trimmed
            .parse()
            .map_err(|_| CoreError::confidence(s, "not numeric"))?;
        if value > 1.0 && value.is_finite() {
            return Err(CoreError::confidence(
                s,
                "ambiguous units; expected a fraction or a percentage with '%'",
            ));
        }
        Self::from_fraction(value)
    }
}
