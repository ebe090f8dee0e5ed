//! Gateway error types.

use thiserror::Error;

/// Coarse classification used by callers deciding what to tell the user.
///
/// Every kind is reported to the user as a network failure; `Decode` and
/// `Timeout` only refine the reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Network,
    Decode,
    Timeout,
}

/// Errors that can occur when calling the prediction or history endpoints.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// HTTP transport error (connection refused, DNS, TLS, broken body).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service returned a non-success status code.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code returned by the service.
        status: u16,
        /// Error message or response body.
        message: String,
    },

    /// The response body does not match the expected shape.
    #[error("decode error: {0}")]
    Decode(String),

    /// No response arrived within the configured timeout.
    #[error("request timed out after {millis}ms")]
    Timeout {
        /// The timeout that elapsed, in milliseconds.
        millis: u64,
    },

    /// The service returned a 429 Too Many Requests response.
    #[error("rate limited, retry after {retry_after_secs}s")]
    RateLimited {
        /// Seconds to wait before retrying.
        retry_after_secs: u64,
    },

    /// The configured base URL cannot address the service.
    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

impl GatewayError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Decode(_) => ErrorKind::Decode,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::Http(_) | Self::Api { .. } | Self::RateLimited { .. } | Self::InvalidBaseUrl { .. } => {
                ErrorKind::Network
            }
        }
    }

    /// Status code for errors that carry one.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::RateLimited { .. } => Some(429),
            _ => None,
        }
    }
}
