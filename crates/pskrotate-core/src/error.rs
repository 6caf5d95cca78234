// ── Core error types ──
//
// The rotation taxonomy. Consumers never see HTTP status codes directly:
// the `From<pskrotate_api::Error>` impl classifies transport-layer errors
// into retryable and terminal kinds.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{DeviceFamily, RunSummary};

/// Unified error type for the core crate.
#[derive(Debug, Clone, Error)]
pub enum CoreError {
    /// Credentials rejected. Fatal for the whole run.
    #[error("Authentication failed: {message}")]
    Auth { message: String },

    /// Rate limit, 5xx, timeout or connection failure. Retryable, bounded.
    #[error("Transient failure: {message}")]
    Transient {
        cause: TransientCause,
        message: String,
        /// `Retry-After` hint from the remote, if it sent one.
        retry_after: Option<Duration>,
    },

    /// The remote rejected the payload (e.g. PSK password policy).
    #[error("Rejected by remote validation: {message}")]
    Validation { message: String },

    /// Stale SSID index/name or vanished network.
    #[error("Not found: {message}")]
    NotFound { message: String },

    /// No SSID endpoint exists for this device family.
    #[error("Unsupported device family: {family}")]
    UnsupportedFamily { family: DeviceFamily },

    #[error("Organization not found: {selector}")]
    OrganizationNotFound { selector: String },

    /// Rejected at the configuration boundary before any remote call.
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Run cancelled")]
    Cancelled,

    /// A fatal failure stopped the run part-way. `summary` still holds one
    /// result per selected network, including those already updated.
    #[error("Run aborted at {network}: {cause}")]
    Aborted {
        network: String,
        cause: Box<CoreError>,
        summary: Box<RunSummary>,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

/// What made a [`CoreError::Transient`] failure transient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum TransientCause {
    /// HTTP 429.
    RateLimited,
    /// HTTP 5xx.
    Server,
    /// No response within the transport timeout.
    Timeout,
    /// The connection could not be established.
    Connect,
    /// The connection dropped while the request or body was in flight.
    Interrupted,
}

/// Data-free mirror of [`CoreError`] used in run reports.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ErrorKind {
    Auth,
    Transient,
    Validation,
    NotFound,
    UnsupportedFamily,
    Config,
    Cancelled,
    Internal,
}

impl CoreError {
    /// Only transient errors are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient { .. })
    }

    /// Errors that must abort the whole run rather than a single network.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Auth { .. })
    }

    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::Transient { retry_after, .. } => *retry_after,
            _ => None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Auth { .. } => ErrorKind::Auth,
            Self::Transient { .. } => ErrorKind::Transient,
            Self::Validation { .. } => ErrorKind::Validation,
            Self::NotFound { .. } | Self::OrganizationNotFound { .. } => ErrorKind::NotFound,
            Self::UnsupportedFamily { .. } => ErrorKind::UnsupportedFamily,
            Self::Config { .. } => ErrorKind::Config,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::Internal(_) => ErrorKind::Internal,
            Self::Aborted { cause, .. } => cause.kind(),
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<pskrotate_api::Error> for CoreError {
    fn from(err: pskrotate_api::Error) -> Self {
        use pskrotate_api::Error as Api;

        match err {
            Api::InvalidApiKey => CoreError::Auth {
                message: "Invalid API key".into(),
            },
            Api::Forbidden { message } | Api::InvalidKeyFormat { message } => {
                CoreError::Auth { message }
            }
            Api::RateLimited { retry_after } => CoreError::Transient {
                cause: TransientCause::RateLimited,
                message: "rate limited (HTTP 429)".into(),
                retry_after,
            },
            Api::Transport(ref e) if e.is_timeout() => CoreError::Transient {
                cause: TransientCause::Timeout,
                message: format!("request timed out: {e}"),
                retry_after: None,
            },
            Api::Transport(ref e) if e.is_connect() => CoreError::Transient {
                cause: TransientCause::Connect,
                message: format!("connection failed: {e}"),
                retry_after: None,
            },
            Api::Transport(ref e) if e.is_request() || e.is_body() => CoreError::Transient {
                cause: TransientCause::Interrupted,
                message: format!("connection interrupted: {e}"),
                retry_after: None,
            },
            Api::Transport(e) => CoreError::Internal(format!("HTTP transport error: {e}")),
            Api::Api { status, errors } => {
                let message = if errors.is_empty() {
                    format!("HTTP {status}")
                } else {
                    format!("HTTP {status}: {}", errors.join("; "))
                };
                match status {
                    404 => CoreError::NotFound { message },
                    400 | 422 => CoreError::Validation { message },
                    s if s >= 500 => CoreError::Transient {
                        cause: TransientCause::Server,
                        message,
                        retry_after: None,
                    },
                    _ => CoreError::Internal(message),
                }
            }
            Api::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            Api::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}
