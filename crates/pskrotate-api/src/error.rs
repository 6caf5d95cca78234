use std::time::Duration;

use thiserror::Error;

/// Top-level error type for the `pskrotate-api` crate.
///
/// The client is a thin, honest transport: it reports what the remote
/// said and never retries on its own. `pskrotate-core` maps these into
/// the retry/abort taxonomy.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// API key rejected (HTTP 401).
    #[error("Invalid API key")]
    InvalidApiKey,

    /// Key is valid but lacks access to the resource (HTTP 403).
    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    /// Key could not be turned into a header value.
    #[error("Invalid API key header value: {message}")]
    InvalidKeyFormat { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Rate limited (HTTP 429). Carries the `Retry-After` hint when present.
    #[error("Rate limited{}", retry_after.map(|d| format!(" -- retry after {}s", d.as_secs())).unwrap_or_default())]
    RateLimited { retry_after: Option<Duration> },

    // ── API ─────────────────────────────────────────────────────────
    /// Non-success status with the `{"errors": [...]}` body, if any.
    #[error("API error (HTTP {status}): {}", errors.join("; "))]
    Api { status: u16, errors: Vec<String> },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if the credentials were rejected.
    pub fn is_auth(&self) -> bool {
        matches!(
            self,
            Self::InvalidApiKey | Self::Forbidden { .. } | Self::InvalidKeyFormat { .. }
        )
    }

    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => {
                e.is_timeout() || e.is_connect() || e.is_request() || e.is_body()
            }
            Self::RateLimited { .. } => true,
            Self::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Api { status: 404, .. })
    }

    /// Returns `true` if the remote rejected the request payload.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Api { status: 400 | 422, .. })
    }

    /// The `Retry-After` hint, if the remote supplied one.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after } => *retry_after,
            _ => None,
        }
    }

    /// HTTP status associated with this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::InvalidApiKey => Some(401),
            Self::Forbidden { .. } => Some(403),
            Self::RateLimited { .. } => Some(429),
            Self::Api { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
