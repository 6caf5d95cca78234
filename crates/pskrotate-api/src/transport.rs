// Shared transport configuration for building reqwest::Client instances.
//
// Both the Dashboard and Webex clients share timeout and user-agent
// settings through this module.

use std::time::Duration;

use reqwest::header::HeaderMap;

use crate::error::Error;

const DEFAULT_USER_AGENT: &str = concat!("pskrotate/", env!("CARGO_PKG_VERSION"));

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Per-request timeout. Every remote call carries one.
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: DEFAULT_USER_AGENT.into(),
        }
    }
}

impl TransportConfig {
    /// Config with a custom timeout and the default user agent.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            ..Self::default()
        }
    }

    /// Build a `reqwest::Client` with additional default headers.
    ///
    /// Used by the API clients to inject their `Authorization` header.
    pub fn build_client_with_headers(&self, headers: HeaderMap) -> Result<reqwest::Client, Error> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent.as_str())
            .default_headers(headers)
            .build()
            .map_err(Error::Transport)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_timeout_is_finite() {
        let cfg = TransportConfig::default();
        assert_eq!(cfg.timeout, Duration::from_secs(30));
        assert!(cfg.user_agent.starts_with("pskrotate/"));
    }

    #[test]
    fn with_timeout_keeps_user_agent() {
        let cfg = TransportConfig::with_timeout(Duration::from_secs(10));
        assert_eq!(cfg.timeout, Duration::from_secs(10));
        assert_eq!(cfg.user_agent, TransportConfig::default().user_agent);
    }
}
