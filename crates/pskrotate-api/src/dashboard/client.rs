// Hand-crafted async HTTP client for the Dashboard REST API (v1).
//
// Base path: /api/v1/
// Auth: Authorization: Bearer <key>

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue, LINK, RETRY_AFTER};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

/// Default Dashboard API root.
pub const DEFAULT_BASE_URL: &str = "https://api.meraki.com/api/v1/";

// ── Error response shape from the Dashboard API ──────────────────────

#[derive(serde::Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    errors: Vec<String>,
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the Dashboard management API.
///
/// Uses bearer API-key authentication and communicates via JSON REST
/// endpoints. Never retries: transient conditions are surfaced as
/// [`Error::RateLimited`] / 5xx [`Error::Api`] for the caller to decide.
pub struct DashboardClient {
    http: reqwest::Client,
    base_url: Url,
}

impl DashboardClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from an API key and transport config.
    ///
    /// Injects `Authorization: Bearer <key>` as a sensitive default header.
    pub fn from_api_key(
        base_url: &str,
        api_key: &SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        let mut value = HeaderValue::from_str(&format!("Bearer {}", api_key.expose_secret()))
            .map_err(|e| Error::InvalidKeyFormat {
                message: e.to_string(),
            })?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);

        let http = transport.build_client_with_headers(headers)?;
        let base_url = Self::normalize_base_url(base_url)?;

        Ok(Self { http, base_url })
    }

    /// Wrap an existing `reqwest::Client` (caller manages auth headers).
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self { http, base_url })
    }

    /// Guarantee a trailing slash so relative joins keep the `/api/v1` path.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{path}/"));
        Ok(url)
    }

    /// The API root every path is joined onto.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Join a relative path (e.g. `"organizations"`) onto the base URL.
    fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path)?)
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("GET {url}");

        let resp = self.http.get(url).send().await?;
        self.handle_response(resp).await
    }

    pub(crate) async fn put<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("PUT {url}");

        let resp = self.http.put(url).json(body).send().await?;
        self.handle_response(resp).await
    }

    /// GET every page of a list endpoint, following `Link: <..>; rel=next`.
    pub(crate) async fn get_paginated<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<Vec<T>, Error> {
        let mut url = self.url(path)?;
        url.query_pairs_mut()
            .extend_pairs(params.iter().map(|(k, v)| (*k, v.as_str())));

        let mut all = Vec::new();
        let mut next = Some(url);

        while let Some(url) = next.take() {
            debug!("GET {url}");
            let resp = self.http.get(url).send().await?;
            next = next_link(resp.headers());
            let page: Vec<T> = self.handle_response(resp).await?;
            trace!(received = page.len(), more = next.is_some(), "page fetched");
            all.extend(page);
        }

        Ok(all)
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            serde_json::from_str(&body).map_err(|e| {
                let preview: String = body.chars().take(200).collect();
                Error::Deserialization {
                    message: format!("{e} (body preview: {preview:?})"),
                    body,
                }
            })
        } else {
            Err(parse_error(status, resp).await)
        }
    }
}

// ── Helpers ──────────────────────────────────────────────────────────

/// Classify a non-success response. Headers are read before the body.
async fn parse_error(status: StatusCode, resp: reqwest::Response) -> Error {
    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after = parse_retry_after(resp.headers());
        return Error::RateLimited { retry_after };
    }
    if status == StatusCode::UNAUTHORIZED {
        return Error::InvalidApiKey;
    }

    let raw = resp.text().await.unwrap_or_default();
    let errors = match serde_json::from_str::<ErrorResponse>(&raw) {
        Ok(parsed) if !parsed.errors.is_empty() => parsed.errors,
        _ if raw.trim().is_empty() => vec![status.to_string()],
        _ => vec![raw.chars().take(200).collect()],
    };

    if status == StatusCode::FORBIDDEN {
        return Error::Forbidden {
            message: errors.join("; "),
        };
    }

    Error::Api {
        status: status.as_u16(),
        errors,
    }
}

/// `Retry-After` in delta-seconds form. HTTP-date values are ignored.
fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    let raw = headers.get(RETRY_AFTER)?.to_str().ok()?.trim();
    raw.parse::<u64>()
        .ok()
        .map(Duration::from_secs)
        .or_else(|| {
            raw.parse::<f64>()
                .ok()
                .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
        })
}

/// Extract the `rel=next` target from an RFC 5988 `Link` header.
fn next_link(headers: &HeaderMap) -> Option<Url> {
    let raw = headers.get(LINK)?.to_str().ok()?;
    raw.split(',').find_map(|part| {
        let (target, params) = part.split_once(';')?;
        let is_next = params.split(';').any(|p| {
            let p = p.trim();
            p == "rel=next" || p == "rel=\"next\""
        });
        if !is_next {
            return None;
        }
        let target = target.trim().strip_prefix('<')?.strip_suffix('>')?;
        Url::parse(target).ok()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(name: reqwest::header::HeaderName, value: &str) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(name, HeaderValue::from_str(value).unwrap_or(HeaderValue::from_static("")));
        map
    }

    #[test]
    fn next_link_picks_rel_next() {
        let map = headers(
            LINK,
            "<https://api.example.com/api/v1/organizations/1/networks?startingAfter=a>; rel=first, \
             <https://api.example.com/api/v1/organizations/1/networks?startingAfter=N_2>; rel=next",
        );
        let next = next_link(&map).map(|u| u.to_string());
        assert_eq!(
            next.as_deref(),
            Some("https://api.example.com/api/v1/organizations/1/networks?startingAfter=N_2")
        );
    }

    #[test]
    fn next_link_absent_on_last_page() {
        let map = headers(LINK, "<https://api.example.com/a>; rel=prev");
        assert!(next_link(&map).is_none());
        assert!(next_link(&HeaderMap::new()).is_none());
    }

    #[test]
    fn retry_after_seconds() {
        let map = headers(RETRY_AFTER, "3");
        assert_eq!(parse_retry_after(&map), Some(Duration::from_secs(3)));
    }

    #[test]
    fn retry_after_out_of_range_is_ignored() {
        assert_eq!(parse_retry_after(&headers(RETRY_AFTER, "1e30")), None);
        assert_eq!(parse_retry_after(&headers(RETRY_AFTER, "-2.5")), None);
        assert_eq!(parse_retry_after(&headers(RETRY_AFTER, "NaN")), None);
        assert_eq!(
            parse_retry_after(&headers(RETRY_AFTER, "1.5")),
            Some(Duration::from_millis(1500))
        );
    }

    #[test]
    fn retry_after_http_date_is_ignored() {
        let map = headers(RETRY_AFTER, "Wed, 21 Oct 2015 07:28:00 GMT");
        assert_eq!(parse_retry_after(&map), None);
    }

    #[test]
    fn base_url_gains_trailing_slash() {
        let client =
            DashboardClient::from_reqwest("https://api.example.com/api/v1", reqwest::Client::new());
        let client = client.ok();
        assert_eq!(
            client.as_ref().map(|c| c.base_url().as_str()),
            Some("https://api.example.com/api/v1/")
        );
    }
}
