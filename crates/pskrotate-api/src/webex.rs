// Webex messaging client.
//
// Only what the notifier needs: post a markdown message into a room the
// bot already belongs to. Room provisioning is handled out of band.

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

/// Default Webex API root.
pub const DEFAULT_WEBEX_URL: &str = "https://webexapis.com/v1/";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateMessage<'a> {
    room_id: &'a str,
    markdown: &'a str,
}

/// The subset of the created message we care about.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub id: String,
    #[serde(default)]
    pub room_id: Option<String>,
}

#[derive(Deserialize)]
struct WebexErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// Bot-token authenticated Webex client.
pub struct WebexClient {
    http: reqwest::Client,
    base_url: Url,
}

impl WebexClient {
    pub fn new(token: &SecretString, transport: &TransportConfig) -> Result<Self, Error> {
        Self::with_base_url(DEFAULT_WEBEX_URL, token, transport)
    }

    /// Point the client at a different API root (tests, proxies).
    pub fn with_base_url(
        base_url: &str,
        token: &SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
            .map_err(|e| Error::InvalidKeyFormat {
                message: e.to_string(),
            })?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);

        let mut base_url = Url::parse(base_url)?;
        let path = base_url.path().trim_end_matches('/').to_owned();
        base_url.set_path(&format!("{path}/"));

        Ok(Self {
            http: transport.build_client_with_headers(headers)?,
            base_url,
        })
    }

    /// `POST /messages` with `{"roomId", "markdown"}`
    pub async fn create_message(
        &self,
        room_id: &str,
        markdown: &str,
    ) -> Result<MessageResponse, Error> {
        let url = self.base_url.join("messages")?;
        debug!("POST {url}");

        let resp = self
            .http
            .post(url)
            .json(&CreateMessage { room_id, markdown })
            .send()
            .await?;

        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            return serde_json::from_str(&body).map_err(|e| Error::Deserialization {
                message: e.to_string(),
                body,
            });
        }

        match status {
            reqwest::StatusCode::UNAUTHORIZED => Err(Error::InvalidApiKey),
            reqwest::StatusCode::TOO_MANY_REQUESTS => Err(Error::RateLimited { retry_after: None }),
            _ => {
                let raw = resp.text().await.unwrap_or_default();
                let message = serde_json::from_str::<WebexErrorBody>(&raw)
                    .ok()
                    .and_then(|b| b.message)
                    .unwrap_or_else(|| status.to_string());
                Err(Error::Api {
                    status: status.as_u16(),
                    errors: vec![message],
                })
            }
        }
    }
}
