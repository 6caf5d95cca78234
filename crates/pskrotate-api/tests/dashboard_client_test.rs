#![allow(clippy::unwrap_used)]
// Integration tests for `DashboardClient` using wiremock.

use std::time::Duration;

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use pskrotate_api::dashboard_types::TagsFilterType;
use pskrotate_api::{DashboardClient, Error, TransportConfig};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, DashboardClient) {
    let server = MockServer::start().await;
    let client = DashboardClient::from_reqwest(
        &format!("{}/api/v1", server.uri()),
        reqwest::Client::new(),
    )
    .unwrap();
    (server, client)
}

fn psk(value: &str) -> SecretString {
    SecretString::from(value.to_owned())
}

// ── Organizations ───────────────────────────────────────────────────

#[tokio::test]
async fn test_list_organizations_sends_bearer_key() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/organizations"))
        .and(header("authorization", "Bearer secret-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "O1", "name": "Acme" },
            { "id": "O2", "name": "Acme Labs", "url": "https://n1.example.com/o/O2" }
        ])))
        .mount(&server)
        .await;

    let client = DashboardClient::from_api_key(
        &format!("{}/api/v1/", server.uri()),
        &psk("secret-key"),
        &TransportConfig::default(),
    )
    .unwrap();

    let orgs = client.list_organizations().await.unwrap();
    assert_eq!(orgs.len(), 2);
    assert_eq!(orgs[0].id, "O1");
    assert_eq!(orgs[1].name, "Acme Labs");
}

#[tokio::test]
async fn test_invalid_api_key() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/organizations"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "errors": ["Invalid API key"] })),
        )
        .mount(&server)
        .await;

    let result = client.list_organizations().await;
    assert!(
        matches!(result, Err(Error::InvalidApiKey)),
        "expected InvalidApiKey, got: {result:?}"
    );
}

// ── Networks ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_networks_with_tag_filter() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/organizations/O1/networks"))
        .and(query_param("tags[]", "psk-rotate"))
        .and(query_param("tagsFilterType", "withAllTags"))
        .and(query_param("perPage", "1000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": "N1",
                "name": "Branch 1",
                "organizationId": "O1",
                "productTypes": ["wireless"],
                "tags": ["psk-rotate"]
            }
        ])))
        .mount(&server)
        .await;

    let nets = client
        .list_networks(
            "O1",
            &["psk-rotate".to_owned()],
            Some(TagsFilterType::WithAllTags),
        )
        .await
        .unwrap();

    assert_eq!(nets.len(), 1);
    assert_eq!(nets[0].tags, vec!["psk-rotate".to_owned()]);
    assert_eq!(nets[0].product_types, vec!["wireless".to_owned()]);
}

#[tokio::test]
async fn test_list_networks_follows_link_pagination() {
    let (server, client) = setup().await;

    let next = format!(
        "<{}/api/v1/organizations/O1/networks?perPage=1000&startingAfter=N1>; rel=next",
        server.uri()
    );

    Mock::given(method("GET"))
        .and(path("/api/v1/organizations/O1/networks"))
        .and(query_param("startingAfter", "N1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "N2", "name": "Branch 2" }
        ])))
        .with_priority(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/organizations/O1/networks"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Link", next.as_str())
                .set_body_json(json!([{ "id": "N1", "name": "Branch 1" }])),
        )
        .with_priority(2)
        .mount(&server)
        .await;

    let nets = client.list_networks("O1", &[], None).await.unwrap();
    let ids: Vec<&str> = nets.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, vec!["N1", "N2"]);
}

// ── SSIDs ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_wireless_ssids() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/networks/N1/wireless/ssids"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "number": 0, "name": "Main", "enabled": true, "authMode": "8021x-radius" },
            { "number": 3, "name": "Guest", "enabled": true, "authMode": "psk", "psk": "OldPass123" }
        ])))
        .mount(&server)
        .await;

    let ssids = client.list_wireless_ssids("N1").await.unwrap();
    assert_eq!(ssids.len(), 2);
    assert_eq!(ssids[1].number, 3);
    assert_eq!(ssids[1].psk.as_deref(), Some("OldPass123"));
}

#[tokio::test]
async fn test_update_wireless_ssid_psk_sends_only_psk() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/api/v1/networks/N1/wireless/ssids/3"))
        .and(body_json(json!({ "psk": "NewPass123!" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "number": 3, "name": "Guest", "enabled": true, "authMode": "psk"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let updated = client
        .update_wireless_ssid_psk("N1", 3, &psk("NewPass123!"))
        .await
        .unwrap();
    assert_eq!(updated.name, "Guest");
}

#[tokio::test]
async fn test_update_appliance_ssid_psk_uses_appliance_path() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/api/v1/networks/N9/appliance/ssids/2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "number": 2, "name": "Guest", "enabled": true, "defaultVlanId": 20
        })))
        .expect(1)
        .mount(&server)
        .await;

    let updated = client
        .update_appliance_ssid_psk("N9", 2, &psk("NewPass123!"))
        .await
        .unwrap();
    assert_eq!(updated.default_vlan_id, Some(20));
}

// ── Error classification ────────────────────────────────────────────

#[tokio::test]
async fn test_rate_limited_carries_retry_after() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/api/v1/networks/N1/wireless/ssids/3"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "2"))
        .expect(1)
        .mount(&server)
        .await;

    let err = client
        .update_wireless_ssid_psk("N1", 3, &psk("NewPass123!"))
        .await
        .unwrap_err();

    assert!(err.is_transient());
    assert_eq!(err.retry_after(), Some(Duration::from_secs(2)));
}

#[tokio::test]
async fn test_oversized_retry_after_is_dropped() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/organizations"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "1e30"))
        .expect(1)
        .mount(&server)
        .await;

    let err = client.list_organizations().await.unwrap_err();

    assert!(matches!(err, Error::RateLimited { retry_after: None }));
}

#[tokio::test]
async fn test_bad_request_is_validation() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/api/v1/networks/N1/wireless/ssids/3"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "errors": ["The passphrase must be between 8 and 63 characters"]
        })))
        .mount(&server)
        .await;

    let err = client
        .update_wireless_ssid_psk("N1", 3, &psk("short"))
        .await
        .unwrap_err();

    assert!(err.is_validation(), "got: {err:?}");
    assert!(err.to_string().contains("between 8 and 63"));
}

#[tokio::test]
async fn test_not_found_and_server_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/networks/missing/wireless/ssids"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/networks/flaky/wireless/ssids"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&server)
        .await;

    let missing = client.list_wireless_ssids("missing").await.unwrap_err();
    assert!(missing.is_not_found());

    let flaky = client.list_wireless_ssids("flaky").await.unwrap_err();
    assert!(flaky.is_transient());
    assert_eq!(flaky.status(), Some(502));
}

#[tokio::test]
async fn test_forbidden_is_auth() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/organizations"))
        .respond_with(
            ResponseTemplate::new(403)
                .set_body_json(json!({ "errors": ["API access is disabled for this organization"] })),
        )
        .mount(&server)
        .await;

    let err = client.list_organizations().await.unwrap_err();
    assert!(err.is_auth());
    assert!(err.to_string().contains("API access is disabled"));
}

#[tokio::test]
async fn test_malformed_body_is_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/organizations"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let result = client.list_organizations().await;
    assert!(
        matches!(result, Err(Error::Deserialization { .. })),
        "expected Deserialization error, got: {result:?}"
    );
}
