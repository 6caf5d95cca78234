// Dashboard API wire types.
//
// Field names follow the API's camelCase JSON. Unknown fields are ignored;
// optional fields default so partial payloads from older firmware decode.

use serde::{Deserialize, Serialize};

// ── Organizations ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationResponse {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
}

// ── Networks ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkResponse {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub organization_id: Option<String>,
    /// e.g. `["appliance", "switch", "wireless"]`.
    #[serde(default)]
    pub product_types: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Server-side tag matching mode for the network listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagsFilterType {
    WithAllTags,
    WithAnyTags,
}

impl TagsFilterType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::WithAllTags => "withAllTags",
            Self::WithAnyTags => "withAnyTags",
        }
    }
}

// ── SSIDs ────────────────────────────────────────────────────────────

/// An SSID on a wireless access-point network.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WirelessSsidResponse {
    pub number: u8,
    pub name: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub auth_mode: Option<String>,
    #[serde(default)]
    pub encryption_mode: Option<String>,
    #[serde(default)]
    pub psk: Option<String>,
}

/// An SSID served by a security appliance with integrated wireless.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplianceSsidResponse {
    pub number: u8,
    pub name: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub default_vlan_id: Option<u16>,
    #[serde(default)]
    pub auth_mode: Option<String>,
    #[serde(default)]
    pub encryption_mode: Option<String>,
    #[serde(default)]
    pub wpa_encryption_mode: Option<String>,
    #[serde(default)]
    pub psk: Option<String>,
}

/// Body for an SSID update. Only the PSK is sent; everything else stays as-is.
#[derive(Debug, Clone, Serialize)]
pub struct SsidPskUpdate<'a> {
    pub psk: &'a str,
}
