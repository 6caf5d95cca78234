// ── API-to-domain type conversions ──
//
// Bridges raw `pskrotate_api` response types into canonical
// `pskrotate_core::model` types. Both SSID shapes collapse into one `Ssid`;
// the family-specific extras (VLAN, WPA mode) are dropped here.

use secrecy::SecretString;

use pskrotate_api::dashboard_types::{
    ApplianceSsidResponse, NetworkResponse, OrganizationResponse, WirelessSsidResponse,
};

use crate::model::{FamilyOverrides, Network, Organization, Ssid};

impl From<OrganizationResponse> for Organization {
    fn from(o: OrganizationResponse) -> Self {
        Self {
            id: o.id,
            name: o.name,
        }
    }
}

/// Convert a wire network, resolving its family through the overrides.
pub fn network_from_response(n: NetworkResponse, overrides: &FamilyOverrides) -> Network {
    let tags = n.tags.into_iter().collect();
    let family = overrides.resolve(&tags, &n.product_types);
    Network {
        id: n.id,
        name: n.name,
        tags,
        family,
        product_types: n.product_types,
    }
}

fn secret(psk: Option<String>) -> Option<SecretString> {
    psk.filter(|p| !p.is_empty()).map(SecretString::from)
}

impl From<WirelessSsidResponse> for Ssid {
    fn from(s: WirelessSsidResponse) -> Self {
        Self {
            index: s.number,
            name: s.name,
            enabled: s.enabled,
            auth_mode: s.auth_mode,
            psk: secret(s.psk),
        }
    }
}

impl From<ApplianceSsidResponse> for Ssid {
    fn from(s: ApplianceSsidResponse) -> Self {
        Self {
            index: s.number,
            name: s.name,
            enabled: s.enabled,
            auth_mode: s.auth_mode,
            psk: secret(s.psk),
        }
    }
}
