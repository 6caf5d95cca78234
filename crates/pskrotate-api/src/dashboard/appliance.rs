// Security-appliance (integrated wireless) SSID endpoints.
//
// Same verbs as the access-point family but a different path segment and
// a richer payload (VLAN, WPA encryption mode).

use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use super::client::DashboardClient;
use super::types::{ApplianceSsidResponse, SsidPskUpdate};
use crate::error::Error;

impl DashboardClient {
    /// `GET /networks/{net}/appliance/ssids`
    pub async fn list_appliance_ssids(
        &self,
        network_id: &str,
    ) -> Result<Vec<ApplianceSsidResponse>, Error> {
        debug!(network_id, "listing appliance SSIDs");
        self.get(&format!("networks/{network_id}/appliance/ssids"))
            .await
    }

    /// `PUT /networks/{net}/appliance/ssids/{number}` with `{"psk": ..}`
    pub async fn update_appliance_ssid_psk(
        &self,
        network_id: &str,
        number: u8,
        psk: &SecretString,
    ) -> Result<ApplianceSsidResponse, Error> {
        debug!(network_id, number, "updating appliance SSID PSK");
        self.put(
            &format!("networks/{network_id}/appliance/ssids/{number}"),
            &SsidPskUpdate {
                psk: psk.expose_secret(),
            },
        )
        .await
    }
}
