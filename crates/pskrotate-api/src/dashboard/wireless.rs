// Wireless access-point SSID endpoints.

use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use super::client::DashboardClient;
use super::types::{SsidPskUpdate, WirelessSsidResponse};
use crate::error::Error;

impl DashboardClient {
    /// `GET /networks/{net}/wireless/ssids`
    pub async fn list_wireless_ssids(
        &self,
        network_id: &str,
    ) -> Result<Vec<WirelessSsidResponse>, Error> {
        debug!(network_id, "listing wireless SSIDs");
        self.get(&format!("networks/{network_id}/wireless/ssids"))
            .await
    }

    /// `PUT /networks/{net}/wireless/ssids/{number}` with `{"psk": ..}`
    pub async fn update_wireless_ssid_psk(
        &self,
        network_id: &str,
        number: u8,
        psk: &SecretString,
    ) -> Result<WirelessSsidResponse, Error> {
        debug!(network_id, number, "updating wireless SSID PSK");
        self.put(
            &format!("networks/{network_id}/wireless/ssids/{number}"),
            &SsidPskUpdate {
                psk: psk.expose_secret(),
            },
        )
        .await
    }
}
