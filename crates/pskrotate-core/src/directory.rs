// ── Remote directory seam ──
//
// `Directory` is everything the engine and aggregator need from the remote
// side. `DashboardDirectory` is the real adapter; tests substitute an
// in-memory implementation.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use secrecy::SecretString;
use tracing::debug;

use pskrotate_api::{DashboardClient, TransportConfig};

use crate::config::DashboardSettings;
use crate::convert::network_from_response;
use crate::error::CoreError;
use crate::limiter::RateLimiter;
use crate::model::{DeviceFamily, FamilyOverrides, Network, Organization, Ssid};
use crate::selector::TagPolicy;

/// Server-side tag filter hint for [`Directory::list_networks`].
///
/// Implementations may ignore it; callers always re-select client-side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagFilter {
    pub tags: BTreeSet<String>,
    pub policy: TagPolicy,
}

/// Remote directory of organizations, networks and SSIDs.
///
/// Implementations are thin and honest: they classify failures into
/// [`CoreError`] and never retry.
#[async_trait]
pub trait Directory: Send + Sync {
    async fn list_organizations(&self) -> Result<Vec<Organization>, CoreError>;

    async fn list_networks(
        &self,
        org_id: &str,
        filter: Option<&TagFilter>,
    ) -> Result<Vec<Network>, CoreError>;

    /// Fails with [`CoreError::UnsupportedFamily`] for [`DeviceFamily::Other`].
    async fn list_ssids(&self, network_id: &str, family: DeviceFamily)
    -> Result<Vec<Ssid>, CoreError>;

    /// One atomic remote mutation of a single SSID's PSK.
    async fn set_ssid_psk(
        &self,
        network_id: &str,
        family: DeviceFamily,
        index: u8,
        psk: &SecretString,
    ) -> Result<(), CoreError>;
}

#[async_trait]
impl<D: Directory + ?Sized> Directory for &D {
    async fn list_organizations(&self) -> Result<Vec<Organization>, CoreError> {
        (**self).list_organizations().await
    }

    async fn list_networks(
        &self,
        org_id: &str,
        filter: Option<&TagFilter>,
    ) -> Result<Vec<Network>, CoreError> {
        (**self).list_networks(org_id, filter).await
    }

    async fn list_ssids(
        &self,
        network_id: &str,
        family: DeviceFamily,
    ) -> Result<Vec<Ssid>, CoreError> {
        (**self).list_ssids(network_id, family).await
    }

    async fn set_ssid_psk(
        &self,
        network_id: &str,
        family: DeviceFamily,
        index: u8,
        psk: &SecretString,
    ) -> Result<(), CoreError> {
        (**self).set_ssid_psk(network_id, family, index, psk).await
    }
}

#[async_trait]
impl<D: Directory + ?Sized> Directory for Arc<D> {
    async fn list_organizations(&self) -> Result<Vec<Organization>, CoreError> {
        (**self).list_organizations().await
    }

    async fn list_networks(
        &self,
        org_id: &str,
        filter: Option<&TagFilter>,
    ) -> Result<Vec<Network>, CoreError> {
        (**self).list_networks(org_id, filter).await
    }

    async fn list_ssids(
        &self,
        network_id: &str,
        family: DeviceFamily,
    ) -> Result<Vec<Ssid>, CoreError> {
        (**self).list_ssids(network_id, family).await
    }

    async fn set_ssid_psk(
        &self,
        network_id: &str,
        family: DeviceFamily,
        index: u8,
        psk: &SecretString,
    ) -> Result<(), CoreError> {
        (**self).set_ssid_psk(network_id, family, index, psk).await
    }
}

// ── Dashboard adapter ────────────────────────────────────────────────

/// [`Directory`] over the Dashboard REST API.
pub struct DashboardDirectory {
    client: DashboardClient,
    family_overrides: FamilyOverrides,
}

impl DashboardDirectory {
    pub fn new(client: DashboardClient, family_overrides: FamilyOverrides) -> Self {
        Self {
            client,
            family_overrides,
        }
    }

    /// Build the HTTP client from connection settings.
    pub fn from_settings(settings: &DashboardSettings) -> Result<Self, CoreError> {
        let transport = TransportConfig::with_timeout(settings.timeout);
        let client =
            DashboardClient::from_api_key(settings.base_url.as_str(), &settings.api_key, &transport)?;
        Ok(Self::new(client, settings.family_overrides.clone()))
    }
}

#[async_trait]
impl Directory for DashboardDirectory {
    async fn list_organizations(&self) -> Result<Vec<Organization>, CoreError> {
        let orgs = self.client.list_organizations().await?;
        Ok(orgs.into_iter().map(Organization::from).collect())
    }

    async fn list_networks(
        &self,
        org_id: &str,
        filter: Option<&TagFilter>,
    ) -> Result<Vec<Network>, CoreError> {
        let (tags, filter_type) = match filter {
            Some(f) => (
                f.tags.iter().cloned().collect::<Vec<_>>(),
                f.policy.server_filter(),
            ),
            None => (Vec::new(), None),
        };
        let networks = self.client.list_networks(org_id, &tags, filter_type).await?;
        debug!(org_id, count = networks.len(), "networks listed");
        Ok(networks
            .into_iter()
            .map(|n| network_from_response(n, &self.family_overrides))
            .collect())
    }

    async fn list_ssids(
        &self,
        network_id: &str,
        family: DeviceFamily,
    ) -> Result<Vec<Ssid>, CoreError> {
        match family {
            DeviceFamily::WirelessAp => Ok(self
                .client
                .list_wireless_ssids(network_id)
                .await?
                .into_iter()
                .map(Ssid::from)
                .collect()),
            DeviceFamily::WirelessAppliance => Ok(self
                .client
                .list_appliance_ssids(network_id)
                .await?
                .into_iter()
                .map(Ssid::from)
                .collect()),
            DeviceFamily::Other => Err(CoreError::UnsupportedFamily { family }),
        }
    }

    async fn set_ssid_psk(
        &self,
        network_id: &str,
        family: DeviceFamily,
        index: u8,
        psk: &SecretString,
    ) -> Result<(), CoreError> {
        match family {
            DeviceFamily::WirelessAp => {
                self.client
                    .update_wireless_ssid_psk(network_id, index, psk)
                    .await?;
            }
            DeviceFamily::WirelessAppliance => {
                self.client
                    .update_appliance_ssid_psk(network_id, index, psk)
                    .await?;
            }
            DeviceFamily::Other => return Err(CoreError::UnsupportedFamily { family }),
        }
        Ok(())
    }
}

// ── Rate limiting ────────────────────────────────────────────────────

/// Puts every call of the inner directory behind a shared [`RateLimiter`].
pub struct Throttled<D> {
    inner: D,
    limiter: Arc<RateLimiter>,
}

impl<D: Directory> Throttled<D> {
    pub fn new(inner: D, limiter: Arc<RateLimiter>) -> Self {
        Self { inner, limiter }
    }

    pub fn inner(&self) -> &D {
        &self.inner
    }
}

#[async_trait]
impl<D: Directory> Directory for Throttled<D> {
    async fn list_organizations(&self) -> Result<Vec<Organization>, CoreError> {
        self.limiter.acquire().await;
        self.inner.list_organizations().await
    }

    async fn list_networks(
        &self,
        org_id: &str,
        filter: Option<&TagFilter>,
    ) -> Result<Vec<Network>, CoreError> {
        self.limiter.acquire().await;
        self.inner.list_networks(org_id, filter).await
    }

    async fn list_ssids(
        &self,
        network_id: &str,
        family: DeviceFamily,
    ) -> Result<Vec<Ssid>, CoreError> {
        self.limiter.acquire().await;
        self.inner.list_ssids(network_id, family).await
    }

    async fn set_ssid_psk(
        &self,
        network_id: &str,
        family: DeviceFamily,
        index: u8,
        psk: &SecretString,
    ) -> Result<(), CoreError> {
        self.limiter.acquire().await;
        self.inner.set_ssid_psk(network_id, family, index, psk).await
    }
}
