// In-memory `Directory` for unit tests.

#![allow(clippy::unwrap_used)]

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use crate::directory::{Directory, TagFilter};
use crate::error::CoreError;
use crate::model::{DeviceFamily, Network, Organization, Ssid};

/// A recorded `set_ssid_psk` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Write {
    pub network_id: String,
    pub family: DeviceFamily,
    pub index: u8,
    pub psk: String,
}

#[derive(Default)]
pub(crate) struct FakeDirectory {
    pub orgs: Vec<Organization>,
    pub networks: Vec<Network>,
    pub ssids: HashMap<String, Vec<Ssid>>,
    /// Scripted failures per network, consumed one per write.
    write_failures: Mutex<HashMap<String, VecDeque<CoreError>>>,
    /// Scripted failures per network, consumed one per SSID listing.
    list_failures: Mutex<HashMap<String, VecDeque<CoreError>>>,
    network_failures: Mutex<VecDeque<CoreError>>,
    writes: Mutex<Vec<Write>>,
    ssid_reads: Mutex<u32>,
}

pub(crate) fn ssid(index: u8, name: &str) -> Ssid {
    Ssid {
        index,
        name: name.into(),
        enabled: true,
        auth_mode: Some("psk".into()),
        psk: None,
    }
}

pub(crate) fn network(id: &str, tags: &[&str]) -> Network {
    Network::new(id, format!("Net {id}"), tags.iter().copied(), DeviceFamily::WirelessAp)
}

pub(crate) fn transient(retry_after: Option<std::time::Duration>) -> CoreError {
    CoreError::Transient {
        cause: crate::error::TransientCause::Server,
        message: "HTTP 503".into(),
        retry_after,
    }
}

impl FakeDirectory {
    pub fn with_org(mut self, id: &str, name: &str) -> Self {
        self.orgs.push(Organization {
            id: id.into(),
            name: name.into(),
        });
        self
    }

    /// Add a network carrying the usual `Main`/`Guest` SSIDs at 0 and 3.
    pub fn with_network(mut self, net: Network) -> Self {
        self.ssids
            .insert(net.id.clone(), vec![ssid(0, "Main"), ssid(3, "Guest")]);
        self.networks.push(net);
        self
    }

    pub fn with_ssids(mut self, network_id: &str, ssids: Vec<Ssid>) -> Self {
        self.ssids.insert(network_id.into(), ssids);
        self
    }

    pub fn fail_writes(self, network_id: &str, errors: impl IntoIterator<Item = CoreError>) -> Self {
        self.write_failures
            .lock()
            .unwrap()
            .entry(network_id.into())
            .or_default()
            .extend(errors);
        self
    }

    pub fn fail_listing(self, network_id: &str, errors: impl IntoIterator<Item = CoreError>) -> Self {
        self.list_failures
            .lock()
            .unwrap()
            .entry(network_id.into())
            .or_default()
            .extend(errors);
        self
    }

    pub fn fail_networks(self, errors: impl IntoIterator<Item = CoreError>) -> Self {
        self.network_failures.lock().unwrap().extend(errors);
        self
    }

    pub fn writes(&self) -> Vec<Write> {
        self.writes.lock().unwrap().clone()
    }

    pub fn ssid_reads(&self) -> u32 {
        *self.ssid_reads.lock().unwrap()
    }
}

#[async_trait]
impl Directory for FakeDirectory {
    async fn list_organizations(&self) -> Result<Vec<Organization>, CoreError> {
        Ok(self.orgs.clone())
    }

    async fn list_networks(
        &self,
        _org_id: &str,
        _filter: Option<&TagFilter>,
    ) -> Result<Vec<Network>, CoreError> {
        if let Some(err) = self.network_failures.lock().unwrap().pop_front() {
            return Err(err);
        }
        Ok(self.networks.clone())
    }

    async fn list_ssids(
        &self,
        network_id: &str,
        family: DeviceFamily,
    ) -> Result<Vec<Ssid>, CoreError> {
        *self.ssid_reads.lock().unwrap() += 1;
        if family == DeviceFamily::Other {
            return Err(CoreError::UnsupportedFamily { family });
        }
        let scripted = self
            .list_failures
            .lock()
            .unwrap()
            .get_mut(network_id)
            .and_then(VecDeque::pop_front);
        if let Some(err) = scripted {
            return Err(err);
        }
        self.ssids
            .get(network_id)
            .cloned()
            .ok_or_else(|| CoreError::NotFound {
                message: format!("network {network_id}"),
            })
    }

    async fn set_ssid_psk(
        &self,
        network_id: &str,
        family: DeviceFamily,
        index: u8,
        psk: &SecretString,
    ) -> Result<(), CoreError> {
        self.writes.lock().unwrap().push(Write {
            network_id: network_id.into(),
            family,
            index,
            psk: psk.expose_secret().to_owned(),
        });
        let scripted = self
            .write_failures
            .lock()
            .unwrap()
            .get_mut(network_id)
            .and_then(VecDeque::pop_front);
        match scripted {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
