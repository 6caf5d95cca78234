// ── Organization / network domain types ──

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// An organization visible to the API key. Fetched fresh each run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub id: String,
    pub name: String,
}

/// Hardware role that decides which SSID endpoint and payload apply.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum DeviceFamily {
    /// Wireless access points.
    WirelessAp,
    /// Security appliance with integrated wireless.
    WirelessAppliance,
    Other,
}

impl DeviceFamily {
    /// Derive the family from the Dashboard `productTypes` list.
    ///
    /// Access points win over an appliance in mixed networks.
    pub fn from_product_types<S: AsRef<str>>(product_types: &[S]) -> Self {
        let has = |wanted: &str| product_types.iter().any(|p| p.as_ref() == wanted);
        if has("wireless") {
            Self::WirelessAp
        } else if has("appliance") {
            Self::WirelessAppliance
        } else {
            Self::Other
        }
    }
}

/// Tag → family overrides, checked before `productTypes`.
///
/// Lets operators pin e.g. `MXW-GuestPSK` networks to the appliance
/// endpoint even when access points are also present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FamilyOverrides(BTreeMap<String, DeviceFamily>);

impl FamilyOverrides {
    pub fn new(map: BTreeMap<String, DeviceFamily>) -> Self {
        Self(map)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// First override (in tag order) matching the network's tags, else the
    /// product-type derivation.
    pub fn resolve<S: AsRef<str>>(&self, tags: &BTreeSet<String>, product_types: &[S]) -> DeviceFamily {
        tags.iter()
            .find_map(|t| self.0.get(t).copied())
            .unwrap_or_else(|| DeviceFamily::from_product_types(product_types))
    }
}

/// A managed network. `tags` are the authoritative selection keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Network {
    pub id: String,
    pub name: String,
    pub tags: BTreeSet<String>,
    pub family: DeviceFamily,
    #[serde(default)]
    pub product_types: Vec<String>,
}

impl Network {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        tags: impl IntoIterator<Item = impl Into<String>>,
        family: DeviceFamily,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            tags: tags.into_iter().map(Into::into).collect(),
            family,
            product_types: Vec::new(),
        }
    }
}
