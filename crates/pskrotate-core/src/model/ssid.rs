// ── SSID domain types ──

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A configured SSID within one network. Read before every write,
/// never created or deleted here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ssid {
    /// 0-based slot number, scoped to the network.
    pub index: u8,
    pub name: String,
    pub enabled: bool,
    pub auth_mode: Option<String>,
    /// Current PSK when the remote echoes it. Never serialized.
    #[serde(skip)]
    pub psk: Option<SecretString>,
}

/// Which SSID to update: by index, by name, or both (index wins).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SsidSelector {
    index: Option<u8>,
    name: Option<String>,
}

impl SsidSelector {
    /// Rejects a selector naming neither an index nor a (non-blank) name.
    pub fn new(index: Option<u8>, name: Option<String>) -> Result<Self, CoreError> {
        let name = name.filter(|n| !n.trim().is_empty());
        if index.is_none() && name.is_none() {
            return Err(CoreError::Config {
                message: "an SSID index or SSID name is required".into(),
            });
        }
        Ok(Self { index, name })
    }

    pub fn by_index(index: u8) -> Self {
        Self {
            index: Some(index),
            name: None,
        }
    }

    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            index: None,
            name: Some(name.into()),
        }
    }

    pub fn index(&self) -> Option<u8> {
        self.index
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Find the target among a network's SSIDs.
    ///
    /// When an index is given the name is ignored entirely, even if the SSID
    /// at that index is named differently. Name matching is exact but
    /// case-insensitive.
    pub fn resolve<'a>(&self, ssids: &'a [Ssid]) -> Option<&'a Ssid> {
        if let Some(index) = self.index {
            return ssids.iter().find(|s| s.index == index);
        }
        let wanted = self.name.as_deref()?.to_lowercase();
        ssids.iter().find(|s| s.name.to_lowercase() == wanted)
    }
}

impl std::fmt::Display for SsidSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.index, &self.name) {
            (Some(i), _) => write!(f, "#{i}"),
            (None, Some(n)) => write!(f, "'{n}'"),
            (None, None) => f.write_str("<none>"),
        }
    }
}
