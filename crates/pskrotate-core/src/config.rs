// ── Runtime rotation configuration ──
//
// These types describe *what* a run does and *how* to reach the Dashboard.
// They carry credentials and run parameters but never touch disk or the
// environment. The CLI builds them once and hands them in immutable.

use std::collections::BTreeSet;
use std::num::{NonZeroU32, NonZeroUsize};
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use url::Url;

use pskrotate_api::dashboard::client::DEFAULT_BASE_URL;

use crate::engine::RetryPolicy;
use crate::error::CoreError;
use crate::limiter::DEFAULT_RATE;
use crate::model::{FamilyOverrides, SsidSelector};
use crate::selector::TagPolicy;

/// Shortest PSK the Dashboard accepts (WPA2 passphrase minimum).
pub const PSK_MIN_LEN: usize = 8;
/// Longest PSK the Dashboard accepts as a passphrase.
pub const PSK_MAX_LEN: usize = 63;

/// Connection settings for the Dashboard API.
#[derive(Debug, Clone)]
pub struct DashboardSettings {
    pub base_url: Url,
    pub api_key: SecretString,
    /// Per-request timeout. A timeout is a transient failure.
    pub timeout: Duration,
    /// Requests per second shared by all concurrent updates.
    pub rate_limit: NonZeroU32,
    /// Tag → device family overrides applied to every listed network.
    pub family_overrides: FamilyOverrides,
}

impl DashboardSettings {
    pub fn new(api_key: SecretString) -> Result<Self, CoreError> {
        let base_url = Url::parse(DEFAULT_BASE_URL).map_err(|e| CoreError::Config {
            message: format!("invalid default base URL: {e}"),
        })?;
        Ok(Self {
            base_url,
            api_key,
            timeout: Duration::from_secs(30),
            rate_limit: DEFAULT_RATE,
            family_overrides: FamilyOverrides::default(),
        })
    }
}

/// Which organization a run targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrgSelector {
    Id(String),
    /// Exact, case-sensitive organization name.
    Name(String),
    /// First organization the API key can see.
    First,
}

impl std::fmt::Display for OrgSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Id(id) => write!(f, "id {id}"),
            Self::Name(name) => write!(f, "name '{name}'"),
            Self::First => f.write_str("first available"),
        }
    }
}

/// Reject a PSK the Dashboard would refuse: 8 to 63 printable ASCII chars.
pub fn validate_psk(psk: &SecretString) -> Result<(), CoreError> {
    let raw = psk.expose_secret();
    let len = raw.chars().count();
    if !(PSK_MIN_LEN..=PSK_MAX_LEN).contains(&len) {
        return Err(CoreError::Config {
            message: format!(
                "PSK must be {PSK_MIN_LEN}-{PSK_MAX_LEN} characters long (got {len})"
            ),
        });
    }
    if !raw.chars().all(|c| c.is_ascii() && !c.is_ascii_control()) {
        return Err(CoreError::Config {
            message: "PSK may only contain printable ASCII characters".into(),
        });
    }
    Ok(())
}

/// One validated rotation run. Built through [`RotationPlan::builder`].
#[derive(Debug, Clone)]
pub struct RotationPlan {
    pub organization: OrgSelector,
    pub required_tags: BTreeSet<String>,
    pub tag_policy: TagPolicy,
    pub ssid: SsidSelector,
    pub psk: SecretString,
    /// Whether the caller attached notification sinks; informational only.
    pub notify: bool,
    /// Networks updated in parallel. 1 means strictly sequential.
    pub concurrency: NonZeroUsize,
    pub retry: RetryPolicy,
}

impl RotationPlan {
    pub fn builder() -> RotationPlanBuilder {
        RotationPlanBuilder::default()
    }
}

#[derive(Debug, Default)]
pub struct RotationPlanBuilder {
    organization: Option<OrgSelector>,
    required_tags: BTreeSet<String>,
    tag_policy: TagPolicy,
    ssid_index: Option<u8>,
    ssid_name: Option<String>,
    psk: Option<SecretString>,
    notify: bool,
    concurrency: Option<NonZeroUsize>,
    retry: Option<RetryPolicy>,
}

impl RotationPlanBuilder {
    pub fn organization(mut self, org: OrgSelector) -> Self {
        self.organization = Some(org);
        self
    }

    pub fn required_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn tag_policy(mut self, policy: TagPolicy) -> Self {
        self.tag_policy = policy;
        self
    }

    pub fn ssid_index(mut self, index: Option<u8>) -> Self {
        self.ssid_index = index;
        self
    }

    pub fn ssid_name(mut self, name: Option<String>) -> Self {
        self.ssid_name = name;
        self
    }

    pub fn psk(mut self, psk: SecretString) -> Self {
        self.psk = Some(psk);
        self
    }

    pub fn notify(mut self, notify: bool) -> Self {
        self.notify = notify;
        self
    }

    pub fn concurrency(mut self, concurrency: NonZeroUsize) -> Self {
        self.concurrency = Some(concurrency);
        self
    }

    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = Some(retry);
        self
    }

    /// Validate every field once. Nothing is defaulted silently: the SSID
    /// selector and PSK must be supplied by the caller.
    pub fn build(self) -> Result<RotationPlan, CoreError> {
        let required_tags: BTreeSet<String> = self
            .required_tags
            .into_iter()
            .map(|t| t.trim().to_owned())
            .filter(|t| !t.is_empty())
            .collect();
        if required_tags.is_empty() {
            return Err(CoreError::Config {
                message: "at least one required tag is needed".into(),
            });
        }

        let ssid = SsidSelector::new(self.ssid_index, self.ssid_name)?;

        let psk = self.psk.ok_or_else(|| CoreError::Config {
            message: "a new PSK is required".into(),
        })?;
        validate_psk(&psk)?;

        Ok(RotationPlan {
            organization: self.organization.unwrap_or(OrgSelector::First),
            required_tags,
            tag_policy: self.tag_policy,
            ssid,
            psk,
            notify: self.notify,
            concurrency: self.concurrency.unwrap_or(NonZeroUsize::MIN),
            retry: self.retry.unwrap_or_default(),
        })
    }
}
