//! Configuration for the pskrotate CLI.
//!
//! TOML profiles, credential resolution (env + plaintext), and translation
//! to the immutable `pskrotate_core` run types. Credentials are only ever
//! read here, never written back.

use std::collections::{BTreeMap, HashMap};
use std::num::{NonZeroU32, NonZeroUsize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use pskrotate_core::{
    DashboardSettings, DeviceFamily, FamilyOverrides, OrgSelector, RetryPolicy, TagCase,
    TagMatchMode, TagPolicy,
};

/// Prefix for environment overrides, e.g. `PSKROTATE_DEFAULTS__TIMEOUT=10`.
pub const ENV_PREFIX: &str = "PSKROTATE_";
/// Fallback environment variable for the Dashboard API key.
pub const API_KEY_ENV: &str = "PSKROTATE_API_KEY";
/// Fallback environment variable for the Webex bot token.
pub const WEBEX_TOKEN_ENV: &str = "PSKROTATE_WEBEX_TOKEN";
/// SSID slot targeted when neither an index nor a name is configured.
pub const DEFAULT_SSID_INDEX: u8 = 3;

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no API key configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Validation {
        field: field.into(),
        reason: reason.into(),
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named Dashboard profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_timeout() -> u64 {
    30
}

/// A named Dashboard profile: where to connect and what a rotation targets.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct Profile {
    /// Dashboard API base URL. Defaults to the public v1 endpoint.
    pub base_url: Option<String>,

    /// API key (plaintext, prefer `api_key_env`).
    pub api_key: Option<String>,

    /// Environment variable name containing the API key.
    pub api_key_env: Option<String>,

    /// Organization ID. Takes precedence over `organization_name`.
    pub organization: Option<String>,

    /// Exact organization name.
    pub organization_name: Option<String>,

    /// Tags a network must carry to be rotated.
    #[serde(default)]
    pub required_tags: Vec<String>,

    /// `all` (default) or `any`.
    pub tag_match: Option<TagMatchMode>,

    /// `sensitive` (default) or `insensitive`.
    pub tag_case: Option<TagCase>,

    pub ssid_number: Option<u8>,
    pub ssid_name: Option<String>,

    /// Network tag → device family (`wireless-ap`, `wireless-appliance`).
    #[serde(default)]
    pub family_tags: BTreeMap<String, DeviceFamily>,

    /// Requests per second across the whole run.
    pub rate_limit: Option<u32>,

    /// Networks updated in parallel.
    pub concurrency: Option<usize>,

    /// Override timeout (seconds).
    pub timeout: Option<u64>,

    #[serde(default)]
    pub retry: RetrySettings,

    #[serde(default)]
    pub notify: NotifySettings,

    /// Directory for JSON run reports.
    pub report_dir: Option<PathBuf>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct RetrySettings {
    pub max_attempts: Option<u32>,
    pub base_delay_ms: Option<u64>,
    pub factor: Option<f64>,
    pub max_delay_ms: Option<u64>,
    pub jitter: Option<bool>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct NotifySettings {
    /// Bot token (plaintext, prefer `webex_token_env`).
    pub webex_token: Option<String>,
    pub webex_token_env: Option<String>,
    pub room_id: Option<String>,
}

// ── Profile translation ─────────────────────────────────────────────

impl Profile {
    /// Dashboard connection settings for this profile.
    pub fn dashboard_settings(
        &self,
        api_key: SecretString,
        default_timeout: u64,
    ) -> Result<DashboardSettings, ConfigError> {
        let mut settings = DashboardSettings::new(api_key).map_err(|e| invalid("base_url", e.to_string()))?;

        if let Some(ref raw) = self.base_url {
            settings.base_url = raw
                .parse()
                .map_err(|_| invalid("base_url", format!("invalid URL: {raw}")))?;
        }
        settings.timeout = Duration::from_secs(self.timeout.unwrap_or(default_timeout));
        if let Some(rate) = self.rate_limit {
            settings.rate_limit =
                NonZeroU32::new(rate).ok_or_else(|| invalid("rate_limit", "must be at least 1"))?;
        }
        settings.family_overrides = FamilyOverrides::new(self.family_tags.clone());
        Ok(settings)
    }

    pub fn tag_policy(&self) -> TagPolicy {
        TagPolicy::new(
            self.tag_match.unwrap_or_default(),
            self.tag_case.unwrap_or_default(),
        )
    }

    /// `organization` (ID) wins over `organization_name`; neither means first.
    pub fn org_selector(&self) -> OrgSelector {
        match (&self.organization, &self.organization_name) {
            (Some(id), _) => OrgSelector::Id(id.clone()),
            (None, Some(name)) => OrgSelector::Name(name.clone()),
            (None, None) => OrgSelector::First,
        }
    }

    pub fn concurrency(&self) -> Result<NonZeroUsize, ConfigError> {
        match self.concurrency {
            None => Ok(NonZeroUsize::MIN),
            Some(n) => NonZeroUsize::new(n).ok_or_else(|| invalid("concurrency", "must be at least 1")),
        }
    }

    pub fn retry_policy(&self) -> Result<RetryPolicy, ConfigError> {
        let defaults = RetryPolicy::default();
        let r = &self.retry;
        let factor = r.factor.unwrap_or(defaults.factor);
        if !factor.is_finite() || factor < 1.0 {
            return Err(invalid("retry.factor", "must be a finite number >= 1"));
        }
        Ok(RetryPolicy {
            max_attempts: r.max_attempts.unwrap_or(defaults.max_attempts).max(1),
            base_delay: r
                .base_delay_ms
                .map_or(defaults.base_delay, Duration::from_millis),
            factor,
            max_delay: r.max_delay_ms.map_or(defaults.max_delay, Duration::from_millis),
            jitter: r.jitter.unwrap_or(defaults.jitter),
        })
    }
}

/// SSID target after applying the documented default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SsidTarget {
    pub index: Option<u8>,
    pub name: Option<String>,
    /// Neither an index nor a name was configured; `index` is the default.
    pub defaulted: bool,
}

/// Apply [`DEFAULT_SSID_INDEX`] when nothing names an SSID.
pub fn resolve_ssid_target(index: Option<u8>, name: Option<String>) -> SsidTarget {
    let name = name.filter(|n| !n.trim().is_empty());
    if index.is_none() && name.is_none() {
        return SsidTarget {
            index: Some(DEFAULT_SSID_INDEX),
            name: None,
            defaulted: true,
        };
    }
    SsidTarget {
        index,
        name,
        defaulted: false,
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "pskrotate", "pskrotate").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("pskrotate");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the default file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file + environment. A missing file is not an error.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Render a config as TOML with every secret value masked.
pub fn render_redacted(cfg: &Config) -> Result<String, ConfigError> {
    let mut profiles = HashMap::with_capacity(cfg.profiles.len());
    for (name, profile) in &cfg.profiles {
        let mut p = profile.clone();
        p.api_key = p.api_key.map(|_| "********".into());
        p.notify.webex_token = p.notify.webex_token.map(|_| "********".into());
        profiles.insert(name.clone(), p);
    }
    let redacted = Config {
        default_profile: cfg.default_profile.clone(),
        defaults: Defaults {
            output: cfg.defaults.output.clone(),
            timeout: cfg.defaults.timeout,
        },
        profiles,
    };
    Ok(toml::to_string_pretty(&redacted)?)
}

// ── Credential resolution (without CLI flags) ───────────────────────

/// Resolve an API key from the credential chain (no CLI flag step).
pub fn resolve_api_key(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    // 1. Profile's api_key_env → env var lookup
    if let Some(ref env_name) = profile.api_key_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    // 2. Well-known env var
    if let Ok(val) = std::env::var(API_KEY_ENV) {
        if !val.is_empty() {
            return Ok(SecretString::from(val));
        }
    }

    // 3. Plaintext in config
    if let Some(ref key) = profile.api_key {
        return Ok(SecretString::from(key.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Resolve the Webex bot token, if any is configured.
pub fn resolve_webex_token(notify: &NotifySettings) -> Option<SecretString> {
    notify
        .webex_token_env
        .as_deref()
        .and_then(|name| std::env::var(name).ok())
        .or_else(|| std::env::var(WEBEX_TOKEN_ENV).ok())
        .filter(|t| !t.is_empty())
        .or_else(|| notify.webex_token.clone())
        .map(SecretString::from)
}
