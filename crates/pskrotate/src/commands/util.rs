//! Shared helpers for command handlers.

use std::io::IsTerminal;
use std::sync::Arc;
use std::time::Duration;

use dialoguer::Password;
use indicatif::{ProgressBar, ProgressStyle};
use secrecy::SecretString;
use tokio_util::sync::CancellationToken;

use pskrotate_core::{
    Aggregator, CoreError, DashboardDirectory, DashboardSettings, Network, OrgSelector,
    RateLimiter, RetryPolicy, Throttled, validate_psk,
};

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// The rate-limited directory every command talks to.
pub type SharedDirectory = Throttled<DashboardDirectory>;

/// Build the Dashboard directory behind one shared rate limiter.
pub fn directory(settings: &DashboardSettings) -> Result<SharedDirectory, CliError> {
    let limiter = Arc::new(RateLimiter::new(settings.rate_limit));
    Ok(Throttled::new(
        DashboardDirectory::from_settings(settings)?,
        limiter,
    ))
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
///
/// Without a terminal there is nobody to ask, so `--yes` becomes mandatory.
pub fn confirm(message: &str, action: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

/// The new PSK from `--psk`/`PSKROTATE_PSK`, or prompted twice.
///
/// Validated here so a bad key fails before any remote call.
pub fn read_psk(flag: Option<&str>) -> Result<SecretString, CliError> {
    let psk = match flag {
        Some(value) => SecretString::from(value.to_owned()),
        None => {
            if !std::io::stdin().is_terminal() {
                return Err(CliError::Validation {
                    field: "psk".into(),
                    reason: "no PSK given; pass --psk or set PSKROTATE_PSK".into(),
                });
            }
            let entered = Password::new()
                .with_prompt("New PSK")
                .with_confirmation("Repeat PSK", "The two entries do not match")
                .interact()
                .map_err(prompt_err)?;
            SecretString::from(entered)
        }
    };
    validate_psk(&psk).map_err(|e| CliError::Validation {
        field: "psk".into(),
        reason: match e {
            CoreError::Config { message } => message,
            other => other.to_string(),
        },
    })?;
    Ok(psk)
}

/// Spinner on stderr while the directory is enumerated.
///
/// Hidden when quiet or when stderr is not a terminal.
pub fn spinner(message: &str, global: &GlobalOpts) -> ProgressBar {
    if global.quiet || !std::io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        bar.set_style(style);
    }
    bar.set_message(message.to_owned());
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

/// Find one network of the selected organization by ID or exact name.
pub async fn find_network(
    aggregator: &Aggregator<SharedDirectory>,
    org: &OrgSelector,
    identifier: &str,
    cancel: &CancellationToken,
) -> Result<Network, CliError> {
    let retry = RetryPolicy::default();
    let org = aggregator.resolve_organization(org, &retry, cancel).await?;
    let networks = aggregator.networks(&org.id, None, &retry, cancel).await?;
    networks
        .into_iter()
        .find(|n| n.id == identifier || n.name == identifier)
        .ok_or_else(|| CliError::NotFound {
            resource_type: "network".into(),
            identifier: identifier.into(),
            list_command: "networks list".into(),
        })
}

/// A token tripped by the first Ctrl-C.
///
/// In-flight requests finish; nothing new starts after the signal.
pub fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let trip = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, finishing in-flight updates");
            trip.cancel();
        }
    });
    token
}
