//! SSID command handlers for a single network.

use tabled::Tabled;
use tokio_util::sync::CancellationToken;

use pskrotate_core::{
    Aggregator, Directory, Engine, ErrorKind, Outcome, SkipReason, Ssid, SsidSelector,
    UpdateRequest, UpdateResult,
};

use crate::cli::{GlobalOpts, SsidsArgs, SsidsCommand};
use crate::config::{self, Profile};
use crate::error::CliError;
use crate::output;

use super::util::{self, SharedDirectory};

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct SsidRow {
    #[tabled(rename = "#")]
    index: u8,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Enabled")]
    enabled: String,
    #[tabled(rename = "Auth")]
    auth_mode: String,
}

impl From<&Ssid> for SsidRow {
    fn from(s: &Ssid) -> Self {
        Self {
            index: s.index,
            name: s.name.clone(),
            enabled: if s.enabled { "yes" } else { "no" }.into(),
            auth_mode: s.auth_mode.clone().unwrap_or_default(),
        }
    }
}

fn detail(result: &UpdateResult, color: bool) -> String {
    let ssid = match (result.ssid_index, &result.ssid_name) {
        (Some(i), Some(n)) => format!("#{i} {n}"),
        (Some(i), None) => format!("#{i}"),
        _ => "-".into(),
    };
    format!(
        "Network:  {} ({})\nSSID:     {ssid}\nAttempts: {}\nOutcome:  {}",
        result.network_name,
        result.network_id,
        result.attempts,
        output::paint_outcome(&result.outcome, color)
    )
}

/// Exit status for a single-network update.
fn outcome_error(result: &UpdateResult, selector: &SsidSelector) -> Option<CliError> {
    match &result.outcome {
        Outcome::Success => None,
        Outcome::Skipped {
            reason: SkipReason::SsidNotFound,
        } => Some(CliError::NotFound {
            resource_type: "SSID".into(),
            identifier: selector.to_string(),
            list_command: format!("ssids list {}", result.network_id),
        }),
        Outcome::Skipped { .. } => Some(CliError::Cancelled),
        Outcome::Failed {
            kind: ErrorKind::Auth,
            message,
        } => Some(CliError::AuthFailed {
            profile: "current".into(),
            message: message.clone(),
        }),
        Outcome::Failed { .. } => Some(CliError::PartialFailure {
            failed: 1,
            total: 1,
        }),
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    aggregator: &Aggregator<SharedDirectory>,
    args: SsidsArgs,
    profile: &Profile,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        SsidsCommand::List { network, org } => {
            let cancel = CancellationToken::new();
            let selector = config::org_selector(&org, profile);

            let spinner = util::spinner("Listing SSIDs", global);
            let listed = async {
                let net = util::find_network(aggregator, &selector, &network, &cancel).await?;
                Ok::<_, CliError>(
                    aggregator
                        .directory()
                        .list_ssids(&net.id, net.family)
                        .await?,
                )
            }
            .await;
            spinner.finish_and_clear();
            let ssids = listed?;

            let out = output::render_list(global.output, &ssids, |s| SsidRow::from(s), |s| {
                s.index.to_string()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        SsidsCommand::SetPsk {
            network,
            org,
            ssid,
            psk,
        } => {
            let psk = util::read_psk(psk.as_deref())?;
            let target = config::ssid_target(&ssid, profile);
            let selector = SsidSelector::new(target.index, target.name)?;
            let cancel = util::cancel_on_ctrl_c();

            let net = util::find_network(
                aggregator,
                &config::org_selector(&org, profile),
                &network,
                &cancel,
            )
            .await?;

            let prompt = format!("Set a new PSK on SSID {selector} of network {}?", net.name);
            if !util::confirm(&prompt, "ssids set-psk", global.yes)? {
                return Ok(());
            }

            let engine = Engine::new(aggregator.directory(), profile.retry_policy()?);
            let request = UpdateRequest::untagged(selector.clone(), psk);
            let result = engine.process(&net, &request, &cancel).await;

            let color = output::should_color(global.color);
            let out = output::render_single(
                global.output,
                &result,
                |r| detail(r, color),
                |r| r.outcome.to_string(),
            )?;
            output::print_output(&out, global.quiet);

            outcome_error(&result, &selector).map_or(Ok(()), Err)
        }
    }
}
