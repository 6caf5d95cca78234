//! `rotate`: bulk PSK update across every tagged network.

use owo_colors::OwoColorize;
use tabled::Tabled;
use tracing::info;

use pskrotate_api::{TransportConfig, WebexClient};
use pskrotate_core::{
    Aggregator, CoreError, DashboardSettings, MessageSink, Network, Notifier, RotationPlan,
    RunSummary, StderrSink, UpdateResult, WebexSink, write_report,
};

use crate::cli::{GlobalOpts, OutputFormat, RotateArgs};
use crate::config::{self, Profile};
use crate::error::CliError;
use crate::output;

use super::util::{self, SharedDirectory};

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct ResultRow {
    #[tabled(rename = "Network")]
    name: String,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Family")]
    family: String,
    #[tabled(rename = "SSID")]
    ssid: String,
    #[tabled(rename = "Attempts")]
    attempts: u32,
    #[tabled(rename = "Outcome")]
    outcome: String,
}

impl From<&UpdateResult> for ResultRow {
    fn from(r: &UpdateResult) -> Self {
        let ssid = match (r.ssid_index, &r.ssid_name) {
            (Some(i), Some(n)) => format!("#{i} {n}"),
            (Some(i), None) => format!("#{i}"),
            _ => String::new(),
        };
        Self {
            name: r.network_name.clone(),
            id: r.network_id.clone(),
            family: r.family.to_string(),
            ssid,
            attempts: r.attempts,
            outcome: r.outcome.to_string(),
        }
    }
}

#[derive(Tabled)]
struct PlannedRow {
    #[tabled(rename = "Network")]
    name: String,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Family")]
    family: String,
}

impl From<&Network> for PlannedRow {
    fn from(n: &Network) -> Self {
        Self {
            name: n.name.clone(),
            id: n.id.clone(),
            family: n.family.to_string(),
        }
    }
}

// ── Rendering ───────────────────────────────────────────────────────

fn totals_line(summary: &RunSummary, color: bool) -> String {
    let ok = format!("{} succeeded", summary.succeeded);
    let failed = format!("{} failed", summary.failed);
    let skipped = format!("{} skipped", summary.skipped);
    if color {
        format!(
            "{} of {}: {}, {}, {}",
            "PSK rotation".bold(),
            summary.total,
            ok.green(),
            if summary.failed > 0 {
                failed.red().bold().to_string()
            } else {
                failed
            },
            skipped.yellow()
        )
    } else {
        format!("PSK rotation of {}: {ok}, {failed}, {skipped}", summary.total)
    }
}

fn render_summary_table(summary: &RunSummary, color: bool) -> String {
    let rows: Vec<ResultRow> = summary.results.iter().map(ResultRow::from).collect();
    let mut out = String::new();
    if !rows.is_empty() {
        out.push_str(&output::render_table(&rows));
        out.push('\n');
    }
    out.push_str(&totals_line(summary, color));
    out
}

fn render_run(summary: &RunSummary, format: OutputFormat, color: bool) -> Result<String, CliError> {
    output::render_single(
        format,
        summary,
        |s| render_summary_table(s, color),
        |s| {
            s.results
                .iter()
                .map(|r| format!("{}\t{}", r.network_id, r.outcome.state()))
                .collect::<Vec<_>>()
                .join("\n")
        },
    )
}

// ── Notification sinks ──────────────────────────────────────────────

fn sinks(
    plan: &RotationPlan,
    profile: &Profile,
    settings: &DashboardSettings,
    global: &GlobalOpts,
) -> Result<Vec<Box<dyn MessageSink>>, CliError> {
    let mut sinks: Vec<Box<dyn MessageSink>> = Vec::new();
    if !global.quiet {
        sinks.push(Box::new(StderrSink));
    }
    if plan.notify {
        let token = config::resolve_webex_token(&profile.notify).ok_or_else(|| {
            CliError::Validation {
                field: "notify".into(),
                reason: "--notify needs a Webex bot token (PSKROTATE_WEBEX_TOKEN or notify.webex_token)".into(),
            }
        })?;
        let room = profile.notify.room_id.clone().ok_or_else(|| CliError::Validation {
            field: "notify.room_id".into(),
            reason: "--notify needs a room ID in the profile".into(),
        })?;
        let client = WebexClient::new(&token, &TransportConfig::with_timeout(settings.timeout))
            .map_err(pskrotate_core::CoreError::from)?;
        sinks.push(Box::new(WebexSink::new(client, room)));
    }
    Ok(sinks)
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    aggregator: Aggregator<SharedDirectory>,
    args: RotateArgs,
    profile: &Profile,
    settings: &DashboardSettings,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let psk = util::read_psk(args.psk.as_deref())?;
    let plan = config::rotation_plan(&args, profile, psk)?;
    let sinks = if args.dry_run {
        Vec::new()
    } else {
        sinks(&plan, profile, settings, global)?
    };
    let cancel = util::cancel_on_ctrl_c();
    let color = output::should_color(global.color);

    // ── Preview ──
    if args.dry_run || !global.yes {
        let spinner = util::spinner("Selecting networks", global);
        let planned = aggregator.plan_networks(&plan, &cancel).await;
        spinner.finish_and_clear();
        let (org, networks) = planned?;

        if args.dry_run {
            let out = output::render_list(global.output, &networks, |n| PlannedRow::from(n), |n| {
                n.id.clone()
            })?;
            output::print_output(&out, global.quiet);
            return Ok(());
        }

        if networks.is_empty() {
            info!(org = %org.name, "no network carries the required tags");
        }
        let prompt = format!(
            "Set a new PSK on SSID {} for {} network(s) in {}?",
            plan.ssid,
            networks.len(),
            org.name
        );
        if !util::confirm(&prompt, "rotate", global.yes)? {
            return Ok(());
        }
    }

    // ── Run ──
    let aggregator = aggregator.with_notifier(Notifier::spawn(sinks));
    let outcome = aggregator.run(&plan, &cancel).await;
    aggregator.close().await;
    // An aborted run still reports the networks it already changed.
    let (summary, aborted) = match outcome {
        Ok(summary) => (summary, None),
        Err(CoreError::Aborted { cause, summary, .. }) => (*summary, Some(*cause)),
        Err(err) => return Err(err.into()),
    };

    if let Some(dir) = args.report.as_ref().or(profile.report_dir.as_ref()) {
        let path = write_report(&summary, dir)?;
        info!(path = %path.display(), "run report written");
        if !global.quiet {
            eprintln!("Report written to {}", path.display());
        }
    }

    let out = render_run(&summary, global.output, color)?;
    output::print_output(&out, global.quiet);

    if let Some(cause) = aborted {
        return Err(cause.into());
    }
    if summary.exit_clean() {
        Ok(())
    } else {
        Err(CliError::PartialFailure {
            failed: summary.failed,
            total: summary.total,
        })
    }
}
