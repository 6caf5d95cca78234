// ── Run report rendering ──
//
// Text for the notifier and the JSON file written after a run. Neither
// ever contains the PSK: `UpdateResult` has no field for it.

use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::model::{Outcome, RunSummary, UpdateResult};

/// One progress line for a finished network, e.g.
/// `[3/12] Branch 7 (#3 Guest): success`.
pub fn progress_line(result: &UpdateResult, position: usize, total: usize) -> String {
    let ssid = match (result.ssid_index, &result.ssid_name) {
        (Some(i), Some(n)) => format!(" (#{i} {n})"),
        (Some(i), None) => format!(" (#{i})"),
        _ => String::new(),
    };
    format!("[{position}/{total}] {}{ssid}: {}", result.network_name, result.outcome)
}

/// Markdown summary listing every failed network with its error kind.
pub fn render_summary(summary: &RunSummary) -> String {
    let mut out = String::new();
    let org = summary
        .organization_name
        .as_deref()
        .unwrap_or(&summary.organization_id);
    let _ = writeln!(out, "**PSK rotation finished** for {org}");
    let _ = writeln!(
        out,
        "- total: {} | succeeded: {} | failed: {} | skipped: {}",
        summary.total, summary.succeeded, summary.failed, summary.skipped
    );

    if summary.failed > 0 {
        let _ = writeln!(out, "\n**Failures**");
        for r in summary.failures() {
            if let Outcome::Failed { kind, message } = &r.outcome {
                let _ = writeln!(out, "- {} (`{}`): {kind}: {message}", r.network_name, r.network_id);
            }
        }
    }

    let skipped: Vec<&UpdateResult> = summary
        .results
        .iter()
        .filter(|r| matches!(r.outcome, Outcome::Skipped { .. }))
        .collect();
    if !skipped.is_empty() {
        let _ = writeln!(out, "\n**Skipped**");
        for r in skipped {
            if let Outcome::Skipped { reason } = &r.outcome {
                let _ = writeln!(out, "- {}: {reason}", r.network_name);
            }
        }
    }

    let _ = write!(out, "\nrun `{}`", summary.run_id);
    out
}

/// File name for a run's JSON report.
pub fn report_file_name(summary: &RunSummary) -> String {
    format!(
        "psk_rotation_{}_{}.json",
        summary.run_id,
        summary.finished_at.format("%Y%m%dT%H%M%SZ")
    )
}

/// Write the summary as pretty JSON into `dir`, creating it if needed.
pub fn write_report(summary: &RunSummary, dir: &Path) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(report_file_name(summary));
    let json = serde_json::to_string_pretty(summary).map_err(io::Error::other)?;
    fs::write(&path, json)?;
    Ok(path)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;
    use crate::error::ErrorKind;
    use crate::model::{DeviceFamily, SkipReason};

    fn result(name: &str, outcome: Outcome) -> UpdateResult {
        UpdateResult {
            network_id: format!("id-{name}"),
            network_name: name.into(),
            family: DeviceFamily::WirelessAp,
            ssid_index: Some(3),
            ssid_name: Some("Guest".into()),
            attempts: 1,
            outcome,
            trail: Vec::new(),
        }
    }

    fn summary() -> RunSummary {
        RunSummary::new(
            Uuid::new_v4(),
            "O1".into(),
            Some("Acme".into()),
            Utc::now(),
            vec![
                result("Branch 1", Outcome::Success),
                result(
                    "Branch 2",
                    Outcome::Failed {
                        kind: ErrorKind::Validation,
                        message: "psk too weak".into(),
                    },
                ),
                result(
                    "Branch 3",
                    Outcome::Skipped {
                        reason: SkipReason::SsidNotFound,
                    },
                ),
            ],
        )
    }

    #[test]
    fn progress_line_format() {
        let line = progress_line(&result("Branch 1", Outcome::Success), 2, 5);
        assert_eq!(line, "[2/5] Branch 1 (#3 Guest): success");
    }

    #[test]
    fn summary_lists_failures_and_skips() {
        let text = render_summary(&summary());
        assert!(text.contains("for Acme"));
        assert!(text.contains("total: 3 | succeeded: 1 | failed: 1 | skipped: 1"));
        assert!(text.contains("- Branch 2 (`id-Branch 2`): validation: psk too weak"));
        assert!(text.contains("- Branch 3: ssid-not-found"));
    }

    #[test]
    fn report_file_is_json_without_secrets() {
        let dir = tempfile::tempdir().unwrap();
        let summary = summary();
        let path = write_report(&summary, &dir.path().join("reports")).unwrap();

        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with(&format!("psk_rotation_{}_", summary.run_id)));

        let body = std::fs::read_to_string(&path).unwrap();
        let parsed: RunSummary = serde_json::from_str(&body).unwrap();
        assert_eq!(parsed.total, 3);
        assert!(!body.contains("psk\""));
        assert!(!body.contains("trail"));
    }
}
