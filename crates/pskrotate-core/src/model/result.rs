// ── Per-network results and run summary ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::network::DeviceFamily;
use crate::error::{CoreError, ErrorKind};

/// Lifecycle of one network's update. Terminal states are never left.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum UpdateState {
    Pending,
    ResolvingSsid,
    Updating,
    Done,
    Skipped,
    Failed,
}

impl UpdateState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Skipped | Self::Failed)
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum SkipReason {
    /// Configured SSID index/name absent in this network.
    SsidNotFound,
    /// Network no longer carries the required tags.
    TagsMismatch,
    /// Run cancelled before this network was attempted.
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum Outcome {
    Success,
    Skipped { reason: SkipReason },
    Failed { kind: ErrorKind, message: String },
}

impl Outcome {
    pub fn failed(err: &CoreError) -> Self {
        Self::Failed {
            kind: err.kind(),
            message: err.to_string(),
        }
    }

    pub fn state(&self) -> UpdateState {
        match self {
            Self::Success => UpdateState::Done,
            Self::Skipped { .. } => UpdateState::Skipped,
            Self::Failed { .. } => UpdateState::Failed,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => f.write_str("success"),
            Self::Skipped { reason } => write!(f, "skipped ({reason})"),
            Self::Failed { kind, message } => write!(f, "failed [{kind}]: {message}"),
        }
    }
}

/// The terminal record for one network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateResult {
    pub network_id: String,
    pub network_name: String,
    pub family: DeviceFamily,
    /// Resolved SSID slot, if resolution got that far.
    pub ssid_index: Option<u8>,
    pub ssid_name: Option<String>,
    /// Number of PSK write attempts made (reads are not counted).
    pub attempts: u32,
    pub outcome: Outcome,
    /// States visited, in order. Kept for tests and debug logging.
    #[serde(skip)]
    pub trail: Vec<UpdateState>,
}

impl UpdateResult {
    pub fn state(&self) -> UpdateState {
        self.outcome.state()
    }
}

/// Aggregate over one rotation run. `results` is in network enumeration
/// order and holds exactly one entry per selected network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub organization_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_name: Option<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    pub results: Vec<UpdateResult>,
}

impl RunSummary {
    /// Build a summary, deriving the counts from `results`.
    pub fn new(
        run_id: Uuid,
        organization_id: String,
        organization_name: Option<String>,
        started_at: DateTime<Utc>,
        results: Vec<UpdateResult>,
    ) -> Self {
        let count = |f: fn(&Outcome) -> bool| results.iter().filter(|r| f(&r.outcome)).count();
        let succeeded = count(Outcome::is_success);
        let failed = count(Outcome::is_failed);
        Self {
            run_id,
            organization_id,
            organization_name,
            started_at,
            finished_at: Utc::now(),
            total: results.len(),
            succeeded,
            failed,
            skipped: results.len() - succeeded - failed,
            results,
        }
    }

    pub fn failures(&self) -> impl Iterator<Item = &UpdateResult> {
        self.results.iter().filter(|r| r.outcome.is_failed())
    }

    /// No network failed. Skips do not count against a run.
    pub fn exit_clean(&self) -> bool {
        self.failed == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(id: &str, outcome: Outcome) -> UpdateResult {
        UpdateResult {
            network_id: id.into(),
            network_name: id.to_uppercase(),
            family: DeviceFamily::WirelessAp,
            ssid_index: Some(3),
            ssid_name: Some("Guest".into()),
            attempts: 1,
            outcome,
            trail: Vec::new(),
        }
    }

    #[test]
    fn summary_counts_add_up() {
        let results = vec![
            result("n1", Outcome::Success),
            result(
                "n2",
                Outcome::Skipped {
                    reason: SkipReason::SsidNotFound,
                },
            ),
            result(
                "n3",
                Outcome::Failed {
                    kind: ErrorKind::Validation,
                    message: "bad psk".into(),
                },
            ),
            result("n4", Outcome::Success),
        ];
        let summary = RunSummary::new(Uuid::new_v4(), "o1".into(), None, Utc::now(), results);

        assert_eq!(summary.total, 4);
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.failed, 1);
        assert!(!summary.exit_clean());
        assert_eq!(
            summary.failures().map(|r| r.network_id.as_str()).collect::<Vec<_>>(),
            vec!["n3"]
        );
    }

    #[test]
    fn outcome_serializes_with_status_tag() {
        let json = serde_json::to_value(Outcome::Skipped {
            reason: SkipReason::TagsMismatch,
        })
        .ok();
        assert_eq!(
            json,
            Some(serde_json::json!({ "status": "skipped", "reason": "tags-mismatch" }))
        );
    }

    #[test]
    fn terminal_states() {
        assert!(UpdateState::Done.is_terminal());
        assert!(UpdateState::Failed.is_terminal());
        assert!(!UpdateState::Updating.is_terminal());
        assert_eq!(Outcome::Success.state(), UpdateState::Done);
    }
}
