// ── Per-network PSK update engine ──
//
// Walks one network through
//   Pending → ResolvingSsid → Updating → Done | Skipped | Failed
// and always returns a terminal `UpdateResult`. Errors never escape:
// they are classified into the result's outcome.

mod retry;

use std::collections::BTreeSet;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::future::Future;

use secrecy::SecretString;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::RotationPlan;
use crate::directory::Directory;
use crate::error::CoreError;
use crate::model::{Network, Outcome, SkipReason, SsidSelector, UpdateResult, UpdateState};
use crate::selector::TagPolicy;

pub use retry::RetryPolicy;

/// The per-network parameters of an update, shared by every network in a run.
#[derive(Debug, Clone)]
pub struct UpdateRequest {
    pub ssid: SsidSelector,
    pub psk: SecretString,
    /// Re-checked against each network before anything is read.
    pub required_tags: BTreeSet<String>,
    pub tag_policy: TagPolicy,
}

impl UpdateRequest {
    /// A request with no tag requirement (single-network updates).
    pub fn untagged(ssid: SsidSelector, psk: SecretString) -> Self {
        Self {
            ssid,
            psk,
            required_tags: BTreeSet::new(),
            tag_policy: TagPolicy::default(),
        }
    }
}

impl From<&RotationPlan> for UpdateRequest {
    fn from(plan: &RotationPlan) -> Self {
        Self {
            ssid: plan.ssid.clone(),
            psk: plan.psk.clone(),
            required_tags: plan.required_tags.clone(),
            tag_policy: plan.tag_policy,
        }
    }
}

/// Result of driving one remote operation through the retry policy.
pub(crate) struct Attempted<T> {
    pub result: Result<T, CoreError>,
    pub calls: u32,
    /// A cancel arrived while waiting to retry.
    pub cancelled: bool,
}

/// Accumulates the state trail and partial result for one network.
struct Progress<'a> {
    network: &'a Network,
    trail: Vec<UpdateState>,
    ssid_index: Option<u8>,
    ssid_name: Option<String>,
    attempts: u32,
}

impl<'a> Progress<'a> {
    fn new(network: &'a Network) -> Self {
        Self {
            network,
            trail: vec![UpdateState::Pending],
            ssid_index: None,
            ssid_name: None,
            attempts: 0,
        }
    }

    fn enter(&mut self, state: UpdateState) {
        debug!(network_id = %self.network.id, %state, "state transition");
        self.trail.push(state);
    }

    fn finish(mut self, outcome: Outcome) -> UpdateResult {
        self.enter(outcome.state());
        match &outcome {
            Outcome::Success => info!(
                network = %self.network.name,
                ssid = self.ssid_index,
                attempts = self.attempts,
                "PSK updated"
            ),
            Outcome::Skipped { reason } => {
                info!(network = %self.network.name, %reason, "network skipped");
            }
            Outcome::Failed { kind, message } => {
                warn!(network = %self.network.name, %kind, error = %message, "network failed");
            }
        }
        UpdateResult {
            network_id: self.network.id.clone(),
            network_name: self.network.name.clone(),
            family: self.network.family,
            ssid_index: self.ssid_index,
            ssid_name: self.ssid_name,
            attempts: self.attempts,
            outcome,
            trail: self.trail,
        }
    }
}

/// Applies a PSK to one network at a time through a [`Directory`].
pub struct Engine<D> {
    directory: D,
    retry: RetryPolicy,
}

impl<D: Directory> Engine<D> {
    pub fn new(directory: D, retry: RetryPolicy) -> Self {
        Self { directory, retry }
    }

    pub fn directory(&self) -> &D {
        &self.directory
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Drive `network` to a terminal state.
    ///
    /// `cancel` is only observed between attempts: an issued write is
    /// always allowed to complete or time out.
    pub async fn process(
        &self,
        network: &Network,
        request: &UpdateRequest,
        cancel: &CancellationToken,
    ) -> UpdateResult {
        self.process_reporting_fatal(network, request, cancel).await.0
    }

    /// Like [`Engine::process`], also handing back the error when it must
    /// abort the whole run.
    pub(crate) async fn process_reporting_fatal(
        &self,
        network: &Network,
        request: &UpdateRequest,
        cancel: &CancellationToken,
    ) -> (UpdateResult, Option<CoreError>) {
        let mut progress = Progress::new(network);

        if !request
            .tag_policy
            .matches(&network.tags, &request.required_tags)
        {
            let result = progress.finish(Outcome::Skipped {
                reason: SkipReason::TagsMismatch,
            });
            return (result, None);
        }

        // ── Resolve SSID ──
        progress.enter(UpdateState::ResolvingSsid);
        let listed = self
            .with_retry("list SSIDs", &network.name, cancel, || {
                self.directory.list_ssids(&network.id, network.family)
            })
            .await;
        let ssids = match listed.result {
            Ok(ssids) => ssids,
            Err(err) => return finish_failed(progress, err, listed.cancelled),
        };

        let Some(target) = request.ssid.resolve(&ssids) else {
            debug!(network_id = %network.id, selector = %request.ssid, "no matching SSID");
            let result = progress.finish(Outcome::Skipped {
                reason: SkipReason::SsidNotFound,
            });
            return (result, None);
        };
        progress.ssid_index = Some(target.index);
        progress.ssid_name = Some(target.name.clone());
        let index = target.index;

        // ── Update ──
        progress.enter(UpdateState::Updating);
        let written = self
            .with_retry("set PSK", &network.name, cancel, || {
                self.directory
                    .set_ssid_psk(&network.id, network.family, index, &request.psk)
            })
            .await;
        progress.attempts = written.calls;

        match written.result {
            Ok(()) => (progress.finish(Outcome::Success), None),
            Err(err) => finish_failed(progress, err, written.cancelled),
        }
    }

    /// Run `op` until it succeeds, fails terminally, exhausts the policy,
    /// or a cancel arrives during a backoff wait.
    pub(crate) async fn with_retry<T, F, Fut>(
        &self,
        what: &str,
        target: &str,
        cancel: &CancellationToken,
        mut op: F,
    ) -> Attempted<T>
    where
        F: FnMut() -> Fut + Send,
        Fut: Future<Output = Result<T, CoreError>> + Send,
        T: Send,
    {
        let max = self.retry.attempts();
        let mut calls = 0;
        loop {
            calls += 1;
            let err = match op().await {
                Ok(value) => {
                    return Attempted {
                        result: Ok(value),
                        calls,
                        cancelled: false,
                    };
                }
                Err(err) => err,
            };

            if !err.is_retryable() || calls >= max {
                return Attempted {
                    result: Err(err),
                    calls,
                    cancelled: false,
                };
            }

            let delay = self.retry.delay(calls, err.retry_after(), jitter_seed(target));
            warn!(
                target,
                operation = what,
                attempt = calls,
                max_attempts = max,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                error = %err,
                "transient failure, retrying"
            );

            tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    return Attempted {
                        result: Err(err),
                        calls,
                        cancelled: true,
                    };
                }
                () = tokio::time::sleep(delay) => {}
            }
        }
    }
}

fn finish_failed(
    progress: Progress<'_>,
    err: CoreError,
    cancelled: bool,
) -> (UpdateResult, Option<CoreError>) {
    let result = progress.finish(failure(&err, cancelled));
    let fatal = err.is_fatal().then_some(err);
    (result, fatal)
}

fn jitter_seed(target: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    target.hash(&mut hasher);
    hasher.finish()
}

fn failure(err: &CoreError, cancelled: bool) -> Outcome {
    let mut outcome = Outcome::failed(err);
    if cancelled {
        if let Outcome::Failed { message, .. } = &mut outcome {
            message.push_str(" (cancelled before retry)");
        }
    }
    outcome
}
