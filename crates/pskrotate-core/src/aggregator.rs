// ── Run aggregator ──
//
// Resolves the organization, selects networks, drives the engine over
// them and folds every outcome into one `RunSummary`. Per-network failures
// stay inside the summary; only failures to enumerate escape as a bare
// `Err`. An authentication failure aborts the run but still returns the
// summary inside `CoreError::Aborted`.

use std::collections::BTreeSet;

use chrono::Utc;
use futures_util::stream::{self, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::{OrgSelector, RotationPlan};
use crate::directory::{Directory, TagFilter};
use crate::engine::{Engine, RetryPolicy, UpdateRequest};
use crate::error::CoreError;
use crate::model::{Network, Organization, Outcome, RunSummary, SkipReason, UpdateResult, UpdateState};
use crate::notify::Notifier;
use crate::report::{progress_line, render_summary};
use crate::selector::{TagPolicy, select};

/// Drives one rotation run over a [`Directory`].
pub struct Aggregator<D> {
    directory: D,
    notifier: Notifier,
}

impl<D: Directory> Aggregator<D> {
    pub fn new(directory: D) -> Self {
        Self {
            directory,
            notifier: Notifier::disabled(),
        }
    }

    pub fn with_notifier(mut self, notifier: Notifier) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn directory(&self) -> &D {
        &self.directory
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    /// Stop the notifier after draining what was posted.
    pub async fn close(self) {
        self.notifier.close().await;
    }

    /// Every organization the API key can see, retried like any read.
    pub async fn organizations(
        &self,
        retry: &RetryPolicy,
        cancel: &CancellationToken,
    ) -> Result<Vec<Organization>, CoreError> {
        enumerate(
            Engine::new(&self.directory, retry.clone())
                .with_retry("list organizations", "organizations", cancel, || {
                    self.directory.list_organizations()
                })
                .await,
        )
    }

    /// Networks of one organization as the directory reports them.
    pub async fn networks(
        &self,
        org_id: &str,
        filter: Option<&TagFilter>,
        retry: &RetryPolicy,
        cancel: &CancellationToken,
    ) -> Result<Vec<Network>, CoreError> {
        enumerate(
            Engine::new(&self.directory, retry.clone())
                .with_retry("list networks", org_id, cancel, || {
                    self.directory.list_networks(org_id, filter)
                })
                .await,
        )
    }

    /// Resolve the target organization.
    pub async fn resolve_organization(
        &self,
        selector: &OrgSelector,
        retry: &RetryPolicy,
        cancel: &CancellationToken,
    ) -> Result<Organization, CoreError> {
        let orgs = self.organizations(retry, cancel).await?;

        let found = match selector {
            OrgSelector::Id(id) => orgs.into_iter().find(|o| &o.id == id),
            OrgSelector::Name(name) => orgs.into_iter().find(|o| &o.name == name),
            OrgSelector::First => orgs.into_iter().next(),
        };
        found.ok_or_else(|| CoreError::OrganizationNotFound {
            selector: selector.to_string(),
        })
    }

    /// List the organization's networks and re-select them client-side.
    ///
    /// The tag filter is passed to the directory as a hint; its result is
    /// never trusted as-is.
    pub async fn select_networks(
        &self,
        org_id: &str,
        required_tags: &BTreeSet<String>,
        policy: &TagPolicy,
        retry: &RetryPolicy,
        cancel: &CancellationToken,
    ) -> Result<Vec<Network>, CoreError> {
        let filter = TagFilter {
            tags: required_tags.clone(),
            policy: *policy,
        };
        let listed = self.networks(org_id, Some(&filter), retry, cancel).await?;
        Ok(select(&listed, required_tags, policy))
    }

    /// Organization and selected networks for `plan`, without updating
    /// anything.
    pub async fn plan_networks(
        &self,
        plan: &RotationPlan,
        cancel: &CancellationToken,
    ) -> Result<(Organization, Vec<Network>), CoreError> {
        let org = self
            .resolve_organization(&plan.organization, &plan.retry, cancel)
            .await?;
        let networks = self
            .select_networks(
                &org.id,
                &plan.required_tags,
                &plan.tag_policy,
                &plan.retry,
                cancel,
            )
            .await?;
        Ok((org, networks))
    }

    /// Execute `plan`. Returns exactly one result per selected network,
    /// in enumeration order.
    ///
    /// Posting to the notifier never waits for delivery; call
    /// [`Aggregator::close`] to drain it.
    pub async fn run(
        &self,
        plan: &RotationPlan,
        cancel: &CancellationToken,
    ) -> Result<RunSummary, CoreError> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();

        let (org, networks) = self.plan_networks(plan, cancel).await?;
        let total = networks.len();
        info!(
            %run_id,
            org = %org.name,
            networks = total,
            ssid = %plan.ssid,
            concurrency = plan.concurrency.get(),
            "starting PSK rotation"
        );
        self.notifier.post(format!(
            "Rotating PSK for SSID {} on {total} network(s) in {}",
            plan.ssid, org.name
        ));

        let engine = Engine::new(&self.directory, plan.retry.clone());
        let request = UpdateRequest::from(plan);
        // Tripped by the caller or by an authentication failure.
        let abort = cancel.child_token();

        let mut updates = stream::iter(networks.iter().enumerate())
            .map(|(position, network)| {
                let (engine, request, abort) = (&engine, &request, &abort);
                async move {
                    let (result, fatal) = if abort.is_cancelled() {
                        (not_started(network), None)
                    } else {
                        engine.process_reporting_fatal(network, request, abort).await
                    };
                    (position, result, fatal)
                }
            })
            .buffer_unordered(plan.concurrency.get());

        let mut results = Vec::with_capacity(total);
        let mut fatal: Option<(String, CoreError)> = None;
        while let Some((position, result, error)) = updates.next().await {
            if let Some(err) = error {
                if fatal.is_none() {
                    warn!(network = %result.network_name, error = %err, "aborting run");
                    fatal = Some((result.network_name.clone(), err));
                    abort.cancel();
                }
            }
            self.notifier
                .post(progress_line(&result, results.len() + 1, total));
            results.push((position, result));
        }
        drop(updates);

        results.sort_by_key(|(position, _)| *position);
        let summary = RunSummary::new(
            run_id,
            org.id,
            Some(org.name),
            started_at,
            results.into_iter().map(|(_, r)| r).collect(),
        );

        info!(
            %run_id,
            total = summary.total,
            succeeded = summary.succeeded,
            failed = summary.failed,
            skipped = summary.skipped,
            "PSK rotation finished"
        );
        self.notifier.post(render_summary(&summary));

        match fatal {
            Some((network, cause)) => {
                self.notifier
                    .post(format!("PSK rotation aborted at {network}: {cause}"));
                Err(CoreError::Aborted {
                    network,
                    cause: Box::new(cause),
                    summary: Box::new(summary),
                })
            }
            None => Ok(summary),
        }
    }
}

/// Unwrap an enumeration attempt, mapping a cancel during backoff to
/// [`CoreError::Cancelled`].
fn enumerate<T>(attempted: crate::engine::Attempted<T>) -> Result<T, CoreError> {
    match attempted.result {
        Ok(v) => Ok(v),
        Err(_) if attempted.cancelled => Err(CoreError::Cancelled),
        Err(e) => Err(e),
    }
}

/// Result for a network the run never got to.
fn not_started(network: &Network) -> UpdateResult {
    UpdateResult {
        network_id: network.id.clone(),
        network_name: network.name.clone(),
        family: network.family,
        ssid_index: None,
        ssid_name: None,
        attempts: 0,
        outcome: Outcome::Skipped {
            reason: SkipReason::Cancelled,
        },
        trail: vec![UpdateState::Pending, UpdateState::Skipped],
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::num::{NonZeroU32, NonZeroUsize};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use secrecy::SecretString;

    use tokio::time::Instant;

    use super::*;
    use crate::directory::Throttled;
    use crate::limiter::RateLimiter;
    use crate::model::DeviceFamily;
    use crate::notify::{MessageSink, NotifyError};
    use crate::testing::{FakeDirectory, network, transient};

    fn plan() -> crate::config::RotationPlanBuilder {
        RotationPlan::builder()
            .required_tags(["psk-rotate"])
            .ssid_index(Some(3))
            .psk(SecretString::from("NewPass123!".to_owned()))
    }

    fn fleet() -> FakeDirectory {
        FakeDirectory::default()
            .with_org("O1", "Acme")
            .with_org("O2", "Globex")
            .with_network(network("N1", &["psk-rotate"]))
            .with_network(network("N2", &[]))
            .with_network(network("N3", &["psk-rotate", "branch"]))
            .with_network(network("N4", &["psk-rotate"]))
    }

    fn ids(summary: &RunSummary) -> Vec<&str> {
        summary.results.iter().map(|r| r.network_id.as_str()).collect()
    }

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<String>>>);

    #[async_trait]
    impl MessageSink for Capture {
        fn name(&self) -> &str {
            "capture"
        }

        async fn post(&self, message: &str) -> Result<(), NotifyError> {
            self.0.lock().unwrap().push(message.to_owned());
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn one_result_per_selected_network_in_order() {
        let agg = Aggregator::new(fleet());
        let summary = agg
            .run(&plan().build().unwrap(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(summary.organization_id, "O1");
        assert_eq!(ids(&summary), vec!["N1", "N3", "N4"]);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.succeeded, 3);
        assert!(summary.exit_clean());
        assert_eq!(agg.directory().writes().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn failures_are_captured_not_raised() {
        let dir = fleet().fail_writes(
            "N3",
            [CoreError::Validation {
                message: "psk policy".into(),
            }],
        );
        let summary = Aggregator::new(dir)
            .run(&plan().build().unwrap(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(summary.failed, 1);
        assert_eq!(summary.succeeded, 2);
        let failed: Vec<_> = summary.failures().map(|r| r.network_id.as_str()).collect();
        assert_eq!(failed, vec!["N3"]);
        assert!(!summary.exit_clean());
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_run_keeps_input_order() {
        // N1 retries twice, so it finishes after N3 and N4.
        let dir = fleet().fail_writes("N1", [transient(None), transient(None)]);
        let plan = plan()
            .concurrency(NonZeroUsize::new(3).unwrap())
            .build()
            .unwrap();
        let summary = Aggregator::new(dir)
            .run(&plan, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(ids(&summary), vec!["N1", "N3", "N4"]);
        assert_eq!(summary.results[0].attempts, 3);
        assert_eq!(summary.succeeded, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn organization_selection() {
        let agg = Aggregator::new(fleet());
        let cancel = CancellationToken::new();
        let retry = RetryPolicy::none();

        let by_name = agg
            .resolve_organization(&OrgSelector::Name("Globex".into()), &retry, &cancel)
            .await
            .unwrap();
        assert_eq!(by_name.id, "O2");

        let missing = agg
            .resolve_organization(&OrgSelector::Id("O9".into()), &retry, &cancel)
            .await;
        assert!(matches!(missing, Err(CoreError::OrganizationNotFound { .. })));

        // Names are matched exactly.
        let wrong_case = agg
            .resolve_organization(&OrgSelector::Name("acme".into()), &retry, &cancel)
            .await;
        assert!(wrong_case.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn unfiltered_listing_returns_every_network() {
        let dir = fleet().fail_networks([transient(None)]);
        let agg = Aggregator::new(dir);
        let cancel = CancellationToken::new();

        let orgs = agg.organizations(&RetryPolicy::none(), &cancel).await.unwrap();
        assert_eq!(orgs.len(), 2);

        let all = agg
            .networks("O1", None, &RetryPolicy::immediate(2), &cancel)
            .await
            .unwrap();
        assert_eq!(all.len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn enumeration_failure_escalates_after_retries() {
        let dir = fleet().fail_networks((0..3).map(|_| transient(None)));
        let result = Aggregator::new(dir)
            .run(&plan().build().unwrap(), &CancellationToken::new())
            .await;
        assert!(matches!(result, Err(CoreError::Transient { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn enumeration_recovers_from_one_transient_failure() {
        let dir = fleet().fail_networks([transient(None)]);
        let summary = Aggregator::new(dir)
            .run(&plan().build().unwrap(), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(summary.total, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn auth_failure_aborts_the_run() {
        let dir = fleet().fail_writes(
            "N1",
            [CoreError::Auth {
                message: "key revoked".into(),
            }],
        );
        let agg = Aggregator::new(dir);
        let result = agg
            .run(&plan().build().unwrap(), &CancellationToken::new())
            .await;

        let (network, cause, summary) = match result {
            Err(CoreError::Aborted {
                network,
                cause,
                summary,
            }) => (network, cause, summary),
            other => panic!("expected an aborted run, got {other:?}"),
        };
        assert_eq!(network, "Net N1");
        assert_eq!(cause.to_string(), "Authentication failed: key revoked");
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.skipped, 2);
        assert_eq!(agg.directory().writes().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn aborted_run_keeps_networks_already_updated() {
        let dir = fleet().fail_writes(
            "N4",
            [CoreError::Auth {
                message: "403 on N4".into(),
            }],
        );
        let agg = Aggregator::new(dir);
        let result = agg
            .run(&plan().build().unwrap(), &CancellationToken::new())
            .await;

        let summary = match result {
            Err(CoreError::Aborted { summary, .. }) => summary,
            other => panic!("expected an aborted run, got {other:?}"),
        };
        assert_eq!(ids(&summary), vec!["N1", "N3", "N4"]);
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.results[2].outcome.state(), UpdateState::Failed);
        assert_eq!(agg.directory().writes().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn shared_limiter_bounds_parallel_requests() {
        let limiter = Arc::new(RateLimiter::new(NonZeroU32::new(2).unwrap()));
        let dir = fleet().with_network(network("N5", &["psk-rotate"]));
        let agg = Aggregator::new(Throttled::new(dir, limiter));
        let plan = plan()
            .concurrency(NonZeroUsize::new(4).unwrap())
            .build()
            .unwrap();

        let start = Instant::now();
        let summary = agg.run(&plan, &CancellationToken::new()).await.unwrap();
        let elapsed = start.elapsed();

        assert_eq!(summary.succeeded, 4);
        let inner = agg.directory().inner();
        // Organizations, networks, then one SSID read and one write per network.
        let calls = 2 + inner.ssid_reads() + u32::try_from(inner.writes().len()).unwrap();
        assert_eq!(calls, 10);
        assert!(elapsed >= Duration::from_millis(500) * (calls - 1), "{elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_run_skips_unstarted_networks() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let agg = Aggregator::new(fleet());
        let summary = agg.run(&plan().build().unwrap(), &cancel).await.unwrap();

        assert_eq!(summary.total, 3);
        assert_eq!(summary.skipped, 3);
        assert!(summary.results.iter().all(|r| r.outcome
            == Outcome::Skipped {
                reason: SkipReason::Cancelled
            }));
        assert!(agg.directory().writes().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn progress_is_posted_per_network() {
        let sink = Capture::default();
        let agg = Aggregator::new(fleet()).with_notifier(Notifier::spawn(vec![Box::new(sink.clone())]));
        agg.run(&plan().build().unwrap(), &CancellationToken::new())
            .await
            .unwrap();
        agg.close().await;

        let messages = sink.0.lock().unwrap().clone();
        // Header, one line per network, final summary.
        assert_eq!(messages.len(), 5);
        assert!(messages[1].starts_with("[1/3] Net N1"));
        assert!(messages[4].contains("PSK rotation finished"));
    }

    #[tokio::test(start_paused = true)]
    async fn appliance_networks_use_their_family() {
        let mut mx = network("MX1", &["psk-rotate"]);
        mx.family = DeviceFamily::WirelessAppliance;
        let dir = FakeDirectory::default().with_org("O1", "Acme").with_network(mx);
        let agg = Aggregator::new(dir);
        agg.run(&plan().build().unwrap(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(
            agg.directory().writes()[0].family,
            DeviceFamily::WirelessAppliance
        );
    }
}
