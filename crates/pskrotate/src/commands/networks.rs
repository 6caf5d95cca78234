//! Network command handlers.

use tabled::Tabled;
use tokio_util::sync::CancellationToken;

use pskrotate_core::{Aggregator, Network};

use crate::cli::{GlobalOpts, NetworksArgs, NetworksCommand};
use crate::config::{self, Profile};
use crate::error::CliError;
use crate::output;

use super::util::{self, SharedDirectory};

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct NetworkRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Family")]
    family: String,
    #[tabled(rename = "Tags")]
    tags: String,
}

impl From<&Network> for NetworkRow {
    fn from(n: &Network) -> Self {
        Self {
            id: n.id.clone(),
            name: n.name.clone(),
            family: n.family.to_string(),
            tags: n.tags.iter().cloned().collect::<Vec<_>>().join(", "),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    aggregator: &Aggregator<SharedDirectory>,
    args: NetworksArgs,
    profile: &Profile,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        NetworksCommand::List {
            org,
            tags,
            tag_match,
            ignore_case,
        } => {
            let cancel = CancellationToken::new();
            let retry = profile.retry_policy()?;
            let selector = config::org_selector(&org, profile);
            // Only explicit --tag flags filter here; profile tags apply to `rotate`.
            let required = config::required_tags(&tags, &Profile::default());
            let policy = config::tag_policy(tag_match, ignore_case, profile);

            let spinner = util::spinner("Listing networks", global);
            let listed = async {
                let org = aggregator.resolve_organization(&selector, &retry, &cancel).await?;
                if required.is_empty() {
                    aggregator.networks(&org.id, None, &retry, &cancel).await
                } else {
                    aggregator
                        .select_networks(&org.id, &required, &policy, &retry, &cancel)
                        .await
                }
            }
            .await;
            spinner.finish_and_clear();
            let networks = listed?;

            let out = output::render_list(global.output, &networks, |n| NetworkRow::from(n), |n| {
                n.id.clone()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
