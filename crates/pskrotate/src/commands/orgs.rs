//! Organization command handlers.

use tabled::Tabled;
use tokio_util::sync::CancellationToken;

use pskrotate_core::{Aggregator, Organization, RetryPolicy};

use crate::cli::{GlobalOpts, OrgsArgs, OrgsCommand};
use crate::error::CliError;
use crate::output;

use super::util::{self, SharedDirectory};

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct OrgRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
}

impl From<&Organization> for OrgRow {
    fn from(o: &Organization) -> Self {
        Self {
            id: o.id.clone(),
            name: o.name.clone(),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    aggregator: &Aggregator<SharedDirectory>,
    args: OrgsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        OrgsCommand::List => {
            let spinner = util::spinner("Listing organizations", global);
            let orgs = aggregator
                .organizations(&RetryPolicy::default(), &CancellationToken::new())
                .await;
            spinner.finish_and_clear();
            let orgs = orgs?;

            let out = output::render_list(global.output, &orgs, |o| OrgRow::from(o), |o| o.id.clone())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
