mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use pskrotate_core::Aggregator;

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let global = cli.global;

    // Commands that need no Dashboard connection
    let command = match cli.command {
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "pskrotate", &mut std::io::stdout());
            return Ok(());
        }
        Command::Config(args) => {
            let cfg = config::load_config()?;
            return commands::config_cmd::handle(args, &cfg, &global);
        }
        other => other,
    };

    let cfg = config::load_config()?;
    let (profile_name, profile) = config::active_profile(&global, &cfg)?;
    let settings = config::resolve_settings(&cfg, &profile, &profile_name, &global)?;
    tracing::debug!(
        profile = %profile_name,
        base_url = %settings.base_url,
        "dashboard settings resolved"
    );
    let aggregator = Aggregator::new(commands::util::directory(&settings)?);

    let result = match command {
        Command::Rotate(args) => {
            commands::rotate::handle(aggregator, *args, &profile, &settings, &global).await
        }
        Command::Orgs(args) => commands::orgs::handle(&aggregator, args, &global).await,
        Command::Networks(args) => {
            commands::networks::handle(&aggregator, args, &profile, &global).await
        }
        Command::Ssids(args) => commands::ssids::handle(&aggregator, args, &profile, &global).await,
        Command::Completions(_) | Command::Config(_) => Ok(()),
    };

    // Name the profile in authentication diagnostics.
    result.map_err(|err| match err {
        CliError::AuthFailed { message, .. } => CliError::AuthFailed {
            profile: profile_name,
            message,
        },
        other => other,
    })
}
