//! Config subcommand handlers.

use tabled::Tabled;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config};
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct ProfileRow {
    #[tabled(rename = "Profile")]
    name: String,
    #[tabled(rename = "Default")]
    default: String,
    #[tabled(rename = "Tags")]
    tags: String,
    #[tabled(rename = "Base URL")]
    base_url: String,
}

pub fn handle(args: ConfigArgs, cfg: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }

        ConfigCommand::Show => {
            let rendered = config::render_redacted(cfg)?;
            output::print_output(rendered.trim_end(), global.quiet);
            Ok(())
        }

        ConfigCommand::Profiles => {
            let active = config::active_profile_name(global, cfg);
            let mut names: Vec<&String> = cfg.profiles.keys().collect();
            names.sort();
            let rows: Vec<ProfileRow> = names
                .into_iter()
                .map(|name| {
                    let p = &cfg.profiles[name];
                    ProfileRow {
                        name: name.clone(),
                        default: if *name == active { "*" } else { "" }.into(),
                        tags: p.required_tags.join(", "),
                        base_url: p.base_url.clone().unwrap_or_default(),
                    }
                })
                .collect();

            let out = if rows.is_empty() {
                String::new()
            } else {
                output::render_table(&rows)
            };
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
