//! Clap derive structures for the `pskrotate` CLI.
//!
//! Only clap and clap_complete may be used here: `build.rs` includes this
//! file directly to render man pages.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// pskrotate -- bulk wireless PSK rotation for Dashboard organizations
#[derive(Debug, Parser)]
#[command(
    name = "pskrotate",
    version,
    about = "Rotate the PSK of one SSID across every tagged Dashboard network",
    long_about = "Selects the networks of a Dashboard organization that carry the\n\
        required tags and sets a new pre-shared key on the chosen SSID of each,\n\
        for both wireless access points and appliances with built-in Wi-Fi.\n\n\
        Every network is reported individually; the run exits with status 9\n\
        when at least one network failed.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Configuration profile to use
    #[arg(long, short = 'p', env = "PSKROTATE_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Dashboard API base URL (overrides profile)
    #[arg(long, env = "PSKROTATE_BASE_URL", global = true)]
    pub base_url: Option<String>,

    /// Dashboard API key
    #[arg(long, env = "PSKROTATE_API_KEY", global = true, hide_env = true)]
    pub api_key: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "PSKROTATE_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "PSKROTATE_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TagMatch {
    /// Every required tag must be present
    All,
    /// At least one required tag must be present
    Any,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Rotate the PSK on every network carrying the required tags
    Rotate(Box<RotateArgs>),

    /// List organizations visible to the API key
    #[command(alias = "org")]
    Orgs(OrgsArgs),

    /// List an organization's networks
    #[command(alias = "net", alias = "n")]
    Networks(NetworksArgs),

    /// Inspect and update SSIDs of a single network
    Ssids(SsidsArgs),

    /// Inspect CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Shared selection arguments ───────────────────────────────────────

/// Which organization to act on. Without either flag the profile decides,
/// falling back to the first organization the key can see.
#[derive(Debug, Args)]
pub struct OrgArgs {
    /// Organization ID
    #[arg(long, conflicts_with = "org_name")]
    pub org: Option<String>,

    /// Organization name (exact match)
    #[arg(long)]
    pub org_name: Option<String>,
}

/// Which SSID to act on. Without either flag the profile decides,
/// falling back to SSID number 3.
#[derive(Debug, Args)]
pub struct SsidArgs {
    /// SSID number (0-14)
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=14))]
    pub ssid_number: Option<u8>,

    /// SSID name (case-insensitive, ignored when --ssid-number is given)
    #[arg(long)]
    pub ssid_name: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  ROTATE
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct RotateArgs {
    /// New pre-shared key (prompted when omitted)
    #[arg(long, env = "PSKROTATE_PSK", hide_env_values = true)]
    pub psk: Option<String>,

    /// Required network tag (repeatable)
    #[arg(long = "tag", short = 't', value_name = "TAG")]
    pub tags: Vec<String>,

    /// How multiple tags combine
    #[arg(long = "match", value_name = "MODE")]
    pub tag_match: Option<TagMatch>,

    /// Compare tags case-insensitively
    #[arg(long)]
    pub ignore_case: bool,

    #[command(flatten)]
    pub org: OrgArgs,

    #[command(flatten)]
    pub ssid: SsidArgs,

    /// Post progress and the final summary to the configured Webex room
    #[arg(long)]
    pub notify: bool,

    /// Write a JSON run report into this directory
    #[arg(long, value_name = "DIR")]
    pub report: Option<PathBuf>,

    /// Networks updated in parallel
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..=32))]
    pub concurrency: Option<u64>,

    /// Only list the networks that would be updated
    #[arg(long)]
    pub dry_run: bool,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  ORGS / NETWORKS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct OrgsArgs {
    #[command(subcommand)]
    pub command: OrgsCommand,
}

#[derive(Debug, Subcommand)]
pub enum OrgsCommand {
    /// List organizations
    #[command(alias = "ls")]
    List,
}

#[derive(Debug, Args)]
pub struct NetworksArgs {
    #[command(subcommand)]
    pub command: NetworksCommand,
}

#[derive(Debug, Subcommand)]
pub enum NetworksCommand {
    /// List networks, optionally only those carrying the given tags
    #[command(alias = "ls")]
    List {
        #[command(flatten)]
        org: OrgArgs,

        /// Required network tag (repeatable)
        #[arg(long = "tag", short = 't', value_name = "TAG")]
        tags: Vec<String>,

        /// How multiple tags combine
        #[arg(long = "match", value_name = "MODE")]
        tag_match: Option<TagMatch>,

        /// Compare tags case-insensitively
        #[arg(long)]
        ignore_case: bool,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  SSIDS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct SsidsArgs {
    #[command(subcommand)]
    pub command: SsidsCommand,
}

#[derive(Debug, Subcommand)]
pub enum SsidsCommand {
    /// List the SSIDs of one network
    #[command(alias = "ls")]
    List {
        /// Network ID or name
        network: String,

        #[command(flatten)]
        org: OrgArgs,
    },

    /// Set the PSK on one SSID of one network
    SetPsk {
        /// Network ID or name
        network: String,

        #[command(flatten)]
        org: OrgArgs,

        #[command(flatten)]
        ssid: SsidArgs,

        /// New pre-shared key (prompted when omitted)
        #[arg(long, env = "PSKROTATE_PSK", hide_env_values = true)]
        psk: Option<String>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG / COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file location
    Path,

    /// Display the resolved configuration with secrets masked
    Show,

    /// List configured profiles
    Profiles,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
