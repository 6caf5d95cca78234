//! Command handlers, one module per top-level subcommand.

pub mod config_cmd;
pub mod networks;
pub mod orgs;
pub mod rotate;
pub mod ssids;
pub mod util;
