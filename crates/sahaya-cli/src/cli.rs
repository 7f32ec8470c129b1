use clap::{Parser, Subcommand};

use crate::commands::{CommonWorks, Funerals, Meetings, Members, Serve, SettingsCommand};

#[derive(Parser, Debug)]
#[clap(name = "sahaya", version=env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[clap(long, env = "SAHAYA_DB", default_value = "sahaya.sqlite3")]
    pub members_db: String,

    /// Seconds to keep fine settings cached
    #[clap(long, env = "SAHAYA_SETTINGS_TTL", default_value_t = 60)]
    pub settings_ttl: u64,

    #[clap(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn init() -> Self {
        Self::parse()
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage members
    #[clap(subcommand, name = "members")]
    Members(Members),

    /// Record meeting attendance
    #[clap(subcommand, name = "meeting")]
    Meeting(Meetings),

    /// Register funerals and record their rosters
    #[clap(subcommand, name = "funeral")]
    Funeral(Funerals),

    /// Record communal work attendance
    #[clap(subcommand, name = "common-work")]
    CommonWork(CommonWorks),

    /// Show or change fine amounts
    #[clap(subcommand, name = "settings")]
    Settings(SettingsCommand),

    /// Run the HTTP API
    #[clap(name = "serve")]
    Serve(Serve),
}
