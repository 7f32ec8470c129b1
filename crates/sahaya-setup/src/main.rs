use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use sahaya_db::Connection;

#[derive(Parser, Debug)]
#[clap(name = "sahaya-setup")]
struct Cli {
    #[clap(long, env = "SAHAYA_DB", default_value = "sahaya.sqlite3")]
    pub members_db: String,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the database and install the schema
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "sahaya=info".into()),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Init => {
            Connection::create(&cli.members_db).await?;
        }
    }
    Ok(())
}
