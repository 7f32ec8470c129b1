use std::time::Duration;

use anyhow::Result;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use sahaya_db::Connection;
use sahaya_reconcile::settings::SettingsCache;

mod cli;
mod commands;
mod formatting;

use cli::{Cli, Command};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sahaya=info,tower_http=info".into()),
        )
        .init();

    let cli = Cli::init();
    let conn = Connection::open(&cli.members_db).await?;
    let settings = SettingsCache::new(Duration::from_secs(cli.settings_ttl));
    debug!(db = %cli.members_db, ttl = ?settings.ttl(), "opened store");

    match cli.command {
        Command::Members(cmd) => cmd.run(&conn).await,
        Command::Meeting(cmd) => cmd.run(&conn).await,
        Command::Funeral(cmd) => cmd.run(&conn, &settings).await,
        Command::CommonWork(cmd) => cmd.run(&conn, &settings).await,
        Command::Settings(cmd) => cmd.run(&conn, &settings).await,
        Command::Serve(cmd) => cmd.run(conn, settings).await,
    }?;

    Ok(())
}
