use std::net::SocketAddr;

use anyhow::Result;
use clap::Args;
use tracing::info;

use sahaya_api::AppStateInner;
use sahaya_db::Connection;
use sahaya_reconcile::settings::SettingsCache;

#[derive(Args, Debug)]
pub struct Serve {
    #[clap(short, long, env = "SAHAYA_LISTEN", default_value = "127.0.0.1:3000")]
    pub listen: SocketAddr,
}

impl Serve {
    pub async fn run(self, db: Connection, settings: SettingsCache) -> Result<()> {
        let app = sahaya_api::router(AppStateInner::new(db, settings));

        info!("sahaya listening on {}", self.listen);
        let listener = tokio::net::TcpListener::bind(self.listen).await?;
        axum::serve(listener, app).await?;
        Ok(())
    }
}
