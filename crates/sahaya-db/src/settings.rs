use anyhow::Result;
use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite};

use sahaya_data::{Retrieve, Settings, Update};

use crate::Connection;

#[async_trait]
impl Retrieve<Settings> for Connection {
    type Key = ();

    /// Fetch current fine settings from database
    async fn retrieve(&self, _key: Self::Key) -> Result<Settings> {
        let mut conn = self.lock().await;
        let settings: Settings = sqlx::query_as(
            r#"
            SELECT
                funeral_fine,
                funeral_work_fine,
                cemetery_work_fine,
                common_work_fine
            FROM settings
            WHERE id = 1
            "#)
            .fetch_one(&mut *conn)
            .await?;
        Ok(settings)
    }
}

#[async_trait]
impl Update<Settings> for Connection {
    /// Update fine settings in database
    async fn update(&self, settings: Settings) -> Result<Settings> {
        {
            let mut conn = self.lock().await;
            QueryBuilder::<Sqlite>::new("UPDATE settings SET")
                .push(" funeral_fine = ")
                .push_bind(settings.funeral_fine)
                .push(", funeral_work_fine = ")
                .push_bind(settings.funeral_work_fine)
                .push(", cemetery_work_fine = ")
                .push_bind(settings.cemetery_work_fine)
                .push(", common_work_fine = ")
                .push_bind(settings.common_work_fine)
                .push(" WHERE id = 1")
                .build()
                .execute(&mut *conn)
                .await?;
        }
        self.retrieve(()).await
    }
}
