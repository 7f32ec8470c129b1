use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;

use sahaya_data::{FineKind, Retrieve, Settings};

use crate::{ReconcileError, Result};

/// Fine amounts, read through from the store and kept for `ttl`.
///
/// The cache is owned by whoever drives the engine. Writers of
/// the settings must call `invalidate` (or `refresh`).
#[derive(Debug)]
pub struct SettingsCache {
    ttl: Duration,
    cached: RwLock<Option<(Instant, Settings)>>,
}

impl SettingsCache {
    pub fn new(ttl: Duration) -> Self {
        SettingsCache {
            ttl,
            cached: RwLock::new(None),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Cached settings, or fresh ones if the cache is empty or stale.
    pub async fn get<DB>(&self, db: &DB) -> Result<Settings>
    where
        DB: Retrieve<Settings, Key = ()> + Sync,
    {
        if let Some((loaded, settings)) = &*self.cached.read().await {
            if loaded.elapsed() < self.ttl {
                return Ok(settings.clone());
            }
        }
        self.refresh(db).await
    }

    /// Configured amount of a fine kind.
    pub async fn amount<DB>(&self, db: &DB, kind: FineKind) -> Result<i64>
    where
        DB: Retrieve<Settings, Key = ()> + Sync,
    {
        self.get(db)
            .await?
            .amount(kind)
            .ok_or_else(|| ReconcileError::Invalid(format!("no configured amount for {} fines", kind)))
    }

    /// Reload from the store.
    pub async fn refresh<DB>(&self, db: &DB) -> Result<Settings>
    where
        DB: Retrieve<Settings, Key = ()> + Sync,
    {
        let settings = db.retrieve(()).await?;
        debug!(?settings, "loaded fine settings");
        *self.cached.write().await = Some((Instant::now(), settings.clone()));
        Ok(settings)
    }

    pub async fn invalidate(&self) {
        *self.cached.write().await = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use sahaya_data::Update;

    use crate::testing::open;

    #[tokio::test]
    async fn test_settings_cached_until_invalidated() {
        let db = open().await;
        let cache = SettingsCache::new(Duration::from_secs(3600));
        assert_eq!(cache.get(&db).await.unwrap(), Settings::default());

        db.update(Settings {
            funeral_fine: 150,
            ..Default::default()
        }).await.unwrap();
        assert_eq!(cache.get(&db).await.unwrap().funeral_fine, 100);

        cache.invalidate().await;
        assert_eq!(cache.get(&db).await.unwrap().funeral_fine, 150);
    }

    #[tokio::test]
    async fn test_settings_expire() {
        let db = open().await;
        let cache = SettingsCache::new(Duration::ZERO);
        assert_eq!(cache.get(&db).await.unwrap().common_work_fine, 300);

        db.update(Settings {
            common_work_fine: 350,
            ..Default::default()
        }).await.unwrap();
        assert_eq!(cache.get(&db).await.unwrap().common_work_fine, 350);
    }

    #[tokio::test]
    async fn test_amount_by_kind() {
        let db = open().await;
        let cache = SettingsCache::new(Duration::from_secs(3600));
        assert_eq!(cache.ttl(), Duration::from_secs(3600));
        assert_eq!(cache.amount(&db, FineKind::CemeteryWork).await.unwrap(), 200);
        assert_eq!(cache.amount(&db, FineKind::Meeting).await.unwrap(), 500);

        let err = cache.amount(&db, FineKind::ExtraDue).await.unwrap_err();
        assert!(matches!(err, ReconcileError::Invalid(_)));
    }
}
