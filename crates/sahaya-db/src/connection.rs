use std::str::FromStr;
use std::sync::Arc;

use anyhow::Result;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteConnection},
    Connection as SqlConnection,
};
use tokio::sync::{Mutex, MutexGuard};
use tracing::info;

use crate::schema;

/// A thread safe connection to the database
#[derive(Clone)]
pub struct Connection(Arc<Mutex<SqliteConnection>>);

impl Connection {
    /// Open a connection to the database
    pub async fn open(filename: &str) -> Result<Self> {
        let opts = SqliteConnectOptions::from_str(filename)?
            .foreign_keys(true);
        let conn = SqliteConnection::connect_with(&opts).await?;
        info!(filename, "opened database");
        Ok(Connection(Arc::new(Mutex::new(conn))))
    }

    /// Open a database file, creating it with the schema
    /// installed if it does not exist yet.
    pub async fn create(filename: &str) -> Result<Self> {
        let opts = SqliteConnectOptions::from_str(filename)?
            .create_if_missing(true)
            .foreign_keys(true);
        let conn = SqliteConnection::connect_with(&opts).await?;
        let conn = Connection(Arc::new(Mutex::new(conn)));
        schema::install(&conn).await?;
        Ok(conn)
    }

    /// Open a new test database connection.
    /// The database lives in memory and is created on each open.
    pub async fn open_test() -> Result<Self> {
        Self::create("sqlite::memory:").await
    }

    pub async fn lock(&self) -> MutexGuard<'_, SqliteConnection> {
        self.0.lock().await
    }
}
