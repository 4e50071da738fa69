mod models;
mod store;

use std::path::Path;
use std::time::Duration;

use anyhow::Context as _;
pub use models::{Model, QueryLog, RulesRevision};
use sqlx::pool::PoolConnection;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Sqlite, SqlitePool};
pub use store::{FileStore, MemoryStore, RulesStore};

#[derive(Debug, Clone)]
pub struct SqliteDb {
    connection_pool: SqlitePool,
}

impl SqliteDb {
    pub async fn new(data_dir: &Path) -> anyhow::Result<Self> {
        // Ensure that all directories exist
        tokio::fs::create_dir_all(data_dir)
            .await
            .context("error while creating the data directory for the console DB")?;

        let path = data_dir.join("console.db");
        let connect_options = SqliteConnectOptions::new().create_if_missing(true).filename(&path);

        let connection_pool = SqlitePoolOptions::new()
            .min_connections(3)
            .max_connections(10)
            .max_lifetime(Duration::from_secs(60 * 60 * 8))
            .connect_with(connect_options)
            .await
            .context("error while opening a connection to SQLite DB")?;

        Ok(SqliteDb { connection_pool })
    }

    pub async fn init_tables(&self) -> anyhow::Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS query_log (
                id INTEGER PRIMARY KEY,
                timestamp INTEGER NOT NULL,
                domain TEXT NOT NULL,
                qtype INTEGER NOT NULL,
                client TEXT,
                elapsed_ms INTEGER NOT NULL,
                filtered INTEGER NOT NULL,
                rule TEXT
            )",
        )
        .execute(&self.connection_pool)
        .await
        .context("error while initializing the 'query_log' table")?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS rules_revision (
                id INTEGER PRIMARY KEY,
                timestamp INTEGER NOT NULL,
                checksum BLOB NOT NULL,
                rules TEXT NOT NULL
            )",
        )
        .execute(&self.connection_pool)
        .await
        .context("error while initializing the 'rules_revision' table")?;

        Ok(())
    }

    pub async fn get_connection(&self) -> anyhow::Result<PoolConnection<Sqlite>> {
        self.connection_pool
            .acquire()
            .await
            .context("failed to acquire a connection from pool")
    }
}
