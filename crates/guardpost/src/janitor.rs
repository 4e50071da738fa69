use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::Context as _;
use guardpost_api::QueryLogConfig;
use guardpost_db::SqliteDb;
use tokio::sync::RwLock;
use tokio::time::interval;

/// How often expired query log entries are purged
const PURGE_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Enforces the query log retention window from the shared config.
pub struct QueryLogJanitor {
    db: SqliteDb,
    config: Arc<RwLock<QueryLogConfig>>,
}

impl QueryLogJanitor {
    pub fn new(db: SqliteDb, config: Arc<RwLock<QueryLogConfig>>) -> Self {
        QueryLogJanitor { db, config }
    }

    pub async fn purge_expired_logs(self) -> anyhow::Result<()> {
        let mut purge_interval = interval(PURGE_INTERVAL);

        loop {
            purge_interval.tick().await;

            let retention_hours = self.config.read().await.retention_hours;
            let cutoff = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .context("bug: misconfigured time on the system")?
                .as_secs()
                .saturating_sub(u64::from(retention_hours) * 60 * 60) as u32;

            let mut connection = self.db.get_connection().await?;
            let purged = sqlx::query("DELETE FROM query_log WHERE timestamp < ?1")
                .bind(cutoff)
                .execute(&mut *connection)
                .await
                .context("error while purging expired query log entries")?
                .rows_affected();

            if purged > 0 {
                tracing::trace!("Purged {} expired query log entries", purged);
            }
        }
    }
}
