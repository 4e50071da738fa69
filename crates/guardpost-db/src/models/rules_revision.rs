use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Context as _;
use serde::Serialize;
use sqlx::{FromRow, SqliteConnection};

use super::Model;

/// An accepted snapshot of the user rules text. One row per mutation, so the
/// console keeps an audit trail of who-changed-what-when at the text level.
#[derive(Debug, Serialize, FromRow)]
pub struct RulesRevision {
    pub id: u32,
    pub timestamp: u32,
    pub checksum: Vec<u8>,
    pub rules: String,
}

impl RulesRevision {
    pub fn new(rules: String, checksum: [u8; 20]) -> anyhow::Result<Self> {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .context("bug: misconfigured time on the system")?
            .as_secs() as u32;

        Ok(RulesRevision {
            id: 0,
            timestamp,
            checksum: checksum.to_vec(),
            rules,
        })
    }

    pub async fn select_latest(connection: &mut SqliteConnection) -> anyhow::Result<Option<Self>> {
        sqlx::query_as::<_, RulesRevision>("SELECT * FROM rules_revision ORDER BY id DESC LIMIT 1")
            .fetch_optional(connection)
            .await
            .context("error while selecting the latest rules revision")
    }
}

impl Model for RulesRevision {
    const NAME: &str = "RulesRevision";

    async fn bind_and_insert(&self, connection: &mut SqliteConnection) -> anyhow::Result<u64> {
        sqlx::query(
            "INSERT INTO rules_revision (timestamp, checksum, rules)
            VALUES (?1, ?2, ?3)",
        )
        .bind(self.timestamp)
        .bind(&self.checksum)
        .bind(&self.rules)
        .execute(connection)
        .await
        .context("error while inserting a rules revision")
        .map(|result| result.rows_affected())
    }
}
