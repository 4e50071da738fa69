use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Context as _;
use serde::Serialize;
use sqlx::{FromRow, SqliteConnection};

use super::Model;

/// A single row of the query log, shaped the way the log view renders it.
#[derive(Debug, Serialize, FromRow)]
pub struct QueryLog {
    pub id: u32,
    pub timestamp: u32,
    pub domain: String,
    pub qtype: u16,
    pub client: Option<String>,
    pub elapsed_ms: u32,
    pub filtered: bool,
    pub rule: Option<String>,
}

impl QueryLog {
    pub fn new(
        domain: String,
        qtype: u16,
        client: Option<String>,
        elapsed_ms: u32,
        filtered: bool,
        rule: Option<String>,
    ) -> anyhow::Result<Self> {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .context("bug: misconfigured time on the system")?
            .as_secs() as u32;

        Ok(QueryLog {
            id: 0,
            timestamp,
            domain,
            qtype,
            client,
            elapsed_ms,
            filtered,
            rule,
        })
    }
}

impl Model for QueryLog {
    const NAME: &str = "QueryLog";

    async fn bind_and_insert(&self, connection: &mut SqliteConnection) -> anyhow::Result<u64> {
        sqlx::query(
            "INSERT INTO query_log (timestamp, domain, qtype, client, elapsed_ms, filtered, rule)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .bind(self.timestamp)
        .bind(&self.domain)
        .bind(self.qtype)
        .bind(&self.client)
        .bind(self.elapsed_ms)
        .bind(self.filtered)
        .bind(&self.rule)
        .execute(connection)
        .await
        .context("error while inserting a query log entry")
        .map(|result| result.rows_affected())
    }
}
