mod handlers;
mod routes;
mod util;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context as _;
use guardpost_common::ConsoleCommand;
use guardpost_core::RuleSet;
use guardpost_db::{RulesStore, SqliteDb};
pub use routes::get_router;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::Sender;
use tokio::sync::RwLock;

/// Live filtering state shared between the API and the refresh watcher.
#[derive(Debug)]
pub struct FilteringState {
    pub enabled: bool,
    pub ruleset: RuleSet,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryLogConfig {
    pub enabled: bool,
    pub retention_hours: u32,
    pub anonymize_clients: bool,
}

impl Default for QueryLogConfig {
    fn default() -> Self {
        QueryLogConfig {
            enabled: true,
            retention_hours: 24 * 7,
            anonymize_clients: false,
        }
    }
}

pub struct ApiState<S> {
    pub db: SqliteDb,
    pub store: S,
    pub filtering: Arc<RwLock<FilteringState>>,
    pub querylog_config: Arc<RwLock<QueryLogConfig>>,
    pub command_tx: Sender<ConsoleCommand>,
}

pub struct ApiServer<S> {
    state: ApiState<S>,
}

impl<S: RulesStore> ApiServer<S> {
    pub fn new(state: ApiState<S>) -> Self {
        ApiServer { state }
    }

    pub async fn serve(self, addr: SocketAddr) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind the API server to {}", addr))?;

        tracing::info!("API server is listening on {}", addr);

        axum::serve(listener, get_router(self.state))
            .await
            .context("API server error")
    }
}
