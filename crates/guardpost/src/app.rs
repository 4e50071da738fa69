use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;
use guardpost_api::{ApiServer, ApiState, FilteringState, QueryLogConfig};
use guardpost_common::rules_checksum;
use guardpost_core::RuleSet;
use guardpost_db::{FileStore, Model as _, RulesRevision, RulesStore as _, SqliteDb};
use tokio::task::JoinSet;

use crate::filtering::FilteringWatcher;
use crate::janitor::QueryLogJanitor;
use crate::Args;

pub struct App;

impl App {
    pub async fn run_until_completion(args: Args, data_dir: PathBuf) -> anyhow::Result<()> {
        let api_bind_addr = SocketAddr::new(args.host, args.api_port);

        let sqlite_db = SqliteDb::new(&data_dir)
            .await
            .context("failed to establish an SQLite DB connection")?;

        sqlite_db
            .init_tables()
            .await
            .context("failed to initialize DB tables")?;

        let rules_path = args.rules_path.clone().unwrap_or_else(|| data_dir.join("user_rules.txt"));
        let store = FileStore::new(rules_path);

        let rules = store.load().await.context("failed to load the user rules")?;

        // Record a revision when the rules file changed out-of-band since the
        // last run (or has never been seen)
        let checksum = rules_checksum(&rules);
        let mut connection = sqlite_db.get_connection().await?;
        let latest_checksum = RulesRevision::select_latest(&mut connection)
            .await?
            .map(|revision| revision.checksum);
        if latest_checksum.as_deref() != Some(checksum.as_slice()) {
            RulesRevision::new(rules.clone(), checksum)?
                .insert_into(&mut connection)
                .await?;
            tracing::info!("The rules file changed since the last run, recorded a new revision");
        }
        drop(connection);

        let ruleset = RuleSet::compile(&rules);
        tracing::info!(
            "Loaded {} filtering rules from '{}'",
            ruleset.rule_count(),
            store.path().display()
        );

        let filtering = Arc::new(tokio::sync::RwLock::new(FilteringState {
            enabled: !args.disable_filtering,
            ruleset,
        }));
        let querylog_config = Arc::new(tokio::sync::RwLock::new(QueryLogConfig {
            enabled: !args.disable_querylog,
            retention_hours: args.querylog_retention_hours,
            anonymize_clients: args.anonymize_clients,
        }));

        let (command_tx, command_rx) = tokio::sync::mpsc::channel(10);

        let mut tasks = JoinSet::new();

        let watcher = FilteringWatcher::new(store.clone(), Arc::clone(&filtering), command_rx);
        tasks.spawn(watcher.watch_for_commands());

        let janitor = QueryLogJanitor::new(sqlite_db.clone(), Arc::clone(&querylog_config));
        tasks.spawn(janitor.purge_expired_logs());

        let api_server = ApiServer::new(ApiState {
            db: sqlite_db,
            store,
            filtering,
            querylog_config,
            command_tx,
        });
        tasks.spawn(api_server.serve(api_bind_addr));

        while let Some(result) = tasks.join_next().await {
            if let Err(e) = result.context("failed to execute a task")? {
                tracing::debug!("Error: {:#}", e);
            }
        }

        Ok(())
    }
}
