use std::sync::Arc;

use anyhow::Context as _;
use guardpost_api::FilteringState;
use guardpost_common::ConsoleCommand;
use guardpost_core::RuleSet;
use guardpost_db::RulesStore;
use tokio::sync::mpsc::Receiver;
use tokio::sync::RwLock;

/// Keeps the shared filtering state in sync with the persisted user rules.
/// Every rule mutation ends with a refresh command landing here.
pub struct FilteringWatcher<S> {
    store: S,
    filtering: Arc<RwLock<FilteringState>>,
    command_rx: Receiver<ConsoleCommand>,
}

impl<S: RulesStore> FilteringWatcher<S> {
    pub fn new(store: S, filtering: Arc<RwLock<FilteringState>>, command_rx: Receiver<ConsoleCommand>) -> Self {
        FilteringWatcher {
            store,
            filtering,
            command_rx,
        }
    }

    pub async fn watch_for_commands(mut self) -> anyhow::Result<()> {
        while let Some(command) = self.command_rx.recv().await {
            match command {
                ConsoleCommand::RefreshFiltering => {
                    if let Err(e) = self.refresh().await {
                        tracing::debug!("Failed to refresh the filtering state: {:#}", e);
                    }
                }
            }
        }

        tracing::debug!("all command senders were dropped, shutting down the filtering watcher");

        Ok(())
    }

    async fn refresh(&self) -> anyhow::Result<()> {
        let rules = self.store.load().await.context("failed to reload the user rules")?;
        let ruleset = RuleSet::compile(&rules);

        tracing::debug!(
            "Recompiled the filtering state: {} rules, {} unrecognized lines",
            ruleset.rule_count(),
            ruleset.skipped_lines()
        );

        self.filtering.write().await.ruleset = ruleset;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use guardpost_db::MemoryStore;
    use tokio::sync::mpsc::channel;

    use super::*;

    #[tokio::test]
    async fn refresh_command_recompiles_the_shared_state() {
        let store = MemoryStore::new("||ads.test^$important\n");
        let filtering = Arc::new(RwLock::new(FilteringState {
            enabled: true,
            ruleset: RuleSet::default(),
        }));

        let (command_tx, command_rx) = channel(10);
        let watcher = FilteringWatcher::new(store.clone(), Arc::clone(&filtering), command_rx);
        let task = tokio::spawn(watcher.watch_for_commands());

        assert_eq!(filtering.read().await.ruleset.rule_count(), 0);

        command_tx
            .send(ConsoleCommand::RefreshFiltering)
            .await
            .expect("should have sent");
        drop(command_tx);
        task.await.expect("should have joined").expect("should have finished");

        let state = filtering.read().await;
        assert_eq!(state.ruleset.rule_count(), 1);
        assert!(state.ruleset.is_filtered("ads.test"));
    }
}
