use std::future::Future;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::Context as _;

/// Storage seam for the user rules text. The toggle logic itself is pure;
/// whoever orchestrates it loads a snapshot here, computes, and saves the
/// result back.
pub trait RulesStore: Send + Sync + 'static {
    fn load(&self) -> impl Future<Output = anyhow::Result<String>> + Send;

    fn save(&self, rules: &str) -> impl Future<Output = anyhow::Result<()>> + Send;
}

/// The persisted user rules file. A missing file reads as empty text so a
/// fresh install starts with no custom rules.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: PathBuf) -> Self {
        FileStore { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RulesStore for FileStore {
    async fn load(&self) -> anyhow::Result<String> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(rules) => Ok(rules),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(e).with_context(|| format!("error while reading the rules file '{}'", self.path.display())),
        }
    }

    async fn save(&self, rules: &str) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .context("error while creating parent directories for the rules file")?;
        }

        tokio::fs::write(&self.path, rules)
            .await
            .with_context(|| format!("error while writing the rules file '{}'", self.path.display()))
    }
}

/// In-memory store used by tests and by anything that wants to dry-run a
/// toggle without touching disk.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    rules: Arc<Mutex<String>>,
}

impl MemoryStore {
    pub fn new(rules: &str) -> Self {
        MemoryStore {
            rules: Arc::new(Mutex::new(rules.to_string())),
        }
    }
}

impl RulesStore for MemoryStore {
    async fn load(&self) -> anyhow::Result<String> {
        self.rules
            .lock()
            .map(|rules| rules.clone())
            .map_err(|_| anyhow::anyhow!("rules lock is poisoned"))
    }

    async fn save(&self, rules: &str) -> anyhow::Result<()> {
        self.rules
            .lock()
            .map(|mut current| *current = rules.to_string())
            .map_err(|_| anyhow::anyhow!("rules lock is poisoned"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_store_roundtrip() {
        let store = MemoryStore::default();
        assert_eq!(store.load().await.expect("should have loaded"), "");

        store
            .save("||ads.test^$important\n")
            .await
            .expect("should have saved");
        assert_eq!(store.load().await.expect("should have loaded"), "||ads.test^$important\n");

        // Clones observe the same text
        let clone = store.clone();
        assert_eq!(clone.load().await.expect("should have loaded"), "||ads.test^$important\n");
    }

    #[tokio::test]
    async fn file_store_treats_a_missing_file_as_empty() {
        let path = std::env::temp_dir().join("guardpost-store-test-missing/user_rules.txt");
        let _ = tokio::fs::remove_file(&path).await;

        let store = FileStore::new(path);
        assert_eq!(store.load().await.expect("should have loaded"), "");
    }

    #[tokio::test]
    async fn file_store_roundtrip_creates_parent_directories() {
        let dir = std::env::temp_dir().join(format!("guardpost-store-test-{}", std::process::id()));
        let _ = tokio::fs::remove_dir_all(&dir).await;

        let store = FileStore::new(dir.join("nested/user_rules.txt"));
        store
            .save("@@||cdn.test^$important\n")
            .await
            .expect("should have saved");
        assert_eq!(
            store.load().await.expect("should have loaded"),
            "@@||cdn.test^$important\n"
        );

        let _ = tokio::fs::remove_dir_all(&dir).await;
    }
}
