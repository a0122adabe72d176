//! Preferred tier: one atomically replaced JSON document.

use std::path::PathBuf;

use async_trait::async_trait;

use photoboard_core::error::{BoardError, Result};

use super::atomic_json::AtomicJsonFile;
use super::tier::StorageTier;

pub struct JsonDocumentStore {
    file: AtomicJsonFile,
    enabled: bool,
}

impl JsonDocumentStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            file: AtomicJsonFile::new(path),
            enabled: true,
        }
    }

    /// A disabled store reports itself unavailable and is skipped.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    async fn blocking<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(AtomicJsonFile) -> Result<T> + Send + 'static,
    {
        let file = self.file.clone();
        tokio::task::spawn_blocking(move || f(file))
            .await
            .map_err(|e| BoardError::internal(format!("document store task failed: {}", e)))?
    }
}

#[async_trait]
impl StorageTier for JsonDocumentStore {
    fn name(&self) -> &str {
        "document"
    }

    async fn is_available(&self) -> bool {
        if !self.enabled {
            return false;
        }
        match self.file.path().parent() {
            Some(parent) => tokio::fs::create_dir_all(parent).await.is_ok(),
            None => false,
        }
    }

    async fn read(&self) -> Result<Option<serde_json::Value>> {
        self.blocking(|file| file.load()).await
    }

    async fn write(&self, document: &serde_json::Value) -> Result<()> {
        let document = document.clone();
        self.blocking(move |file| file.save(&document)).await
    }

    async fn erase(&self) -> Result<()> {
        self.blocking(|file| file.remove()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonDocumentStore::new(temp_dir.path().join("board.json"));

        assert!(store.is_available().await);
        assert!(store.read().await.unwrap().is_none());

        store.write(&json!({"areas": []})).await.unwrap();
        assert_eq!(store.read().await.unwrap(), Some(json!({"areas": []})));

        store.erase().await.unwrap();
        assert!(store.read().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_disabled_store_is_unavailable() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonDocumentStore::new(temp_dir.path().join("board.json")).with_enabled(false);
        assert!(!store.is_available().await);
    }
}
