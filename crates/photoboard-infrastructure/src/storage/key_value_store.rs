//! Fallback tier: flat string key-value store, one file per key.

use std::path::PathBuf;

use async_trait::async_trait;

use photoboard_core::error::{BoardError, Result};

use super::tier::StorageTier;

/// Key under which the board document is stored.
pub const STATE_KEY: &str = "photoboard-state";

pub struct KeyValueStore {
    dir: PathBuf,
}

impl KeyValueStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn key_path(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
            return Err(BoardError::invalid_config(format!("invalid storage key '{}'", key)));
        }
        Ok(self.dir.join(key))
    }

    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        match tokio::fs::read_to_string(self.key_path(key)?).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.key_path(key)?;
        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(path, value).await?;
        Ok(())
    }

    pub async fn remove(&self, key: &str) -> Result<()> {
        match tokio::fs::remove_file(self.key_path(key)?).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl StorageTier for KeyValueStore {
    fn name(&self) -> &str {
        "key-value"
    }

    async fn is_available(&self) -> bool {
        tokio::fs::create_dir_all(&self.dir).await.is_ok()
    }

    async fn read(&self) -> Result<Option<serde_json::Value>> {
        match self.get(STATE_KEY).await? {
            Some(raw) if !raw.trim().is_empty() => Ok(Some(serde_json::from_str(&raw)?)),
            _ => Ok(None),
        }
    }

    async fn write(&self, document: &serde_json::Value) -> Result<()> {
        self.set(STATE_KEY, &serde_json::to_string(document)?).await
    }

    async fn erase(&self) -> Result<()> {
        self.remove(STATE_KEY).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_get_set_remove() {
        let temp_dir = TempDir::new().unwrap();
        let store = KeyValueStore::new(temp_dir.path().join("kv"));

        assert!(store.get("a").await.unwrap().is_none());
        store.set("a", "1").await.unwrap();
        assert_eq!(store.get("a").await.unwrap().as_deref(), Some("1"));
        store.remove("a").await.unwrap();
        store.remove("a").await.unwrap();
        assert!(store.get("a").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_rejects_path_like_keys() {
        let temp_dir = TempDir::new().unwrap();
        let store = KeyValueStore::new(temp_dir.path().to_path_buf());
        assert!(store.set("../escape", "x").await.unwrap_err().is_invalid_config());
    }

    #[tokio::test]
    async fn test_tier_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let store = KeyValueStore::new(temp_dir.path().join("kv"));
        store.write(&json!({"version": 1})).await.unwrap();
        assert_eq!(store.read().await.unwrap(), Some(json!({"version": 1})));
        assert!(temp_dir.path().join("kv").join(STATE_KEY).exists());
    }
}
