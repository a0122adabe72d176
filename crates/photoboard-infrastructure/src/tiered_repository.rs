//! Board repository over ranked storage tiers.

use std::sync::Arc;

use async_trait::async_trait;

use photoboard_core::area::AreaCollection;
use photoboard_core::error::{BoardError, Result};
use photoboard_core::persistence::{BoardRepository, MigrationOutcome};

use photoboard_core::config::BoardConfig;

use crate::dto::{decode_board, encode_board};
use crate::paths::BoardPaths;
use crate::storage::{JsonDocumentStore, KeyValueStore, StorageTier};

/// Writes to the best available tier and falls back silently.
///
/// Tiers are ranked by position: index 0 is preferred.
pub struct TieredBoardRepository {
    tiers: Vec<Arc<dyn StorageTier>>,
}

impl TieredBoardRepository {
    pub fn new(tiers: Vec<Arc<dyn StorageTier>>) -> Result<Self> {
        if tiers.is_empty() {
            return Err(BoardError::config("at least one storage tier is required"));
        }
        Ok(Self { tiers })
    }

    /// Document store first, key-value store as fallback.
    pub fn from_paths(paths: &BoardPaths, config: &BoardConfig) -> Result<Self> {
        let document = JsonDocumentStore::new(paths.document_file())
            .with_enabled(config.structured_store);
        let flat = KeyValueStore::new(paths.key_value_dir());
        Self::new(vec![Arc::new(document), Arc::new(flat)])
    }

    fn decode(&self, document: serde_json::Value) -> Result<Option<AreaCollection>> {
        let collection = decode_board(document)?;
        Ok((!collection.is_empty()).then_some(collection))
    }

    fn encode(collection: &AreaCollection) -> Result<serde_json::Value> {
        encode_board(collection)
    }

    /// Drops copies in tiers ranked above `accepted`, which would otherwise
    /// shadow the newer document on load.
    async fn erase_above(&self, accepted: usize) {
        for tier in &self.tiers[..accepted] {
            if !tier.is_available().await {
                continue;
            }
            if let Err(e) = tier.erase().await {
                tracing::warn!(
                    "[TieredRepository] Failed to erase stale copy in '{}': {}",
                    tier.name(),
                    e
                );
            }
        }
    }
}

#[async_trait]
impl BoardRepository for TieredBoardRepository {
    async fn save(&self, collection: &AreaCollection) -> Result<()> {
        let document = Self::encode(collection)?;
        let mut failures = Vec::new();

        for (index, tier) in self.tiers.iter().enumerate() {
            if !tier.is_available().await {
                continue;
            }
            match tier.write(&document).await {
                Ok(()) => {
                    tracing::debug!(
                        "[TieredRepository] Saved v{} to '{}'",
                        collection.version(),
                        tier.name()
                    );
                    if index > 0 {
                        self.erase_above(index).await;
                    }
                    return Ok(());
                }
                Err(e) => {
                    tracing::warn!(
                        "[TieredRepository] Tier '{}' rejected write, trying next: {}",
                        tier.name(),
                        e
                    );
                    failures.push(format!("{}: {}", tier.name(), e));
                }
            }
        }

        if failures.is_empty() {
            failures.push("no storage tier available".to_string());
        }
        Err(BoardError::save_failed(failures.join("; ")))
    }

    async fn load(&self) -> Result<Option<AreaCollection>> {
        for tier in &self.tiers {
            if !tier.is_available().await {
                continue;
            }
            let document = match tier.read().await {
                Ok(Some(document)) => document,
                Ok(None) => continue,
                Err(e) => {
                    tracing::warn!(
                        "[TieredRepository] Tier '{}' read failed, trying next: {}",
                        tier.name(),
                        e
                    );
                    continue;
                }
            };
            match self.decode(document) {
                Ok(Some(collection)) => {
                    tracing::info!(
                        "[TieredRepository] Loaded {} area(s) from '{}'",
                        collection.len(),
                        tier.name()
                    );
                    return Ok(Some(collection));
                }
                Ok(None) => continue,
                Err(e) => {
                    tracing::warn!(
                        "[TieredRepository] Ignoring unreadable document in '{}': {}",
                        tier.name(),
                        e
                    );
                }
            }
        }
        Ok(None)
    }

    async fn migrate_once(&self) -> Result<MigrationOutcome> {
        let preferred = &self.tiers[0];
        if !preferred.is_available().await {
            return Ok(MigrationOutcome::PreferredUnavailable);
        }
        if preferred.read().await?.is_some() {
            return Ok(MigrationOutcome::NothingToMigrate);
        }

        for lower in &self.tiers[1..] {
            if !lower.is_available().await {
                continue;
            }
            let Some(document) = lower.read().await? else {
                continue;
            };

            // Upgrade on the way up so the preferred tier only holds the current format
            let Some(collection) = self.decode(document)? else {
                continue;
            };
            preferred.write(&Self::encode(&collection)?).await?;
            lower.erase().await?;

            tracing::info!(
                "[TieredRepository] Migrated {} area(s) from '{}' to '{}'",
                collection.len(),
                lower.name(),
                preferred.name()
            );
            return Ok(MigrationOutcome::Migrated {
                from: lower.name().to_string(),
                to: preferred.name().to_string(),
            });
        }

        Ok(MigrationOutcome::NothingToMigrate)
    }

    async fn clear(&self) -> Result<()> {
        let mut failures = Vec::new();
        for tier in &self.tiers {
            if !tier.is_available().await {
                continue;
            }
            if let Err(e) = tier.erase().await {
                tracing::warn!("[TieredRepository] Failed to erase '{}': {}", tier.name(), e);
                failures.push(format!("{}: {}", tier.name(), e));
            }
        }
        if failures.is_empty() {
            Ok(())
        } else {
            Err(BoardError::save_failed(failures.join("; ")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::STATE_KEY;
    use photoboard_core::area::{Media, MediaKind};
    use serde_json::json;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tempfile::TempDir;

    /// Tier that can be switched off or made to fail.
    struct MockTier {
        name: &'static str,
        available: bool,
        fail_writes: AtomicBool,
        document: Mutex<Option<serde_json::Value>>,
    }

    impl MockTier {
        fn new(name: &'static str) -> Self {
            Self {
                name,
                available: true,
                fail_writes: AtomicBool::new(false),
                document: Mutex::new(None),
            }
        }

        fn failing(name: &'static str) -> Self {
            let tier = Self::new(name);
            tier.set_fail_writes(true);
            tier
        }

        fn unavailable(name: &'static str) -> Self {
            Self {
                available: false,
                ..Self::new(name)
            }
        }

        fn holding(name: &'static str, document: serde_json::Value) -> Self {
            let tier = Self::new(name);
            *tier.document.lock().unwrap() = Some(document);
            tier
        }

        fn set_fail_writes(&self, fail: bool) {
            self.fail_writes.store(fail, Ordering::SeqCst);
        }

        fn stored(&self) -> Option<serde_json::Value> {
            self.document.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl StorageTier for MockTier {
        fn name(&self) -> &str {
            self.name
        }

        async fn is_available(&self) -> bool {
            self.available
        }

        async fn read(&self) -> Result<Option<serde_json::Value>> {
            Ok(self.stored())
        }

        async fn write(&self, document: &serde_json::Value) -> Result<()> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(BoardError::io("quota exceeded"));
            }
            *self.document.lock().unwrap() = Some(document.clone());
            Ok(())
        }

        async fn erase(&self) -> Result<()> {
            *self.document.lock().unwrap() = None;
            Ok(())
        }
    }

    fn sample() -> AreaCollection {
        let mut collection = AreaCollection::create(3).unwrap().with_version(5);
        collection.get_mut(2).unwrap().name = "Porch".to_string();
        collection.get_mut(3).unwrap().media = Some(Media::inline(
            "data:video/mp4;base64,AAAA",
            MediaKind::Video,
        ));
        collection
    }

    #[tokio::test]
    async fn test_save_load_round_trip_on_disk() {
        let temp_dir = TempDir::new().unwrap();
        let repo = TieredBoardRepository::new(vec![
            Arc::new(JsonDocumentStore::new(temp_dir.path().join("board.json"))),
            Arc::new(KeyValueStore::new(temp_dir.path().join("kv"))),
        ])
        .unwrap();

        repo.save(&sample()).await.unwrap();
        assert_eq!(repo.load().await.unwrap(), Some(sample()));
        assert!(!temp_dir.path().join("kv").join(STATE_KEY).exists());
    }

    #[tokio::test]
    async fn test_disabled_structured_store_uses_flat_tier() {
        let temp_dir = TempDir::new().unwrap();
        let paths = BoardPaths::with_data_dir(temp_dir.path().to_path_buf());
        let config = BoardConfig {
            structured_store: false,
            ..BoardConfig::default()
        };
        let repo = TieredBoardRepository::from_paths(&paths, &config).unwrap();

        repo.save(&sample()).await.unwrap();
        assert!(!paths.document_file().exists());
        assert!(paths.key_value_dir().join(STATE_KEY).exists());
        assert_eq!(
            repo.migrate_once().await.unwrap(),
            MigrationOutcome::PreferredUnavailable
        );
        assert_eq!(repo.load().await.unwrap(), Some(sample()));
    }

    #[tokio::test]
    async fn test_save_falls_back_to_next_tier() {
        let preferred = Arc::new(MockTier::failing("document"));
        let fallback = Arc::new(MockTier::new("key-value"));
        let repo = TieredBoardRepository::new(vec![preferred.clone(), fallback.clone()]).unwrap();

        repo.save(&sample()).await.unwrap();
        assert!(preferred.stored().is_none());
        assert!(fallback.stored().is_some());
        assert_eq!(repo.load().await.unwrap(), Some(sample()));
    }

    #[tokio::test]
    async fn test_fallback_save_is_not_shadowed_by_older_copy() {
        let older = AreaCollection::create(2).unwrap().with_version(1);
        let preferred = Arc::new(MockTier::holding("document", encode_board(&older).unwrap()));
        let fallback = Arc::new(MockTier::new("key-value"));
        let repo = TieredBoardRepository::new(vec![preferred.clone(), fallback.clone()]).unwrap();
        assert_eq!(repo.load().await.unwrap(), Some(older));

        preferred.set_fail_writes(true);
        repo.save(&sample()).await.unwrap();

        assert!(preferred.stored().is_none());
        assert_eq!(repo.load().await.unwrap(), Some(sample()));
    }

    #[tokio::test]
    async fn test_save_fails_only_when_every_tier_fails() {
        let repo = TieredBoardRepository::new(vec![
            Arc::new(MockTier::failing("document")),
            Arc::new(MockTier::failing("key-value")),
        ])
        .unwrap();

        let err = repo.save(&sample()).await.unwrap_err();
        assert!(matches!(err, BoardError::SaveFailed(_)));
        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn test_load_skips_unreadable_document() {
        let repo = TieredBoardRepository::new(vec![
            Arc::new(MockTier::holding("document", json!({"areas": "garbage"}))),
            Arc::new(MockTier::holding(
                "key-value",
                encode_board(&sample()).unwrap(),
            )),
        ])
        .unwrap();

        assert_eq!(repo.load().await.unwrap(), Some(sample()));
    }

    #[tokio::test]
    async fn test_load_nothing_persisted() {
        let repo = TieredBoardRepository::new(vec![Arc::new(MockTier::new("document"))]).unwrap();
        assert_eq!(repo.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_migrate_once_copies_up_and_is_idempotent() {
        let legacy = json!({
            "areas": [
                {"id": 1, "name": "Gate", "imageSrc": "data:image/png;base64,AA=="},
                {"id": 2, "name": "Yard", "mediaSrc": "data:video/webm;base64,AA=="}
            ]
        });
        let preferred = Arc::new(MockTier::new("document"));
        let fallback = Arc::new(MockTier::holding("key-value", legacy));
        let repo = TieredBoardRepository::new(vec![preferred.clone(), fallback.clone()]).unwrap();

        let outcome = repo.migrate_once().await.unwrap();
        assert_eq!(
            outcome,
            MigrationOutcome::Migrated {
                from: "key-value".to_string(),
                to: "document".to_string()
            }
        );
        assert!(fallback.stored().is_none());
        let upgraded = preferred.stored().unwrap();
        assert_eq!(upgraded["formatVersion"], "2.0.0");
        assert_eq!(upgraded["areas"][1]["media"]["kind"], "video");

        let before = repo.load().await.unwrap();
        assert_eq!(repo.migrate_once().await.unwrap(), MigrationOutcome::NothingToMigrate);
        assert_eq!(repo.load().await.unwrap(), before);
        assert_eq!(before.unwrap().get(1).unwrap().name, "Gate");
    }

    #[tokio::test]
    async fn test_migrate_once_without_preferred_tier() {
        let fallback = Arc::new(MockTier::holding(
            "key-value",
            encode_board(&sample()).unwrap(),
        ));
        let repo = TieredBoardRepository::new(vec![
            Arc::new(MockTier::unavailable("document")),
            fallback.clone(),
        ])
        .unwrap();

        assert_eq!(
            repo.migrate_once().await.unwrap(),
            MigrationOutcome::PreferredUnavailable
        );
        assert!(fallback.stored().is_some());
        assert_eq!(repo.load().await.unwrap(), Some(sample()));
    }

    #[tokio::test]
    async fn test_clear_erases_every_tier() {
        let preferred = Arc::new(MockTier::holding("document", json!({"areas": []})));
        let fallback = Arc::new(MockTier::holding("key-value", json!({"areas": []})));
        let repo = TieredBoardRepository::new(vec![preferred.clone(), fallback.clone()]).unwrap();

        repo.clear().await.unwrap();
        assert!(preferred.stored().is_none());
        assert!(fallback.stored().is_none());
    }
}
