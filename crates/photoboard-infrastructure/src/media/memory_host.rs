//! In-memory media host for synced boards.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;

use photoboard_core::area::{AreaId, Media, MediaLocator};
use photoboard_core::error::{BoardError, Result};
use photoboard_core::export::{FetchedMedia, MediaFetcher};
use photoboard_core::media::{MediaBlob, MediaDeleter, MediaUploader};

use super::inline::decode_data_url;

const URL_PREFIX: &str = "memory://photoboard/";

/// Hosts uploaded assets under generated provider ids.
#[derive(Debug, Default)]
pub struct MemoryMediaHost {
    assets: Mutex<HashMap<String, FetchedMedia>>,
    next_id: AtomicU64,
    reject_deletes: AtomicBool,
}

impl MemoryMediaHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every delete fail, to exercise best-effort deletion.
    pub fn set_reject_deletes(&self, reject: bool) {
        self.reject_deletes.store(reject, Ordering::SeqCst);
    }

    pub fn contains(&self, provider_id: &str) -> bool {
        self.lock_assets()
            .map(|assets| assets.contains_key(provider_id))
            .unwrap_or(false)
    }

    pub fn asset_count(&self) -> usize {
        self.lock_assets().map(|assets| assets.len()).unwrap_or(0)
    }

    fn lock_assets(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, FetchedMedia>>> {
        self.assets
            .lock()
            .map_err(|_| BoardError::internal("media host lock poisoned"))
    }
}

#[async_trait]
impl MediaUploader for MemoryMediaHost {
    async fn upload(&self, area: AreaId, blob: MediaBlob) -> Result<Media> {
        let kind = blob.kind()?;
        let sequence = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let provider_id = format!("area{}-{}", area, sequence);
        let url = format!("{}{}", URL_PREFIX, provider_id);

        self.lock_assets()?.insert(
            provider_id.clone(),
            FetchedMedia {
                bytes: blob.bytes,
                content_type: blob.content_type,
            },
        );

        tracing::debug!("[MediaHost] Stored asset {}", provider_id);
        Ok(Media::remote(url, provider_id, kind))
    }
}

#[async_trait]
impl MediaDeleter for MemoryMediaHost {
    async fn delete(&self, provider_id: &str) -> Result<()> {
        if self.reject_deletes.load(Ordering::SeqCst) {
            return Err(BoardError::delete_failed(format!(
                "host refused to delete {}",
                provider_id
            )));
        }
        match self.lock_assets()?.remove(provider_id) {
            Some(_) => Ok(()),
            None => Err(BoardError::delete_failed(format!(
                "unknown asset {}",
                provider_id
            ))),
        }
    }
}

#[async_trait]
impl MediaFetcher for MemoryMediaHost {
    async fn fetch(&self, locator: &MediaLocator) -> Result<FetchedMedia> {
        match locator {
            MediaLocator::Inline { data_url } => decode_data_url(data_url),
            MediaLocator::Remote { provider_id, .. } => self
                .lock_assets()?
                .get(provider_id)
                .cloned()
                .ok_or_else(|| BoardError::not_found("Media", provider_id.clone())),
        }
    }
}
