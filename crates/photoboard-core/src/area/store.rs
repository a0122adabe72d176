//! In-memory source of truth for the current board.

use super::model::{Area, AreaCollection, AreaId, Media, MediaKind, MediaLocator};
use crate::error::{BoardError, Result};

/// Holds the current [`AreaCollection`].
///
/// Every mutation goes through this type so that the id invariant
/// (`1..=N`, `N <= MAX_AREAS`) holds after each call.
#[derive(Debug, Clone, Default)]
pub struct AreaStore {
    collection: AreaCollection,
}

impl AreaStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_collection(collection: AreaCollection) -> Result<Self> {
        let mut store = Self::new();
        if !collection.is_empty() {
            store.replace_all(collection)?;
        }
        Ok(store)
    }

    pub fn collection(&self) -> &AreaCollection {
        &self.collection
    }

    pub fn is_empty(&self) -> bool {
        self.collection.is_empty()
    }

    pub fn version(&self) -> u64 {
        self.collection.version()
    }

    pub fn set_version(&mut self, version: u64) {
        self.collection.set_version(version);
    }

    /// Replaces the whole board.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` when the collection is empty, larger than
    /// `MAX_AREAS`, or its ids are not `1..=N`. The store is untouched.
    pub fn replace_all(&mut self, collection: AreaCollection) -> Result<()> {
        AreaCollection::validate_count(collection.len())?;
        AreaCollection::validate_sequence(collection.areas())?;
        self.collection = collection;
        Ok(())
    }

    /// Drops every area. The version marker is kept.
    pub fn clear(&mut self) {
        let version = self.collection.version();
        self.collection = AreaCollection::empty().with_version(version);
    }

    /// Applies `f` to the area with `id`.
    pub fn mutate<F, T>(&mut self, id: AreaId, f: F) -> Result<T>
    where
        F: FnOnce(&mut Area) -> T,
    {
        let area = self
            .collection
            .get_mut(id)
            .ok_or_else(|| BoardError::not_found("Area", id.to_string()))?;
        Ok(f(area))
    }

    /// Renames an area and returns the name that was stored.
    pub fn rename(&mut self, id: AreaId, new_name: &str) -> Result<String> {
        let name = Area::normalize_name(id, new_name);
        self.mutate(id, |area| {
            area.name = name.clone();
        })?;
        Ok(name)
    }

    pub fn set_media(&mut self, id: AreaId, locator: MediaLocator, kind: MediaKind) -> Result<()> {
        self.mutate(id, |area| {
            area.media = Some(Media::new(locator, kind));
        })
    }

    /// Detaches the media of an area and returns what was there.
    pub fn clear_media(&mut self, id: AreaId) -> Result<Option<Media>> {
        self.mutate(id, |area| area.media.take())
    }
}
