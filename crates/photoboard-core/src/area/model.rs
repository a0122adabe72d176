//! Area domain models.

use serde::{Deserialize, Serialize};

use crate::error::{BoardError, Result};

/// Identifier of an area. Always in `1..=N` for a board of `N` areas.
pub type AreaId = u32;

/// Maximum number of concurrently visible areas on one board.
pub const MAX_AREAS: usize = 9;

/// Kind of media an area can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    #[default]
    Image,
    Video,
}

impl MediaKind {
    /// Kind for an uploaded blob's content type (`video/*` is video, anything else image).
    pub fn from_content_type(content_type: &str) -> Self {
        if content_type.starts_with("video/") {
            MediaKind::Video
        } else {
            MediaKind::Image
        }
    }

    /// Kind inferred from a locator string, used for records that predate the
    /// explicit kind field. Only inline `data:video` payloads are videos.
    pub fn infer_from_locator(locator: &str) -> Self {
        if locator.starts_with("data:video") {
            MediaKind::Video
        } else {
            MediaKind::Image
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
        }
    }
}

/// Where the bytes of a media item live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MediaLocator {
    /// Content-encoded blob (`data:<content-type>;base64,<payload>`), local-only mode.
    Inline { data_url: String },
    /// Asset on a media host, synced mode.
    Remote { url: String, provider_id: String },
}

impl MediaLocator {
    pub fn inline(data_url: impl Into<String>) -> Self {
        MediaLocator::Inline {
            data_url: data_url.into(),
        }
    }

    pub fn remote(url: impl Into<String>, provider_id: impl Into<String>) -> Self {
        MediaLocator::Remote {
            url: url.into(),
            provider_id: provider_id.into(),
        }
    }

    /// The string a view would use as its `src`.
    pub fn href(&self) -> &str {
        match self {
            MediaLocator::Inline { data_url } => data_url,
            MediaLocator::Remote { url, .. } => url,
        }
    }

    /// Provider-assigned identifier for remote assets.
    pub fn provider_id(&self) -> Option<&str> {
        match self {
            MediaLocator::Inline { .. } => None,
            MediaLocator::Remote { provider_id, .. } => Some(provider_id),
        }
    }

    /// Content type embedded in an inline data URL (`data:image/png;base64,...` → `image/png`).
    pub fn inline_content_type(&self) -> Option<&str> {
        match self {
            MediaLocator::Inline { data_url } => {
                let rest = data_url.strip_prefix("data:")?;
                let end = rest.find([';', ','])?;
                let content_type = &rest[..end];
                (!content_type.is_empty()).then_some(content_type)
            }
            MediaLocator::Remote { .. } => None,
        }
    }
}

/// A media item attached to an area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Media {
    pub locator: MediaLocator,
    pub kind: MediaKind,
}

impl Media {
    pub fn new(locator: MediaLocator, kind: MediaKind) -> Self {
        Self { locator, kind }
    }

    pub fn inline(data_url: impl Into<String>, kind: MediaKind) -> Self {
        Self::new(MediaLocator::inline(data_url), kind)
    }

    pub fn remote(url: impl Into<String>, provider_id: impl Into<String>, kind: MediaKind) -> Self {
        Self::new(MediaLocator::remote(url, provider_id), kind)
    }
}

/// One cell of the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Area {
    pub id: AreaId,
    pub name: String,
    #[serde(default)]
    pub media: Option<Media>,
}

impl Area {
    /// Creates an empty area with its default name.
    pub fn new(id: AreaId) -> Self {
        Self {
            id,
            name: Self::default_name(id),
            media: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_media(mut self, media: Media) -> Self {
        self.media = Some(media);
        self
    }

    /// `"Area {id}"`.
    pub fn default_name(id: AreaId) -> String {
        format!("Area {}", id)
    }

    /// Trims `raw`; a blank result falls back to the default name.
    pub fn normalize_name(id: AreaId, raw: &str) -> String {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            Self::default_name(id)
        } else {
            trimmed.to_string()
        }
    }

    pub fn has_media(&self) -> bool {
        self.media.is_some()
    }
}

/// The ordered areas of one board document plus its version marker.
///
/// The marker is a local counter in local-only mode and the last
/// server-assigned version in synced mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AreaCollection {
    areas: Vec<Area>,
    version: u64,
}

impl AreaCollection {
    /// An empty board (the "no areas created" state).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates `count` fresh areas numbered `1..=count`.
    pub fn create(count: usize) -> Result<Self> {
        Self::validate_count(count)?;
        let areas = (1..=count as AreaId).map(Area::new).collect();
        Ok(Self { areas, version: 0 })
    }

    /// Builds a collection from already-numbered areas, checking the id invariant.
    pub fn from_areas(areas: Vec<Area>, version: u64) -> Result<Self> {
        Self::validate_count(areas.len())?;
        Self::validate_sequence(&areas)?;
        Ok(Self { areas, version })
    }

    /// Builds a collection without checking ids; pair with [`Self::validate`].
    pub fn from_areas_unchecked(areas: Vec<Area>, version: u64) -> Self {
        Self { areas, version }
    }

    /// An empty board is valid; otherwise the count and id invariants apply.
    pub fn validate(&self) -> Result<()> {
        if self.areas.is_empty() {
            return Ok(());
        }
        Self::validate_count(self.areas.len())?;
        Self::validate_sequence(&self.areas)
    }

    /// Rejects counts outside `1..=MAX_AREAS`.
    pub fn validate_count(count: usize) -> Result<()> {
        if count < 1 || count > MAX_AREAS {
            return Err(BoardError::invalid_config(format!(
                "area count must be between 1 and {}, got {}",
                MAX_AREAS, count
            )));
        }
        Ok(())
    }

    /// Ids must be exactly `1..=N` in order, and names non-empty.
    pub fn validate_sequence(areas: &[Area]) -> Result<()> {
        for (index, area) in areas.iter().enumerate() {
            let expected = index as AreaId + 1;
            if area.id != expected {
                return Err(BoardError::invalid_config(format!(
                    "area ids must be sequential: expected {} at position {}, got {}",
                    expected, index, area.id
                )));
            }
            if area.name.trim().is_empty() {
                return Err(BoardError::invalid_config(format!(
                    "area {} has an empty name",
                    area.id
                )));
            }
        }
        Ok(())
    }

    pub fn areas(&self) -> &[Area] {
        &self.areas
    }

    pub fn into_areas(self) -> Vec<Area> {
        self.areas
    }

    pub fn len(&self) -> usize {
        self.areas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn set_version(&mut self, version: u64) {
        self.version = version;
    }

    pub fn with_version(mut self, version: u64) -> Self {
        self.version = version;
        self
    }

    pub fn get(&self, id: AreaId) -> Option<&Area> {
        // ids are 1..=N in order, so the index is id - 1
        let index = (id as usize).checked_sub(1)?;
        self.areas.get(index).filter(|area| area.id == id)
    }

    pub fn get_mut(&mut self, id: AreaId) -> Option<&mut Area> {
        let index = (id as usize).checked_sub(1)?;
        self.areas.get_mut(index).filter(|area| area.id == id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Area> {
        self.areas.iter()
    }

    /// Areas that currently hold media.
    pub fn with_media(&self) -> impl Iterator<Item = &Area> {
        self.areas.iter().filter(|area| area.has_media())
    }
}

impl<'a> IntoIterator for &'a AreaCollection {
    type Item = &'a Area;
    type IntoIter = std::slice::Iter<'a, Area>;

    fn into_iter(self) -> Self::IntoIter {
        self.areas.iter()
    }
}

/// Number of grid columns a view should use for `count` areas.
pub fn grid_columns_for(count: usize) -> usize {
    count.min(MAX_AREAS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_assigns_sequential_ids_and_default_names() {
        let collection = AreaCollection::create(3).unwrap();
        let ids: Vec<AreaId> = collection.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(collection.get(2).unwrap().name, "Area 2");
        assert!(collection.iter().all(|a| a.media.is_none()));
    }

    #[test]
    fn test_create_rejects_out_of_range_counts() {
        assert!(AreaCollection::create(0).unwrap_err().is_invalid_config());
        assert!(AreaCollection::create(10).unwrap_err().is_invalid_config());
        for n in 1..=MAX_AREAS {
            assert_eq!(AreaCollection::create(n).unwrap().len(), n);
        }
    }

    #[test]
    fn test_from_areas_rejects_gaps() {
        let areas = vec![Area::new(1), Area::new(3)];
        let err = AreaCollection::from_areas(areas, 0).unwrap_err();
        assert!(err.is_invalid_config());
    }

    #[test]
    fn test_validate_unchecked_collections() {
        assert!(AreaCollection::from_areas_unchecked(vec![], 3).validate().is_ok());
        let ok = AreaCollection::from_areas_unchecked(vec![Area::new(1), Area::new(2)], 0);
        assert!(ok.validate().is_ok());
        let gap = AreaCollection::from_areas_unchecked(vec![Area::new(2)], 0);
        assert!(gap.validate().unwrap_err().is_invalid_config());
    }

    #[test]
    fn test_get_unknown_id() {
        let collection = AreaCollection::create(2).unwrap();
        assert!(collection.get(0).is_none());
        assert!(collection.get(3).is_none());
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(Area::normalize_name(4, "  Kitchen "), "Kitchen");
        assert_eq!(Area::normalize_name(4, "   "), "Area 4");
    }

    #[test]
    fn test_media_kind_inference() {
        assert_eq!(MediaKind::from_content_type("video/mp4"), MediaKind::Video);
        assert_eq!(MediaKind::from_content_type("image/png"), MediaKind::Image);
        assert_eq!(
            MediaKind::infer_from_locator("data:video/webm;base64,AAAA"),
            MediaKind::Video
        );
        assert_eq!(
            MediaKind::infer_from_locator("https://cdn.example/clip.mp4"),
            MediaKind::Image
        );
    }

    #[test]
    fn test_inline_content_type() {
        let locator = MediaLocator::inline("data:video/quicktime;base64,AAAA");
        assert_eq!(locator.inline_content_type(), Some("video/quicktime"));

        let remote = MediaLocator::remote("https://cdn.example/a.png", "abc");
        assert_eq!(remote.inline_content_type(), None);
        assert_eq!(remote.provider_id(), Some("abc"));
    }

    #[test]
    fn test_grid_columns_for() {
        assert_eq!(grid_columns_for(4), 4);
        assert_eq!(grid_columns_for(12), 9);
    }
}
