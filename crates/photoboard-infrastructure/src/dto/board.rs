//! Persisted board document DTOs and migrations.
//!
//! ```text
//! 1.0.0  single-media fields per area (imageSrc / mediaSrc / mediaType)
//!   |    fold into media
//!   v
//! 2.0.0  media: { locator, kind } | null
//! ```
//!
//! Documents carry their format in `formatVersion`; `version` is the
//! board's own version marker.

use serde::{Deserialize, Serialize};
use version_migrate::{FromDomain, IntoDomain, MigratesTo, Versioned};

use photoboard_core::area::{Area, AreaCollection, Media, MediaKind, MediaLocator};
use photoboard_core::error::{BoardError, Result};

/// Migrator entity name for the board document.
pub const BOARD_ENTITY: &str = "board_state";

/// Key holding the format version in a persisted document.
pub const FORMAT_VERSION_KEY: &str = "formatVersion";

/// Format written by this build.
pub const CURRENT_FORMAT_VERSION: &str = "2.0.0";

/// Format assumed for documents without a `formatVersion` field.
pub const LEGACY_FORMAT_VERSION: &str = "1.0.0";

// ============================================================================
// V1.0.0
// ============================================================================

/// Board document V1.0.0 (one media source string per area).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Versioned)]
#[versioned(version = "1.0.0", version_key = "formatVersion")]
#[serde(rename_all = "camelCase")]
pub struct BoardStateV1_0_0 {
    #[serde(default)]
    pub areas: Vec<AreaV1_0_0>,
    #[serde(default)]
    pub version: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaV1_0_0 {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub image_src: Option<String>,
    #[serde(default)]
    pub media_src: Option<String>,
    #[serde(default)]
    pub media_type: Option<String>,
}

// ============================================================================
// V2.0.0
// ============================================================================

/// Board document V2.0.0 (explicit media locator and kind).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Versioned)]
#[versioned(version = "2.0.0", version_key = "formatVersion")]
#[serde(rename_all = "camelCase")]
pub struct BoardStateV2_0_0 {
    #[serde(default)]
    pub areas: Vec<AreaDTO>,
    #[serde(default)]
    pub version: u64,
}

/// Type alias for the latest board document version.
pub type BoardStateDTO = BoardStateV2_0_0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaDTO {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub media: Option<MediaDTO>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaDTO {
    pub locator: LocatorDTO,
    pub kind: MediaKind,
}

/// A bare string is an inline data URL; an object is a hosted asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LocatorDTO {
    Inline(String),
    #[serde(rename_all = "camelCase")]
    Remote { url: String, provider_id: String },
}

// ============================================================================
// Migration implementations
// ============================================================================

/// V1.0.0 -> V2.0.0: folds `mediaSrc` (or `imageSrc`) and `mediaType` into
/// `media`. Without `mediaType` the kind is inferred from a `data:video`
/// prefix.
impl MigratesTo<BoardStateV2_0_0> for BoardStateV1_0_0 {
    fn migrate(self) -> BoardStateV2_0_0 {
        let areas = self
            .areas
            .into_iter()
            .map(|area| {
                let media = area
                    .media_src
                    .or(area.image_src)
                    .filter(|src| !src.is_empty())
                    .map(|src| {
                        let kind = match area.media_type.as_deref() {
                            Some("video") => MediaKind::Video,
                            Some("image") => MediaKind::Image,
                            _ => MediaKind::infer_from_locator(&src),
                        };
                        MediaDTO {
                            locator: LocatorDTO::Inline(src),
                            kind,
                        }
                    });
                AreaDTO {
                    id: area.id,
                    name: area.name,
                    media,
                }
            })
            .collect();

        BoardStateV2_0_0 {
            areas,
            version: self.version,
        }
    }
}

// ============================================================================
// Domain model conversions
// ============================================================================

/// The id invariant is not checked here; the repository validates the
/// result before handing it out.
impl IntoDomain<AreaCollection> for BoardStateV2_0_0 {
    fn into_domain(self) -> AreaCollection {
        let areas = self.areas.into_iter().map(AreaDTO::into_domain).collect();
        AreaCollection::from_areas_unchecked(areas, self.version)
    }
}

impl FromDomain<AreaCollection> for BoardStateV2_0_0 {
    fn from_domain(collection: AreaCollection) -> Self {
        BoardStateV2_0_0::from(&collection)
    }
}

impl From<&AreaCollection> for BoardStateV2_0_0 {
    fn from(collection: &AreaCollection) -> Self {
        Self {
            areas: collection
                .iter()
                .map(|area| AreaDTO {
                    id: area.id,
                    name: area.name.clone(),
                    media: area.media.as_ref().map(MediaDTO::from),
                })
                .collect(),
            version: collection.version(),
        }
    }
}

impl AreaDTO {
    fn into_domain(self) -> Area {
        let mut area = Area::new(self.id).with_name(self.name);
        area.media = self.media.map(MediaDTO::into_domain);
        area
    }
}

impl MediaDTO {
    fn into_domain(self) -> Media {
        let locator = match self.locator {
            LocatorDTO::Inline(data_url) => MediaLocator::Inline { data_url },
            LocatorDTO::Remote { url, provider_id } => MediaLocator::Remote { url, provider_id },
        };
        Media::new(locator, self.kind)
    }
}

impl From<&Media> for MediaDTO {
    fn from(media: &Media) -> Self {
        let locator = match &media.locator {
            MediaLocator::Inline { data_url } => LocatorDTO::Inline(data_url.clone()),
            MediaLocator::Remote { url, provider_id } => LocatorDTO::Remote {
                url: url.clone(),
                provider_id: provider_id.clone(),
            },
        };
        Self {
            locator,
            kind: media.kind,
        }
    }
}

// ============================================================================
// Migrator factory
// ============================================================================

/// Creates a Migrator for the board document.
///
/// # Migration Path
///
/// - V1.0.0 → V2.0.0: folds legacy media fields into `media`
/// - V2.0.0 → AreaCollection: converts DTO to domain model
pub fn create_board_migrator() -> Result<version_migrate::Migrator> {
    let mut migrator = version_migrate::Migrator::builder().build();

    let board_path = version_migrate::Migrator::define(BOARD_ENTITY)
        .from::<BoardStateV1_0_0>()
        .step::<BoardStateV2_0_0>()
        .into_with_save::<AreaCollection>();

    migrator
        .register(board_path)
        .map_err(|e| BoardError::migration(format!("failed to register board path: {}", e)))?;

    Ok(migrator)
}

/// Documents written before format tagging have no `formatVersion`; they
/// are the 1.0.0 layout.
pub fn tag_legacy_document(document: &mut serde_json::Value) {
    if let Some(object) = document.as_object_mut() {
        object
            .entry(FORMAT_VERSION_KEY)
            .or_insert_with(|| serde_json::Value::String(LEGACY_FORMAT_VERSION.to_string()));
    }
}

/// Upgrades a persisted document of any known format into the domain
/// collection. The id invariant is checked.
pub fn decode_board(mut document: serde_json::Value) -> Result<AreaCollection> {
    tag_legacy_document(&mut document);
    let migrator = create_board_migrator()?;
    let collection: AreaCollection = migrator
        .load_flat_from(BOARD_ENTITY, document)
        .map_err(|e| BoardError::migration(format!("failed to migrate board document: {}", e)))?;
    collection.validate()?;
    Ok(collection)
}

/// Serializes `collection` in the current format.
pub fn encode_board(collection: &AreaCollection) -> Result<serde_json::Value> {
    let migrator = create_board_migrator()?;
    let json = migrator
        .save_domain_flat(BOARD_ENTITY, collection)
        .map_err(|e| BoardError::migration(format!("failed to serialize board: {}", e)))?;
    Ok(serde_json::from_str(&json)?)
}
