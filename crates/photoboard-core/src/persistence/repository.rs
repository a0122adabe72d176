use async_trait::async_trait;

use crate::area::AreaCollection;
use crate::error::Result;

/// Result of a one-time copy from a lower-ranked tier to the preferred one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationOutcome {
    /// A document was copied up and the lower copy erased.
    Migrated { from: String, to: String },
    /// The preferred tier already had data, or no lower tier had any.
    NothingToMigrate,
    /// The preferred tier cannot be used in this environment.
    PreferredUnavailable,
}

/// Persistence port for the board document.
///
/// Implementations pick the best available storage tier and fall back
/// silently; callers only see an error when every tier failed.
#[async_trait]
pub trait BoardRepository: Send + Sync {
    /// Serializes the whole collection.
    ///
    /// # Errors
    ///
    /// `SaveFailed` when no tier accepted the write.
    async fn save(&self, collection: &AreaCollection) -> Result<()>;

    /// Loads the persisted collection.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(collection))` - found in some tier
    /// - `Ok(None)` - nothing persisted, or the stored document is unreadable
    async fn load(&self) -> Result<Option<AreaCollection>>;

    /// Moves data from a lower tier into the preferred one. Safe to call on
    /// every startup.
    async fn migrate_once(&self) -> Result<MigrationOutcome>;

    /// Removes the document from every tier.
    async fn clear(&self) -> Result<()>;
}
