use async_trait::async_trait;

use photoboard_core::error::Result;

/// One ranked local storage tier holding a single JSON document.
#[async_trait]
pub trait StorageTier: Send + Sync {
    /// Short name used in logs and migration outcomes.
    fn name(&self) -> &str;

    /// Whether the tier can be used in this environment.
    async fn is_available(&self) -> bool;

    /// `Ok(None)` when the tier holds no document.
    async fn read(&self) -> Result<Option<serde_json::Value>>;

    async fn write(&self, document: &serde_json::Value) -> Result<()>;

    async fn erase(&self) -> Result<()>;
}
