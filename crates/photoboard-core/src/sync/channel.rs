use async_trait::async_trait;

use super::subscription::Subscription;
use crate::area::AreaCollection;
use crate::error::Result;

/// Shared board document on a realtime backend.
///
/// Versions are assigned by the backend and increase strictly across
/// publishes and deletes.
#[async_trait]
pub trait RemoteChannel: Send + Sync {
    /// Starts a listener. The current state is delivered as the first event.
    async fn subscribe(&self) -> Result<Subscription>;

    /// Replaces the remote document and returns the assigned version.
    ///
    /// # Errors
    ///
    /// `PublishFailed` when the backend cannot be reached. The remote
    /// version is not advanced in that case.
    async fn publish(&self, collection: &AreaCollection) -> Result<u64>;

    /// Deletes the remote document. Subscribers receive an absent snapshot.
    async fn delete(&self) -> Result<u64>;
}
