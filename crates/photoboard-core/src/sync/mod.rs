//! Remote channel contract: snapshots, subscriptions and sync status.

pub mod channel;
pub mod snapshot;
pub mod status;
pub mod subscription;

pub use channel::RemoteChannel;
pub use snapshot::{RemoteEvent, Snapshot};
pub use status::SyncState;
pub use subscription::{Subscription, SubscriptionHandle};
