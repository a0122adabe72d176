pub mod area;
pub mod config;
pub mod error;
pub mod export;
pub mod media;
pub mod persistence;
pub mod reconcile;
pub mod role;
pub mod sync;

// Re-export common types
pub use area::{Area, AreaCollection, AreaId, AreaStore, MAX_AREAS, Media, MediaKind, MediaLocator};
pub use config::{BoardConfig, SyncMode};
pub use error::{BoardError, Result};
pub use reconcile::{Directive, MutationPlan, ReconciliationEngine};
pub use role::Role;
pub use sync::{RemoteChannel, RemoteEvent, Snapshot, Subscription, SyncState};
