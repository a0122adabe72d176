//! Snapshots and events delivered by a remote channel.

use serde::{Deserialize, Serialize};

use crate::area::{Area, AreaCollection};

/// Full state of the shared board document at one version.
///
/// `areas == None` means the document does not exist (never created, or
/// deleted by a reset).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub areas: Option<Vec<Area>>,
    pub version: u64,
}

impl Snapshot {
    pub fn absent(version: u64) -> Self {
        Self {
            areas: None,
            version,
        }
    }

    pub fn present(areas: Vec<Area>, version: u64) -> Self {
        Self {
            areas: Some(areas),
            version,
        }
    }

    /// Snapshot carrying a copy of `collection` at its own version.
    pub fn of(collection: &AreaCollection) -> Self {
        if collection.is_empty() {
            Self::absent(collection.version())
        } else {
            Self::present(collection.areas().to_vec(), collection.version())
        }
    }

    pub fn is_absent(&self) -> bool {
        self.areas.as_ref().is_none_or(|areas| areas.is_empty())
    }
}

/// Item delivered by a [`Subscription`](super::Subscription).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteEvent {
    Snapshot(Snapshot),
    /// Transport-level failure of the listener. Previously received state stays valid.
    Error(String),
}
