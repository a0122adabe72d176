use std::fmt;

use serde::{Deserialize, Serialize};

/// Connection indicator shown next to the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SyncState {
    /// Waiting for the first snapshot.
    #[default]
    Connecting,
    /// Receiving snapshots.
    Live,
    /// A publish or listener error happened; local state may be ahead of the remote.
    Degraded,
    /// Local-only mode, or the listener has been torn down.
    Offline,
}

impl SyncState {
    pub fn label(&self) -> &'static str {
        match self {
            SyncState::Connecting => "Connecting...",
            SyncState::Live => "Live",
            SyncState::Degraded => "Sync Error",
            SyncState::Offline => "Offline",
        }
    }
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
