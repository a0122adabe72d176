//! Messages processed by the board actor.

use std::sync::Arc;

use tokio::sync::oneshot;

use photoboard_core::area::{AreaCollection, AreaId, Media};
use photoboard_core::error::Result;
use photoboard_core::sync::{RemoteEvent, SubscriptionHandle};

pub(crate) type Reply<T> = oneshot::Sender<Result<T>>;

/// Everything that can change the board goes through this queue, in order.
#[derive(Debug)]
pub(crate) enum BoardCommand {
    Create {
        count: usize,
        reply: Reply<Arc<AreaCollection>>,
    },
    Rename {
        id: AreaId,
        name: String,
        reply: Reply<String>,
    },
    SetMedia {
        id: AreaId,
        media: Media,
        reply: Reply<()>,
    },
    ClearMedia {
        id: AreaId,
        reply: Reply<Option<Media>>,
    },
    Reset {
        reply: Reply<()>,
    },
    /// Event from the listener identified by `handle`.
    Remote {
        event: RemoteEvent,
        handle: SubscriptionHandle,
    },
    /// A new listener was attached.
    Subscribed,
    /// The listener was torn down.
    Unsubscribed,
    /// The listener could not be attached.
    ListenerFailed(String),
    Worker(WorkerEvent),
    /// Enqueues a flush marker on every worker and returns the acks.
    Flush {
        reply: oneshot::Sender<Vec<oneshot::Receiver<()>>>,
    },
    /// Round trip through the queue; replies once earlier commands ran.
    Barrier {
        reply: oneshot::Sender<()>,
    },
    Shutdown,
}

/// Outcome reported back by a background worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum WorkerEvent {
    Saved,
    SaveFailed(String),
    Published(u64),
    PublishFailed(String),
}
