//! Cancellable listener handle.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::snapshot::RemoteEvent;

/// Receiving end of a remote listener.
///
/// Once [`unsubscribe`](Subscription::unsubscribe) has been called no further
/// event is yielded, even if the producer had already queued some.
#[derive(Debug)]
pub struct Subscription {
    events: mpsc::Receiver<RemoteEvent>,
    token: CancellationToken,
}

impl Subscription {
    /// Wraps a producer channel. The producer should stop once `token` is cancelled.
    pub fn new(events: mpsc::Receiver<RemoteEvent>, token: CancellationToken) -> Self {
        Self { events, token }
    }

    /// Waits for the next event. Returns `None` after unsubscribe or when the
    /// producer hung up.
    pub async fn next(&mut self) -> Option<RemoteEvent> {
        if self.token.is_cancelled() {
            return None;
        }
        tokio::select! {
            biased;
            _ = self.token.cancelled() => None,
            event = self.events.recv() => {
                if self.token.is_cancelled() {
                    None
                } else {
                    event
                }
            }
        }
    }

    /// Idempotent.
    pub fn unsubscribe(&self) {
        self.token.cancel();
    }

    pub fn is_active(&self) -> bool {
        !self.token.is_cancelled()
    }

    /// Detached handle that can cancel this subscription from elsewhere.
    pub fn handle(&self) -> SubscriptionHandle {
        SubscriptionHandle {
            token: self.token.clone(),
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Cloneable cancel handle for a [`Subscription`].
#[derive(Debug, Clone)]
pub struct SubscriptionHandle {
    token: CancellationToken,
}

impl SubscriptionHandle {
    pub fn unsubscribe(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}
