//! In-process realtime document hub.
//!
//! Holds one shared board document and pushes every new version to all
//! listeners. Several services in the same process (one per simulated
//! device) can share one hub through an `Arc`.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::{broadcast, mpsc, watch};
use tokio_util::sync::CancellationToken;

use photoboard_core::area::AreaCollection;
use photoboard_core::error::{BoardError, Result};
use photoboard_core::sync::{RemoteChannel, RemoteEvent, Snapshot, Subscription};

const LISTENER_BUFFER: usize = 16;

pub struct RemoteHub {
    document: watch::Sender<Snapshot>,
    errors: broadcast::Sender<String>,
    online: AtomicBool,
}

impl RemoteHub {
    pub fn new() -> Self {
        let (document, _) = watch::channel(Snapshot::absent(0));
        let (errors, _) = broadcast::channel(LISTENER_BUFFER);
        Self {
            document,
            errors,
            online: AtomicBool::new(true),
        }
    }

    /// While offline, subscribe/publish/delete fail with `PublishFailed`.
    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
        tracing::info!("[RemoteHub] {}", if online { "Online" } else { "Offline" });
    }

    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    pub fn current(&self) -> Snapshot {
        self.document.borrow().clone()
    }

    /// Delivers a listener error to every active subscription.
    pub fn report_error(&self, reason: impl Into<String>) {
        let _ = self.errors.send(reason.into());
    }

    pub fn listener_count(&self) -> usize {
        self.document.receiver_count()
    }

    fn ensure_online(&self) -> Result<()> {
        if self.is_online() {
            Ok(())
        } else {
            Err(BoardError::publish_failed("remote channel is offline"))
        }
    }

    /// Replaces the document and returns the newly assigned version.
    fn replace(&self, areas: Option<Vec<photoboard_core::area::Area>>) -> u64 {
        let mut assigned = 0;
        self.document.send_modify(|current| {
            assigned = current.version + 1;
            *current = Snapshot {
                areas,
                version: assigned,
            };
        });
        assigned
    }
}

impl Default for RemoteHub {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RemoteChannel for RemoteHub {
    async fn subscribe(&self) -> Result<Subscription> {
        self.ensure_online()?;

        let (tx, rx) = mpsc::channel(LISTENER_BUFFER);
        let token = CancellationToken::new();
        let listener_token = token.clone();
        let mut document = self.document.subscribe();
        let mut errors = self.errors.subscribe();

        tokio::spawn(async move {
            let first = document.borrow_and_update().clone();
            if tx.send(RemoteEvent::Snapshot(first)).await.is_err() {
                return;
            }
            loop {
                tokio::select! {
                    _ = listener_token.cancelled() => break,
                    changed = document.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let snapshot = document.borrow_and_update().clone();
                        if tx.send(RemoteEvent::Snapshot(snapshot)).await.is_err() {
                            break;
                        }
                    }
                    error = errors.recv() => match error {
                        Ok(reason) => {
                            if tx.send(RemoteEvent::Error(reason)).await.is_err() {
                                break;
                            }
                        }
                        Err(broadcast::error::RecvError::Lagged(_)) => continue,
                        Err(broadcast::error::RecvError::Closed) => break,
                    },
                }
            }
            tracing::debug!("[RemoteHub] Listener stopped");
        });

        tracing::debug!("[RemoteHub] Listener started");
        Ok(Subscription::new(rx, token))
    }

    async fn publish(&self, collection: &AreaCollection) -> Result<u64> {
        self.ensure_online()?;
        let areas = (!collection.is_empty()).then(|| collection.areas().to_vec());
        let version = self.replace(areas);
        tracing::debug!("[RemoteHub] Published v{}", version);
        Ok(version)
    }

    async fn delete(&self) -> Result<u64> {
        self.ensure_online()?;
        let version = self.replace(None);
        tracing::debug!("[RemoteHub] Deleted document at v{}", version);
        Ok(version)
    }
}
