//! Board use cases.

use std::sync::Arc;

use tokio::sync::{Mutex, broadcast, mpsc, oneshot, watch};

use photoboard_core::area::{AreaCollection, AreaId, AreaStore, Media};
use photoboard_core::config::SyncMode;
use photoboard_core::error::{BoardError, Result};
use photoboard_core::media::{MediaBlob, MediaDeleter, MediaUploader};
use photoboard_core::persistence::BoardRepository;
use photoboard_core::reconcile::{MutationPlan, ReconciliationEngine};
use photoboard_core::role::Role;
use photoboard_core::sync::{RemoteChannel, Snapshot, SubscriptionHandle, SyncState};

use super::actor::{BoardActor, Faults};
use super::command::BoardCommand;
use super::worker::{spawn_persist_worker, spawn_publish_worker};

const COMMAND_BUFFER: usize = 64;
const PLAN_BUFFER: usize = 64;

/// Collaborators a board runs with.
pub struct BoardDependencies {
    pub mode: SyncMode,
    pub repository: Arc<dyn BoardRepository>,
    pub uploader: Arc<dyn MediaUploader>,
    /// Synced mode only.
    pub channel: Option<Arc<dyn RemoteChannel>>,
    /// Best-effort removal of hosted assets (synced mode).
    pub deleter: Option<Arc<dyn MediaDeleter>>,
}

/// Handle to a running board.
///
/// All mutations are queued to one actor task that owns the area store;
/// readers get immutable `Arc<AreaCollection>` values without locking.
pub struct BoardService {
    mode: SyncMode,
    commands: mpsc::Sender<BoardCommand>,
    collection: watch::Receiver<Arc<AreaCollection>>,
    status: watch::Receiver<SyncState>,
    plans: broadcast::Sender<MutationPlan>,
    uploader: Arc<dyn MediaUploader>,
    deleter: Option<Arc<dyn MediaDeleter>>,
    channel: Option<Arc<dyn RemoteChannel>>,
    subscription: Mutex<Option<SubscriptionHandle>>,
}

impl BoardService {
    /// Bootstraps a board.
    ///
    /// 1. moves any lower-tier data into the preferred storage tier
    /// 2. restores the persisted collection
    /// 3. starts the actor and workers
    /// 4. in synced mode, attaches a remote listener
    ///
    /// Persistence errors during bootstrap are logged and the board starts
    /// empty; they never prevent startup.
    pub async fn start(deps: BoardDependencies) -> Result<Self> {
        if deps.mode == SyncMode::Synced && deps.channel.is_none() {
            return Err(BoardError::config("synced mode requires a remote channel"));
        }

        match deps.repository.migrate_once().await {
            Ok(outcome) => tracing::debug!("[BoardService] Storage migration: {:?}", outcome),
            Err(e) => tracing::warn!("[BoardService] Storage migration failed: {}", e),
        }

        let mut store = AreaStore::new();
        let engine = ReconciliationEngine::new();
        match deps.repository.load().await {
            Ok(Some(persisted)) => {
                engine.restore(&mut store, &Snapshot::of(&persisted))?;
                tracing::info!("[BoardService] Restored {} area(s)", store.collection().len());
            }
            Ok(None) => tracing::debug!("[BoardService] No persisted board"),
            Err(e) => tracing::warn!("[BoardService] Failed to load persisted board: {}", e),
        }

        let (commands_tx, commands_rx) = mpsc::channel(COMMAND_BUFFER);
        let (collection_tx, collection_rx) =
            watch::channel(Arc::new(store.collection().clone()));
        let (status_tx, status_rx) = watch::channel(match deps.mode {
            SyncMode::Local => SyncState::Offline,
            SyncMode::Synced => SyncState::Connecting,
        });
        let (plans, _) = broadcast::channel(PLAN_BUFFER);

        let persist = spawn_persist_worker(deps.repository.clone(), commands_tx.clone());
        let publish = deps
            .channel
            .as_ref()
            .filter(|_| deps.mode == SyncMode::Synced)
            .map(|channel| spawn_publish_worker(channel.clone(), commands_tx.clone()));

        let actor = BoardActor {
            store,
            engine,
            mode: deps.mode,
            collection_tx,
            status_tx,
            plans: plans.clone(),
            persist,
            publish,
            subscribed: false,
            faults: Faults::default(),
        };
        tokio::spawn(actor.run(commands_rx));

        let service = Self {
            mode: deps.mode,
            commands: commands_tx,
            collection: collection_rx,
            status: status_rx,
            plans,
            uploader: deps.uploader,
            deleter: deps.deleter,
            channel: deps.channel,
            subscription: Mutex::new(None),
        };

        if service.mode == SyncMode::Synced {
            if let Err(e) = service.connect().await {
                tracing::warn!("[BoardService] Could not attach listener: {}", e);
            }
        }

        tracing::info!("[BoardService] Started ({:?})", service.mode);
        Ok(service)
    }

    pub fn mode(&self) -> SyncMode {
        self.mode
    }

    /// Latest collection. Never blocks.
    pub fn snapshot(&self) -> Arc<AreaCollection> {
        self.collection.borrow().clone()
    }

    pub fn watch_collection(&self) -> watch::Receiver<Arc<AreaCollection>> {
        self.collection.clone()
    }

    pub fn status(&self) -> SyncState {
        *self.status.borrow()
    }

    pub fn watch_status(&self) -> watch::Receiver<SyncState> {
        self.status.clone()
    }

    /// View mutation plans, in application order.
    pub fn subscribe_plans(&self) -> broadcast::Receiver<MutationPlan> {
        self.plans.subscribe()
    }

    /// Replaces the board with `count` fresh areas.
    pub async fn create_areas(&self, role: Role, count: usize) -> Result<Arc<AreaCollection>> {
        role.require_admin("create areas")?;
        self.request(|reply| BoardCommand::Create { count, reply })
            .await
    }

    /// Returns the name that was stored (trimmed, or the default name when blank).
    pub async fn rename_area(&self, role: Role, id: AreaId, name: &str) -> Result<String> {
        role.require_admin("rename areas")?;
        let name = name.to_string();
        self.request(|reply| BoardCommand::Rename { id, name, reply })
            .await
    }

    /// Uploads `blob` and shows it in area `id`.
    pub async fn attach_media(&self, id: AreaId, blob: MediaBlob) -> Result<Media> {
        if self.snapshot().get(id).is_none() {
            return Err(BoardError::not_found("Area", id.to_string()));
        }

        let media = self.uploader.upload(id, blob).await?;
        let attached = media.clone();
        match self
            .request(|reply| BoardCommand::SetMedia { id, media, reply })
            .await
        {
            Ok(()) => Ok(attached),
            Err(e) => {
                // The area vanished while uploading; do not leave the asset behind
                self.delete_hosted(&attached).await;
                Err(e)
            }
        }
    }

    /// Removes the media of area `id`. Hosted assets are deleted best-effort.
    pub async fn clear_media(&self, id: AreaId) -> Result<()> {
        let previous = self
            .request(|reply| BoardCommand::ClearMedia { id, reply })
            .await?;
        if let Some(media) = previous {
            self.delete_hosted(&media).await;
        }
        Ok(())
    }

    /// Clears memory, every storage tier and (when synced) the remote document.
    pub async fn reset(&self, role: Role) -> Result<()> {
        role.require_admin("reset the board")?;
        self.request(|reply| BoardCommand::Reset { reply }).await
    }

    /// Attaches a new remote listener, replacing any previous one.
    pub async fn connect(&self) -> Result<()> {
        let channel = self
            .channel
            .clone()
            .ok_or_else(|| BoardError::config("no remote channel configured"))?;

        let mut guard = self.subscription.lock().await;
        if let Some(previous) = guard.take() {
            previous.unsubscribe();
        }

        self.send(BoardCommand::Subscribed).await?;
        let mut subscription = match channel.subscribe().await {
            Ok(subscription) => subscription,
            Err(e) => {
                self.send(BoardCommand::ListenerFailed(e.to_string())).await?;
                return Err(e);
            }
        };
        let handle = subscription.handle();
        *guard = Some(handle.clone());
        drop(guard);

        let commands = self.commands.clone();
        tokio::spawn(async move {
            while let Some(event) = subscription.next().await {
                let command = BoardCommand::Remote {
                    event,
                    handle: handle.clone(),
                };
                if commands.send(command).await.is_err() {
                    break;
                }
            }
            tracing::debug!("[BoardService] Listener forwarder stopped");
        });

        tracing::info!("[BoardService] Listening for remote snapshots");
        Ok(())
    }

    /// Stops applying remote snapshots, including any already queued.
    /// Idempotent.
    pub async fn unsubscribe(&self) {
        let handle = self.subscription.lock().await.take();
        if let Some(handle) = handle {
            handle.unsubscribe();
            let _ = self.send(BoardCommand::Unsubscribed).await;
            tracing::info!("[BoardService] Listener detached");
        }
    }

    /// Waits until every write queued so far has been persisted or
    /// published, and the outcome is reflected in [`status`](Self::status).
    pub async fn flush(&self) -> Result<()> {
        let acks = self.request_raw(|reply| BoardCommand::Flush { reply }).await?;
        for ack in acks {
            let _ = ack.await;
        }
        self.request_raw(|reply| BoardCommand::Barrier { reply })
            .await
    }

    /// Stops the listener, the actor and (once drained) the workers.
    pub async fn shutdown(&self) {
        self.unsubscribe().await;
        let _ = self.commands.send(BoardCommand::Shutdown).await;
    }

    async fn delete_hosted(&self, media: &Media) {
        let (Some(deleter), Some(provider_id)) = (&self.deleter, media.locator.provider_id())
        else {
            return;
        };
        if let Err(e) = deleter.delete(provider_id).await {
            tracing::warn!(
                "[BoardService] Could not delete hosted asset {}: {}",
                provider_id,
                e
            );
        }
    }

    async fn send(&self, command: BoardCommand) -> Result<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| BoardError::internal("board actor has stopped"))
    }

    async fn request_raw<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> BoardCommand,
    ) -> Result<T> {
        let (reply, response) = oneshot::channel();
        self.send(build(reply)).await?;
        response
            .await
            .map_err(|_| BoardError::internal("board actor dropped the request"))
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<Result<T>>) -> BoardCommand,
    ) -> Result<T> {
        self.request_raw(build).await?
    }
}

impl Drop for BoardService {
    fn drop(&mut self) {
        if let Ok(mut guard) = self.subscription.try_lock() {
            if let Some(handle) = guard.take() {
                handle.unsubscribe();
            }
        }
        let _ = self.commands.try_send(BoardCommand::Shutdown);
    }
}
