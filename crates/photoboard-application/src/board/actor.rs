//! Single writer over the area store.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, oneshot, watch};

use photoboard_core::area::{AreaCollection, AreaStore};
use photoboard_core::config::SyncMode;
use photoboard_core::error::Result;
use photoboard_core::reconcile::{Directive, MutationPlan, ReconciliationEngine};
use photoboard_core::sync::{RemoteEvent, Snapshot, SyncState};

use super::command::{BoardCommand, WorkerEvent};
use super::worker::{Job, JobSender};

pub(crate) struct BoardActor {
    pub(crate) store: AreaStore,
    pub(crate) engine: ReconciliationEngine,
    pub(crate) mode: SyncMode,
    pub(crate) collection_tx: watch::Sender<Arc<AreaCollection>>,
    pub(crate) status_tx: watch::Sender<SyncState>,
    pub(crate) plans: broadcast::Sender<MutationPlan>,
    pub(crate) persist: JobSender,
    pub(crate) publish: Option<JobSender>,
    pub(crate) subscribed: bool,
    pub(crate) faults: Faults,
}

/// Failures that currently hold the board in `Degraded`.
///
/// A dead listener only clears on a new subscription (or a deliberate
/// unsubscribe); a successful publish says nothing about it.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct Faults {
    pub(crate) persistence: bool,
    pub(crate) publish: bool,
    pub(crate) listener: bool,
}

impl Faults {
    fn any(&self) -> bool {
        self.persistence || self.publish || self.listener
    }
}

impl BoardActor {
    pub(crate) async fn run(mut self, mut commands: mpsc::Receiver<BoardCommand>) {
        tracing::debug!("[BoardActor] Started in {:?} mode", self.mode);
        while let Some(command) = commands.recv().await {
            if matches!(command, BoardCommand::Shutdown) {
                break;
            }
            self.handle(command);
        }
        tracing::debug!("[BoardActor] Stopped");
    }

    fn handle(&mut self, command: BoardCommand) {
        match command {
            BoardCommand::Create { count, reply } => {
                let _ = reply.send(self.create(count));
            }
            BoardCommand::Rename { id, name, reply } => {
                let result = self.store.rename(id, &name);
                if let Ok(stored) = &result {
                    self.commit_patch(vec![Directive::Rename {
                        id,
                        name: stored.clone(),
                    }]);
                }
                let _ = reply.send(result);
            }
            BoardCommand::SetMedia { id, media, reply } => {
                let result = self
                    .store
                    .set_media(id, media.locator.clone(), media.kind);
                if result.is_ok() {
                    tracing::debug!("[BoardActor] Area {} now shows {}", id, media.kind.as_str());
                    self.commit_patch(vec![Directive::Render {
                        id,
                        media: Some(media),
                    }]);
                }
                let _ = reply.send(result);
            }
            BoardCommand::ClearMedia { id, reply } => {
                let result = self.store.clear_media(id);
                if result.is_ok() {
                    self.commit_patch(vec![Directive::Render { id, media: None }]);
                }
                let _ = reply.send(result);
            }
            BoardCommand::Reset { reply } => {
                self.reset();
                let _ = reply.send(Ok(()));
            }
            BoardCommand::Remote { event, handle } => {
                if handle.is_cancelled() {
                    tracing::debug!("[BoardActor] Dropping event from a cancelled listener");
                    return;
                }
                self.on_remote(event);
            }
            BoardCommand::Subscribed => {
                self.subscribed = true;
                self.faults.listener = false;
                self.engine.reset();
                self.set_status(SyncState::Connecting);
            }
            BoardCommand::Unsubscribed => {
                self.subscribed = false;
                self.faults.listener = false;
                self.refresh_status();
            }
            BoardCommand::ListenerFailed(reason) => {
                tracing::warn!("[BoardActor] Listener unavailable: {}", reason);
                self.subscribed = false;
                self.fail_listener();
            }
            BoardCommand::Worker(event) => self.on_worker(event),
            BoardCommand::Flush { reply } => {
                let mut acks = Vec::new();
                for worker in std::iter::once(&self.persist).chain(self.publish.as_ref()) {
                    let (ack, done) = oneshot::channel();
                    if worker.send(Job::Flush(ack)).is_ok() {
                        acks.push(done);
                    }
                }
                let _ = reply.send(acks);
            }
            BoardCommand::Barrier { reply } => {
                let _ = reply.send(());
            }
            BoardCommand::Shutdown => {}
        }
    }

    fn create(&mut self, count: usize) -> Result<Arc<AreaCollection>> {
        let collection = AreaCollection::create(count)?.with_version(self.store.version());
        self.store.replace_all(collection)?;
        self.bump_local_version();
        self.commit_local(MutationPlan::FullRebuild {
            collection: self.store.collection().clone(),
            renders: Vec::new(),
        });
        tracing::info!("[BoardActor] Created {} area(s)", count);
        Ok(self.current())
    }

    fn reset(&mut self) {
        self.store.clear();
        self.publish_view(MutationPlan::ClearToEmpty {
            version: self.store.version(),
        });
        self.enqueue_persist(Job::Erase);
        if let Some(publish) = &self.publish {
            let _ = publish.send(Job::Erase);
        }
        tracing::info!("[BoardActor] Board reset");
    }

    /// The version marker is a local counter only when not synced; in synced
    /// mode the server assigns it.
    fn bump_local_version(&mut self) {
        if self.mode == SyncMode::Local {
            let next = self.store.version() + 1;
            self.store.set_version(next);
        }
    }

    fn commit_patch(&mut self, directives: Vec<Directive>) {
        self.bump_local_version();
        self.commit_local(MutationPlan::Patch {
            directives,
            version: self.store.version(),
        });
    }

    /// Fans a local edit out to readers, persistence and (in synced mode)
    /// the remote document.
    fn commit_local(&mut self, plan: MutationPlan) {
        self.publish_view(plan);
        let snapshot = self.current();
        self.enqueue_persist(Job::Write(snapshot.clone()));
        if let Some(publish) = &self.publish {
            let _ = publish.send(Job::Write(snapshot));
        }
    }

    fn on_remote(&mut self, event: RemoteEvent) {
        match event {
            RemoteEvent::Snapshot(snapshot) => self.apply_snapshot(snapshot),
            RemoteEvent::Error(reason) => {
                tracing::warn!("[BoardActor] Listener error: {}", reason);
                self.fail_listener();
            }
        }
    }

    fn apply_snapshot(&mut self, snapshot: Snapshot) {
        let before = self.store.collection().clone();
        match self.engine.reconcile(&mut self.store, &snapshot) {
            Ok(plan) if plan.is_stale() => {}
            Ok(plan) => {
                // A delivered snapshot proves the listener works again
                self.faults.listener = false;
                let status = *self.status_tx.borrow();
                if status == SyncState::Connecting && !self.faults.any() {
                    self.set_status(SyncState::Live);
                } else {
                    self.refresh_status();
                }
                if self.store.collection() == &before {
                    return;
                }
                if plan.is_noop() {
                    // Only the version marker moved
                    let _ = self.collection_tx.send(self.current());
                } else {
                    self.publish_view(plan);
                }
                let job = if self.store.is_empty() {
                    Job::Erase
                } else {
                    Job::Write(self.current())
                };
                self.enqueue_persist(job);
            }
            Err(e) => {
                tracing::warn!(
                    "[BoardActor] Rejected snapshot v{}: {}",
                    snapshot.version,
                    e
                );
                self.fail_listener();
            }
        }
    }

    fn on_worker(&mut self, event: WorkerEvent) {
        match event {
            WorkerEvent::Saved => {
                self.faults.persistence = false;
                self.refresh_status();
            }
            WorkerEvent::SaveFailed(reason) => {
                tracing::warn!("[BoardActor] Persistence degraded: {}", reason);
                self.faults.persistence = true;
                self.set_status(SyncState::Degraded);
            }
            WorkerEvent::Published(version) => {
                self.engine.acknowledge(version);
                self.faults.publish = false;
                self.refresh_status();
            }
            WorkerEvent::PublishFailed(reason) => {
                tracing::warn!("[BoardActor] Remote degraded: {}", reason);
                self.faults.publish = true;
                self.set_status(SyncState::Degraded);
            }
        }
    }

    fn fail_listener(&mut self) {
        self.faults.listener = true;
        self.set_status(SyncState::Degraded);
    }

    /// Leaves `Degraded` once every failing side has succeeded again.
    fn refresh_status(&mut self) {
        let status = *self.status_tx.borrow();
        let next = if self.faults.any() {
            SyncState::Degraded
        } else if !self.subscribed {
            SyncState::Offline
        } else if status == SyncState::Connecting {
            SyncState::Connecting
        } else {
            SyncState::Live
        };
        self.set_status(next);
    }

    fn current(&self) -> Arc<AreaCollection> {
        Arc::new(self.store.collection().clone())
    }

    fn publish_view(&self, plan: MutationPlan) {
        let _ = self.collection_tx.send(self.current());
        // No receivers is fine
        let _ = self.plans.send(plan);
    }

    fn enqueue_persist(&self, job: Job) {
        if self.persist.send(job).is_err() {
            tracing::warn!("[BoardActor] Persist worker is gone");
        }
    }

    fn set_status(&self, state: SyncState) {
        self.status_tx.send_if_modified(|current| {
            if *current == state {
                false
            } else {
                tracing::info!("[BoardActor] Sync state {} -> {}", current, state);
                *current = state;
                true
            }
        });
    }
}
