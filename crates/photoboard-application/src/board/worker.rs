//! Background persistence and publish workers.
//!
//! Each worker drains its queue before doing I/O and collapses adjacent
//! writes, so only the latest collection of a burst is written. Jobs are
//! otherwise processed in the order they were queued.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};

use photoboard_core::area::AreaCollection;
use photoboard_core::persistence::BoardRepository;
use photoboard_core::sync::RemoteChannel;

use super::command::{BoardCommand, WorkerEvent};

#[derive(Debug)]
pub(crate) enum Job {
    Write(Arc<AreaCollection>),
    Erase,
    Flush(oneshot::Sender<()>),
}

pub(crate) type JobSender = mpsc::UnboundedSender<Job>;

async fn next_batch(jobs: &mut mpsc::UnboundedReceiver<Job>) -> Option<Vec<Job>> {
    let first = jobs.recv().await?;
    let mut batch = vec![first];
    while let Ok(job) = jobs.try_recv() {
        batch.push(job);
    }
    Some(coalesce(batch))
}

fn coalesce(batch: Vec<Job>) -> Vec<Job> {
    let mut out: Vec<Job> = Vec::with_capacity(batch.len());
    for job in batch {
        if matches!(job, Job::Write(_)) && matches!(out.last(), Some(Job::Write(_))) {
            out.pop();
        }
        out.push(job);
    }
    out
}

async fn report(feedback: &mpsc::Sender<BoardCommand>, event: WorkerEvent) {
    // The actor is gone during shutdown; nothing left to report to.
    let _ = feedback.send(BoardCommand::Worker(event)).await;
}

pub(crate) fn spawn_persist_worker(
    repository: Arc<dyn BoardRepository>,
    feedback: mpsc::Sender<BoardCommand>,
) -> JobSender {
    let (tx, mut rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        while let Some(batch) = next_batch(&mut rx).await {
            for job in batch {
                match job {
                    Job::Write(collection) => match repository.save(&collection).await {
                        Ok(()) => report(&feedback, WorkerEvent::Saved).await,
                        Err(e) => {
                            tracing::warn!("[PersistWorker] Save failed: {}", e);
                            report(&feedback, WorkerEvent::SaveFailed(e.to_string())).await;
                        }
                    },
                    Job::Erase => {
                        if let Err(e) = repository.clear().await {
                            tracing::warn!("[PersistWorker] Clear failed: {}", e);
                            report(&feedback, WorkerEvent::SaveFailed(e.to_string())).await;
                        }
                    }
                    Job::Flush(ack) => {
                        let _ = ack.send(());
                    }
                }
            }
        }
        tracing::debug!("[PersistWorker] Stopped");
    });
    tx
}

pub(crate) fn spawn_publish_worker(
    channel: Arc<dyn RemoteChannel>,
    feedback: mpsc::Sender<BoardCommand>,
) -> JobSender {
    let (tx, mut rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        while let Some(batch) = next_batch(&mut rx).await {
            for job in batch {
                let result = match job {
                    Job::Write(collection) => channel.publish(&collection).await,
                    Job::Erase => channel.delete().await,
                    Job::Flush(ack) => {
                        let _ = ack.send(());
                        continue;
                    }
                };
                match result {
                    Ok(version) => report(&feedback, WorkerEvent::Published(version)).await,
                    Err(e) => {
                        tracing::warn!("[PublishWorker] Publish failed: {}", e);
                        report(&feedback, WorkerEvent::PublishFailed(e.to_string())).await;
                    }
                }
            }
        }
        tracing::debug!("[PublishWorker] Stopped");
    });
    tx
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(n: usize) -> Job {
        Job::Write(Arc::new(AreaCollection::create(n).unwrap()))
    }

    #[test]
    fn test_coalesce_keeps_latest_write_of_each_run() {
        let (ack, _rx) = oneshot::channel();
        let out = coalesce(vec![write(1), write(2), Job::Erase, write(3), Job::Flush(ack), write(4)]);

        assert_eq!(out.len(), 5);
        assert!(matches!(&out[0], Job::Write(c) if c.len() == 2));
        assert!(matches!(out[1], Job::Erase));
        assert!(matches!(&out[2], Job::Write(c) if c.len() == 3));
        assert!(matches!(out[3], Job::Flush(_)));
        assert!(matches!(&out[4], Job::Write(c) if c.len() == 4));
    }
}
