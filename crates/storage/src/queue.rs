//! Per-key write queue
//!
//! Callers that update memory optimistically hand the serialized value to a
//! [`WriteQueue`]; a background task applies the writes to the store one at
//! a time, in the order they were enqueued. Each enqueue returns a
//! [`PendingWrite`] that resolves once that particular write has landed.
//! Dropping the handle does not cancel the write.

use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

use crate::kv::{KeyValueStore, Result, StorageError};

enum Op {
    Set(String),
    Remove,
    Barrier,
}

struct Job {
    op: Op,
    done: oneshot::Sender<Result<()>>,
}

/// Completion handle for one queued write
#[must_use = "the write proceeds regardless; await `wait` to observe its outcome"]
#[derive(Debug)]
pub struct PendingWrite {
    key: String,
    rx: oneshot::Receiver<Result<()>>,
}

impl PendingWrite {
    /// Wait for the write to complete and return its outcome
    pub async fn wait(self) -> Result<()> {
        match self.rx.await {
            Ok(result) => result,
            Err(_) => Err(StorageError::QueueClosed(self.key)),
        }
    }

    /// Key the write targets
    pub fn key(&self) -> &str {
        &self.key
    }
}

/// Serialized writer for a single storage key
#[derive(Debug, Clone)]
pub struct WriteQueue {
    key: String,
    tx: mpsc::UnboundedSender<Job>,
}

impl WriteQueue {
    /// Start a queue writing `key` into `store`
    ///
    /// Must be called within a Tokio runtime; the worker task runs until the
    /// last clone of the queue is dropped and every queued write is applied.
    pub fn new(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        let key = key.into();
        let (tx, mut rx) = mpsc::unbounded_channel::<Job>();

        let worker_key = key.clone();
        tokio::spawn(async move {
            while let Some(job) = rx.recv().await {
                let result = match &job.op {
                    Op::Set(value) => store.set(&worker_key, value).await,
                    Op::Remove => store.remove(&worker_key).await,
                    Op::Barrier => Ok(()),
                };

                if let Err(e) = &result {
                    tracing::warn!(key = %worker_key, "queued write failed: {}", e);
                }

                // Receiver may be gone; the write has happened either way
                let _ = job.done.send(result);
            }
            tracing::trace!(key = %worker_key, "write queue drained");
        });

        Self { key, tx }
    }

    /// Key this queue writes
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Queue a write of `value`
    pub fn enqueue(&self, value: impl Into<String>) -> PendingWrite {
        self.submit(Op::Set(value.into()))
    }

    /// Queue removal of the key
    pub fn enqueue_remove(&self) -> PendingWrite {
        self.submit(Op::Remove)
    }

    /// Wait until every write enqueued before this call has completed
    pub async fn flush(&self) -> Result<()> {
        self.submit(Op::Barrier).wait().await
    }

    fn submit(&self, op: Op) -> PendingWrite {
        let (done, rx) = oneshot::channel();
        // A failed send drops `done`, which surfaces as QueueClosed on wait
        let _ = self.tx.send(Job { op, done });
        PendingWrite { key: self.key.clone(), rx }
    }
}
