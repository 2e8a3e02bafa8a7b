//! Task delivery to worker queues
//!
//! Two delivery modes: fire-and-forget ([`TaskDelivery::send`]) and
//! run-to-completion ([`TaskDelivery::run`]), which blocks until the
//! worker publishes the task result or the task deadline expires.

use std::sync::Arc;
use std::time::Duration;

use crate::error::Error;
use crate::models::{result_channel_key, TaskRequest, WorkerId};
use crate::store::Store;

/// Delivers tasks onto worker queues and awaits synchronous results.
#[derive(Clone)]
pub struct TaskDelivery {
    store: Arc<dyn Store>,
    task_timeout: Duration,
}

impl TaskDelivery {
    pub fn new(store: Arc<dyn Store>, task_timeout: Duration) -> Self {
        Self {
            store,
            task_timeout,
        }
    }

    /// Serialize `task` and push it onto `worker`'s job queue.
    ///
    /// Success is the store's ack; there is no read-back.
    pub async fn send(&self, worker: &WorkerId, task: &TaskRequest) -> Result<(), Error> {
        let payload = serde_json::to_string(task).map_err(|e| {
            tracing::error!(error = %e, task_id = %task.task_id, "task serialization failed");
            Error::Json(e)
        })?;

        self.store
            .list_push(&worker.queue_key(), &payload)
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    task_id = %task.task_id,
                    worker_id = %worker,
                    "unable to enqueue task"
                );
                Error::Store(e)
            })
    }

    /// Push `task` onto `worker`'s queue and wait for its published
    /// result, bounded by the task deadline.
    ///
    /// The result channel is subscribed *before* the push: a fast worker
    /// may publish the instant it pops the job, and the message is only
    /// observable if the subscription already exists. A deadline expiry
    /// is a normal error; nothing is retried or requeued, and a result
    /// published after expiry is dropped.
    pub async fn run(&self, worker: &WorkerId, task: &TaskRequest) -> Result<String, Error> {
        let channel = result_channel_key(&task.task_id);
        let mut subscription = self.store.subscribe(&channel).await.map_err(|e| {
            tracing::error!(error = %e, task_id = %task.task_id, "unable to subscribe for task result");
            Error::Store(e)
        })?;

        self.send(worker, task).await?;

        subscription
            .receive(self.task_timeout)
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    task_id = %task.task_id,
                    worker_id = %worker,
                    "error receiving task result"
                );
                Error::Store(e)
            })
    }
}
