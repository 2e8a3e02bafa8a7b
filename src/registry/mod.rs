//! Read-only worker registry view
//!
//! Queries over the coordination sets the workers maintain about
//! themselves. The dispatcher never mutates any of these; workers add and
//! remove themselves from `running`, `available`, and the per-label sets,
//! and keep their label counts current. An empty result from any query is
//! a normal answer, not an error.

use std::sync::Arc;

use crate::models::{
    label_workers_key, WorkerId, AVAILABLE_WORKERS_KEY, LABEL_COUNTS_KEY, RUNNING_WORKERS_KEY,
};
use crate::store::{Store, StoreError};

/// Upper bound on how many workers the label-capacity query returns.
const LABEL_CAPACITY_LIMIT: usize = 20;

/// Read-only view over the worker coordination state.
#[derive(Clone)]
pub struct WorkerRegistry {
    store: Arc<dyn Store>,
    max_labels_per_worker: u32,
}

impl WorkerRegistry {
    pub fn new(store: Arc<dyn Store>, max_labels_per_worker: u32) -> Self {
        Self {
            store,
            max_labels_per_worker,
        }
    }

    /// Ids of all currently running workers.
    pub async fn running(&self) -> Result<Vec<WorkerId>, StoreError> {
        self.store
            .set_members(RUNNING_WORKERS_KEY)
            .await
            .map(into_worker_ids)
            .map_err(|e| {
                tracing::error!(error = %e, "unable to fetch running workers");
                e
            })
    }

    /// Ids of all currently idle workers.
    pub async fn available(&self) -> Result<Vec<WorkerId>, StoreError> {
        self.store
            .set_members(AVAILABLE_WORKERS_KEY)
            .await
            .map(into_worker_ids)
            .map_err(|e| {
                tracing::error!(error = %e, "unable to fetch available workers");
                e
            })
    }

    /// Ids of idle workers advertising `label`.
    ///
    /// A single server-side intersection, so a worker leaving the
    /// available set mid-call can never show up as a phantom entry.
    pub async fn available_with_label(&self, label: &str) -> Result<Vec<WorkerId>, StoreError> {
        self.store
            .set_intersect(AVAILABLE_WORKERS_KEY, &label_workers_key(label))
            .await
            .map(into_worker_ids)
            .map_err(|e| {
                tracing::error!(error = %e, label = %label, "unable to fetch available workers for label");
                e
            })
    }

    /// Ids of all workers advertising `label`, idle or not.
    pub async fn with_label(&self, label: &str) -> Result<Vec<WorkerId>, StoreError> {
        self.store
            .set_members(&label_workers_key(label))
            .await
            .map(into_worker_ids)
            .map_err(|e| {
                tracing::error!(error = %e, label = %label, "unable to fetch workers for label");
                e
            })
    }

    /// Whether `worker` is currently idle.
    pub async fn is_available(&self, worker: &WorkerId) -> Result<bool, StoreError> {
        self.store
            .set_contains(AVAILABLE_WORKERS_KEY, worker.as_str())
            .await
            .map_err(|e| {
                tracing::error!(error = %e, worker_id = %worker, "unable to check worker availability");
                e
            })
    }

    /// Ids of workers that can take on an additional label.
    pub async fn with_label_capacity(&self) -> Result<Vec<WorkerId>, StoreError> {
        let max_score = f64::from(self.max_labels_per_worker.saturating_sub(1));
        self.store
            .sorted_set_range_by_score(LABEL_COUNTS_KEY, 0.0, max_score, LABEL_CAPACITY_LIMIT)
            .await
            .map(into_worker_ids)
            .map_err(|e| {
                tracing::error!(error = %e, "unable to fetch workers with label capacity");
                e
            })
    }
}

fn into_worker_ids(members: Vec<String>) -> Vec<WorkerId> {
    members.into_iter().map(WorkerId::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::testutil::seeded_store;

    #[tokio::test]
    async fn test_running_workers() {
        let registry = WorkerRegistry::new(seeded_store().await, 2);
        let mut running = registry.running().await.unwrap();
        running.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        assert_eq!(
            running,
            vec!["uw1".into(), "uw2".into(), "w1".into(), "w2".into()]
        );
    }

    #[tokio::test]
    async fn test_available_workers() {
        let registry = WorkerRegistry::new(seeded_store().await, 2);
        let mut available = registry.available().await.unwrap();
        available.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        assert_eq!(available, vec!["w1".into(), "w2".into()]);
    }

    #[tokio::test]
    async fn test_available_with_label_excludes_busy_workers() {
        let registry = WorkerRegistry::new(seeded_store().await, 2);
        let available = registry.available_with_label("label-1").await.unwrap();
        assert_eq!(available, vec!["w1".into()]);
    }

    #[tokio::test]
    async fn test_available_with_unknown_label_is_empty() {
        let registry = WorkerRegistry::new(seeded_store().await, 2);
        assert!(registry.available_with_label("label-3").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_with_label_includes_busy_workers() {
        let registry = WorkerRegistry::new(seeded_store().await, 2);
        let mut workers = registry.with_label("label-1").await.unwrap();
        workers.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        assert_eq!(workers, vec!["uw1".into(), "w1".into()]);
    }

    #[tokio::test]
    async fn test_is_available() {
        let registry = WorkerRegistry::new(seeded_store().await, 2);
        assert!(registry.is_available(&WorkerId::new("w1")).await.unwrap());
        assert!(!registry.is_available(&WorkerId::new("uw1")).await.unwrap());
        assert!(!registry.is_available(&WorkerId::new("ghost")).await.unwrap());
    }

    #[tokio::test]
    async fn test_with_label_capacity() {
        // Capacity 2 means only workers carrying fewer than 2 labels match.
        let registry = WorkerRegistry::new(seeded_store().await, 2);
        let mut workers = registry.with_label_capacity().await.unwrap();
        workers.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        assert_eq!(workers, vec!["uw2".into(), "w2".into()]);
    }

    #[tokio::test]
    async fn test_empty_store_reads_as_empty() {
        let registry = WorkerRegistry::new(Arc::new(MemoryStore::new()), 2);
        assert!(registry.running().await.unwrap().is_empty());
        assert!(registry.available().await.unwrap().is_empty());
        assert!(registry.with_label_capacity().await.unwrap().is_empty());
    }
}
