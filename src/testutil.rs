//! Shared fixtures for the unit test suites.

use std::sync::Arc;

use crate::models::{
    label_workers_key, AVAILABLE_WORKERS_KEY, LABEL_COUNTS_KEY, RUNNING_WORKERS_KEY,
};
use crate::store::{MemoryStore, Store};

/// Seed the store fixture used across the dispatcher tests: four running
/// workers, two of them idle, each pair advertising one label. The
/// `uw`-prefixed workers are the busy ones.
pub(crate) async fn seeded_store() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    store
        .set_add(RUNNING_WORKERS_KEY, &["w1", "w2", "uw1", "uw2"])
        .await
        .unwrap();
    store
        .set_add(AVAILABLE_WORKERS_KEY, &["w1", "w2"])
        .await
        .unwrap();
    store
        .set_add(&label_workers_key("label-1"), &["w1", "uw1"])
        .await
        .unwrap();
    store
        .set_add(&label_workers_key("label-2"), &["w2", "uw2"])
        .await
        .unwrap();
    store.set_score(LABEL_COUNTS_KEY, "w1", 2.0).await;
    store.set_score(LABEL_COUNTS_KEY, "uw1", 2.0).await;
    store.set_score(LABEL_COUNTS_KEY, "w2", 1.0).await;
    store.set_score(LABEL_COUNTS_KEY, "uw2", 1.0).await;
    store
}
