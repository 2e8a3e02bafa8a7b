//! Worker-selection policy
//!
//! Given a task request, pick the queue it should land on: a specific
//! idle worker advertising the task's label, or the shared fallback queue
//! that any idle worker drains. The policy is chosen once at startup, not
//! re-decided per request.

use rand::Rng;

use crate::models::{TaskRequest, WorkerId};
use crate::registry::WorkerRegistry;
use crate::store::StoreError;

/// Queue-selection strategy, fixed at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchPolicy {
    /// Everything goes to the shared fallback queue. Exists to benchmark
    /// the labeled policy against a baseline.
    Random,

    /// Prefer an idle worker advertising the task's label, falling back
    /// to the shared queue when none is available.
    Labeled,
}

impl DispatchPolicy {
    pub fn from_flag(random_dispatch: bool) -> Self {
        if random_dispatch {
            Self::Random
        } else {
            Self::Labeled
        }
    }

    /// Select the queue for `task`.
    pub async fn select_queue(
        &self,
        registry: &WorkerRegistry,
        task: &TaskRequest,
    ) -> Result<WorkerId, StoreError> {
        match self {
            Self::Random => Ok(WorkerId::fallback()),
            Self::Labeled => select_labeled_queue(registry, task).await,
        }
    }
}

/// Pick uniformly at random among the idle workers advertising the
/// task's label; no load balancing beyond that tie-break.
async fn select_labeled_queue(
    registry: &WorkerRegistry,
    task: &TaskRequest,
) -> Result<WorkerId, StoreError> {
    let available = registry.available_with_label(&task.label).await?;

    if !available.is_empty() {
        let picked = rand::thread_rng().gen_range(0..available.len());
        return Ok(available[picked].clone());
    }

    tracing::warn!(
        label = %task.label,
        task_id = %task.task_id,
        "no available workers found with label"
    );
    Ok(WorkerId::fallback())
}
