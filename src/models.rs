//! Core data types shared across the dispatcher
//!
//! This module defines the task request wire format, worker identifiers,
//! and the coordination-store key schema the dispatcher shares with the
//! worker pool.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Set of all workers currently alive.
pub const RUNNING_WORKERS_KEY: &str = "task-runners:running";

/// Subset of running workers that is currently idle.
pub const AVAILABLE_WORKERS_KEY: &str = "task-runners:available";

/// Sorted set scoring each worker by the number of labels it carries.
pub const LABEL_COUNTS_KEY: &str = "task-runners:label-counts";

/// Reserved worker id naming the shared fallback queue.
///
/// The fallback queue is consumed cooperatively by every available worker;
/// no real worker ever registers under this id.
pub const FALLBACK_QUEUE_ID: &str = "all";

/// Key of the set of workers advertising `label`.
pub fn label_workers_key(label: &str) -> String {
    format!("task-runners:labels:{label}:workers")
}

/// Pubsub channel a worker publishes the result for `task_id` on.
///
/// The task id is used verbatim as the channel suffix, reserved
/// characters and all.
pub fn result_channel_key(task_id: &str) -> String {
    format!("task-runners:results:{task_id}")
}

// ============================================================================
// Worker Id
// ============================================================================

/// Opaque identifier of a worker process, or the reserved fallback id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkerId(String);

impl WorkerId {
    /// Create a worker id from a raw string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The reserved id of the shared fallback queue.
    pub fn fallback() -> Self {
        Self(FALLBACK_QUEUE_ID.to_string())
    }

    /// Whether this id names the shared fallback queue rather than a worker.
    pub fn is_fallback(&self) -> bool {
        self.0 == FALLBACK_QUEUE_ID
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Key of this worker's FIFO job queue.
    pub fn queue_key(&self) -> String {
        format!("task-runners:{}:jobs", self.0)
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for WorkerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for WorkerId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

// ============================================================================
// Task Request
// ============================================================================

/// A request to run a task on a worker.
///
/// `parameters` is an opaque JSON-encoded string passed through to the
/// worker unchanged. `task_id` is producer-chosen and is not required to
/// be globally unique; collisions only confuse result routing for
/// synchronous submissions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRequest {
    pub task_id: String,
    pub task_type: String,
    pub label: String,
    #[serde(rename = "parameters_json")]
    pub parameters: String,
    pub return_result: bool,
}
