//! HTTP API for the dispatcher
//!
//! Four endpoints: health, worker listing, fire-and-forget dispatch, and
//! synchronous run-to-completion. Request and response bodies are JSON,
//! except `/run-task`, which returns the worker's result payload verbatim.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use crate::models::{TaskRequest, WorkerId};

use super::AppState;

// ============================================================================
// API Response Types
// ============================================================================

/// Simple message-only response body.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Response listing the currently running workers.
#[derive(Debug, Serialize)]
pub struct WorkersResponse {
    pub workers: Vec<WorkerId>,
}

// ============================================================================
// API Routes
// ============================================================================

/// Create the API router.
///
/// Unmatched methods on a known path get a 405 from the method router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/workers", get(running_workers))
        .route("/send-task", post(send_task))
        .route("/run-task", post(run_task))
        .with_state(state)
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint.
async fn health_check() -> impl IntoResponse {
    Json(MessageResponse::new("OK"))
}

/// List the ids of all running workers.
async fn running_workers(State(state): State<AppState>) -> Response {
    match state.registry.running().await {
        Ok(workers) => (StatusCode::OK, Json(WorkersResponse { workers })).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "error retrieving running workers");
            internal_error("Error retrieving running workers")
        }
    }
}

/// Dispatch a task to a worker queue without waiting for a result.
async fn send_task(
    State(state): State<AppState>,
    payload: Result<Json<TaskRequest>, JsonRejection>,
) -> Response {
    let task = match parse_task(payload) {
        Ok(task) => task,
        Err(response) => return response,
    };

    let worker = match state.policy.select_queue(&state.registry, &task).await {
        Ok(worker) => worker,
        Err(e) => {
            tracing::error!(error = %e, task_id = %task.task_id, "error selecting worker");
            return internal_error("Error selecting worker");
        }
    };

    if let Err(e) = state.delivery.send(&worker, &task).await {
        tracing::error!(
            error = %e,
            task_id = %task.task_id,
            worker_id = %worker,
            "error sending task to worker"
        );
        return internal_error("Error sending task to worker");
    }

    tracing::info!(worker_id = %worker, task_id = %task.task_id, "sent task to worker");
    (
        StatusCode::ACCEPTED,
        Json(MessageResponse::new("Task dispatched successfully")),
    )
        .into_response()
}

/// Dispatch a task and block until its result is published.
///
/// The response body is the raw result payload, unwrapped; the
/// dispatcher does not parse it.
async fn run_task(
    State(state): State<AppState>,
    payload: Result<Json<TaskRequest>, JsonRejection>,
) -> Response {
    let task = match parse_task(payload) {
        Ok(task) => task,
        Err(response) => return response,
    };

    if !task.return_result {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(MessageResponse::new(
                "Return result must be true to run the task with this method",
            )),
        )
            .into_response();
    }

    let worker = match state.policy.select_queue(&state.registry, &task).await {
        Ok(worker) => worker,
        Err(e) => {
            tracing::error!(error = %e, task_id = %task.task_id, "error selecting worker");
            return internal_error("Error selecting worker");
        }
    };

    match state.delivery.run(&worker, &task).await {
        Ok(result) => (StatusCode::OK, result).into_response(),
        Err(e) => {
            tracing::error!(
                error = %e,
                task_id = %task.task_id,
                worker_id = %worker,
                "error when running task"
            );
            internal_error("Error when running task")
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Unwrap the parsed body, mapping every rejection to a 400.
fn parse_task(payload: Result<Json<TaskRequest>, JsonRejection>) -> Result<TaskRequest, Response> {
    match payload {
        Ok(Json(task)) => Ok(task),
        Err(rejection) => {
            tracing::debug!(error = %rejection, "error decoding request body");
            Err((
                StatusCode::BAD_REQUEST,
                Json(MessageResponse::new("Invalid request body")),
            )
                .into_response())
        }
    }
}

fn internal_error(message: &str) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(MessageResponse::new(message)),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_response_shape() {
        let body = serde_json::to_value(MessageResponse::new("OK")).unwrap();
        assert_eq!(body, serde_json::json!({"message": "OK"}));
    }

    #[test]
    fn test_workers_response_shape() {
        let body = serde_json::to_value(WorkersResponse {
            workers: vec![WorkerId::new("w1"), WorkerId::new("w2")],
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"workers": ["w1", "w2"]}));
    }
}
