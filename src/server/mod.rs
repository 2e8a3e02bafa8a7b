//! Dispatcher HTTP server
//!
//! Wires the registry, routing policy, and delivery components into an
//! axum application. The server holds no cross-request state; everything
//! the handlers share travels through [`AppState`], and all coordination
//! happens in the store.

pub mod api;

pub use api::{MessageResponse, WorkersResponse};

use std::sync::Arc;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::config::DispatcherConfig;
use crate::delivery::TaskDelivery;
use crate::registry::WorkerRegistry;
use crate::routing::DispatchPolicy;
use crate::store::Store;

// ============================================================================
// App State
// ============================================================================

/// Shared application state, cloned into every handler invocation.
#[derive(Clone)]
pub struct AppState {
    /// Read-only worker registry view.
    pub registry: WorkerRegistry,

    /// Task delivery component.
    pub delivery: TaskDelivery,

    /// Queue-selection policy, fixed at startup.
    pub policy: DispatchPolicy,
}

// ============================================================================
// Dispatcher Server
// ============================================================================

/// Main dispatcher server.
pub struct DispatcherServer {
    config: DispatcherConfig,
    state: AppState,
}

impl DispatcherServer {
    /// Create a new dispatcher server on top of a store client.
    pub fn new(config: DispatcherConfig, store: Arc<dyn Store>) -> Result<Self, ServerError> {
        config
            .validate()
            .map_err(|e| ServerError::Config(e.to_string()))?;

        let state = AppState {
            registry: WorkerRegistry::new(store.clone(), config.max_labels_per_worker),
            delivery: TaskDelivery::new(store, config.task_timeout()),
            policy: DispatchPolicy::from_flag(config.random_dispatch),
        };

        Ok(Self { config, state })
    }

    /// Get the application state.
    pub fn state(&self) -> AppState {
        self.state.clone()
    }

    /// Build the router with all routes and layers.
    pub fn build_router(&self) -> Router {
        let mut router = api::create_router(self.state.clone());

        if self.config.enable_request_logging {
            router = router.layer(TraceLayer::new_for_http());
        }

        router
    }

    /// Start the server.
    pub async fn start(&self) -> Result<(), ServerError> {
        let router = self.build_router();
        let addr = self.config.bind_address;

        tracing::info!(addr = %addr, policy = ?self.state.policy, "starting dispatcher server");

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::Bind(e.to_string()))?;

        axum::serve(listener, router)
            .await
            .map_err(|e| ServerError::Serve(e.to_string()))?;

        Ok(())
    }

    /// Start with graceful shutdown.
    pub async fn start_with_shutdown(
        &self,
        shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> Result<(), ServerError> {
        let router = self.build_router();
        let addr = self.config.bind_address;

        tracing::info!(addr = %addr, policy = ?self.state.policy, "starting dispatcher server");

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::Bind(e.to_string()))?;

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal)
            .await
            .map_err(|e| ServerError::Serve(e.to_string()))?;

        tracing::info!("dispatcher server shutdown complete");
        Ok(())
    }
}

// ============================================================================
// Server Errors
// ============================================================================

/// Server errors.
#[derive(Debug, Clone)]
pub enum ServerError {
    /// Configuration error.
    Config(String),

    /// Failed to bind to the address.
    Bind(String),

    /// Server error while serving.
    Serve(String),
}

impl std::fmt::Display for ServerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "Configuration error: {}", msg),
            Self::Bind(msg) => write!(f, "Failed to bind: {}", msg),
            Self::Serve(msg) => write!(f, "Server error: {}", msg),
        }
    }
}

impl std::error::Error for ServerError {}
