//! dispatchd - Label-aware task dispatcher
//!
//! A stateless dispatch service for a small distributed task-execution
//! system. Producers submit task requests over HTTP; the dispatcher picks
//! a worker queue and either fires-and-forgets the task or blocks until
//! the worker publishes the result. All coordination state lives in a
//! shared key-value/pubsub store.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`config`] - Configuration management and settings
//! - [`models`] - Task request wire format, worker ids, store key schema
//! - [`store`] - Coordination store clients (Redis and in-memory)
//! - [`registry`] - Read-only queries over the worker coordination sets
//! - [`routing`] - Worker-selection policy
//! - [`delivery`] - Queue delivery and synchronous run-to-completion
//! - [`server`] - HTTP surface
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use dispatchd::config::DispatcherConfig;
//! use dispatchd::server::DispatcherServer;
//! use dispatchd::store::RedisStore;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = DispatcherConfig::from_env()?;
//!     let store = RedisStore::connect(
//!         &config.redis_url(),
//!         config.pool_size,
//!         config.op_timeout(),
//!     )
//!     .await?;
//!     let server = DispatcherServer::new(config, Arc::new(store))?;
//!     server.start().await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod delivery;
pub mod error;
pub mod models;
pub mod registry;
pub mod routing;
pub mod server;
pub mod store;

#[cfg(test)]
mod testutil;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::DispatcherConfig;
    pub use crate::delivery::TaskDelivery;
    pub use crate::error::{Error, Result};
    pub use crate::models::{TaskRequest, WorkerId};
    pub use crate::registry::WorkerRegistry;
    pub use crate::routing::DispatchPolicy;
    pub use crate::server::DispatcherServer;
    pub use crate::store::{MemoryStore, RedisStore, Store};
}

// Direct re-exports for convenience
pub use models::{TaskRequest, WorkerId};
