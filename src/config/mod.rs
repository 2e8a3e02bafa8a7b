//! Configuration management for the dispatcher
//!
//! All settings come from environment variables with sensible defaults,
//! matching how the service is deployed next to its Redis instance. The
//! two timeouts are layered, not nested: the per-operation deadline lives
//! in the store client, the task deadline in the delivery component.

use std::net::SocketAddr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Dispatcher service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatcherConfig {
    /// HTTP bind address.
    pub bind_address: SocketAddr,

    /// Redis host.
    pub redis_host: String,

    /// Redis port.
    pub redis_port: u16,

    /// Redis connection pool size.
    pub pool_size: usize,

    /// Route every task to the shared fallback queue instead of matching
    /// labels. Exists to benchmark the labeled policy against a baseline.
    pub random_dispatch: bool,

    /// Deadline for a single store operation, in milliseconds.
    pub op_timeout_ms: u64,

    /// Deadline for a synchronous task result, in seconds.
    pub task_timeout_secs: u64,

    /// Maximum number of labels a single worker may carry.
    pub max_labels_per_worker: u32,

    /// Log each HTTP request via the tracing layer.
    pub enable_request_logging: bool,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".parse().expect("static address"),
            redis_host: "localhost".to_string(),
            redis_port: 6379,
            pool_size: 10,
            random_dispatch: false,
            op_timeout_ms: 500,
            task_timeout_secs: 30,
            max_labels_per_worker: 2,
            enable_request_logging: true,
        }
    }
}

impl DispatcherConfig {
    /// Build a config from environment variables, falling back to
    /// defaults for anything unset.
    ///
    /// Recognized variables: `PORT`, `REDIS_HOST`, `REDIS_PORT`,
    /// `REDIS_POOL_SIZE`, `RANDOM_DISPATCH`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let bind_address = match std::env::var("PORT") {
            Ok(port) => format!("0.0.0.0:{port}")
                .parse()
                .map_err(|_| ConfigError::InvalidValue {
                    field: "PORT".to_string(),
                    reason: format!("not a valid port: {port}"),
                })?,
            Err(_) => defaults.bind_address,
        };

        let redis_port = match std::env::var("REDIS_PORT") {
            Ok(port) => port.parse().map_err(|_| ConfigError::InvalidValue {
                field: "REDIS_PORT".to_string(),
                reason: format!("not a valid port: {port}"),
            })?,
            Err(_) => defaults.redis_port,
        };

        let config = Self {
            bind_address,
            redis_host: std::env::var("REDIS_HOST").unwrap_or_else(|_| defaults.redis_host.clone()),
            redis_port,
            pool_size: std::env::var("REDIS_POOL_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.pool_size),
            random_dispatch: std::env::var("RANDOM_DISPATCH")
                .map(|v| v == "true")
                .unwrap_or(false),
            ..defaults
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate cross-field constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pool_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "pool_size".to_string(),
                reason: "must allow at least 1 connection".to_string(),
            });
        }

        if self.max_labels_per_worker == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_labels_per_worker".to_string(),
                reason: "must allow at least 1 label".to_string(),
            });
        }

        if self.task_timeout() <= self.op_timeout() {
            return Err(ConfigError::InvalidValue {
                field: "task_timeout_secs".to_string(),
                reason: "task deadline must exceed the per-operation deadline".to_string(),
            });
        }

        Ok(())
    }

    /// Redis connection URL.
    pub fn redis_url(&self) -> String {
        format!("redis://{}:{}", self.redis_host, self.redis_port)
    }

    /// Per-operation deadline as a [`Duration`].
    pub fn op_timeout(&self) -> Duration {
        Duration::from_millis(self.op_timeout_ms)
    }

    /// Synchronous task deadline as a [`Duration`].
    pub fn task_timeout(&self) -> Duration {
        Duration::from_secs(self.task_timeout_secs)
    }
}

/// Configuration errors.
#[derive(Debug, Clone)]
pub enum ConfigError {
    InvalidValue { field: String, reason: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { field, reason } => {
                write!(f, "Invalid value for '{}': {}", field, reason)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
