//! Coordination store client
//!
//! The dispatcher keeps no state of its own: worker membership, per-worker
//! job queues, and per-task result channels all live in a shared
//! key-value/pubsub store. This module defines the minimal primitive
//! surface the dispatcher needs as the [`Store`] capability trait, with
//! two implementations:
//!
//! - [`RedisStore`] - the production client, backed by a `deadpool-redis`
//!   connection pool plus a dedicated pubsub connection per subscription
//! - [`MemoryStore`] - an in-process fake with the same set/list/pubsub
//!   semantics, used by tests and local development
//!
//! Every command is bounded by the per-operation deadline inside the
//! client; the only longer wait is [`Subscription::receive`], which takes
//! its deadline from the caller. Errors are surfaced verbatim; nothing is
//! retried here.

pub mod memory;
pub mod redis;

pub use memory::MemoryStore;
pub use redis::RedisStore;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Errors surfaced by a coordination store client.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Could not obtain a connection from the pool.
    #[error("store connection error: {0}")]
    Connection(String),

    /// A store command failed.
    #[error("store command error: {0}")]
    Command(#[from] ::redis::RedisError),

    /// A single store operation exceeded the per-operation deadline.
    #[error("store operation timed out after {0:?}")]
    OpTimeout(Duration),

    /// No message was published before the receive deadline expired.
    #[error("timed out after {0:?} waiting for a published message")]
    ReceiveTimeout(Duration),

    /// The subscription ended before a message arrived.
    #[error("subscription closed before a message arrived")]
    SubscriptionClosed,
}

/// Minimal key-value/pubsub surface the dispatcher depends on.
///
/// The registry and delivery components take this capability rather than
/// a concrete client so tests can substitute [`MemoryStore`].
#[async_trait]
pub trait Store: Send + Sync {
    /// Add members to a set. A no-op for an empty member list.
    async fn set_add(&self, key: &str, members: &[&str]) -> Result<(), StoreError>;

    /// All members of a set. A missing key reads as the empty set.
    async fn set_members(&self, key: &str) -> Result<Vec<String>, StoreError>;

    /// Whether `member` is in the set at `key`.
    async fn set_contains(&self, key: &str, member: &str) -> Result<bool, StoreError>;

    /// Server-side intersection of two sets.
    ///
    /// This must be a single atomic operation: callers rely on it to never
    /// observe a member that left one of the sets mid-query.
    async fn set_intersect(&self, first: &str, second: &str) -> Result<Vec<String>, StoreError>;

    /// Members of a sorted set with `min <= score <= max`, at most `count`.
    async fn sorted_set_range_by_score(
        &self,
        key: &str,
        min: f64,
        max: f64,
        count: usize,
    ) -> Result<Vec<String>, StoreError>;

    /// Append a value to the tail of a FIFO list.
    async fn list_push(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Publish a payload on a pubsub channel.
    ///
    /// A publish with no active subscriber is dropped, not queued.
    async fn publish(&self, channel: &str, payload: &str) -> Result<(), StoreError>;

    /// Open a subscription on a pubsub channel.
    ///
    /// The subscription is live as soon as this returns: any publish after
    /// that point is observable via [`Subscription::receive`], even if it
    /// lands before `receive` is first polled.
    async fn subscribe(&self, channel: &str) -> Result<Box<dyn Subscription>, StoreError>;
}

/// A live pubsub subscription delivering at most one message to the caller.
#[async_trait]
pub trait Subscription: Send {
    /// Wait for the next message, bounded by `deadline`.
    async fn receive(&mut self, deadline: Duration) -> Result<String, StoreError>;
}
