//! Redis-backed coordination store
//!
//! Commands run on pooled connections; each subscription gets its own
//! pubsub connection, torn down when the subscription is dropped.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use deadpool_redis::{Config as PoolConfig, Connection, Pool, Runtime};
use futures_util::StreamExt;
use redis::AsyncCommands;

use super::{Store, StoreError, Subscription};

/// Redis client implementing the [`Store`] capability.
pub struct RedisStore {
    /// Connection pool for single-shot commands.
    pool: Pool,

    /// Client handle used to open dedicated pubsub connections.
    client: redis::Client,

    /// Per-operation deadline applied to every command.
    op_timeout: Duration,
}

impl RedisStore {
    /// Connect to Redis and verify the connection with a PING.
    pub async fn connect(
        url: &str,
        pool_size: usize,
        op_timeout: Duration,
    ) -> Result<Self, StoreError> {
        let pool = PoolConfig::from_url(url)
            .builder()
            .map_err(|e| StoreError::Connection(e.to_string()))?
            .max_size(pool_size)
            .runtime(Runtime::Tokio1)
            .build()
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        let mut conn = pool
            .get()
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        let _: String = redis::cmd("PING").query_async(&mut *conn).await?;

        let client = redis::Client::open(url)?;

        tracing::info!(url = %url, "connected to coordination store");

        Ok(Self {
            pool,
            client,
            op_timeout,
        })
    }

    async fn conn(&self) -> Result<Connection, StoreError> {
        self.pool
            .get()
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))
    }

    /// Run `op` bounded by the per-operation deadline.
    async fn bounded<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, StoreError>> + Send,
    {
        tokio::time::timeout(self.op_timeout, op)
            .await
            .map_err(|_| StoreError::OpTimeout(self.op_timeout))?
    }
}

#[async_trait]
impl Store for RedisStore {
    async fn set_add(&self, key: &str, members: &[&str]) -> Result<(), StoreError> {
        if members.is_empty() {
            return Ok(());
        }
        self.bounded(async {
            let mut conn = self.conn().await?;
            let _: i64 = conn.sadd(key, members.to_vec()).await?;
            Ok(())
        })
        .await
    }

    async fn set_members(&self, key: &str) -> Result<Vec<String>, StoreError> {
        self.bounded(async {
            let mut conn = self.conn().await?;
            let members: Vec<String> = conn.smembers(key).await?;
            Ok(members)
        })
        .await
    }

    async fn set_contains(&self, key: &str, member: &str) -> Result<bool, StoreError> {
        self.bounded(async {
            let mut conn = self.conn().await?;
            let found: bool = conn.sismember(key, member).await?;
            Ok(found)
        })
        .await
    }

    async fn set_intersect(&self, first: &str, second: &str) -> Result<Vec<String>, StoreError> {
        self.bounded(async {
            let mut conn = self.conn().await?;
            let members: Vec<String> = conn.sinter((first, second)).await?;
            Ok(members)
        })
        .await
    }

    async fn sorted_set_range_by_score(
        &self,
        key: &str,
        min: f64,
        max: f64,
        count: usize,
    ) -> Result<Vec<String>, StoreError> {
        self.bounded(async {
            let mut conn = self.conn().await?;
            let members: Vec<String> = conn
                .zrangebyscore_limit(key, min, max, 0, count as isize)
                .await?;
            Ok(members)
        })
        .await
    }

    async fn list_push(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.bounded(async {
            let mut conn = self.conn().await?;
            let _: i64 = conn.rpush(key, value).await?;
            Ok(())
        })
        .await
    }

    async fn publish(&self, channel: &str, payload: &str) -> Result<(), StoreError> {
        self.bounded(async {
            let mut conn = self.conn().await?;
            let _: i64 = conn.publish(channel, payload).await?;
            Ok(())
        })
        .await
    }

    async fn subscribe(&self, channel: &str) -> Result<Box<dyn Subscription>, StoreError> {
        let pubsub = self
            .bounded(async {
                let mut pubsub = self.client.get_async_pubsub().await?;
                pubsub.subscribe(channel).await?;
                Ok(pubsub)
            })
            .await?;
        Ok(Box::new(RedisSubscription { pubsub }))
    }
}

/// Subscription holding a dedicated pubsub connection.
///
/// Dropping the subscription closes the connection, which unsubscribes.
struct RedisSubscription {
    pubsub: redis::aio::PubSub,
}

#[async_trait]
impl Subscription for RedisSubscription {
    async fn receive(&mut self, deadline: Duration) -> Result<String, StoreError> {
        let message = tokio::time::timeout(deadline, self.pubsub.on_message().next())
            .await
            .map_err(|_| StoreError::ReceiveTimeout(deadline))?
            .ok_or(StoreError::SubscriptionClosed)?;
        let payload: String = message.get_payload()?;
        Ok(payload)
    }
}
