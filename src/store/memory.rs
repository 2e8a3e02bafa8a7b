//! In-process coordination store fake
//!
//! Implements the same set/list/pubsub semantics as the Redis client
//! against plain in-memory structures. Used by the test suites and handy
//! for running the dispatcher without a Redis instance.
//!
//! Pubsub matches the real store's behavior where it matters: a publish
//! with no live subscriber is dropped, and a message published after
//! `subscribe` returns is buffered until the subscriber polls.

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{broadcast, Mutex};

use super::{Store, StoreError, Subscription};

const CHANNEL_BUFFER: usize = 16;

#[derive(Default)]
struct Inner {
    sets: HashMap<String, BTreeSet<String>>,
    lists: HashMap<String, VecDeque<String>>,
    scores: HashMap<String, BTreeMap<String, f64>>,
    channels: HashMap<String, broadcast::Sender<String>>,
}

/// In-memory [`Store`] implementation.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pop the head of a list, the way a worker consumes its job queue.
    pub async fn list_pop(&self, key: &str) -> Option<String> {
        let mut inner = self.inner.lock().await;
        inner.lists.get_mut(key).and_then(|list| list.pop_front())
    }

    /// Length of a list. A missing key reads as empty.
    pub async fn list_len(&self, key: &str) -> usize {
        let inner = self.inner.lock().await;
        inner.lists.get(key).map(|list| list.len()).unwrap_or(0)
    }

    /// Keys of all lists that have ever been pushed to.
    pub async fn list_keys(&self) -> Vec<String> {
        let inner = self.inner.lock().await;
        inner.lists.keys().cloned().collect()
    }

    /// Set a member's score in a sorted set, the way workers maintain
    /// their label counts.
    pub async fn set_score(&self, key: &str, member: &str, score: f64) {
        let mut inner = self.inner.lock().await;
        inner
            .scores
            .entry(key.to_string())
            .or_default()
            .insert(member.to_string(), score);
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn set_add(&self, key: &str, members: &[&str]) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        let set = inner.sets.entry(key.to_string()).or_default();
        for member in members {
            set.insert((*member).to_string());
        }
        Ok(())
    }

    async fn set_members(&self, key: &str) -> Result<Vec<String>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .sets
            .get(key)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default())
    }

    async fn set_contains(&self, key: &str, member: &str) -> Result<bool, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .sets
            .get(key)
            .map(|set| set.contains(member))
            .unwrap_or(false))
    }

    async fn set_intersect(&self, first: &str, second: &str) -> Result<Vec<String>, StoreError> {
        let inner = self.inner.lock().await;
        match (inner.sets.get(first), inner.sets.get(second)) {
            (Some(a), Some(b)) => Ok(a.intersection(b).cloned().collect()),
            _ => Ok(Vec::new()),
        }
    }

    async fn sorted_set_range_by_score(
        &self,
        key: &str,
        min: f64,
        max: f64,
        count: usize,
    ) -> Result<Vec<String>, StoreError> {
        let inner = self.inner.lock().await;
        let Some(scores) = inner.scores.get(key) else {
            return Ok(Vec::new());
        };
        let mut in_range: Vec<(&String, f64)> = scores
            .iter()
            .filter(|(_, score)| min <= **score && **score <= max)
            .map(|(member, score)| (member, *score))
            .collect();
        // Score order, members tie-broken lexicographically, as Redis does.
        in_range.sort_by(|a, b| {
            a.1.partial_cmp(&b.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(b.0))
        });
        Ok(in_range
            .into_iter()
            .take(count)
            .map(|(member, _)| member.clone())
            .collect())
    }

    async fn list_push(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        inner
            .lists
            .entry(key.to_string())
            .or_default()
            .push_back(value.to_string());
        Ok(())
    }

    async fn publish(&self, channel: &str, payload: &str) -> Result<(), StoreError> {
        let inner = self.inner.lock().await;
        if let Some(sender) = inner.channels.get(channel) {
            // A send with no live receiver errors; that is exactly the
            // drop-without-subscriber semantics of the real store.
            let _ = sender.send(payload.to_string());
        }
        Ok(())
    }

    async fn subscribe(&self, channel: &str) -> Result<Box<dyn Subscription>, StoreError> {
        let mut inner = self.inner.lock().await;
        let sender = inner
            .channels
            .entry(channel.to_string())
            .or_insert_with(|| broadcast::channel(CHANNEL_BUFFER).0);
        Ok(Box::new(MemorySubscription {
            receiver: sender.subscribe(),
        }))
    }
}

struct MemorySubscription {
    receiver: broadcast::Receiver<String>,
}

#[async_trait]
impl Subscription for MemorySubscription {
    async fn receive(&mut self, deadline: Duration) -> Result<String, StoreError> {
        match tokio::time::timeout(deadline, self.receiver.recv()).await {
            Ok(Ok(payload)) => Ok(payload),
            Ok(Err(_)) => Err(StoreError::SubscriptionClosed),
            Err(_) => Err(StoreError::ReceiveTimeout(deadline)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_operations() {
        let store = MemoryStore::new();
        store.set_add("s", &["a", "b"]).await.unwrap();
        store.set_add("s", &["b", "c"]).await.unwrap();

        let mut members = store.set_members("s").await.unwrap();
        members.sort();
        assert_eq!(members, vec!["a", "b", "c"]);

        assert!(store.set_contains("s", "a").await.unwrap());
        assert!(!store.set_contains("s", "z").await.unwrap());
        assert!(store.set_members("missing").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_set_intersect() {
        let store = MemoryStore::new();
        store.set_add("x", &["a", "b", "c"]).await.unwrap();
        store.set_add("y", &["b", "c", "d"]).await.unwrap();

        let mut common = store.set_intersect("x", "y").await.unwrap();
        common.sort();
        assert_eq!(common, vec!["b", "c"]);

        assert!(store.set_intersect("x", "missing").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_sorted_set_range_by_score() {
        let store = MemoryStore::new();
        store.set_score("z", "two", 2.0).await;
        store.set_score("z", "zero", 0.0).await;
        store.set_score("z", "one-b", 1.0).await;
        store.set_score("z", "one-a", 1.0).await;

        let members = store.sorted_set_range_by_score("z", 0.0, 1.0, 20).await.unwrap();
        assert_eq!(members, vec!["zero", "one-a", "one-b"]);

        let capped = store.sorted_set_range_by_score("z", 0.0, 2.0, 2).await.unwrap();
        assert_eq!(capped.len(), 2);
    }

    #[tokio::test]
    async fn test_list_is_fifo() {
        let store = MemoryStore::new();
        store.list_push("q", "first").await.unwrap();
        store.list_push("q", "second").await.unwrap();

        assert_eq!(store.list_len("q").await, 2);
        assert_eq!(store.list_pop("q").await.as_deref(), Some("first"));
        assert_eq!(store.list_pop("q").await.as_deref(), Some("second"));
        assert_eq!(store.list_pop("q").await, None);
    }

    #[tokio::test]
    async fn test_publish_without_subscriber_is_dropped() {
        let store = MemoryStore::new();
        store.publish("ch", "lost").await.unwrap();

        let mut sub = store.subscribe("ch").await.unwrap();
        let err = sub.receive(Duration::from_millis(20)).await.unwrap_err();
        assert!(matches!(err, StoreError::ReceiveTimeout(_)));
    }

    #[tokio::test]
    async fn test_publish_after_subscribe_is_buffered() {
        let store = MemoryStore::new();
        let mut sub = store.subscribe("ch").await.unwrap();

        // Published before receive is polled, still delivered.
        store.publish("ch", "payload").await.unwrap();
        let message = sub.receive(Duration::from_millis(100)).await.unwrap();
        assert_eq!(message, "payload");
    }
}
