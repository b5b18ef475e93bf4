//! Expiring key-value storage.
//!
//! The taxonomy cache is a policy layer over this interface, not over any
//! concrete store. Deployments can plug in a persistent backend; the
//! in-memory backend here covers single-process use and tests.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

/// Prune expired entries once the store grows past this many keys.
const PRUNE_THRESHOLD: usize = 100;

/// Generic expiring key-value interface.
///
/// Implementations must be thread-safe. A read past an entry's expiry must
/// behave identically to a read of an absent key.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Get a value, or `None` if the key is absent or expired.
    async fn get(&self, key: &str) -> Option<String>;

    /// Store a value with a time-to-live, replacing any previous value.
    async fn set(&self, key: &str, value: String, ttl: Duration);

    /// Remove a key.
    async fn delete(&self, key: &str);

    /// Remove every key starting with the given prefix.
    async fn delete_prefix(&self, prefix: &str);
}

struct StoredEntry {
    value: String,
    expires_at: Instant,
}

impl StoredEntry {
    fn new(value: String, ttl: Duration) -> Self {
        Self {
            value,
            expires_at: Instant::now() + ttl,
        }
    }

    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// In-memory store for single-process operation.
///
/// State is not persisted across restarts.
#[derive(Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<HashMap<String, StoredEntry>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| !entry.is_expired())
            .map(|entry| entry.value.clone())
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) {
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), StoredEntry::new(value, ttl));
        if entries.len() > PRUNE_THRESHOLD {
            entries.retain(|_, entry| !entry.is_expired());
        }
    }

    async fn delete(&self, key: &str) {
        let mut entries = self.entries.write().await;
        entries.remove(key);
    }

    async fn delete_prefix(&self, prefix: &str) {
        let mut entries = self.entries.write().await;
        entries.retain(|key, _| !key.starts_with(prefix));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_returns_stored_value_before_expiry() {
        let store = MemoryStore::new();
        store
            .set("categories", "{}".to_string(), Duration::from_secs(60))
            .await;
        assert_eq!(store.get("categories").await.as_deref(), Some("{}"));
    }

    #[tokio::test]
    async fn test_get_after_expiry_behaves_as_miss() {
        let store = MemoryStore::new();
        store
            .set("categories", "{}".to_string(), Duration::from_millis(10))
            .await;
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(store.get("categories").await, None);
    }

    #[tokio::test]
    async fn test_zero_ttl_expires_immediately() {
        let store = MemoryStore::new();
        store.set("k", "v".to_string(), Duration::ZERO).await;
        assert_eq!(store.get("k").await, None);
    }

    #[tokio::test]
    async fn test_set_replaces_whole_value() {
        let store = MemoryStore::new();
        store
            .set("k", "old".to_string(), Duration::from_secs(60))
            .await;
        store
            .set("k", "new".to_string(), Duration::from_secs(60))
            .await;
        assert_eq!(store.get("k").await.as_deref(), Some("new"));
    }

    #[tokio::test]
    async fn test_delete() {
        let store = MemoryStore::new();
        store
            .set("k", "v".to_string(), Duration::from_secs(60))
            .await;
        store.delete("k").await;
        assert_eq!(store.get("k").await, None);
    }

    #[tokio::test]
    async fn test_delete_prefix_spares_other_keys() {
        let store = MemoryStore::new();
        store
            .set("subcategories:91", "a".to_string(), Duration::from_secs(60))
            .await;
        store
            .set("subcategories:201", "b".to_string(), Duration::from_secs(60))
            .await;
        store
            .set("categories", "c".to_string(), Duration::from_secs(60))
            .await;

        store.delete_prefix("subcategories:").await;

        assert_eq!(store.get("subcategories:91").await, None);
        assert_eq!(store.get("subcategories:201").await, None);
        assert_eq!(store.get("categories").await.as_deref(), Some("c"));
    }
}
