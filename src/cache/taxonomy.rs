//! Cache policy for the scraped category taxonomy.
//!
//! Lookups go to the store first; on a miss the live site is scraped and the
//! result stored with the configured time-to-live. Category lookups never
//! come back empty: if the site cannot be reached or parsed, the fixed
//! fallback taxonomy is served instead. Subcategory lookups degrade to an
//! empty mapping, which is an accepted, documented degradation.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::models::{fallback_categories, CategoryMap};
use crate::scrapers::CategorySource;

use super::store::KeyValueStore;

/// Store key for the top-level category snapshot.
pub const CATEGORIES_KEY: &str = "categories";

/// Key prefix for per-parent subcategory snapshots.
pub const SUBCATEGORIES_PREFIX: &str = "subcategories:";

/// Store key for one parent's subcategory snapshot.
pub fn subcategories_key(category_id: &str) -> String {
    format!("{}{}", SUBCATEGORIES_PREFIX, category_id)
}

/// Time-to-live for a cache duration given in days.
pub fn ttl_for_days(days: u64) -> Duration {
    Duration::from_secs(days * 86_400)
}

/// Time-expiring cache over the marketplace taxonomy.
pub struct TaxonomyCache {
    store: Arc<dyn KeyValueStore>,
    source: Arc<dyn CategorySource>,
    ttl: Duration,
    // Per-key single-flight guards: concurrent misses on the same key
    // collapse into one outbound fetch.
    flights: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl TaxonomyCache {
    pub fn new(store: Arc<dyn KeyValueStore>, source: Arc<dyn CategorySource>, ttl: Duration) -> Self {
        Self {
            store,
            source,
            ttl,
            flights: Mutex::new(HashMap::new()),
        }
    }

    /// All known top-level categories.
    ///
    /// Served from cache when unexpired; otherwise scraped and stored. On
    /// fetch or extraction failure the fallback taxonomy is returned (and
    /// cached, so a struggling site is not hammered on every request).
    pub async fn get_categories(&self) -> CategoryMap {
        if let Some(cached) = self.read(CATEGORIES_KEY).await {
            return cached;
        }

        let flight = self.flight(CATEGORIES_KEY).await;
        let _guard = flight.lock().await;

        // Another caller may have repopulated while we waited on the flight.
        if let Some(cached) = self.read(CATEGORIES_KEY).await {
            return cached;
        }

        let categories = match self.source.fetch_categories().await {
            Ok(map) if !map.is_empty() => map,
            Ok(_) => {
                warn!("No categories discovered on taxonomy root; using fallback list");
                fallback_categories()
            }
            Err(e) => {
                warn!("Failed to fetch categories: {}; using fallback list", e);
                fallback_categories()
            }
        };

        self.write(CATEGORIES_KEY, &categories).await;
        categories
    }

    /// Subcategories of one parent category, fetched lazily on first request.
    ///
    /// Returns an empty mapping when the parent is unknown or the fetch
    /// fails; there is no fallback subcategory list.
    pub async fn get_subcategories(&self, category_id: &str) -> CategoryMap {
        let key = subcategories_key(category_id);
        if let Some(cached) = self.read(&key).await {
            return cached;
        }

        // The parent's label is needed to build the page URL.
        let categories = self.get_categories().await;
        let label = match categories.get(category_id) {
            Some(label) => label.clone(),
            None => {
                warn!("Category id {} not found in categories list", category_id);
                return CategoryMap::new();
            }
        };

        let flight = self.flight(&key).await;
        let _guard = flight.lock().await;

        if let Some(cached) = self.read(&key).await {
            return cached;
        }

        let subcategories = match self.source.fetch_subcategories(category_id, &label).await {
            Ok(map) => map,
            Err(e) => {
                warn!(
                    "Failed to fetch subcategories for {}: {}; returning empty",
                    category_id, e
                );
                CategoryMap::new()
            }
        };

        self.write(&key, &subcategories).await;
        subcategories
    }

    /// Evict the top-level category snapshot.
    pub async fn invalidate_categories(&self) {
        self.store.delete(CATEGORIES_KEY).await;
    }

    /// Evict one parent's subcategory snapshot.
    pub async fn invalidate_subcategories(&self, category_id: &str) {
        self.store.delete(&subcategories_key(category_id)).await;
    }

    /// Evict everything this cache owns.
    pub async fn invalidate_all(&self) {
        self.store.delete(CATEGORIES_KEY).await;
        self.store.delete_prefix(SUBCATEGORIES_PREFIX).await;
    }

    async fn read(&self, key: &str) -> Option<CategoryMap> {
        let raw = self.store.get(key).await?;
        match serde_json::from_str(&raw) {
            Ok(map) => {
                debug!("Cache hit for {}", key);
                Some(map)
            }
            Err(e) => {
                warn!("Discarding unreadable cache entry {}: {}", key, e);
                None
            }
        }
    }

    async fn write(&self, key: &str, map: &CategoryMap) {
        match serde_json::to_string(map) {
            Ok(raw) => self.store.set(key, raw, self.ttl).await,
            Err(e) => warn!("Failed to serialize cache entry {}: {}", key, e),
        }
    }

    async fn flight(&self, key: &str) -> Arc<Mutex<()>> {
        let mut flights = self.flights.lock().await;
        flights
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}
