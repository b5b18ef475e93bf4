//! Refresh coordination for the cached taxonomy.
//!
//! Two triggers, no intrinsic states: a forced refresh (user-initiated,
//! always repopulates and stamps the timestamp) and a periodic check meant
//! to be driven by an external scheduler. The periodic check is safe to
//! invoke arbitrarily often; it never refreshes more than once per interval.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::cache::TaxonomyCache;
use crate::models::CategoryMap;

/// Result of a forced refresh. Always definite: the underlying fetch may
/// have fallen back, but the caller gets a count and a usable snapshot.
#[derive(Debug, Clone)]
pub struct RefreshOutcome {
    pub count: usize,
    pub categories: CategoryMap,
}

/// Decides when the category snapshot is refetched.
pub struct RefreshCoordinator {
    cache: Arc<TaxonomyCache>,
    interval: Duration,
    last_refresh: Mutex<Option<DateTime<Utc>>>,
}

impl RefreshCoordinator {
    pub fn new(cache: Arc<TaxonomyCache>, interval: Duration) -> Self {
        Self {
            cache,
            interval,
            last_refresh: Mutex::new(None),
        }
    }

    /// Seed the last-refresh timestamp, e.g. from state the embedder kept.
    pub fn with_last_refresh(mut self, at: DateTime<Utc>) -> Self {
        self.last_refresh = Mutex::new(Some(at));
        self
    }

    /// Timestamp of the last refresh this coordinator performed or was
    /// seeded with.
    pub async fn last_refresh(&self) -> Option<DateTime<Utc>> {
        *self.last_refresh.lock().await
    }

    /// Unconditionally invalidate and refetch the category snapshot.
    ///
    /// The timestamp is updated whether or not the underlying fetch
    /// succeeded; the outcome reflects whatever snapshot is now served,
    /// fallback included.
    pub async fn force_refresh(&self) -> RefreshOutcome {
        let mut last_refresh = self.last_refresh.lock().await;

        self.cache.invalidate_categories().await;
        let categories = self.cache.get_categories().await;
        *last_refresh = Some(Utc::now());

        info!("Forced refresh obtained {} categories", categories.len());
        RefreshOutcome {
            count: categories.len(),
            categories,
        }
    }

    /// Periodic check: refresh only when the interval has elapsed.
    ///
    /// Returns whether a refresh was performed. The state lock is held
    /// across check-and-refresh, so concurrent invocations cannot trigger
    /// duplicate refetches.
    pub async fn check(&self) -> bool {
        let mut last_refresh = self.last_refresh.lock().await;

        let due = match *last_refresh {
            None => true,
            Some(last) => {
                let elapsed = Utc::now().signed_duration_since(last);
                elapsed.num_seconds() > self.interval.as_secs() as i64
            }
        };

        if !due {
            debug!("Taxonomy refresh not due yet");
            return false;
        }

        self.cache.invalidate_categories().await;
        let categories = self.cache.get_categories().await;
        *last_refresh = Some(Utc::now());

        info!(
            "Periodic refresh obtained {} categories",
            categories.len()
        );
        true
    }
}
