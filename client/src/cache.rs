//! Tag-invalidated response cache
//!
//! Read responses are cached by endpoint path with a TTL. Concurrent
//! identical fetches coalesce into one in-flight request. Every cached
//! key registers under one or more [`QueryTag`]s, and mutations
//! invalidate their tag set, forcing the next read to refetch.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use moka::future::Cache;
use serde_json::Value;

use crate::error::{ClientError, ClientResult};

/// Endpoint group a cached response belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryTag {
    Orders,
    Recipes,
    Journal,
    Qa,
    Shipments,
    Purchases,
    Categories,
    Clients,
    Suppliers,
    References,
    Profile,
}

/// TTL-bounded response cache with request coalescing and tag
/// invalidation. Last write wins; there is no conflict detection.
pub struct QueryCache {
    inner: Cache<String, Arc<Value>>,
    tags: RwLock<HashMap<QueryTag, HashSet<String>>>,
}

impl QueryCache {
    pub fn new(capacity: u64, ttl: Duration) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(capacity)
                .time_to_live(ttl)
                .build(),
            tags: RwLock::new(HashMap::new()),
        }
    }

    /// Return the cached response for `key`, or run `fetch` to produce
    /// it. Concurrent callers for the same key share a single fetch.
    /// Failures are handed to every waiter and are not cached.
    pub async fn get_with<F, Fut>(
        &self,
        key: &str,
        tags: &[QueryTag],
        fetch: F,
    ) -> ClientResult<Arc<Value>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ClientResult<Value>>,
    {
        let result = self
            .inner
            .try_get_with(key.to_string(), async move { fetch().await.map(Arc::new) })
            .await;

        match result {
            Ok(value) => {
                self.register(key, tags);
                Ok(value)
            }
            Err(shared) => {
                Err(Arc::try_unwrap(shared).unwrap_or_else(|still_shared| still_shared.duplicate()))
            }
        }
    }

    /// Drop every key registered under any of `tags`
    pub async fn invalidate(&self, tags: &[QueryTag]) {
        let keys: Vec<String> = {
            let mut index = self.tags.write().unwrap_or_else(|e| e.into_inner());
            tags.iter()
                .flat_map(|tag| index.remove(tag).unwrap_or_default())
                .collect()
        };
        for key in &keys {
            self.inner.invalidate(key).await;
        }
        if !keys.is_empty() {
            tracing::debug!(count = keys.len(), ?tags, "invalidated cached responses");
        }
    }

    /// Drop everything, tagged or not
    pub async fn clear(&self) {
        self.tags.write().unwrap_or_else(|e| e.into_inner()).clear();
        self.inner.invalidate_all();
        // run_pending_tasks makes the eviction visible immediately
        self.inner.run_pending_tasks().await;
    }

    fn register(&self, key: &str, tags: &[QueryTag]) {
        let mut index = self.tags.write().unwrap_or_else(|e| e.into_inner());
        for tag in tags {
            index.entry(*tag).or_default().insert(key.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn cache() -> QueryCache {
        QueryCache::new(100, Duration::from_secs(60))
    }

    #[tokio::test]
    async fn concurrent_gets_share_one_fetch() {
        let cache = cache();
        let fetches = AtomicUsize::new(0);

        let get = || {
            cache.get_with("/production-orders", &[QueryTag::Orders], || async {
                fetches.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(20)).await;
                Ok(json!([{"number": 41}]))
            })
        };

        let (a, b, c, d, e) = tokio::join!(get(), get(), get(), get(), get());
        for result in [a, b, c, d, e] {
            assert_eq!(*result.unwrap(), json!([{"number": 41}]));
        }
        assert_eq!(fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn invalidation_evicts_exactly_the_tagged_keys() {
        let cache = cache();
        let order_fetches = AtomicUsize::new(0);
        let category_fetches = AtomicUsize::new(0);

        let get_orders = || {
            cache.get_with("/production-orders", &[QueryTag::Orders], || async {
                order_fetches.fetch_add(1, Ordering::SeqCst);
                Ok(json!([]))
            })
        };
        let get_categories = || {
            cache.get_with("/categories/tree", &[QueryTag::Categories], || async {
                category_fetches.fetch_add(1, Ordering::SeqCst);
                Ok(json!([]))
            })
        };

        get_orders().await.unwrap();
        get_categories().await.unwrap();

        cache.invalidate(&[QueryTag::Orders]).await;

        get_orders().await.unwrap();
        get_categories().await.unwrap();

        assert_eq!(order_fetches.load(Ordering::SeqCst), 2);
        assert_eq!(category_fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn a_key_may_register_under_several_tags() {
        let cache = cache();
        let fetches = AtomicUsize::new(0);

        let get = || {
            cache.get_with(
                "/production-orders/abc/recipe",
                &[QueryTag::Orders, QueryTag::Recipes],
                || async {
                    fetches.fetch_add(1, Ordering::SeqCst);
                    Ok(json!(null))
                },
            )
        };

        get().await.unwrap();
        cache.invalidate(&[QueryTag::Recipes]).await;
        get().await.unwrap();

        assert_eq!(fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let cache = cache();
        let fetches = AtomicUsize::new(0);

        let failing = cache.get_with("/prod-qa/x", &[QueryTag::Qa], || async {
            fetches.fetch_add(1, Ordering::SeqCst);
            Err(ClientError::Decode("bad payload".to_string()))
        });
        assert!(failing.await.is_err());

        let ok = cache
            .get_with("/prod-qa/x", &[QueryTag::Qa], || async {
                fetches.fetch_add(1, Ordering::SeqCst);
                Ok(json!({"ok": true}))
            })
            .await
            .unwrap();

        assert_eq!(*ok, json!({"ok": true}));
        assert_eq!(fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn clear_drops_everything() {
        let cache = cache();
        let fetches = AtomicUsize::new(0);

        let get = || {
            cache.get_with("/clients", &[QueryTag::Clients], || async {
                fetches.fetch_add(1, Ordering::SeqCst);
                Ok(json!([]))
            })
        };

        get().await.unwrap();
        cache.clear().await;
        get().await.unwrap();

        assert_eq!(fetches.load(Ordering::SeqCst), 2);
    }
}
