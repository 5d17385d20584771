//! Cache keys and consistency helpers for link records and listings.
//!
//! # Key layout
//!
//! - `link:{code}` - one record as JSON, TTL [`CacheSettings::link_ttl`]
//! - `links:list:version` - namespace counter for listings, no TTL
//! - `links:list:v{N}:{query}` - one listing page as JSON, TTL [`CacheSettings::list_ttl`]
//!
//! Listings are keyed by the full serialized query, so they cannot be
//! invalidated individually. Instead every write bumps the namespace
//! counter: pages cached under an older version are never read again and
//! expire on their own.
//!
//! # Failure policy
//!
//! The cache is advisory. Every helper here bounds the call with
//! [`CacheSettings::op_timeout`], logs failures, and degrades: reads become
//! misses and writes become no-ops. Within a TTL window a read may observe a
//! slightly stale record; the store remains the only authority.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::domain::entities::{Link, LinkPage, LinkQuery};
use crate::infrastructure::cache::{CacheError, CacheResult, CacheService};

/// Key of the listing namespace counter.
pub const LIST_VERSION_KEY: &str = "links:list:version";

/// TTLs and deadline for cache calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheSettings {
    pub link_ttl: Duration,
    pub list_ttl: Duration,
    pub op_timeout: Duration,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            link_ttl: Duration::from_secs(3600),
            list_ttl: Duration::from_secs(30),
            op_timeout: Duration::from_millis(500),
        }
    }
}

/// Cache key for a single record.
pub fn link_key(code: &str) -> String {
    format!("link:{code}")
}

/// Cache key for a listing page under namespace `version`.
pub fn list_key(version: i64, query: &LinkQuery) -> String {
    // Serializing plain data cannot fail.
    let params = serde_json::to_string(query).unwrap_or_default();
    format!("links:list:v{version}:{params}")
}

/// A listing cache key pinned to the namespace version current at lookup.
///
/// A page computed after the lookup is stored under the same key, so a write
/// that lands in between makes it unreachable instead of serving it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListSlot {
    key: String,
}

impl ListSlot {
    pub fn key(&self) -> &str {
        &self.key
    }
}

/// Typed, fail-soft access to the cache for link data.
pub struct LinkCache {
    cache: Arc<dyn CacheService>,
    settings: CacheSettings,
}

impl LinkCache {
    pub fn new(cache: Arc<dyn CacheService>, settings: CacheSettings) -> Self {
        Self { cache, settings }
    }

    pub fn settings(&self) -> CacheSettings {
        self.settings
    }

    /// Runs a cache call under the deadline, logging and discarding failures.
    async fn attempt<T, F>(&self, op: &'static str, key: &str, fut: F) -> Option<T>
    where
        F: Future<Output = CacheResult<T>>,
    {
        let outcome = match tokio::time::timeout(self.settings.op_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(CacheError::OperationError(format!(
                "timed out after {}ms",
                self.settings.op_timeout.as_millis()
            ))),
        };

        match outcome {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(op, key, error = %e, "Cache call failed, continuing without cache");
                None
            }
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, key: &str, kind: &'static str) -> Option<T> {
        let raw = self.attempt("get", key, self.cache.get(key)).await.flatten();

        let Some(raw) = raw else {
            debug!(key, "Cache MISS");
            metrics::counter!("cache_misses_total", "kind" => kind).increment(1);
            return None;
        };

        match serde_json::from_str(&raw) {
            Ok(value) => {
                debug!(key, "Cache HIT");
                metrics::counter!("cache_hits_total", "kind" => kind).increment(1);
                Some(value)
            }
            Err(e) => {
                warn!(key, error = %e, "Discarding undecodable cache entry");
                self.attempt("delete", key, self.cache.delete(key)).await;
                metrics::counter!("cache_misses_total", "kind" => kind).increment(1);
                None
            }
        }
    }

    async fn set_json<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) {
        match serde_json::to_string(value) {
            Ok(json) => {
                self.attempt("set", key, self.cache.set(key, &json, ttl)).await;
            }
            Err(e) => warn!(key, error = %e, "Failed to serialize cache entry"),
        }
    }

    /// Cached record for `code`, if any.
    pub async fn get_link(&self, code: &str) -> Option<Link> {
        self.get_json(&link_key(code), "link").await
    }

    /// Stores `link` under its code.
    pub async fn put_link(&self, link: &Link) {
        self.set_json(&link_key(&link.short_code), link, self.settings.link_ttl)
            .await;
    }

    /// Removes the cached record for `code`.
    pub async fn evict_link(&self, code: &str) {
        let key = link_key(code);
        self.attempt("delete", &key, self.cache.delete(&key)).await;
    }

    /// Resolves the cache slot for `query` under the current namespace version.
    ///
    /// Returns `None` when the version cannot be read; callers then skip the
    /// listing cache for this request.
    pub async fn list_slot(&self, query: &LinkQuery) -> Option<ListSlot> {
        let raw = self
            .attempt("get", LIST_VERSION_KEY, self.cache.get(LIST_VERSION_KEY))
            .await?;

        let version = match raw {
            None => 0,
            Some(v) => match v.parse::<i64>() {
                Ok(v) => v,
                Err(_) => {
                    warn!(value = %v, "Listing namespace version is not an integer");
                    return None;
                }
            },
        };

        Some(ListSlot {
            key: list_key(version, query),
        })
    }

    /// Cached listing page for `slot`, if any.
    pub async fn get_list(&self, slot: &ListSlot) -> Option<LinkPage> {
        self.get_json(&slot.key, "list").await
    }

    /// Stores a listing page in `slot`.
    pub async fn put_list(&self, slot: &ListSlot, page: &LinkPage) {
        self.set_json(&slot.key, page, self.settings.list_ttl).await;
    }

    /// Makes every cached listing unreachable.
    pub async fn invalidate_lists(&self) {
        if let Some(version) = self
            .attempt("incr", LIST_VERSION_KEY, self.cache.incr(LIST_VERSION_KEY))
            .await
        {
            debug!(version, "Listing cache namespace advanced");
        }
    }

    /// Checks if the cache backend answers within the deadline.
    pub async fn is_healthy(&self) -> bool {
        tokio::time::timeout(self.settings.op_timeout, self.cache.health_check())
            .await
            .unwrap_or(false)
    }
}
