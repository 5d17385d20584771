#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use axum_test::TestServer;
use link_shortener::infrastructure::cache::{CacheError, CacheResult, CacheService};
use link_shortener::routes::service_routes;
use link_shortener::state::{AppState, ServiceSettings};
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

pub const BASE_URL: &str = "https://s.test";

/// In-process stand-in for Redis with TTL expiry.
///
/// `set_failing(true)` makes every call fail, to exercise the degraded paths.
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, (String, Instant)>>,
    failing: AtomicBool,
}

impl MemoryCache {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        let entries = self.entries.lock().unwrap();
        entries
            .get(key)
            .filter(|(_, expires)| *expires > Instant::now())
            .map(|(value, _)| value.clone())
    }

    pub fn insert_raw(&self, key: &str, value: &str) {
        self.entries.lock().unwrap().insert(
            key.to_string(),
            (value.to_string(), Instant::now() + Duration::from_secs(3600)),
        );
    }

    pub fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
        let entries = self.entries.lock().unwrap();
        entries
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect()
    }

    fn check(&self) -> CacheResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            Err(CacheError::ConnectionError("cache offline".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl CacheService for MemoryCache {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        self.check()?;
        Ok(self.raw(key))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        self.check()?;
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), (value.to_string(), Instant::now() + ttl));
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        self.check()?;
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }

    async fn incr(&self, key: &str) -> CacheResult<i64> {
        self.check()?;
        let mut entries = self.entries.lock().unwrap();
        let far_future = Instant::now() + Duration::from_secs(365 * 24 * 3600);
        let entry = entries
            .entry(key.to_string())
            .or_insert_with(|| ("0".to_string(), far_future));
        let next = entry.0.parse::<i64>().unwrap_or(0) + 1;
        entry.0 = next.to_string();
        Ok(next)
    }

    async fn health_check(&self) -> bool {
        self.check().is_ok()
    }
}

pub fn test_settings() -> ServiceSettings {
    ServiceSettings {
        base_url: BASE_URL.to_string(),
        ..Default::default()
    }
}

pub fn create_test_state(pool: PgPool) -> (AppState, Arc<MemoryCache>) {
    let cache = MemoryCache::new();
    let state = AppState::new(Arc::new(pool), cache.clone(), test_settings());
    (state, cache)
}

pub fn create_test_app(state: AppState) -> Router {
    service_routes().with_state(state)
}

pub fn create_test_server(pool: PgPool) -> (TestServer, Arc<MemoryCache>) {
    let (state, cache) = create_test_state(pool);
    let server = TestServer::new(create_test_app(state)).unwrap();
    (server, cache)
}

/// Inserts a link directly, bypassing the services and the cache.
pub async fn create_test_link(pool: &PgPool, code: &str, url: &str, clicks: i64) {
    sqlx::query(
        "INSERT INTO links (short_code, long_url, total_clicks, last_clicked_at) \
         VALUES ($1, $2, $3, CASE WHEN $3 > 0 THEN NOW() END)",
    )
    .bind(code)
    .bind(url)
    .bind(clicks)
    .execute(pool)
    .await
    .unwrap();
}

pub async fn get_clicks(pool: &PgPool, code: &str) -> i64 {
    sqlx::query_scalar("SELECT total_clicks FROM links WHERE short_code = $1")
        .bind(code)
        .fetch_one(pool)
        .await
        .unwrap()
}
