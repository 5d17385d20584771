//! Redis-backed cache implementation.

use super::service::{CacheError, CacheResult, CacheService};
use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use std::time::Duration;
use tracing::{debug, info};

/// Redis cache client.
///
/// Uses `ConnectionManager` for connection reuse and automatic reconnects.
/// Errors are returned to the caller rather than swallowed here.
pub struct RedisCache {
    client: ConnectionManager,
}

impl RedisCache {
    /// Connects to Redis and validates the connection with a PING.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::ConnectionError`] if the URL is invalid, the connection cannot
    /// be established, or the PING health check fails.
    pub async fn connect(redis_url: &str) -> CacheResult<Self> {
        info!("Connecting to Redis");

        let client = Client::open(redis_url).map_err(|e| {
            CacheError::ConnectionError(format!("Failed to create Redis client: {}", e))
        })?;

        let manager = ConnectionManager::new(client).await.map_err(|e| {
            CacheError::ConnectionError(format!("Failed to connect to Redis: {}", e))
        })?;

        let mut test_conn = manager.clone();
        test_conn
            .ping::<()>()
            .await
            .map_err(|e| CacheError::ConnectionError(format!("Redis PING failed: {}", e)))?;

        info!("Connected to Redis");

        Ok(Self { client: manager })
    }
}

fn op_error(op: &str, key: &str, e: redis::RedisError) -> CacheError {
    CacheError::OperationError(format!("Redis {} failed for {}: {}", op, key, e))
}

#[async_trait]
impl CacheService for RedisCache {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let mut conn = self.client.clone();
        let value = conn
            .get::<_, Option<String>>(key)
            .await
            .map_err(|e| op_error("GET", key, e))?;

        debug!(key, hit = value.is_some(), "Redis GET");
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        let mut conn = self.client.clone();
        // SETEX rejects a zero expiry.
        let ttl_seconds = ttl.as_secs().max(1);

        conn.set_ex::<_, _, ()>(key, value, ttl_seconds)
            .await
            .map_err(|e| op_error("SETEX", key, e))?;

        debug!(key, ttl_seconds, "Redis SETEX");
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        let mut conn = self.client.clone();
        let deleted = conn
            .del::<_, i64>(key)
            .await
            .map_err(|e| op_error("DEL", key, e))?;

        debug!(key, deleted, "Redis DEL");
        Ok(())
    }

    async fn incr(&self, key: &str) -> CacheResult<i64> {
        let mut conn = self.client.clone();
        let value = conn
            .incr::<_, _, i64>(key, 1)
            .await
            .map_err(|e| op_error("INCR", key, e))?;

        debug!(key, value, "Redis INCR");
        Ok(value)
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.client.clone();
        conn.ping::<()>().await.is_ok()
    }
}
