//! Redis-backed cache store.

use std::time::Duration;

use async_trait::async_trait;
use deadpool_redis::{Config, Connection, Pool, PoolConfig, Runtime};
use redis::AsyncCommands;
use tracing::{debug, info};

use super::config::CacheConfig;
use super::store::{CacheError, CacheStore};

const SCAN_BATCH: usize = 500;

#[derive(Clone)]
pub struct RedisCacheStore {
    pool: Pool,
}

impl RedisCacheStore {
    /// Build the pool and verify the server answers before returning.
    pub async fn connect(config: &CacheConfig) -> Result<Self, CacheError> {
        let mut redis_config = Config::from_url(&config.url);
        let mut pool_config = PoolConfig::new(config.pool_size.max(1));
        pool_config.timeouts.wait = Some(config.connect_timeout);
        pool_config.timeouts.create = Some(config.connect_timeout);
        pool_config.timeouts.recycle = Some(config.connect_timeout);
        redis_config.pool = Some(pool_config);

        let pool = redis_config
            .create_pool(Some(Runtime::Tokio1))
            .map_err(CacheError::connection)?;

        let store = Self { pool };
        store.ping().await?;
        info!(pool_size = config.pool_size, "connected to redis");
        Ok(store)
    }

    async fn connection(&self) -> Result<Connection, CacheError> {
        self.pool.get().await.map_err(CacheError::connection)
    }
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.connection().await?;
        conn.get::<_, Option<String>>(key)
            .await
            .map_err(|err| CacheError::command("GET", err))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self.connection().await?;
        let seconds = ttl.as_secs().max(1);
        conn.set_ex::<_, _, ()>(key, value, seconds)
            .await
            .map_err(|err| CacheError::command("SETEX", err))
    }

    async fn delete(&self, key: &str) -> Result<bool, CacheError> {
        let mut conn = self.connection().await?;
        let removed: u64 = conn
            .del(key)
            .await
            .map_err(|err| CacheError::command("DEL", err))?;
        Ok(removed > 0)
    }

    async fn delete_pattern(&self, pattern: &str) -> Result<u64, CacheError> {
        let mut conn = self.connection().await?;

        let mut matched = Vec::new();
        let mut cursor = 0u64;
        loop {
            let (next, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(&mut conn)
                .await
                .map_err(|err| CacheError::command("SCAN", err))?;
            matched.extend(keys);
            if next == 0 {
                break;
            }
            cursor = next;
        }

        // SCAN may return a key more than once.
        matched.sort_unstable();
        matched.dedup();

        let mut removed = 0u64;
        for chunk in matched.chunks(SCAN_BATCH) {
            let count: u64 = conn
                .del(chunk)
                .await
                .map_err(|err| CacheError::command("DEL", err))?;
            removed += count;
        }

        debug!(pattern, removed, "swept cache keys");
        Ok(removed)
    }

    async fn ping(&self) -> Result<(), CacheError> {
        let mut conn = self.connection().await?;
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|err| CacheError::command("PING", err))?;
        Ok(())
    }

    fn close(&self) {
        self.pool.close();
    }
}
