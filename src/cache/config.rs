//! Cache connection configuration.

use std::time::Duration;

const DEFAULT_URL: &str = "redis://localhost:6379";
const DEFAULT_POOL_SIZE: usize = 16;
const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 10_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// `redis://` connection URL.
    pub url: String,
    /// Maximum pooled connections.
    pub pool_size: usize,
    /// Bound on waiting for, creating, or recycling a pooled connection.
    pub connect_timeout: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            pool_size: DEFAULT_POOL_SIZE,
            connect_timeout: Duration::from_millis(DEFAULT_CONNECT_TIMEOUT_MS),
        }
    }
}

impl From<&crate::config::CacheSettings> for CacheConfig {
    fn from(settings: &crate::config::CacheSettings) -> Self {
        Self {
            url: settings.url.clone(),
            pool_size: settings.pool_size.get() as usize,
            connect_timeout: Duration::from_millis(settings.connect_timeout_ms.get()),
        }
    }
}
