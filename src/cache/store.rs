//! Cache store capability consumed by the article layer.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache connection failed: {0}")]
    Connection(String),
    #[error("cache command `{command}` failed: {message}")]
    Command {
        command: &'static str,
        message: String,
    },
    #[error("invalid key pattern `{pattern}`: {message}")]
    Pattern { pattern: String, message: String },
}

impl CacheError {
    pub fn connection(err: impl std::fmt::Display) -> Self {
        Self::Connection(err.to_string())
    }

    pub fn command(command: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Command {
            command,
            message: err.to_string(),
        }
    }
}

/// TTL key/value store with glob-pattern deletion.
///
/// Any failure is reported as an error; implementations never map a failed
/// lookup to "absent".
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Unconditionally overwrite `key`, expiring it after `ttl`.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;

    /// Returns whether a live entry was removed.
    async fn delete(&self, key: &str) -> Result<bool, CacheError>;

    /// Delete every key matching `pattern` (`*` wildcard) and return how many went.
    ///
    /// Keys written while the sweep is running may survive it.
    async fn delete_pattern(&self, pattern: &str) -> Result<u64, CacheError>;

    async fn ping(&self) -> Result<(), CacheError>;

    /// Release connections. Calls made after closing fail.
    fn close(&self) {}
}
