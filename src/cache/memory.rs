//! Process-local cache store.
//!
//! Expiry is measured on the tokio clock so tests can pause and advance time.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use globset::{GlobBuilder, GlobMatcher};
use tokio::time::Instant;

use super::store::{CacheError, CacheStore};

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Instant,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

#[derive(Debug, Default)]
pub struct InMemoryCacheStore {
    entries: DashMap<String, Entry>,
    closed: AtomicBool,
}

impl InMemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .iter()
            .filter(|entry| entry.value().is_live(now))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sorted snapshot of live keys.
    pub fn keys(&self) -> Vec<String> {
        let now = Instant::now();
        let mut keys: Vec<String> = self
            .entries
            .iter()
            .filter(|entry| entry.value().is_live(now))
            .map(|entry| entry.key().clone())
            .collect();
        keys.sort();
        keys
    }

    fn ensure_open(&self, command: &'static str) -> Result<(), CacheError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(CacheError::command(command, "store is closed"));
        }
        Ok(())
    }
}

fn compile_pattern(pattern: &str) -> Result<GlobMatcher, CacheError> {
    GlobBuilder::new(pattern)
        .literal_separator(false)
        .backslash_escape(true)
        .build()
        .map(|glob| glob.compile_matcher())
        .map_err(|err| CacheError::Pattern {
            pattern: pattern.to_string(),
            message: err.to_string(),
        })
}

#[async_trait]
impl CacheStore for InMemoryCacheStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        self.ensure_open("GET")?;
        let now = Instant::now();
        if let Some(entry) = self.entries.get(key) {
            if entry.is_live(now) {
                return Ok(Some(entry.value.clone()));
            }
        }
        self.entries.remove_if(key, |_, entry| !entry.is_live(now));
        Ok(None)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        self.ensure_open("SET")?;
        self.entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, CacheError> {
        self.ensure_open("DEL")?;
        let now = Instant::now();
        Ok(self
            .entries
            .remove(key)
            .is_some_and(|(_, entry)| entry.is_live(now)))
    }

    async fn delete_pattern(&self, pattern: &str) -> Result<u64, CacheError> {
        self.ensure_open("SCAN")?;
        let matcher = compile_pattern(pattern)?;
        let now = Instant::now();
        let mut removed = 0u64;
        self.entries.retain(|key, entry| {
            if !matcher.is_match(key.as_str()) {
                return true;
            }
            if entry.is_live(now) {
                removed += 1;
            }
            false
        });
        Ok(removed)
    }

    async fn ping(&self) -> Result<(), CacheError> {
        self.ensure_open("PING")
    }

    fn close(&self) {
        self.closed.store(true, Ordering::Release);
        self.entries.clear();
    }
}
