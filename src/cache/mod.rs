//! Article cache plumbing.
//!
//! The article layer talks to a [`CacheStore`]: a TTL key/value store with
//! glob deletion. Two implementations ship:
//!
//! - [`RedisCacheStore`]: the production store, shared across processes
//! - [`InMemoryCacheStore`]: a process-local store used by tests and tooling
//!
//! Key formats live in [`keys`].

mod config;
pub mod keys;
mod memory;
mod redis;
mod store;

pub use self::config::CacheConfig;
pub use keys::{ENTRY_TTL, detail_key, listing_key};
pub use memory::InMemoryCacheStore;
pub use self::redis::RedisCacheStore;
pub use store::{CacheError, CacheStore};
