//! Article reads and writes fronted by the shared cache.
//!
//! Reads are cache-aside: look up the key, fall back to the repository on a
//! miss, then store the result for [`crate::cache::ENTRY_TTL`]. Any successful
//! write sweeps every listing and detail key.
//!
//! Known windows:
//!
//! - A read that misses before a write commits can populate its key after the
//!   write's sweep. That entry is stale until the TTL elapses.
//! - Concurrent misses on one key are not coalesced; each queries the
//!   repository and overwrites the entry.

mod commands;
mod queries;
mod service;
pub mod types;

pub use service::*;
pub use types::{ArticleError, CreateArticleCommand, NotFoundReason, UpdateArticleCommand};

pub const METRIC_CACHE_HIT: &str = "quire_cache_hit_total";
pub const METRIC_CACHE_MISS: &str = "quire_cache_miss_total";
pub const METRIC_INVALIDATION_FAILED: &str = "quire_cache_invalidation_failed_total";
