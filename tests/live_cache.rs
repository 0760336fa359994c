//! Live tests for the Redis cache store.
//!
//! - Marked `#[ignore]`; run with `cargo test --test live_cache -- --ignored`.
//! - Needs a disposable Redis at `QUIRE_TEST_REDIS_URL` (default `redis://127.0.0.1:6379`).
//!   The sweep tests delete every `articles:*` and `article:*` key in it.

use std::time::Duration;

use serial_test::serial;
use uuid::Uuid;

use quire::cache::{CacheConfig, CacheStore, RedisCacheStore};

type TestResult<T> = Result<T, Box<dyn std::error::Error>>;

fn redis_url() -> String {
    std::env::var("QUIRE_TEST_REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string())
}

async fn connect() -> TestResult<RedisCacheStore> {
    let config = CacheConfig {
        url: redis_url(),
        pool_size: 4,
        ..Default::default()
    };
    Ok(RedisCacheStore::connect(&config).await?)
}

async fn raw_ttl(key: &str) -> TestResult<i64> {
    let client = redis::Client::open(redis_url())?;
    let mut conn = client.get_multiplexed_async_connection().await?;
    let ttl: i64 = redis::cmd("TTL").arg(key).query_async(&mut conn).await?;
    Ok(ttl)
}

#[tokio::test]
#[ignore]
#[serial]
async fn live_redis_round_trips_and_deletes() -> TestResult<()> {
    let store = connect().await?;
    let key = format!("article:{}", Uuid::new_v4());

    assert_eq!(store.get(&key).await?, None);
    store.set(&key, "{\"v\":1}", Duration::from_secs(60)).await?;
    assert_eq!(store.get(&key).await?.as_deref(), Some("{\"v\":1}"));

    store.set(&key, "{\"v\":2}", Duration::from_secs(60)).await?;
    assert_eq!(store.get(&key).await?.as_deref(), Some("{\"v\":2}"));

    assert!(store.delete(&key).await?);
    assert!(!store.delete(&key).await?);
    assert_eq!(store.get(&key).await?, None);
    Ok(())
}

#[tokio::test]
#[ignore]
#[serial]
async fn live_redis_sub_second_ttl_is_clamped_to_one_second() -> TestResult<()> {
    let store = connect().await?;
    let key = format!("article:{}", Uuid::new_v4());

    store.set(&key, "v", Duration::from_millis(10)).await?;
    assert_eq!(store.get(&key).await?.as_deref(), Some("v"));
    let ttl = raw_ttl(&key).await?;
    assert!((0..=1).contains(&ttl), "unexpected ttl {ttl}");

    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert_eq!(store.get(&key).await?, None);
    Ok(())
}

#[tokio::test]
#[ignore]
#[serial]
async fn live_redis_entries_carry_the_requested_ttl() -> TestResult<()> {
    let store = connect().await?;
    let key = format!("article:{}", Uuid::new_v4());

    store.set(&key, "v", Duration::from_secs(3600)).await?;
    let ttl = raw_ttl(&key).await?;
    assert!((3590..=3600).contains(&ttl), "unexpected ttl {ttl}");

    store.delete(&key).await?;
    Ok(())
}

#[tokio::test]
#[ignore]
#[serial]
async fn live_redis_sweeps_respect_prefix_boundary() -> TestResult<()> {
    let store = connect().await?;
    store.delete_pattern("articles:*").await?;
    store.delete_pattern("article:*").await?;

    let run = Uuid::new_v4();
    let listing = format!("articles:{{\"run\":\"{run}\"}}");
    let detail = format!("article:{run}");
    let unrelated = format!("session:{run}");
    for key in [&listing, &detail, &unrelated] {
        store.set(key, "v", Duration::from_secs(60)).await?;
    }

    assert_eq!(store.delete_pattern("articles:*").await?, 1);
    assert_eq!(store.get(&listing).await?, None);
    assert_eq!(store.get(&detail).await?.as_deref(), Some("v"));

    assert_eq!(store.delete_pattern("article:*").await?, 1);
    assert_eq!(store.get(&detail).await?, None);
    assert_eq!(store.get(&unrelated).await?.as_deref(), Some("v"));

    assert_eq!(store.delete_pattern("articles:*").await?, 0);
    assert_eq!(store.delete_pattern("article:*").await?, 0);

    store.delete(&unrelated).await?;
    Ok(())
}

#[tokio::test]
#[ignore]
#[serial]
async fn live_redis_sweep_spans_scan_batches() -> TestResult<()> {
    let store = connect().await?;
    store.delete_pattern("article:*").await?;

    let run = Uuid::new_v4();
    let keys: Vec<String> = (0..1_234).map(|i| format!("article:{run}:{i}")).collect();
    for key in &keys {
        store.set(key, "v", Duration::from_secs(60)).await?;
    }

    assert_eq!(store.delete_pattern("article:*").await?, keys.len() as u64);
    for key in keys.iter().step_by(97) {
        assert_eq!(store.get(key).await?, None);
    }
    assert_eq!(store.delete_pattern("article:*").await?, 0);
    Ok(())
}

#[tokio::test]
#[ignore]
#[serial]
async fn live_redis_commands_fail_after_close() -> TestResult<()> {
    let store = connect().await?;
    store.ping().await?;

    store.close();

    assert!(store.ping().await.is_err());
    assert!(store.get("article:closed").await.is_err());
    Ok(())
}

#[tokio::test]
#[ignore]
async fn live_redis_unreachable_server_fails_fast() {
    let config = CacheConfig {
        url: "redis://127.0.0.1:1".to_string(),
        pool_size: 1,
        connect_timeout: Duration::from_millis(500),
    };
    assert!(RedisCacheStore::connect(&config).await.is_err());
}
