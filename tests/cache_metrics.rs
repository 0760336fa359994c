use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use metrics_util::debugging::{DebugValue, DebuggingRecorder};
use serial_test::serial;
use uuid::Uuid;

use quire::application::articles::{ArticleService, CreateArticleCommand};
use quire::application::repos::{ArticleQueryFilter, CreateUserParams, UsersRepo};
use quire::cache::{CacheError, CacheStore, InMemoryCacheStore};
use quire::domain::entities::ActingUser;
use quire::infra::memory::InMemoryArticles;
use quire::infra::telemetry;

/// Store whose sweeps always fail.
#[derive(Default)]
struct UnsweepableCache {
    inner: InMemoryCacheStore,
}

#[async_trait]
impl CacheStore for UnsweepableCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        self.inner.set(key, value, ttl).await
    }

    async fn delete(&self, key: &str) -> Result<bool, CacheError> {
        self.inner.delete(key).await
    }

    async fn delete_pattern(&self, _pattern: &str) -> Result<u64, CacheError> {
        Err(CacheError::connection("broken pipe"))
    }

    async fn ping(&self) -> Result<(), CacheError> {
        self.inner.ping().await
    }
}

type Counters = HashMap<(String, Vec<(String, String)>), u64>;

fn counters(snapshotter: &metrics_util::debugging::Snapshotter) -> Counters {
    snapshotter
        .snapshot()
        .into_vec()
        .into_iter()
        .filter_map(|(composite_key, _, _, value)| {
            let DebugValue::Counter(count) = value else {
                return None;
            };
            let key = composite_key.key();
            let labels = key
                .labels()
                .map(|label| (label.key().to_string(), label.value().to_string()))
                .collect();
            Some(((key.name().to_string(), labels), count))
        })
        .collect()
}

fn counter(counters: &Counters, name: &str, label: (&str, &str)) -> u64 {
    counters
        .get(&(
            name.to_string(),
            vec![(label.0.to_string(), label.1.to_string())],
        ))
        .copied()
        .unwrap_or_default()
}

#[tokio::test]
#[serial]
async fn cache_paths_emit_expected_counters() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    recorder
        .install()
        .expect("debug metrics recorder should install in this test process");
    telemetry::describe_metrics();

    let repo = Arc::new(InMemoryArticles::new());
    let cache = Arc::new(UnsweepableCache::default());
    let service = ArticleService::new(repo.clone(), repo.clone(), cache);

    let user = repo
        .create_user(CreateUserParams {
            email: "metrics@example.com".into(),
            first_name: "Metric".into(),
            last_name: "Writer".into(),
            token_prefix: Uuid::new_v4().simple().to_string(),
            credential_hash: vec![0; 32],
        })
        .await
        .expect("create user");
    let author = ActingUser::from(&user);

    let article = service
        .create(
            CreateArticleCommand {
                title: "Counted".into(),
                description: "Counted in every way".into(),
                publish_date: None,
            },
            &author,
        )
        .await
        .expect("write succeeds despite failed sweep");

    let filter = ArticleQueryFilter::default();
    service.find_all(&filter).await.expect("listing miss");
    service.find_all(&filter).await.expect("listing hit");
    service.find_one(article.id).await.expect("detail miss");
    service.find_one(article.id).await.expect("detail hit");
    service.find_one(article.id).await.expect("detail hit");

    let counters = counters(&snapshotter);
    assert_eq!(
        counter(&counters, "quire_cache_miss_total", ("kind", "listing")),
        1
    );
    assert_eq!(
        counter(&counters, "quire_cache_hit_total", ("kind", "listing")),
        1
    );
    assert_eq!(
        counter(&counters, "quire_cache_miss_total", ("kind", "detail")),
        1
    );
    assert_eq!(
        counter(&counters, "quire_cache_hit_total", ("kind", "detail")),
        2
    );
    assert_eq!(
        counter(
            &counters,
            "quire_cache_invalidation_failed_total",
            ("operation", "create")
        ),
        1
    );
}
