use metrics::counter;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, error, instrument, warn};
use uuid::Uuid;

use crate::application::repos::{ArticlePage, ArticleQueryFilter};
use crate::cache::{ENTRY_TTL, detail_key, listing_key};
use crate::domain::entities::ArticleRecord;

use super::service::ArticleService;
use super::types::{ArticleError, NotFoundReason};
use super::{METRIC_CACHE_HIT, METRIC_CACHE_MISS};

const LISTING: &str = "listing";
const DETAIL: &str = "detail";

impl ArticleService {
    /// One page of articles matching `filter`, newest publish date first.
    #[instrument(skip(self, filter))]
    pub async fn find_all(&self, filter: &ArticleQueryFilter) -> Result<ArticlePage, ArticleError> {
        let resolved = filter
            .resolve()
            .map_err(|err| ArticleError::InvalidFilter(err.to_string()))?;
        let key = listing_key(&resolved)
            .map_err(|err| ArticleError::InvalidFilter(err.to_string()))?;

        if let Some(page) = self.read_cached::<ArticlePage>(&key, LISTING).await? {
            return Ok(page);
        }

        let page = self.reader.query_articles(&resolved).await.map_err(|err| {
            error!(error = %err, "article listing query failed");
            ArticleError::Persistence(err)
        })?;

        self.populate(&key, &page).await?;
        Ok(page)
    }

    #[instrument(skip(self))]
    pub async fn find_one(&self, id: Uuid) -> Result<ArticleRecord, ArticleError> {
        let key = detail_key(id);

        if let Some(article) = self.read_cached::<ArticleRecord>(&key, DETAIL).await? {
            return Ok(article);
        }

        let article = self
            .reader
            .find_by_id(id)
            .await
            .map_err(|err| {
                error!(article_id = %id, error = %err, "article lookup failed");
                ArticleError::Persistence(err)
            })?
            .ok_or_else(|| {
                debug!(article_id = %id, reason = NotFoundReason::Missing.as_str(), "article not found");
                ArticleError::not_found(NotFoundReason::Missing)
            })?;

        self.populate(&key, &article).await?;
        Ok(article)
    }

    /// Cached value under `key`, or `None` on a miss.
    ///
    /// Undecodable payloads count as misses and get overwritten by the caller.
    async fn read_cached<T: DeserializeOwned>(
        &self,
        key: &str,
        kind: &'static str,
    ) -> Result<Option<T>, ArticleError> {
        let cached = self.cache.get(key).await.map_err(|err| {
            error!(key, error = %err, "article cache read failed");
            ArticleError::CacheUnavailable(err)
        })?;

        let Some(payload) = cached else {
            counter!(METRIC_CACHE_MISS, "kind" => kind).increment(1);
            return Ok(None);
        };

        match serde_json::from_str(&payload) {
            Ok(value) => {
                counter!(METRIC_CACHE_HIT, "kind" => kind).increment(1);
                debug!(key, "article cache hit");
                Ok(Some(value))
            }
            Err(err) => {
                warn!(key, error = %err, "discarding undecodable cache entry");
                counter!(METRIC_CACHE_MISS, "kind" => kind).increment(1);
                Ok(None)
            }
        }
    }

    async fn populate<T: Serialize>(&self, key: &str, value: &T) -> Result<(), ArticleError> {
        let payload = match serde_json::to_string(value) {
            Ok(payload) => payload,
            Err(err) => {
                warn!(key, error = %err, "skipping cache population for unencodable value");
                return Ok(());
            }
        };

        self.cache
            .set(key, &payload, ENTRY_TTL)
            .await
            .map_err(|err| {
                error!(key, error = %err, "article cache write failed");
                ArticleError::CacheUnavailable(err)
            })
    }
}
