//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::{OffsetDateTime, UtcOffset};
use uuid::Uuid;

use crate::domain::entities::{ArticleRecord, UserRecord};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PAGE_LIMIT: u32 = 10;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("duplicate record violates unique constraint `{constraint}`")]
    Duplicate { constraint: String },
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("integrity error: {message}")]
    Integrity { message: String },
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

/// Listing filter as supplied by callers. Unset paging falls back to defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleQueryFilter {
    pub search: Option<String>,
    pub from_date: Option<OffsetDateTime>,
    pub to_date: Option<OffsetDateTime>,
    pub author_id: Option<Uuid>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl ArticleQueryFilter {
    /// Collapse the filter to the conditions that actually constrain a query.
    ///
    /// Empty search strings and half-open date ranges apply no condition, so they
    /// resolve the same as leaving the field unset. Fails when a range bound has
    /// no UTC representation.
    pub fn resolve(&self) -> Result<ResolvedArticleFilter, FilterError> {
        let search = self
            .search
            .as_ref()
            .filter(|value| !value.is_empty())
            .cloned();

        let publish_range = match (self.from_date, self.to_date) {
            (Some(from), Some(to)) => Some(PublishRange {
                from: to_utc(from, "fromDate")?,
                to: to_utc(to, "toDate")?,
            }),
            _ => None,
        };

        Ok(ResolvedArticleFilter {
            search,
            publish_range,
            author_id: self.author_id,
            page: self.page.unwrap_or(DEFAULT_PAGE).max(1),
            limit: self.limit.unwrap_or(DEFAULT_PAGE_LIMIT).max(1),
        })
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterError {
    #[error("`{field}` is outside the supported date range")]
    DateOutOfRange { field: &'static str },
}

/// Normalize `instant` to UTC without panicking at the edges of the calendar.
pub fn to_utc(
    instant: OffsetDateTime,
    field: &'static str,
) -> Result<OffsetDateTime, FilterError> {
    instant
        .checked_to_offset(UtcOffset::UTC)
        .ok_or(FilterError::DateOutOfRange { field })
}

/// Inclusive publish-date window, normalized to UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublishRange {
    pub from: OffsetDateTime,
    pub to: OffsetDateTime,
}

impl PublishRange {
    pub fn contains(&self, instant: OffsetDateTime) -> bool {
        self.from <= instant && instant <= self.to
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedArticleFilter {
    pub search: Option<String>,
    pub publish_range: Option<PublishRange>,
    pub author_id: Option<Uuid>,
    pub page: u32,
    pub limit: u32,
}

impl ResolvedArticleFilter {
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }
}

/// One page of articles plus the pre-pagination match count.
///
/// Serializes as `[articles, total]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "(Vec<ArticleRecord>, u64)",
    into = "(Vec<ArticleRecord>, u64)"
)]
pub struct ArticlePage {
    pub articles: Vec<ArticleRecord>,
    pub total: u64,
}

impl ArticlePage {
    pub fn new(articles: Vec<ArticleRecord>, total: u64) -> Self {
        Self { articles, total }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new(), 0)
    }
}

impl From<(Vec<ArticleRecord>, u64)> for ArticlePage {
    fn from((articles, total): (Vec<ArticleRecord>, u64)) -> Self {
        Self { articles, total }
    }
}

impl From<ArticlePage> for (Vec<ArticleRecord>, u64) {
    fn from(page: ArticlePage) -> Self {
        (page.articles, page.total)
    }
}

#[derive(Debug, Clone)]
pub struct CreateArticleParams {
    pub title: String,
    pub description: String,
    pub publish_date: OffsetDateTime,
    pub author_id: Uuid,
}

#[async_trait]
pub trait ArticlesRepo: Send + Sync {
    async fn query_articles(
        &self,
        filter: &ResolvedArticleFilter,
    ) -> Result<ArticlePage, RepoError>;

    /// Load one article with its author joined in.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<ArticleRecord>, RepoError>;
}

#[async_trait]
pub trait ArticlesWriteRepo: Send + Sync {
    async fn create_article(&self, params: CreateArticleParams)
    -> Result<ArticleRecord, RepoError>;

    /// Persist title, description and publish date. The author column is never written.
    async fn save_article(&self, article: &ArticleRecord) -> Result<ArticleRecord, RepoError>;

    async fn delete_article(&self, article: &ArticleRecord) -> Result<(), RepoError>;
}

#[derive(Debug, Clone)]
pub struct CreateUserParams {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub token_prefix: String,
    pub credential_hash: Vec<u8>,
}

#[async_trait]
pub trait UsersRepo: Send + Sync {
    async fn create_user(&self, params: CreateUserParams) -> Result<UserRecord, RepoError>;

    async fn find_by_token_prefix(&self, prefix: &str) -> Result<Option<UserRecord>, RepoError>;
}
