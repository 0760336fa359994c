use metrics::counter;
use time::OffsetDateTime;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::application::repos::{CreateArticleParams, RepoError};
use crate::cache::CacheError;
use crate::cache::keys::{DETAIL_SWEEP_PATTERN, LISTING_SWEEP_PATTERN};
use crate::domain::entities::{ActingUser, ArticleRecord};

use super::METRIC_INVALIDATION_FAILED;
use super::service::ArticleService;
use super::types::{ArticleError, CreateArticleCommand, NotFoundReason, UpdateArticleCommand};

impl ArticleService {
    /// Persist a new article authored by `user`.
    ///
    /// Field rules (minimum lengths and the like) are enforced by the caller.
    #[instrument(skip(self, command), fields(author_id = %user.id()))]
    pub async fn create(
        &self,
        command: CreateArticleCommand,
        user: &ActingUser,
    ) -> Result<ArticleRecord, ArticleError> {
        let params = CreateArticleParams {
            title: command.title,
            description: command.description,
            publish_date: command
                .publish_date
                .unwrap_or_else(OffsetDateTime::now_utc),
            author_id: user.id(),
        };

        let article = self
            .writer
            .create_article(params)
            .await
            .map_err(|err| persistence_failure("create", err))?;

        info!(article_id = %article.id, "article created");
        self.invalidate_after_write("create").await;
        Ok(article)
    }

    /// Apply a partial update to an article owned by `user`.
    ///
    /// Non-owners get the same [`ArticleError::NotFound`] as a missing id.
    #[instrument(skip(self, command), fields(user_id = %user.id()))]
    pub async fn update(
        &self,
        id: Uuid,
        command: UpdateArticleCommand,
        user: &ActingUser,
    ) -> Result<ArticleRecord, ArticleError> {
        let mut article = self.find_owned(id, user).await?;
        if command.is_empty() {
            debug!(article_id = %id, "empty update, rewriting stored fields");
        }
        command.apply_to(&mut article);

        let saved = self
            .writer
            .save_article(&article)
            .await
            .map_err(|err| persistence_failure("update", err))?;

        info!(article_id = %id, "article updated");
        self.invalidate_after_write("update").await;
        Ok(saved)
    }

    #[instrument(skip(self), fields(user_id = %user.id()))]
    pub async fn remove(&self, id: Uuid, user: &ActingUser) -> Result<(), ArticleError> {
        let article = self.find_owned(id, user).await?;

        self.writer
            .delete_article(&article)
            .await
            .map_err(|err| persistence_failure("remove", err))?;

        info!(article_id = %id, "article removed");
        self.invalidate_after_write("remove").await;
        Ok(())
    }

    /// Sweep every listing and detail key.
    ///
    /// Both sweeps run even when the first fails; the first error is returned.
    pub async fn invalidate_all(&self) -> Result<u64, CacheError> {
        let listings = self.cache.delete_pattern(LISTING_SWEEP_PATTERN).await;
        let details = self.cache.delete_pattern(DETAIL_SWEEP_PATTERN).await;
        Ok(listings? + details?)
    }

    async fn invalidate_after_write(&self, operation: &'static str) {
        match self.invalidate_all().await {
            Ok(removed) => debug!(operation, removed, "article cache invalidated"),
            Err(err) => {
                warn!(
                    operation,
                    error = %err,
                    "article cache invalidation failed; stale entries live until expiry"
                );
                counter!(METRIC_INVALIDATION_FAILED, "operation" => operation).increment(1);
            }
        }
    }

    async fn find_owned(&self, id: Uuid, user: &ActingUser) -> Result<ArticleRecord, ArticleError> {
        let article = self.find_one(id).await?;
        if !article.is_authored_by(user) {
            debug!(
                article_id = %id,
                reason = NotFoundReason::NotOwner.as_str(),
                "article not found"
            );
            return Err(ArticleError::not_found(NotFoundReason::NotOwner));
        }
        Ok(article)
    }
}

fn persistence_failure(operation: &'static str, err: RepoError) -> ArticleError {
    match err {
        RepoError::NotFound => ArticleError::not_found(NotFoundReason::Missing),
        other => {
            error!(operation, error = %other, "article write failed");
            ArticleError::Persistence(other)
        }
    }
}
