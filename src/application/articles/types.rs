use thiserror::Error;
use time::OffsetDateTime;

use crate::application::repos::RepoError;
use crate::cache::CacheError;
use crate::domain::entities::ArticleRecord;

/// Why an article lookup produced "not found".
///
/// Diagnostic only. Callers outside the process must not be able to tell the
/// two apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotFoundReason {
    Missing,
    NotOwner,
}

impl NotFoundReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotFoundReason::Missing => "missing",
            NotFoundReason::NotOwner => "not_owner",
        }
    }
}

#[derive(Debug, Error)]
pub enum ArticleError {
    #[error("article not found")]
    NotFound { reason: NotFoundReason },
    #[error("article cache unavailable")]
    CacheUnavailable(#[source] CacheError),
    #[error("invalid article filter: {0}")]
    InvalidFilter(String),
    #[error(transparent)]
    Persistence(#[from] RepoError),
}

impl ArticleError {
    pub fn not_found(reason: NotFoundReason) -> Self {
        Self::NotFound { reason }
    }

    pub fn not_found_reason(&self) -> Option<NotFoundReason> {
        match self {
            ArticleError::NotFound { reason } => Some(*reason),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CreateArticleCommand {
    pub title: String,
    pub description: String,
    /// Defaults to the creation instant.
    pub publish_date: Option<OffsetDateTime>,
}

/// Partial update. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdateArticleCommand {
    pub title: Option<String>,
    pub description: Option<String>,
    pub publish_date: Option<OffsetDateTime>,
}

impl UpdateArticleCommand {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.publish_date.is_none()
    }

    pub(crate) fn apply_to(self, article: &mut ArticleRecord) {
        if let Some(title) = self.title {
            article.title = title;
        }
        if let Some(description) = self.description {
            article.description = description;
        }
        if let Some(publish_date) = self.publish_date {
            article.publish_date = publish_date;
        }
    }
}
