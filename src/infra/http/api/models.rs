//! Request payloads and their field rules.
//!
//! Length and range checks live here, at the edge. The article service
//! accepts whatever it is handed.

use serde::Deserialize;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::articles::{CreateArticleCommand, UpdateArticleCommand};
use crate::application::repos::{ArticleQueryFilter, to_utc};

use super::error::ApiError;

pub const TITLE_MIN_CHARS: usize = 3;
pub const DESCRIPTION_MIN_CHARS: usize = 10;
pub const MAX_PAGE_LIMIT: u32 = 100;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleListQuery {
    pub search: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub from_date: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub to_date: Option<OffsetDateTime>,
    pub author_id: Option<Uuid>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl ArticleListQuery {
    pub fn into_filter(self) -> Result<ArticleQueryFilter, ApiError> {
        if self.page == Some(0) {
            return Err(ApiError::validation("page must be at least 1"));
        }
        if let Some(limit) = self.limit
            && !(1..=MAX_PAGE_LIMIT).contains(&limit)
        {
            return Err(ApiError::validation(format!(
                "limit must be between 1 and {MAX_PAGE_LIMIT}"
            )));
        }

        let from_date = normalize_date(self.from_date, "fromDate")?;
        let to_date = normalize_date(self.to_date, "toDate")?;

        Ok(ArticleQueryFilter {
            search: self.search,
            from_date,
            to_date,
            author_id: self.author_id,
            page: self.page,
            limit: self.limit,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleCreateRequest {
    pub title: String,
    pub description: String,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub publish_date: Option<OffsetDateTime>,
}

impl ArticleCreateRequest {
    pub fn into_command(self) -> Result<CreateArticleCommand, ApiError> {
        ensure_min_chars(&self.title, "title", TITLE_MIN_CHARS)?;
        ensure_min_chars(&self.description, "description", DESCRIPTION_MIN_CHARS)?;
        Ok(CreateArticleCommand {
            title: self.title,
            description: self.description,
            publish_date: self.publish_date,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleUpdateRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub publish_date: Option<OffsetDateTime>,
}

impl ArticleUpdateRequest {
    pub fn into_command(self) -> Result<UpdateArticleCommand, ApiError> {
        if let Some(title) = self.title.as_deref() {
            ensure_min_chars(title, "title", TITLE_MIN_CHARS)?;
        }
        if let Some(description) = self.description.as_deref() {
            ensure_min_chars(description, "description", DESCRIPTION_MIN_CHARS)?;
        }
        Ok(UpdateArticleCommand {
            title: self.title,
            description: self.description,
            publish_date: self.publish_date,
        })
    }
}

fn normalize_date(
    value: Option<OffsetDateTime>,
    field: &'static str,
) -> Result<Option<OffsetDateTime>, ApiError> {
    value
        .map(|instant| to_utc(instant, field))
        .transpose()
        .map_err(|err| ApiError::validation(err.to_string()))
}

fn ensure_min_chars(value: &str, field: &str, min: usize) -> Result<(), ApiError> {
    if value.chars().count() < min {
        return Err(ApiError::validation(format!(
            "{field} must be at least {min} characters"
        )));
    }
    Ok(())
}
