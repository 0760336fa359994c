use crate::application::articles::ArticleError;
use crate::application::error::ErrorReport;
use crate::application::repos::RepoError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    pub error: ApiErrorMessage,
}

pub mod codes {
    pub const BAD_REQUEST: &str = "bad_request";
    pub const VALIDATION: &str = "validation_failed";
    pub const UNAUTHORIZED: &str = "unauthorized";
    pub const NOT_FOUND: &str = "not_found";
    pub const DUPLICATE: &str = "duplicate";
    pub const INVALID_INPUT: &str = "invalid_input";
    pub const INTEGRITY: &str = "integrity_error";
    pub const DB_TIMEOUT: &str = "db_timeout";
    pub const REPO: &str = "repo_error";
    pub const CACHE_UNAVAILABLE: &str = "cache_unavailable";
}

#[derive(Debug, Serialize)]
pub struct ApiErrorMessage {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: &'static str,
    hint: Option<String>,
    /// Logged through the error report, never sent to the client.
    detail: Option<String>,
}

impl ApiError {
    pub fn new(
        status: StatusCode,
        code: &'static str,
        message: &'static str,
        hint: Option<String>,
    ) -> Self {
        Self {
            status,
            code,
            message,
            hint,
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn bad_request(message: &'static str, hint: Option<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, codes::BAD_REQUEST, message, hint)
    }

    pub fn validation(hint: impl Into<String>) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            codes::VALIDATION,
            "Request validation failed",
            Some(hint.into()),
        )
    }

    pub fn unauthorized() -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            codes::UNAUTHORIZED,
            "Access token required",
            None,
        )
    }

    pub fn not_found(message: &'static str) -> Self {
        Self::new(StatusCode::NOT_FOUND, codes::NOT_FOUND, message, None)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let diagnostic = self
            .detail
            .clone()
            .or_else(|| self.hint.clone())
            .unwrap_or_else(|| self.message.to_string());
        let body = ApiErrorBody {
            error: ApiErrorMessage {
                code: self.code.to_string(),
                message: self.message.to_string(),
                hint: self.hint,
            },
        };
        let mut response = (self.status, Json(body)).into_response();
        ErrorReport::from_message(
            "infra::http::api",
            self.status,
            format!("{}: {diagnostic}", self.code),
        )
        .attach(&mut response);
        response
    }
}

pub fn repo_to_api(err: RepoError) -> ApiError {
    match err {
        RepoError::Duplicate { constraint } => ApiError::new(
            StatusCode::CONFLICT,
            codes::DUPLICATE,
            "Duplicate record",
            None,
        )
        .with_detail(constraint),
        RepoError::NotFound => ApiError::not_found("article not found"),
        RepoError::InvalidInput { message } => ApiError::new(
            StatusCode::BAD_REQUEST,
            codes::INVALID_INPUT,
            "Invalid input",
            None,
        )
        .with_detail(message),
        RepoError::Integrity { message } => ApiError::new(
            StatusCode::CONFLICT,
            codes::INTEGRITY,
            "Integrity constraint violated",
            None,
        )
        .with_detail(message),
        RepoError::Timeout => ApiError::new(
            StatusCode::SERVICE_UNAVAILABLE,
            codes::DB_TIMEOUT,
            "Database timeout",
            None,
        ),
        RepoError::Persistence(message) => ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            codes::REPO,
            "Persistence error",
            None,
        )
        .with_detail(message),
    }
}

/// Missing and not-owned articles render identically; only the log sees the reason.
pub fn article_to_api(err: ArticleError) -> ApiError {
    match err {
        ArticleError::NotFound { reason } => {
            ApiError::not_found("article not found").with_detail(reason.as_str())
        }
        ArticleError::CacheUnavailable(err) => ApiError::new(
            StatusCode::SERVICE_UNAVAILABLE,
            codes::CACHE_UNAVAILABLE,
            "Service temporarily unavailable",
            None,
        )
        .with_detail(err.to_string()),
        ArticleError::InvalidFilter(message) => {
            ApiError::bad_request("invalid filter", Some(message))
        }
        ArticleError::Persistence(err) => repo_to_api(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::articles::NotFoundReason;
    use crate::cache::CacheError;

    #[test]
    fn not_found_reasons_map_to_same_status_and_body() {
        let missing = article_to_api(ArticleError::not_found(NotFoundReason::Missing));
        let not_owner = article_to_api(ArticleError::not_found(NotFoundReason::NotOwner));
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
        assert_eq!(missing.status(), not_owner.status());
        assert_eq!(missing.code, not_owner.code);
        assert_eq!(missing.message, not_owner.message);
        assert_eq!(missing.hint, not_owner.hint);
    }

    #[test]
    fn cache_failures_are_service_unavailable() {
        let err = article_to_api(ArticleError::CacheUnavailable(CacheError::connection(
            "refused",
        )));
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(err.hint.is_none());
    }
}
