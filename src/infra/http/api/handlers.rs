use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use uuid::Uuid;

use crate::domain::entities::ActingUser;
use crate::infra::http::health_response;

use super::error::{ApiError, article_to_api};
use super::models::{ArticleCreateRequest, ArticleListQuery, ArticleUpdateRequest};
use super::state::ApiState;

pub async fn list_articles(
    State(state): State<ApiState>,
    Query(query): Query<ArticleListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = query.into_filter()?;
    let page = state
        .articles
        .find_all(&filter)
        .await
        .map_err(article_to_api)?;
    Ok(Json(page))
}

pub async fn get_article(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let article = state.articles.find_one(id).await.map_err(article_to_api)?;
    Ok(Json(article))
}

pub async fn create_article(
    State(state): State<ApiState>,
    Extension(user): Extension<ActingUser>,
    Json(payload): Json<ArticleCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let command = payload.into_command()?;
    let article = state
        .articles
        .create(command, &user)
        .await
        .map_err(article_to_api)?;
    Ok((StatusCode::CREATED, Json(article)))
}

pub async fn update_article(
    State(state): State<ApiState>,
    Extension(user): Extension<ActingUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ArticleUpdateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let command = payload.into_command()?;
    let article = state
        .articles
        .update(id, command, &user)
        .await
        .map_err(article_to_api)?;
    Ok(Json(article))
}

pub async fn delete_article(
    State(state): State<ApiState>,
    Extension(user): Extension<ActingUser>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .articles
        .remove(id, &user)
        .await
        .map_err(article_to_api)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn health(State(state): State<ApiState>) -> Response {
    let result = async {
        state.cache.ping().await?;
        if let Some(db) = state.db.as_ref() {
            db.health_check().await?;
        }
        Ok::<(), Box<dyn std::error::Error + Send + Sync>>(())
    }
    .await;
    health_response(result)
}
