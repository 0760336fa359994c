pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod state;

pub use state::ApiState;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, patch, post},
};

use crate::infra::http::middleware::{log_responses, set_request_context};

pub fn build_api_router(state: ApiState) -> Router {
    let writes = Router::new()
        .route("/articles", post(handlers::create_article))
        .route(
            "/articles/{id}",
            patch(handlers::update_article).delete(handlers::delete_article),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::api_auth,
        ));

    Router::new()
        .route("/articles", get(handlers::list_articles))
        .route("/articles/{id}", get(handlers::get_article))
        .route("/health", get(handlers::health))
        .merge(writes)
        .with_state(state)
        .layer(axum_middleware::from_fn(log_responses))
        .layer(axum_middleware::from_fn(set_request_context))
}
