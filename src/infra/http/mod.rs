pub mod api;
mod middleware;

pub use api::{ApiState, build_api_router as build_router};
pub use middleware::{RequestContext, log_responses, set_request_context};

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::application::error::ErrorReport;

/// 204 when every dependency answered, otherwise 503 carrying the first failure.
fn health_response(result: Result<(), Box<dyn std::error::Error + Send + Sync>>) -> Response {
    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => {
            let mut response = StatusCode::SERVICE_UNAVAILABLE.into_response();
            ErrorReport::from_error(
                "infra::http::health",
                StatusCode::SERVICE_UNAVAILABLE,
                err.as_ref(),
            )
            .attach(&mut response);
            response
        }
    }
}
