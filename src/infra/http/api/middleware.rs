use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderValue, Request, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::error;

use crate::application::auth::AuthError;

use super::error::ApiError;
use super::state::ApiState;

/// Resolve the bearer token (or `x-api-key`) to an [`ActingUser`](crate::domain::entities::ActingUser)
/// and insert it into the request extensions.
pub async fn api_auth(
    State(state): State<ApiState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let token = extract_token(request.headers().get(header::AUTHORIZATION)).or_else(|| {
        request
            .headers()
            .get("x-api-key")
            .and_then(|v| v.to_str().ok().map(|s| s.to_string()))
    });

    let Some(token) = token else {
        return ApiError::unauthorized().into_response();
    };

    let user = match state.auth.authenticate(&token).await {
        Ok(user) => user,
        Err(AuthError::Invalid) => {
            return ApiError::unauthorized().into_response();
        }
        Err(AuthError::Repo(err)) => {
            error!(error = %err, "user lookup failed during authentication");
            return ApiError::unauthorized().into_response();
        }
    };

    request.extensions_mut().insert(user);

    let mut response = next.run(request).await;
    response.extensions_mut().insert(user);
    response
}

fn extract_token(header: Option<&HeaderValue>) -> Option<String> {
    let raw = header?.to_str().ok()?;
    let bearer = raw.strip_prefix("Bearer ")?;
    Some(bearer.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_prefix_is_required() {
        let value = HeaderValue::from_static("Bearer qt_abc_secret");
        assert_eq!(extract_token(Some(&value)).as_deref(), Some("qt_abc_secret"));

        let value = HeaderValue::from_static("Basic abc");
        assert!(extract_token(Some(&value)).is_none());
        assert!(extract_token(None).is_none());
    }
}
