/// Bearer-token authentication middleware
///
/// Applied to every route that needs a logged-in user. The middleware
/// verifies `Authorization: Bearer <token>` and inserts the resulting
/// [`Principal`] into the request extensions; handlers extract it directly.
/// Requests without a valid token never reach the handler.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use mdnote_shared::auth::principal::Principal;

use crate::{app::AppState, error::ApiError};

/// Extracts the token from an `Authorization` header value
///
/// Exactly two space-separated parts are accepted, the first being `Bearer`.
pub fn bearer_token(value: &str) -> Option<&str> {
    let mut parts = value.split(' ');

    match (parts.next(), parts.next(), parts.next()) {
        (Some("Bearer"), Some(token), None) if !token.is_empty() => Some(token),
        _ => None,
    }
}

/// Rejects the request with 401 unless it carries a valid bearer token
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Authorization header is required".to_string()))?;

    let token = bearer_token(auth_header)
        .ok_or_else(|| ApiError::Unauthorized("Invalid authorization format".to_string()))?;

    let principal: Principal = state.tokens.verify(token).map_err(|e| {
        tracing::debug!(error = %e, "Rejected bearer token");
        ApiError::from(e)
    })?;

    req.extensions_mut().insert(principal);

    Ok(next.run(req).await)
}
