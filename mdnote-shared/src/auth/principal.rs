/// Authenticated request identity
///
/// The bearer-token middleware inserts a [`Principal`] into the request
/// extensions after a token verifies. Handlers take it as an ordinary
/// extractor argument:
///
/// ```no_run
/// use mdnote_shared::auth::principal::Principal;
///
/// async fn whoami(principal: Principal) -> String {
///     format!("{} ({})", principal.username, principal.user_id)
/// }
/// ```
///
/// A handler that asks for a `Principal` on a route where the middleware did
/// not run is rejected with 401 before its body executes.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Identity attached to a request after successful token verification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Authenticated user id
    pub user_id: i64,

    /// Username carried in the token
    pub username: String,
}

impl Principal {
    pub fn new(user_id: i64, username: impl Into<String>) -> Self {
        Self {
            user_id,
            username: username.into(),
        }
    }
}

/// Rejection returned when no principal is present on the request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MissingPrincipal;

impl IntoResponse for MissingPrincipal {
    fn into_response(self) -> Response {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "success": false,
                "error": "Not logged in or token is invalid",
            })),
        )
            .into_response()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = MissingPrincipal;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .ok_or(MissingPrincipal)
    }
}
