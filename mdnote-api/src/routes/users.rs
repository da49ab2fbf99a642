/// User endpoints
///
/// - `PUT /api/users/profile` - Update the current user's email and bio
/// - `GET /api/users` - List all users

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::ApiJson,
    response::ApiResponse,
};
use axum::extract::State;
use mdnote_shared::{
    auth::principal::Principal,
    input::trimmed_option,
    models::user::{UpdateProfile, User, UserSummary},
};
use serde::Deserialize;
use validator::Validate;

/// Profile update request; absent fields are left unchanged
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[serde(default, deserialize_with = "trimmed_option")]
    #[validate(
        email(message = "must be a valid email address"),
        length(max = 100, message = "must be at most 100 characters")
    )]
    pub email: Option<String>,

    #[validate(length(max = 1000, message = "must be at most 1000 characters"))]
    pub bio: Option<String>,
}

/// Update the current user's profile
///
/// # Errors
///
/// - `400 Bad Request`: Invalid or over-long email
/// - `404 Not Found`: Account no longer exists
/// - `409 Conflict`: Email already used by another account
pub async fn update_profile(
    State(state): State<AppState>,
    principal: Principal,
    ApiJson(req): ApiJson<UpdateProfileRequest>,
) -> ApiResult<ApiResponse<UserSummary>> {
    req.validate()?;

    let update = UpdateProfile {
        email: req.email,
        bio: req.bio,
    };

    let user = User::update_profile(&state.db, principal.user_id, update)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    tracing::info!(user_id = user.id, "Profile updated");

    Ok(ApiResponse::success(user.into()).with_message("Profile updated successfully"))
}

/// List all users, newest first
pub async fn list_users(State(state): State<AppState>) -> ApiResult<ApiResponse<Vec<UserSummary>>> {
    let users = User::list(&state.db).await?;
    Ok(ApiResponse::success(users))
}
