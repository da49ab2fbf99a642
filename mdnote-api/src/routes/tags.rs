/// Tag endpoints
///
/// - `GET /api/tags` - The caller's tags
/// - `POST /api/tags` - Create a tag
/// - `PUT /api/tags/:id` - Rename or recolor a tag
/// - `DELETE /api/tags/:id` - Delete a tag and detach it everywhere

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{ApiJson, ApiPath},
    response::ApiResponse,
};
use axum::extract::State;
use mdnote_shared::{
    auth::principal::Principal,
    input::{trimmed, trimmed_option},
    models::tag::Tag,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// `{"list": [...]}` wrapper shared by every tag listing
#[derive(Debug, Serialize)]
pub struct TagList {
    pub list: Vec<Tag>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTagRequest {
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(max = 50, message = "must be at most 50 characters"))]
    pub name: String,

    #[serde(default, deserialize_with = "trimmed_option")]
    #[validate(length(max = 20, message = "must be at most 20 characters"))]
    pub color: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateTagRequest {
    #[serde(default, deserialize_with = "trimmed_option")]
    #[validate(length(max = 50, message = "must be at most 50 characters"))]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "trimmed_option")]
    #[validate(length(max = 20, message = "must be at most 20 characters"))]
    pub color: Option<String>,
}

pub async fn list_tags(
    State(state): State<AppState>,
    principal: Principal,
) -> ApiResult<ApiResponse<TagList>> {
    let list = Tag::list_for_user(&state.db, principal.user_id).await?;
    Ok(ApiResponse::success(TagList { list }))
}

/// Create a tag; the color defaults to `#3b82f6`
///
/// # Errors
///
/// - `400 Bad Request`: Name is empty after trimming, or a field is too long
pub async fn create_tag(
    State(state): State<AppState>,
    principal: Principal,
    ApiJson(req): ApiJson<CreateTagRequest>,
) -> ApiResult<ApiResponse<Tag>> {
    req.validate()?;

    if req.name.is_empty() {
        return Err(ApiError::BadRequest("Tag name is required".to_string()));
    }

    let tag = Tag::create(&state.db, principal.user_id, &req.name, req.color.as_deref()).await?;

    tracing::info!(tag_id = tag.id, user_id = principal.user_id, "Tag created");

    Ok(ApiResponse::success(tag))
}

/// # Errors
///
/// - `400 Bad Request`: A field is too long
/// - `404 Not Found`: Missing or owned by someone else
pub async fn update_tag(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(id): ApiPath<i64>,
    ApiJson(req): ApiJson<UpdateTagRequest>,
) -> ApiResult<ApiResponse<Tag>> {
    req.validate()?;

    let tag = Tag::update_for_user(
        &state.db,
        principal.user_id,
        id,
        req.name.as_deref(),
        req.color.as_deref(),
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Tag not found".to_string()))?;

    Ok(ApiResponse::success(tag))
}

/// # Errors
///
/// - `404 Not Found`: Missing or owned by someone else
pub async fn delete_tag(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<ApiResponse<()>> {
    Tag::delete_for_user(&state.db, &principal, id).await?;
    Ok(ApiResponse::message("Tag deleted"))
}
