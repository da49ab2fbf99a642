/// Community feed endpoints
///
/// - `GET /api/posts?page=&limit=` - Public feed, newest updated first
/// - `GET /api/posts/:id` - Single public post
/// - `POST /api/posts/:id/like` - Like a post (token required)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{ApiPath, ApiQuery},
    response::ApiResponse,
};
use axum::extract::State;
use mdnote_shared::{
    auth::principal::Principal,
    models::post::{Page, Post},
};
use serde::{Deserialize, Serialize};

/// Raw pagination query; unparseable or out-of-range values fall back to the
/// defaults instead of being rejected
#[derive(Debug, Default, Deserialize)]
pub struct FeedQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl FeedQuery {
    pub fn page(&self) -> Page {
        let number = |raw: &Option<String>| raw.as_deref().and_then(|v| v.trim().parse::<i64>().ok());
        Page::clamp(number(&self.page), number(&self.limit))
    }
}

#[derive(Debug, Serialize)]
pub struct FeedPage {
    pub list: Vec<Post>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

#[derive(Debug, Serialize)]
pub struct LikeResponse {
    pub likes_count: i64,
}

/// One page of the public feed
pub async fn list_posts(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<FeedQuery>,
) -> ApiResult<ApiResponse<FeedPage>> {
    let page = query.page();

    let list = Post::list(&state.db, page).await?;
    let total = Post::count(&state.db).await?;

    Ok(ApiResponse::success(FeedPage {
        list,
        total,
        page: page.page,
        limit: page.limit,
    }))
}

/// A single post
///
/// # Errors
///
/// - `404 Not Found`: No document with this id
pub async fn get_post(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<ApiResponse<Post>> {
    let post = Post::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Post not found".to_string()))?;

    Ok(ApiResponse::success(post))
}

/// Like a post and return its new like count
///
/// Any authenticated user may like any post, their own included, and may
/// like it more than once.
///
/// # Errors
///
/// - `404 Not Found`: No document with this id
pub async fn like_post(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<ApiResponse<LikeResponse>> {
    let likes_count = Post::like(&state.db, principal.user_id, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Post not found".to_string()))?;

    tracing::debug!(document_id = id, user_id = principal.user_id, likes_count, "Post liked");

    Ok(ApiResponse::success(LikeResponse { likes_count }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(page: &str, limit: &str) -> FeedQuery {
        FeedQuery {
            page: Some(page.to_string()),
            limit: Some(limit.to_string()),
        }
    }

    #[test]
    fn test_feed_query_accepts_missing_values() {
        let query: FeedQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query.page(), Page { page: 1, limit: 20 });
    }

    #[test]
    fn test_feed_query_unparseable_values_use_defaults() {
        assert_eq!(query("abc", "xyz").page(), Page { page: 1, limit: 20 });
        assert_eq!(query("", "1.5").page(), Page { page: 1, limit: 20 });
        assert_eq!(query("3", "oops").page(), Page { page: 3, limit: 20 });
    }

    #[test]
    fn test_feed_query_parses_numbers() {
        assert_eq!(query("2", "10").page(), Page { page: 2, limit: 10 });
        assert_eq!(query("0", "100").page(), Page { page: 1, limit: 20 });
    }

    #[test]
    fn test_feed_page_shape() {
        let body = serde_json::to_value(FeedPage {
            list: Vec::new(),
            total: 0,
            page: 2,
            limit: 10,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"list": [], "total": 0, "page": 2, "limit": 10}));
    }
}
