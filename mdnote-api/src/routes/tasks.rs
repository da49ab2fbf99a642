/// Task endpoints
///
/// - `GET /api/tasks?status=` - The caller's tasks, newest first
/// - `POST /api/tasks` - Create a task
/// - `PUT /api/tasks/:id` - Partial update
/// - `DELETE /api/tasks/:id` - Delete a task
/// - `GET /api/tasks/:id/tags` - Tags attached to a task

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{ApiJson, ApiPath, ApiQuery},
    response::ApiResponse,
    routes::tags::TagList,
};
use axum::extract::State;
use mdnote_shared::{
    auth::{authorization::assert_owner, principal::Principal},
    models::{
        tag::{Tag, TagTarget},
        task::{CreateTask, Task, TaskStatus, UpdateTask},
    },
};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Default, Deserialize)]
pub struct TaskQuery {
    pub status: Option<String>,
}

impl TaskQuery {
    /// Parses the status filter; a blank value means no filter
    pub fn status_filter(&self) -> Result<Option<TaskStatus>, ApiError> {
        match self.status.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => raw
                .parse::<TaskStatus>()
                .map(Some)
                .map_err(|e| ApiError::BadRequest(e.to_string())),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TaskList {
    pub list: Vec<Task>,
}

/// # Errors
///
/// - `400 Bad Request`: Unknown `status` value
pub async fn list_tasks(
    State(state): State<AppState>,
    principal: Principal,
    ApiQuery(query): ApiQuery<TaskQuery>,
) -> ApiResult<ApiResponse<TaskList>> {
    let status = query.status_filter()?;

    let list = Task::list_for_user(&state.db, principal.user_id, status).await?;
    Ok(ApiResponse::success(TaskList { list }))
}

/// Create a task in the `pending` state
///
/// # Endpoint
///
/// ```text
/// POST /api/tasks
/// Content-Type: application/json
///
/// {
///   "title": "Write report",
///   "priority": "high",
///   "due_date": "2026-03-01T09:00:00Z",
///   "tag_ids": [1, 4]
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Title is empty or too long, or an unknown priority
pub async fn create_task(
    State(state): State<AppState>,
    principal: Principal,
    ApiJson(req): ApiJson<CreateTask>,
) -> ApiResult<ApiResponse<Task>> {
    req.validate()?;

    if req.title.is_empty() {
        return Err(ApiError::BadRequest("Task title is required".to_string()));
    }

    let task = Task::create(&state.db, principal.user_id, req).await?;
    Ok(ApiResponse::success(task))
}

/// Partial update
///
/// Setting `status` also sets `completed_at` (to now for `completed`, cleared
/// otherwise). `"due_date": null` clears the due date.
///
/// # Errors
///
/// - `400 Bad Request`: Title too long
/// - `404 Not Found`: Missing or owned by someone else
pub async fn update_task(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(id): ApiPath<i64>,
    ApiJson(req): ApiJson<UpdateTask>,
) -> ApiResult<ApiResponse<Task>> {
    req.validate()?;

    let task = Task::update_for_user(&state.db, &principal, id, req).await?;
    Ok(ApiResponse::success(task))
}

/// # Errors
///
/// - `404 Not Found`: Missing or owned by someone else
pub async fn delete_task(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<ApiResponse<()>> {
    Task::delete_for_user(&state.db, &principal, id).await?;
    Ok(ApiResponse::message("Task deleted"))
}

pub async fn get_task_tags(
    State(state): State<AppState>,
    principal: Principal,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<ApiResponse<TagList>> {
    assert_owner::<Task, _>(&state.db, &principal, id).await?;

    let list = Tag::list_for(&state.db, TagTarget::Task, id).await?;
    Ok(ApiResponse::success(TagList { list }))
}
