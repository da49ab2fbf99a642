/// Task model and database operations
///
/// Tasks are a per-user to-do list with a status, a priority, an optional due
/// date and tags. `completed_at` tracks the status: it is set whenever a task
/// is moved to `completed` and cleared when it is moved anywhere else.
///
/// # Status
///
/// ```text
/// pending ⇄ in_progress ⇄ completed
/// ```
///
/// Any status may follow any other.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     id BIGSERIAL PRIMARY KEY,
///     user_id BIGINT NOT NULL REFERENCES users (id),
///     title VARCHAR(255) NOT NULL,
///     description TEXT NOT NULL DEFAULT '',
///     status VARCHAR(20) NOT NULL DEFAULT 'pending',
///     priority VARCHAR(20) NOT NULL DEFAULT 'medium',
///     due_date TIMESTAMPTZ,
///     completed_at TIMESTAMPTZ,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use mdnote_shared::auth::principal::Principal;
/// use mdnote_shared::models::task::{CreateTask, Task, TaskStatus, UpdateTask};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool, principal: Principal) -> Result<(), Box<dyn std::error::Error>> {
/// let task = Task::create(&pool, principal.user_id, CreateTask {
///     title: "Write release notes".to_string(),
///     ..Default::default()
/// }).await?;
///
/// Task::update_for_user(&pool, &principal, task.id, UpdateTask {
///     status: Some(TaskStatus::Completed),
///     ..Default::default()
/// }).await?;
/// # Ok(())
/// # }
/// ```

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::PgPool;
use validator::Validate;

use super::tag::{reassign_tags, TagTarget};
use crate::auth::authorization::{assert_owner, AuthzError, OwnedResource};
use crate::auth::principal::Principal;
use crate::input::{trimmed, trimmed_option};

/// Unrecognized status or priority string
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind}: {value}")]
pub struct ParseTaskFieldError {
    kind: &'static str,
    value: String,
}

/// Task progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, TaskStatus::Completed)
    }
}

impl FromStr for TaskStatus {
    type Err = ParseTaskFieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TaskStatus::Pending),
            "in_progress" => Ok(TaskStatus::InProgress),
            "completed" => Ok(TaskStatus::Completed),
            other => Err(ParseTaskFieldError {
                kind: "status",
                value: other.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for TaskStatus {
    type Error = ParseTaskFieldError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Task priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

impl TaskPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
        }
    }
}

impl FromStr for TaskPriority {
    type Err = ParseTaskFieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(TaskPriority::Low),
            "medium" => Ok(TaskPriority::Medium),
            "high" => Ok(TaskPriority::High),
            other => Err(ParseTaskFieldError {
                kind: "priority",
                value: other.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for TaskPriority {
    type Error = ParseTaskFieldError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    pub id: i64,

    pub user_id: i64,

    pub title: String,

    pub description: String,

    #[sqlx(try_from = "String")]
    pub status: TaskStatus,

    #[sqlx(try_from = "String")]
    pub priority: TaskPriority,

    pub due_date: Option<DateTime<Utc>>,

    /// Set while the status is `completed`
    pub completed_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl OwnedResource for Task {
    const TABLE: &'static str = "tasks";
    const NAME: &'static str = "Task";
}

/// Input for creating a task; new tasks always start as `pending`
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CreateTask {
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(max = 255, message = "must be at most 255 characters"))]
    pub title: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub priority: Option<TaskPriority>,

    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,

    #[serde(default)]
    pub tag_ids: Option<Vec<i64>>,
}

/// Partial task update
///
/// `None` keeps the stored value. `due_date` distinguishes an absent field
/// (`None`) from an explicit `null` (`Some(None)`), which clears it.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateTask {
    #[serde(default, deserialize_with = "trimmed_option")]
    #[validate(length(max = 255, message = "must be at most 255 characters"))]
    pub title: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub status: Option<TaskStatus>,

    #[serde(default)]
    pub priority: Option<TaskPriority>,

    #[serde(default, deserialize_with = "deserialize_present")]
    pub due_date: Option<Option<DateTime<Utc>>>,

    /// Replaces the tag set when present, even if empty
    #[serde(default)]
    pub tag_ids: Option<Vec<i64>>,
}

/// Wraps any present value, `null` included, in `Some`
fn deserialize_present<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

const TASK_COLUMNS: &str = "id, user_id, title, description, status, priority, due_date, \
                            completed_at, created_at, updated_at";

impl Task {
    /// Creates a pending task and attaches the caller's tags, in one transaction
    pub async fn create(pool: &PgPool, user_id: i64, data: CreateTask) -> Result<Self, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let task = sqlx::query_as::<_, Task>(&format!(
            r#"
            INSERT INTO tasks (user_id, title, description, status, priority, due_date)
            VALUES ($1, $2, $3, 'pending', $4, $5)
            RETURNING {}
            "#,
            TASK_COLUMNS
        ))
        .bind(user_id)
        .bind(data.title.trim())
        .bind(data.description.unwrap_or_default())
        .bind(data.priority.unwrap_or_default().as_str())
        .bind(data.due_date)
        .fetch_one(&mut *tx)
        .await?;

        if let Some(tag_ids) = &data.tag_ids {
            reassign_tags(&mut *tx, TagTarget::Task, user_id, task.id, tag_ids).await?;
        }

        tx.commit().await?;

        tracing::info!(task_id = task.id, user_id, "Task created");
        Ok(task)
    }

    /// Lists the user's tasks, newest first, optionally by status
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: i64,
        status: Option<TaskStatus>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(&format!(
            r#"
            SELECT {}
            FROM tasks
            WHERE user_id = $1 AND ($2::VARCHAR IS NULL OR status = $2)
            ORDER BY created_at DESC
            "#,
            TASK_COLUMNS
        ))
        .bind(user_id)
        .bind(status.map(|s| s.as_str()))
        .fetch_all(pool)
        .await
    }

    /// Applies a partial update in one transaction
    ///
    /// Order: ownership check, field update, `completed_at` (only when a
    /// status is supplied), tag reassignment (only when `tag_ids` is supplied).
    /// A blank title keeps the stored one.
    pub async fn update_for_user(
        pool: &PgPool,
        principal: &Principal,
        id: i64,
        data: UpdateTask,
    ) -> Result<Self, AuthzError> {
        let mut tx = pool.begin().await?;

        assert_owner::<Task, _>(&mut *tx, principal, id).await?;

        let title = data
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty());
        let (set_due_date, due_date) = match data.due_date {
            Some(due_date) => (true, due_date),
            None => (false, None),
        };

        let mut task = sqlx::query_as::<_, Task>(&format!(
            r#"
            UPDATE tasks
            SET title = COALESCE($3, title),
                description = COALESCE($4, description),
                status = COALESCE($5, status),
                priority = COALESCE($6, priority),
                due_date = CASE WHEN $7 THEN $8 ELSE due_date END,
                updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING {}
            "#,
            TASK_COLUMNS
        ))
        .bind(id)
        .bind(principal.user_id)
        .bind(title)
        .bind(data.description.as_deref())
        .bind(data.status.map(|s| s.as_str()))
        .bind(data.priority.map(|p| p.as_str()))
        .bind(set_due_date)
        .bind(due_date)
        .fetch_one(&mut *tx)
        .await?;

        if let Some(status) = data.status {
            task = sqlx::query_as::<_, Task>(&format!(
                r#"
                UPDATE tasks
                SET completed_at = CASE WHEN $2 THEN NOW() ELSE NULL END
                WHERE id = $1
                RETURNING {}
                "#,
                TASK_COLUMNS
            ))
            .bind(id)
            .bind(status.is_completed())
            .fetch_one(&mut *tx)
            .await?;
        }

        if let Some(tag_ids) = &data.tag_ids {
            reassign_tags(&mut *tx, TagTarget::Task, principal.user_id, id, tag_ids).await?;
        }

        tx.commit().await?;

        tracing::debug!(task_id = id, user_id = principal.user_id, "Task updated");
        Ok(task)
    }

    /// Deletes a task and its tag assignments, in one transaction
    pub async fn delete_for_user(
        pool: &PgPool,
        principal: &Principal,
        id: i64,
    ) -> Result<(), AuthzError> {
        let mut tx = pool.begin().await?;

        assert_owner::<Task, _>(&mut *tx, principal, id).await?;

        sqlx::query("DELETE FROM task_tags WHERE task_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM tasks WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(principal.user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(task_id = id, user_id = principal.user_id, "Task deleted");
        Ok(())
    }
}
