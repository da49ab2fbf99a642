/// Tag model and tag assignment
///
/// Tags are user-owned labels attached to documents (`document_tags`) and
/// tasks (`task_tags`). Assignment always goes through [`reassign_tags`],
/// which replaces the full set inside the caller's transaction and silently
/// drops ids the caller does not own.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tags (
///     id BIGSERIAL PRIMARY KEY,
///     user_id BIGINT NOT NULL REFERENCES users (id),
///     name VARCHAR(50) NOT NULL,
///     color VARCHAR(20) NOT NULL DEFAULT '#3b82f6',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};

use crate::auth::authorization::{assert_owner, AuthzError, OwnedResource};
use crate::auth::principal::Principal;

/// Color given to tags created without one
pub const DEFAULT_TAG_COLOR: &str = "#3b82f6";

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Tag {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub color: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OwnedResource for Tag {
    const TABLE: &'static str = "tags";
    const NAME: &'static str = "Tag";
}

/// Parent of a tag assignment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagTarget {
    Document,
    Task,
}

impl TagTarget {
    fn join_table(self) -> &'static str {
        match self {
            TagTarget::Document => "document_tags",
            TagTarget::Task => "task_tags",
        }
    }

    fn parent_column(self) -> &'static str {
        match self {
            TagTarget::Document => "document_id",
            TagTarget::Task => "task_id",
        }
    }
}

/// Trims `value` and maps blank input to `None`
fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

const TAG_COLUMNS: &str = "id, user_id, name, color, created_at, updated_at";

impl Tag {
    /// Lists the user's tags, newest first
    pub async fn list_for_user(pool: &PgPool, user_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Tag>(&format!(
            "SELECT {} FROM tags WHERE user_id = $1 ORDER BY created_at DESC",
            TAG_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Creates a tag; a missing or blank color falls back to [`DEFAULT_TAG_COLOR`]
    ///
    /// The caller rejects blank names before calling this.
    pub async fn create(
        pool: &PgPool,
        user_id: i64,
        name: &str,
        color: Option<&str>,
    ) -> Result<Self, sqlx::Error> {
        let color = non_blank(color).unwrap_or(DEFAULT_TAG_COLOR);

        sqlx::query_as::<_, Tag>(&format!(
            "INSERT INTO tags (user_id, name, color) VALUES ($1, $2, $3) RETURNING {}",
            TAG_COLUMNS
        ))
        .bind(user_id)
        .bind(name.trim())
        .bind(color)
        .fetch_one(pool)
        .await
    }

    /// Renames or recolors a tag; blank fields keep their stored value
    ///
    /// # Returns
    ///
    /// The updated tag, or `None` if it is missing or foreign
    pub async fn update_for_user(
        pool: &PgPool,
        user_id: i64,
        id: i64,
        name: Option<&str>,
        color: Option<&str>,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Tag>(&format!(
            r#"
            UPDATE tags
            SET name = COALESCE($3, name),
                color = COALESCE($4, color),
                updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING {}
            "#,
            TAG_COLUMNS
        ))
        .bind(id)
        .bind(user_id)
        .bind(non_blank(name))
        .bind(non_blank(color))
        .fetch_optional(pool)
        .await
    }

    /// Deletes a tag and every assignment referencing it, in one transaction
    pub async fn delete_for_user(
        pool: &PgPool,
        principal: &Principal,
        id: i64,
    ) -> Result<(), AuthzError> {
        let mut tx = pool.begin().await?;

        assert_owner::<Tag, _>(&mut *tx, principal, id).await?;

        sqlx::query("DELETE FROM document_tags WHERE tag_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM task_tags WHERE tag_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM tags WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(principal.user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(tag_id = id, user_id = principal.user_id, "Tag deleted");
        Ok(())
    }

    /// Lists the tags attached to a document or task, by name
    ///
    /// The caller checks ownership of the parent first.
    pub async fn list_for(
        pool: &PgPool,
        target: TagTarget,
        parent_id: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let sql = format!(
            r#"
            SELECT t.id, t.user_id, t.name, t.color, t.created_at, t.updated_at
            FROM tags t
            JOIN {join} j ON j.tag_id = t.id
            WHERE j.{parent} = $1
            ORDER BY t.name
            "#,
            join = target.join_table(),
            parent = target.parent_column(),
        );

        sqlx::query_as::<_, Tag>(&sql)
            .bind(parent_id)
            .fetch_all(pool)
            .await
    }
}

/// Replaces the tag set of a document or task
///
/// Runs on the caller's connection so it joins their transaction. Every
/// existing assignment of `parent_id` is removed, then one row is inserted per
/// distinct id in `tag_ids` that names a tag owned by `user_id`.
///
/// # Returns
///
/// Number of assignments written
pub async fn reassign_tags(
    conn: &mut PgConnection,
    target: TagTarget,
    user_id: i64,
    parent_id: i64,
    tag_ids: &[i64],
) -> Result<u64, sqlx::Error> {
    let (join, parent) = (target.join_table(), target.parent_column());

    sqlx::query(&format!("DELETE FROM {} WHERE {} = $1", join, parent))
        .bind(parent_id)
        .execute(&mut *conn)
        .await?;

    if tag_ids.is_empty() {
        return Ok(0);
    }

    let inserted = sqlx::query(&format!(
        r#"
        INSERT INTO {join} ({parent}, tag_id)
        SELECT $1, id FROM tags WHERE id = ANY($2) AND user_id = $3
        ON CONFLICT DO NOTHING
        "#,
        join = join,
        parent = parent,
    ))
    .bind(parent_id)
    .bind(tag_ids)
    .bind(user_id)
    .execute(&mut *conn)
    .await?
    .rows_affected();

    if inserted < tag_ids.len() as u64 {
        tracing::debug!(
            parent_id,
            requested = tag_ids.len(),
            inserted,
            "Skipped unknown, foreign or duplicate tag ids"
        );
    }

    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_target_tables() {
        assert_eq!(TagTarget::Document.join_table(), "document_tags");
        assert_eq!(TagTarget::Document.parent_column(), "document_id");
        assert_eq!(TagTarget::Task.join_table(), "task_tags");
        assert_eq!(TagTarget::Task.parent_column(), "task_id");
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some("  red ")), Some("red"));
        assert_eq!(non_blank(Some("   ")), None);
        assert_eq!(non_blank(None), None);
    }
}
