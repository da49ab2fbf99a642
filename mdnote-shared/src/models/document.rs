/// Document model and database operations
///
/// A document is a markdown note owned by exactly one user. Image uploads are
/// documents too: their content is a single markdown image reference and
/// `image_path` points at the stored file, relative to the upload root.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE documents (
///     id BIGSERIAL PRIMARY KEY,
///     user_id BIGINT NOT NULL REFERENCES users (id),
///     title VARCHAR(255) NOT NULL,
///     filename VARCHAR(255) NOT NULL,
///     content TEXT NOT NULL DEFAULT '',
///     file_size BIGINT NOT NULL DEFAULT 0,
///     image_path VARCHAR(512),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// Every query here that takes a document id also takes the owner's
/// `user_id`; the feed in [`super::post`] is the only cross-user read.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::auth::authorization::OwnedResource;
use crate::markdown::markdown_filename;

/// Longest accepted title; `filename` adds up to three characters for `.md`
pub const MAX_TITLE_CHARS: usize = 252;

/// Number of days covered by [`DocumentStats::daily`]
pub const HISTOGRAM_DAYS: i64 = 7;

/// Full document row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Document {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub filename: String,
    pub content: String,
    pub file_size: i64,

    /// Stored image, relative to the upload root (image documents only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OwnedResource for Document {
    const TABLE: &'static str = "documents";
    const NAME: &'static str = "Document";
}

/// Document listing entry (no content)
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct DocumentSummary {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub filename: String,
    pub file_size: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Resolved values written to a document row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentDraft {
    pub title: String,
    pub filename: String,
    pub content: String,
    pub file_size: i64,
    pub image_path: Option<String>,
}

impl DocumentDraft {
    /// Builds a text document draft
    ///
    /// Returns `None` when the title is empty after trimming.
    pub fn markdown(title: &str, content: &str) -> Option<Self> {
        let title = title.trim();
        if title.is_empty() {
            return None;
        }

        Some(Self {
            title: title.to_string(),
            filename: markdown_filename(title),
            content: content.to_string(),
            file_size: content.len() as i64,
            image_path: None,
        })
    }

    /// Builds an image document draft
    ///
    /// `file_size` is the size of the uploaded image, not of the markdown body.
    pub fn image(title: &str, content: String, file_size: i64, image_path: String) -> Self {
        Self {
            title: title.to_string(),
            filename: markdown_filename(title),
            content,
            file_size,
            image_path: Some(image_path),
        }
    }

    /// Resolves a partial update against the stored values
    ///
    /// Absent or empty (after trimming, for the title) fields fall back to the
    /// current value; filename and size are recomputed from the result.
    pub fn resolve_update(
        current: &Document,
        title: Option<&str>,
        content: Option<&str>,
    ) -> Self {
        let title = title
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(&current.title);
        let content = content.filter(|c| !c.is_empty()).unwrap_or(&current.content);

        Self {
            title: title.to_string(),
            filename: markdown_filename(title),
            content: content.to_string(),
            file_size: content.len() as i64,
            image_path: current.image_path.clone(),
        }
    }
}

/// One day of the update histogram
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: i64,
}

/// Per-user document statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentStats {
    pub total_count: i64,
    pub total_size: i64,

    /// Documents whose last update fell on the current calendar day
    pub today_count: i64,

    /// Update counts for the last seven days, oldest first
    pub daily: Vec<DailyCount>,
}

#[derive(sqlx::FromRow)]
struct StatsRow {
    today: NaiveDate,
    total_count: i64,
    total_size: i64,
    today_count: i64,
}

/// Zero-fills per-day counts into a seven-day window ending at `today`
pub fn daily_histogram(today: NaiveDate, counts: &[(NaiveDate, i64)]) -> Vec<DailyCount> {
    (0..HISTOGRAM_DAYS)
        .rev()
        .map(|days_ago| {
            let date = today - Duration::days(days_ago);
            let count = counts
                .iter()
                .find(|(d, _)| *d == date)
                .map(|(_, c)| *c)
                .unwrap_or(0);
            DailyCount { date, count }
        })
        .collect()
}

/// Escapes `%`, `_` and `\` so a keyword matches literally inside `LIKE`
fn escape_like(keyword: &str) -> String {
    let mut escaped = String::with_capacity(keyword.len());
    for c in keyword.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

const DOCUMENT_COLUMNS: &str =
    "id, user_id, title, filename, content, file_size, image_path, created_at, updated_at";

const SUMMARY_COLUMNS: &str = "id, user_id, title, filename, file_size, created_at, updated_at";

impl Document {
    /// Inserts a new document for `user_id`
    pub async fn create(
        pool: &PgPool,
        user_id: i64,
        draft: &DocumentDraft,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Document>(&format!(
            r#"
            INSERT INTO documents (user_id, title, filename, content, file_size, image_path)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            DOCUMENT_COLUMNS
        ))
        .bind(user_id)
        .bind(&draft.title)
        .bind(&draft.filename)
        .bind(&draft.content)
        .bind(draft.file_size)
        .bind(&draft.image_path)
        .fetch_one(pool)
        .await
    }

    /// Lists the user's documents, most recently updated first
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: i64,
    ) -> Result<Vec<DocumentSummary>, sqlx::Error> {
        sqlx::query_as::<_, DocumentSummary>(&format!(
            "SELECT {} FROM documents WHERE user_id = $1 ORDER BY updated_at DESC",
            SUMMARY_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Fetches a document if it exists and belongs to `user_id`
    pub async fn find_for_user(
        pool: &PgPool,
        user_id: i64,
        id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Document>(&format!(
            "SELECT {} FROM documents WHERE id = $1 AND user_id = $2",
            DOCUMENT_COLUMNS
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    /// Searches the user's documents by title or filename
    ///
    /// The caller is responsible for skipping the query on an empty keyword.
    pub async fn search_for_user(
        pool: &PgPool,
        user_id: i64,
        keyword: &str,
    ) -> Result<Vec<DocumentSummary>, sqlx::Error> {
        let pattern = format!("%{}%", escape_like(keyword));

        sqlx::query_as::<_, DocumentSummary>(&format!(
            r#"
            SELECT {}
            FROM documents
            WHERE user_id = $1 AND (title ILIKE $2 OR filename ILIKE $2)
            ORDER BY updated_at DESC
            "#,
            SUMMARY_COLUMNS
        ))
        .bind(user_id)
        .bind(pattern)
        .fetch_all(pool)
        .await
    }

    /// Writes resolved title, filename, content and size
    ///
    /// # Returns
    ///
    /// The updated row, or `None` if the document is missing or foreign
    pub async fn update_for_user(
        pool: &PgPool,
        user_id: i64,
        id: i64,
        draft: &DocumentDraft,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Document>(&format!(
            r#"
            UPDATE documents
            SET title = $3, filename = $4, content = $5, file_size = $6, updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING {}
            "#,
            DOCUMENT_COLUMNS
        ))
        .bind(id)
        .bind(user_id)
        .bind(&draft.title)
        .bind(&draft.filename)
        .bind(&draft.content)
        .bind(draft.file_size)
        .fetch_optional(pool)
        .await
    }

    /// Deletes a document owned by `user_id`
    ///
    /// Join rows in `document_tags` and `document_likes` go with it
    /// (`ON DELETE CASCADE`).
    ///
    /// # Returns
    ///
    /// The deleted row's image path (outer `None` if nothing was deleted)
    pub async fn delete_for_user(
        pool: &PgPool,
        user_id: i64,
        id: i64,
    ) -> Result<Option<Option<String>>, sqlx::Error> {
        let deleted: Option<(Option<String>,)> = sqlx::query_as(
            "DELETE FROM documents WHERE id = $1 AND user_id = $2 RETURNING image_path",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(deleted.map(|(path,)| path))
    }

    /// Computes totals and the seven-day update histogram for `user_id`
    ///
    /// Calendar days follow the database session's time zone.
    pub async fn stats_for_user(pool: &PgPool, user_id: i64) -> Result<DocumentStats, sqlx::Error> {
        let totals = sqlx::query_as::<_, StatsRow>(
            r#"
            SELECT CURRENT_DATE AS today,
                   COUNT(*) AS total_count,
                   COALESCE(SUM(file_size), 0)::BIGINT AS total_size,
                   COUNT(*) FILTER (WHERE updated_at::date = CURRENT_DATE) AS today_count
            FROM documents
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        let counts: Vec<(NaiveDate, i64)> = sqlx::query_as(
            r#"
            SELECT updated_at::date AS day, COUNT(*) AS count
            FROM documents
            WHERE user_id = $1 AND updated_at >= CURRENT_DATE - ($2::INT - 1)
            GROUP BY day
            ORDER BY day
            "#,
        )
        .bind(user_id)
        .bind(HISTOGRAM_DAYS as i32)
        .fetch_all(pool)
        .await?;

        Ok(DocumentStats {
            total_count: totals.total_count,
            total_size: totals.total_size,
            today_count: totals.today_count,
            daily: daily_histogram(totals.today, &counts),
        })
    }
}
