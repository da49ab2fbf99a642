/// Community feed read model
///
/// A post is every document of every user, viewed publicly: the document row
/// joined with its author's name and its like count, plus media fields derived
/// from the content on each read. There is no posts table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::markdown::first_image_url;

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 50;

/// Author name shown when the owning user row is missing
pub const ANONYMOUS_AUTHOR: &str = "Anonymous";

const AVATAR_BASE_URL: &str = "https://ui-avatars.com/api/";

/// Foreign key from `document_likes.document_id` to `documents`
const LIKED_DOCUMENT_FK: &str = "document_likes_document_id_fkey";

/// Validated feed page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Page {
    pub page: i64,
    pub limit: i64,
}

impl Page {
    /// Clamps raw query values: `page < 1` becomes 1, a `limit` outside
    /// `1..=50` becomes 20
    pub fn clamp(page: Option<i64>, limit: Option<i64>) -> Self {
        let page = page.filter(|p| *p >= 1).unwrap_or(1);
        let limit = limit
            .filter(|l| (1..=MAX_PAGE_SIZE).contains(l))
            .unwrap_or(DEFAULT_PAGE_SIZE);

        Self { page, limit }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

/// Public view of a document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub content: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_url: Option<String>,

    pub likes_count: i64,

    /// Always zero; comments are not stored
    pub comments_count: i64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub author_name: String,
    pub author_avatar: String,
}

#[derive(sqlx::FromRow)]
struct PostRow {
    id: i64,
    user_id: i64,
    title: String,
    content: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    author_name: Option<String>,
    likes_count: i64,
}

impl From<PostRow> for Post {
    fn from(row: PostRow) -> Self {
        let media_url = first_image_url(&row.content).map(str::to_string);
        let author_name = row
            .author_name
            .unwrap_or_else(|| ANONYMOUS_AUTHOR.to_string());

        Self {
            id: row.id,
            user_id: row.user_id,
            media_type: media_url.as_ref().map(|_| "image".to_string()),
            media_url,
            title: row.title,
            content: row.content,
            likes_count: row.likes_count,
            comments_count: 0,
            created_at: row.created_at,
            updated_at: row.updated_at,
            author_avatar: avatar_url(&author_name),
            author_name,
        }
    }
}

/// Generated-avatar URL for an author name
pub fn avatar_url(name: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(name.as_bytes()).collect();
    format!("{}?name={}&background=random", AVATAR_BASE_URL, encoded)
}

const POST_SELECT: &str = r#"
    SELECT d.id, d.user_id, d.title, d.content, d.created_at, d.updated_at,
           u.username AS author_name,
           COALESCE(l.likes_count, 0) AS likes_count
    FROM documents d
    LEFT JOIN users u ON u.id = d.user_id
    LEFT JOIN (
        SELECT document_id, COUNT(*) AS likes_count
        FROM document_likes
        GROUP BY document_id
    ) l ON l.document_id = d.id
"#;

impl Post {
    /// Lists one page of the feed, most recently updated first
    pub async fn list(pool: &PgPool, page: Page) -> Result<Vec<Self>, sqlx::Error> {
        let rows = sqlx::query_as::<_, PostRow>(&format!(
            "{} ORDER BY d.updated_at DESC, d.id DESC LIMIT $1 OFFSET $2",
            POST_SELECT
        ))
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().map(Post::from).collect())
    }

    /// Total number of posts across all users
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM documents")
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let row = sqlx::query_as::<_, PostRow>(&format!("{} WHERE d.id = $1", POST_SELECT))
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(row.map(Post::from))
    }

    /// Records one like by `user_id` and returns the new like count
    ///
    /// Likes are not deduplicated.
    ///
    /// # Returns
    ///
    /// `None` if the document does not exist
    pub async fn like(
        pool: &PgPool,
        user_id: i64,
        document_id: i64,
    ) -> Result<Option<i64>, sqlx::Error> {
        let inserted = sqlx::query("INSERT INTO document_likes (user_id, document_id) VALUES ($1, $2)")
            .bind(user_id)
            .bind(document_id)
            .execute(pool)
            .await;

        match inserted {
            Ok(_) => {}
            Err(sqlx::Error::Database(e)) if e.constraint() == Some(LIKED_DOCUMENT_FK) => {
                return Ok(None);
            }
            Err(e) => return Err(e),
        }

        let count = sqlx::query_scalar("SELECT COUNT(*) FROM document_likes WHERE document_id = $1")
            .bind(document_id)
            .fetch_one(pool)
            .await?;

        Ok(Some(count))
    }
}
