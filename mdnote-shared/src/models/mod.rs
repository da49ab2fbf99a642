/// Database models for mdnote
///
/// Each model owns its SQL. Runtime `query_as` is used throughout so the crate
/// builds without a live database.
///
/// # Models
///
/// - `user`: accounts and profiles
/// - `document`: markdown documents and image uploads
/// - `post`: public feed view over documents, with likes
/// - `tag`: user labels and their assignment to documents and tasks
/// - `task`: per-user to-do items
///
/// # Example
///
/// ```no_run
/// use mdnote_shared::models::user::{CreateUser, User};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
/// let user = User::create(&pool, CreateUser {
///     username: "alice".to_string(),
///     email: "alice@example.com".to_string(),
///     password_hash: "$argon2id$...".to_string(),
/// }).await?;
/// # Ok(())
/// # }
/// ```

pub mod document;
pub mod post;
pub mod tag;
pub mod task;
pub mod user;
