/// Ownership checks for user-scoped resources
///
/// Documents, tags and tasks belong to exactly one user. Every handler that
/// touches one of them by id goes through [`assert_owner`] (or a model query
/// carrying the same `user_id` predicate), so guessing another user's numeric
/// id yields the same answer as asking for an id that does not exist.
///
/// # Example
///
/// ```no_run
/// use mdnote_shared::auth::authorization::assert_owner;
/// use mdnote_shared::auth::principal::Principal;
/// use mdnote_shared::models::document::Document;
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool, principal: Principal) -> Result<(), Box<dyn std::error::Error>> {
/// assert_owner::<Document, _>(&pool, &principal, 17).await?;
///
/// // Inside a transaction
/// let mut tx = pool.begin().await?;
/// assert_owner::<Document, _>(&mut *tx, &principal, 17).await?;
/// tx.commit().await?;
/// # Ok(())
/// # }
/// ```

use sqlx::PgExecutor;

use super::principal::Principal;

/// Error type for authorization checks
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    /// Resource does not exist or belongs to someone else
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Database error
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

/// A table whose rows carry an owning `user_id`
pub trait OwnedResource {
    /// Table name used in the ownership query
    const TABLE: &'static str;

    /// Human-readable resource name for error messages
    const NAME: &'static str;
}

/// Fails with [`AuthzError::NotFound`] unless `id` exists in `R::TABLE` and
/// is owned by `principal`
pub async fn assert_owner<'e, R, E>(
    executor: E,
    principal: &Principal,
    id: i64,
) -> Result<(), AuthzError>
where
    R: OwnedResource,
    E: PgExecutor<'e>,
{
    let owned = is_owner::<R, E>(executor, principal.user_id, id).await?;

    if !owned {
        tracing::debug!(
            resource = R::NAME,
            id,
            user_id = principal.user_id,
            "Ownership check failed"
        );
        return Err(AuthzError::NotFound(R::NAME));
    }

    Ok(())
}

/// Returns whether `id` exists in `R::TABLE` and belongs to `user_id`
pub async fn is_owner<'e, R, E>(executor: E, user_id: i64, id: i64) -> Result<bool, sqlx::Error>
where
    R: OwnedResource,
    E: PgExecutor<'e>,
{
    let sql = ownership_query(R::TABLE);

    sqlx::query_scalar::<_, bool>(&sql)
        .bind(id)
        .bind(user_id)
        .fetch_one(executor)
        .await
}

fn ownership_query(table: &str) -> String {
    format!(
        "SELECT EXISTS (SELECT 1 FROM {} WHERE id = $1 AND user_id = $2)",
        table
    )
}
