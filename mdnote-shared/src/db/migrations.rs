/// Schema bootstrap: database creation, migrations, seed rows
///
/// On first start against an empty server the service creates its own
/// database, applies the SQL files in `mdnote-shared/migrations/`, and inserts
/// the default accounts. Each step is idempotent, so it runs on every start.
///
/// # Example
///
/// ```no_run
/// use mdnote_shared::db::migrations::{ensure_database_exists, run_migrations, seed_default_users};
/// use mdnote_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = DatabaseConfig {
///     url: std::env::var("DATABASE_URL")?,
///     ..Default::default()
/// };
///
/// ensure_database_exists(&config.url).await?;
/// let pool = create_pool(&config).await?;
/// run_migrations(&pool).await?;
/// seed_default_users(&pool).await?;
/// # Ok(())
/// # }
/// ```

use sqlx::{migrate::MigrateDatabase, postgres::PgPool, Postgres};
use tracing::{debug, info, warn};

use crate::auth::password::{hash_password, PasswordError};

/// Usernames and emails of the accounts created on first run
pub const DEFAULT_USERS: [(&str, &str); 2] = [
    ("admin", "admin@example.com"),
    ("testuser", "test@example.com"),
];

/// Password shared by the default accounts
pub const DEFAULT_PASSWORD: &str = "123456";

/// Error type for seeding
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Runs all pending migrations
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    info!("Starting database migrations");

    match sqlx::migrate!("./migrations").run(pool).await {
        Ok(()) => {
            info!("All database migrations completed successfully");
            Ok(())
        }
        Err(e) => {
            warn!("Migration failed: {}", e);
            Err(e)
        }
    }
}

/// Creates the database named in `database_url` if it doesn't exist
pub async fn ensure_database_exists(database_url: &str) -> Result<(), sqlx::Error> {
    if !Postgres::database_exists(database_url).await? {
        info!("Database does not exist, creating it");
        Postgres::create_database(database_url).await?;
        info!("Database created successfully");
    } else {
        debug!("Database already exists");
    }

    Ok(())
}

/// Inserts the default accounts unless they already exist
///
/// Existing rows are left untouched, including their passwords.
///
/// # Returns
///
/// Number of accounts that were created
pub async fn seed_default_users(pool: &PgPool) -> Result<u64, SeedError> {
    let mut created = 0;

    for (username, email) in DEFAULT_USERS {
        let password_hash = hash_password(DEFAULT_PASSWORD)?;

        let result = sqlx::query(
            r#"
            INSERT INTO users (username, email, password_hash)
            VALUES ($1, $2, $3)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .execute(pool)
        .await?;

        created += result.rows_affected();
    }

    if created > 0 {
        info!(created, "Seeded default user accounts");
    } else {
        debug!("Default user accounts already present");
    }

    Ok(created)
}
