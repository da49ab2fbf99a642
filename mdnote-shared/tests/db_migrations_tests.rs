/// Integration tests for migrations and seeding
///
/// Requires PostgreSQL; skipped when `DATABASE_URL` is unset.

use mdnote_shared::db::migrations::{run_migrations, seed_default_users, DEFAULT_USERS};
use mdnote_shared::db::pool::{create_pool, DatabaseConfig};
use mdnote_shared::models::user::User;
use sqlx::PgPool;

async fn migrated_pool() -> Option<PgPool> {
    let url = std::env::var("DATABASE_URL").ok()?;
    let pool = create_pool(&DatabaseConfig {
        url,
        max_connections: 2,
        min_connections: 0,
        ..Default::default()
    })
    .await
    .expect("pool should connect");

    run_migrations(&pool).await.expect("migrations should apply");
    Some(pool)
}

async fn table_exists(pool: &PgPool, table: &str) -> bool {
    sqlx::query_scalar(
        r#"
        SELECT EXISTS (
            SELECT 1 FROM information_schema.tables
            WHERE table_schema = 'public' AND table_name = $1
        )
        "#,
    )
    .bind(table)
    .fetch_one(pool)
    .await
    .unwrap()
}

#[tokio::test]
async fn test_migrations_create_all_tables() {
    let Some(pool) = migrated_pool().await else {
        eprintln!("DATABASE_URL not set, skipping");
        return;
    };

    for table in [
        "users",
        "documents",
        "document_likes",
        "tags",
        "document_tags",
        "tasks",
        "task_tags",
    ] {
        assert!(table_exists(&pool, table).await, "missing table {}", table);
    }
}

#[tokio::test]
async fn test_migrations_are_idempotent() {
    let Some(pool) = migrated_pool().await else {
        eprintln!("DATABASE_URL not set, skipping");
        return;
    };

    assert!(run_migrations(&pool).await.is_ok());
}

#[tokio::test]
async fn test_seed_is_idempotent_and_keeps_passwords() {
    let Some(pool) = migrated_pool().await else {
        eprintln!("DATABASE_URL not set, skipping");
        return;
    };

    seed_default_users(&pool).await.expect("first seed");

    let (username, _) = DEFAULT_USERS[0];
    let before = User::find_by_username(&pool, username)
        .await
        .unwrap()
        .expect("seeded user exists");

    let created = seed_default_users(&pool).await.expect("second seed");
    assert_eq!(created, 0);

    let after = User::find_by_username(&pool, username).await.unwrap().unwrap();
    assert_eq!(before.id, after.id);
    assert_eq!(before.password_hash, after.password_hash);
}

#[tokio::test]
async fn test_task_status_check_constraint() {
    let Some(pool) = migrated_pool().await else {
        eprintln!("DATABASE_URL not set, skipping");
        return;
    };

    seed_default_users(&pool).await.unwrap();
    let user = User::find_by_username(&pool, DEFAULT_USERS[0].0).await.unwrap().unwrap();

    let result = sqlx::query("INSERT INTO tasks (user_id, title, status) VALUES ($1, 'x', 'archived')")
        .bind(user.id)
        .execute(&pool)
        .await;

    assert!(result.is_err());
}
