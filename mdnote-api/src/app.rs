/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use mdnote_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url()?).await?;
/// let state = AppState::new(pool, config);
/// let app = mdnote_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, middleware, storage::ImageStore};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};
use mdnote_shared::auth::jwt::TokenManager;
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Largest accepted request body (image uploads included)
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Shared application state
///
/// Cloned into every handler through Axum's `State` extractor; every field
/// is cheap to clone.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Token signing and verification
    pub tokens: TokenManager,

    /// Uploaded image storage
    pub images: ImageStore,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        let tokens = TokenManager::new(&config.jwt.secret, config.jwt.expiry_hours);
        let images = ImageStore::new(config.upload.dir.clone());

        Self {
            db,
            config: Arc::new(config),
            tokens,
            images,
        }
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                        # Health check (public)
/// ├── /uploads/*                     # Uploaded files (public, static)
/// └── /api/
///     ├── /auth/register, /auth/login    # public
///     ├── /posts, /posts/:id             # public
///     └── everything else                # bearer token required
/// ```
///
/// # Middleware Stack
///
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Authentication (protected routes only)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let public_routes = Router::new()
        .route("/auth/register", post(routes::auth::register))
        .route("/auth/login", post(routes::auth::login))
        .route("/posts", get(routes::posts::list_posts))
        .route("/posts/:id", get(routes::posts::get_post));

    let protected_routes = Router::new()
        .route(
            "/users/profile",
            get(routes::auth::get_profile).put(routes::users::update_profile),
        )
        .route("/users", get(routes::users::list_users))
        .route(
            "/documents",
            get(routes::documents::list_documents).post(routes::documents::create_document),
        )
        .route("/documents/search", get(routes::documents::search_documents))
        .route("/documents/stats", get(routes::documents::document_stats))
        .route("/documents/images", post(routes::documents::upload_image))
        .route(
            "/documents/:id",
            get(routes::documents::get_document)
                .put(routes::documents::update_document)
                .delete(routes::documents::delete_document),
        )
        .route(
            "/documents/:id/tags",
            get(routes::documents::get_document_tags).put(routes::documents::set_document_tags),
        )
        .route("/posts/:id/like", post(routes::posts::like_post))
        .route(
            "/tags",
            get(routes::tags::list_tags).post(routes::tags::create_tag),
        )
        .route(
            "/tags/:id",
            put(routes::tags::update_tag).delete(routes::tags::delete_tag),
        )
        .route(
            "/tasks",
            get(routes::tasks::list_tasks).post(routes::tasks::create_task),
        )
        .route(
            "/tasks/:id",
            put(routes::tasks::update_task).delete(routes::tasks::delete_task),
        )
        .route("/tasks/:id/tags", get(routes::tasks::get_task_tags))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_auth,
        ));

    let api_routes = Router::new().merge(public_routes).merge(protected_routes);

    let cors = middleware::cors::cors_layer(&state.config);
    let uploads = ServeDir::new(state.images.root());

    Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/api", api_routes)
        .nest_service("/uploads", uploads)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}
