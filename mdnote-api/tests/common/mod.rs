/// Common test utilities for integration tests
///
/// This module provides shared infrastructure for integration tests:
/// - A migrated database pool (from `DATABASE_URL`)
/// - The full router over that pool
/// - Helpers to register users and send JSON requests

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use mdnote_api::{
    app::{build_router, AppState},
    config::{CorsConfig, Config, DatabaseConfig, JwtConfig, ServerConfig, ServerMode, UploadConfig},
};
use mdnote_shared::db::{
    migrations::run_migrations,
    pool::{create_pool, DatabaseConfig as PoolConfig},
};
use serde_json::{json, Value};
use sqlx::PgPool;
use std::path::PathBuf;
use tower::ServiceExt;

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: PgPool,
    pub app: Router,
    pub upload_dir: PathBuf,
}

/// A registered user and their token
pub struct TestUser {
    pub id: i64,
    pub username: String,
    pub token: String,
}

impl TestUser {
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

/// Status and parsed JSON body of a response
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestResponse {
    /// The `data` field of a success envelope
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }
}

/// Random suffix for usernames and emails
pub fn unique(prefix: &str) -> String {
    let bytes: [u8; 6] = rand::random();
    format!("{}{}", prefix, hex::encode(bytes))
}

impl TestContext {
    /// Creates a test context, or `None` when `DATABASE_URL` is unset
    pub async fn new() -> Option<Self> {
        let url = match std::env::var("DATABASE_URL") {
            Ok(url) => url,
            Err(_) => {
                eprintln!("DATABASE_URL not set, skipping");
                return None;
            }
        };

        let db = create_pool(&PoolConfig {
            url,
            max_connections: 5,
            min_connections: 0,
            ..Default::default()
        })
        .await
        .expect("pool should connect");

        run_migrations(&db).await.expect("migrations should apply");

        let upload_dir = std::env::temp_dir().join(unique("mdnote-it-"));

        let config = Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                mode: ServerMode::Debug,
            },
            database: DatabaseConfig {
                host: "unused".to_string(),
                port: 5432,
                user: "unused".to_string(),
                password: "unused".to_string(),
                name: "unused".to_string(),
                max_connections: 5,
                seed: false,
            },
            jwt: JwtConfig {
                secret: "integration-test-secret-at-least-32-bytes".to_string(),
                expiry_hours: 1,
            },
            cors: CorsConfig {
                allowed_origins: Vec::new(),
            },
            upload: UploadConfig {
                dir: upload_dir.clone(),
            },
        };

        let app = build_router(AppState::new(db.clone(), config));

        Some(Self { db, app, upload_dir })
    }

    /// Sends a request with an optional JSON body and bearer token
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&TestUser>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(user) = token {
            builder = builder.header(header::AUTHORIZATION, user.auth_header());
        }

        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        self.send(builder.body(body).unwrap()).await
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }

    /// Registers a fresh user and returns their token
    pub async fn register(&self) -> TestUser {
        let username = unique("u");
        let response = self
            .request(
                Method::POST,
                "/api/auth/register",
                None,
                Some(json!({
                    "username": username,
                    "email": format!("{}@example.com", username),
                    "password": "secret1",
                })),
            )
            .await;

        assert_eq!(response.status, StatusCode::OK, "register failed: {}", response.body);

        TestUser {
            id: response.data()["user"]["id"].as_i64().unwrap(),
            username,
            token: response.data()["token"].as_str().unwrap().to_string(),
        }
    }

    /// Creates a markdown document and returns its id
    pub async fn create_document(&self, user: &TestUser, title: &str, content: &str) -> i64 {
        let response = self
            .request(
                Method::POST,
                "/api/documents",
                Some(user),
                Some(json!({ "title": title, "content": content })),
            )
            .await;

        assert_eq!(response.status, StatusCode::OK, "create failed: {}", response.body);
        response.data()["id"].as_i64().unwrap()
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.upload_dir);
    }
}
