/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /api/auth/register` - Register new user
/// - `POST /api/auth/login` - Login and get a token
/// - `GET /api/users/profile` - Current user's profile (token required)
///
/// Tokens are HS256 JWTs valid for `JWT_EXPIRY` hours. There is no refresh
/// endpoint; clients log in again once a token expires.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::ApiJson,
    response::ApiResponse,
};
use axum::extract::State;
use mdnote_shared::{
    auth::{password, principal::Principal},
    input::trimmed,
    models::user::{CreateUser, User, UserSummary},
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Same message for unknown usernames and wrong passwords
const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Register request; username and email are trimmed before validation
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 3, max = 50, message = "must be between 3 and 50 characters"))]
    pub username: String,

    #[serde(deserialize_with = "trimmed")]
    #[validate(
        email(message = "must be a valid email address"),
        length(max = 100, message = "must be at most 100 characters")
    )]
    pub email: String,

    #[validate(length(min = 6, message = "must be at least 6 characters"))]
    pub password: String,
}

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// User fields returned next to a token
#[derive(Debug, Serialize)]
pub struct AuthUser {
    pub id: i64,
    pub username: String,
    pub email: String,
}

/// Register and login response
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: AuthUser,
}

impl AuthResponse {
    fn issue(state: &AppState, user: User) -> ApiResult<Self> {
        let token = state.tokens.issue(user.id, &user.username)?;

        Ok(Self {
            token,
            user: AuthUser {
                id: user.id,
                username: user.username,
                email: user.email,
            },
        })
    }
}

/// Register a new user
///
/// # Endpoint
///
/// ```text
/// POST /api/auth/register
/// Content-Type: application/json
///
/// {
///   "username": "alice",
///   "email": "alice@example.com",
///   "password": "secret1"
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `409 Conflict`: Username or email already exists
pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> ApiResult<ApiResponse<AuthResponse>> {
    req.validate()?;

    let RegisterRequest {
        username,
        email,
        password: secret,
    } = req;

    if User::username_or_email_taken(&state.db, &username, &email).await? {
        return Err(ApiError::Conflict(
            "Username or email already exists".to_string(),
        ));
    }

    let password_hash = password::hash_password(&secret)?;

    // A concurrent registration can still hit the unique constraints; those
    // map to 409 through `From<sqlx::Error>`.
    let user = User::create(
        &state.db,
        CreateUser {
            username,
            email,
            password_hash,
        },
    )
    .await?;

    tracing::info!(user_id = user.id, username = %user.username, "User registered");

    let response = AuthResponse::issue(&state, user)?;
    Ok(ApiResponse::success(response).with_message("Registration successful"))
}

/// Login endpoint
///
/// # Errors
///
/// - `401 Unauthorized`: Unknown username or wrong password (same message)
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ApiResult<ApiResponse<AuthResponse>> {
    let user = match User::find_by_username(&state.db, req.username.trim()).await? {
        Some(user) => user,
        None => {
            tracing::debug!(username = %req.username, "Login for unknown username");
            password::verify_decoy(&req.password);
            return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }
    };

    if !password::verify_password(&req.password, &user.password_hash)? {
        tracing::debug!(user_id = user.id, "Login with wrong password");
        return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    }

    tracing::info!(user_id = user.id, "User logged in");

    Ok(ApiResponse::success(AuthResponse::issue(&state, user)?).with_message("Login successful"))
}

/// Current user's profile
///
/// # Errors
///
/// - `404 Not Found`: The token is valid but the account no longer exists
pub async fn get_profile(
    State(state): State<AppState>,
    principal: Principal,
) -> ApiResult<ApiResponse<UserSummary>> {
    let user = User::find_by_id(&state.db, principal.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(ApiResponse::success(user.into()))
}
