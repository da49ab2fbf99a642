/// Configuration management for the API server
///
/// Configuration comes from environment variables, after loading a `.env`
/// file if one is present.
///
/// # Environment Variables
///
/// - `SERVER_HOST`: host to bind to (default: 0.0.0.0)
/// - `SERVER_PORT`: port to bind to (default: 8080)
/// - `SERVER_MODE`: `debug` or `release` (default: debug)
/// - `DB_HOST`, `DB_PORT`, `DB_USER`, `DB_NAME`: PostgreSQL location
///   (defaults: localhost, 5432, postgres, markdown_editor)
/// - `DB_PASSWORD`: PostgreSQL password (required)
/// - `DB_MAX_CONNECTIONS`: pool ceiling (default: 25)
/// - `DB_SEED`: create the default accounts on startup (default: true)
/// - `JWT_SECRET`: token signing secret; required and at least 32 characters
///   in release mode
/// - `JWT_EXPIRY`: token lifetime in hours (default: 24)
/// - `CORS_ALLOWED_ORIGINS`: comma-separated list of allowed origins
/// - `UPLOAD_DIR`: root directory for uploaded files (default: uploads)
/// - `RUST_LOG`: log filter
///
/// # Example
///
/// ```no_run
/// use mdnote_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Signing secret used in debug mode when `JWT_SECRET` is unset
pub const DEV_JWT_SECRET: &str = "mdnote-development-secret-change-me-before-release";

/// Minimum secret length accepted in release mode
pub const MIN_JWT_SECRET_LEN: usize = 32;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub cors: CorsConfig,
    pub upload: UploadConfig,
}

/// Debug mode relaxes CORS and allows the development JWT secret
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerMode {
    Debug,
    Release,
}

impl ServerMode {
    pub fn is_debug(&self) -> bool {
        matches!(self, ServerMode::Debug)
    }
}

impl FromStr for ServerMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "debug" => Ok(ServerMode::Debug),
            "release" => Ok(ServerMode::Release),
            other => anyhow::bail!("SERVER_MODE must be 'debug' or 'release', got '{}'", other),
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub mode: ServerMode,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub name: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,

    /// Insert the default accounts on startup
    pub seed: bool,
}

impl DatabaseConfig {
    /// Builds the PostgreSQL connection URL, percent-encoding the credentials
    pub fn url(&self) -> anyhow::Result<String> {
        let mut url = url::Url::parse(&format!(
            "postgres://{}:{}/{}",
            self.host, self.port, self.name
        ))?;

        url.set_username(&self.user)
            .map_err(|_| anyhow::anyhow!("DB_USER cannot be encoded in a URL"))?;
        url.set_password(Some(&self.password))
            .map_err(|_| anyhow::anyhow!("DB_PASSWORD cannot be encoded in a URL"))?;

        Ok(url.to_string())
    }
}

/// JWT configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// Secret key for JWT signing
    ///
    /// Generate with: `openssl rand -hex 32`
    #[serde(skip_serializing)]
    pub secret: String,

    /// Token lifetime in hours
    pub expiry_hours: i64,
}

/// CORS configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

/// Upload storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Root directory served under `/uploads`
    pub dir: PathBuf,
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `DB_PASSWORD` is missing or empty
    /// - `JWT_SECRET` is missing or shorter than 32 characters in release mode
    /// - a numeric or boolean variable fails to parse
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let mode: ServerMode = var("SERVER_MODE", "debug").parse()?;

        let server = ServerConfig {
            host: var("SERVER_HOST", "0.0.0.0"),
            port: parse_var("SERVER_PORT", &var("SERVER_PORT", "8080"))?,
            mode,
        };

        let password = lookup("DB_PASSWORD").unwrap_or_default();
        if password.is_empty() {
            anyhow::bail!("DB_PASSWORD environment variable is required");
        }

        let database = DatabaseConfig {
            host: var("DB_HOST", "localhost"),
            port: parse_var("DB_PORT", &var("DB_PORT", "5432"))?,
            user: var("DB_USER", "postgres"),
            password,
            name: var("DB_NAME", "markdown_editor"),
            max_connections: parse_var("DB_MAX_CONNECTIONS", &var("DB_MAX_CONNECTIONS", "25"))?,
            seed: parse_bool("DB_SEED", &var("DB_SEED", "true"))?,
        };

        let secret = match lookup("JWT_SECRET").filter(|s| !s.is_empty()) {
            Some(secret) => secret,
            None if mode.is_debug() => {
                tracing::warn!("JWT_SECRET is not set, using the development secret");
                DEV_JWT_SECRET.to_string()
            }
            None => anyhow::bail!("JWT_SECRET environment variable is required in release mode"),
        };

        if !mode.is_debug() && secret.len() < MIN_JWT_SECRET_LEN {
            anyhow::bail!(
                "JWT_SECRET must be at least {} characters long",
                MIN_JWT_SECRET_LEN
            );
        }

        let expiry_hours: i64 = parse_var("JWT_EXPIRY", &var("JWT_EXPIRY", "24"))?;
        if expiry_hours <= 0 {
            anyhow::bail!("JWT_EXPIRY must be a positive number of hours");
        }

        Ok(Self {
            server,
            database,
            jwt: JwtConfig {
                secret,
                expiry_hours,
            },
            cors: CorsConfig {
                allowed_origins: parse_origins(&var("CORS_ALLOWED_ORIGINS", "")),
            },
            upload: UploadConfig {
                dir: PathBuf::from(var("UPLOAD_DIR", "uploads")),
            },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn parse_var<T>(key: &str, value: &str) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| anyhow::anyhow!("{} has an invalid value '{}': {}", key, value, e))
}

fn parse_bool(key: &str, value: &str) -> anyhow::Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => anyhow::bail!("{} must be a boolean, got '{}'", key, value),
    }
}

/// Splits a comma-separated origin list, dropping blanks and trailing slashes
pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|origin| origin.trim().trim_end_matches('/'))
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}
