/// CORS policy
///
/// Origins listed in `CORS_ALLOWED_ORIGINS` are always allowed. In debug mode
/// any `http://localhost:<port>` or `http://127.0.0.1:<port>` origin is allowed
/// as well, so a local frontend dev server works without configuration.
/// Credentials are allowed, which rules out a wildcard origin.

use axum::http::{header, HeaderName, HeaderValue, Method};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::config::Config;

const LOCAL_ORIGIN_PREFIXES: [&str; 2] = ["http://localhost:", "http://127.0.0.1:"];

/// Returns whether a request from `origin` may read the response
pub fn origin_allowed(origin: &str, allowed: &[String], debug: bool) -> bool {
    if allowed.iter().any(|a| a == origin) {
        return true;
    }

    debug && LOCAL_ORIGIN_PREFIXES.iter().any(|p| {
        origin
            .strip_prefix(p)
            .map_or(false, |port| !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()))
    })
}

/// Builds the CORS layer for the configured origins and mode
pub fn cors_layer(config: &Config) -> CorsLayer {
    let allowed: Arc<Vec<String>> = Arc::new(config.cors.allowed_origins.clone());
    let debug = config.server.mode.is_debug();

    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(move |origin: &HeaderValue, _| {
            origin
                .to_str()
                .map_or(false, |origin| origin_allowed(origin, &allowed, debug))
        }))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::CACHE_CONTROL,
            HeaderName::from_static("x-requested-with"),
        ])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}
