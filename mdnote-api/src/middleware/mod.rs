/// Middleware modules for the API server
///
/// - `auth`: bearer-token verification for protected routes
/// - `cors`: origin policy for browser clients

pub mod auth;
pub mod cors;
