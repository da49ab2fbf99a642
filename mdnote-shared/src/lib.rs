//! # mdnote Shared Library
//!
//! Types, persistence and authentication primitives used by the mdnote API
//! server.
//!
//! ## Module Organization
//!
//! - `auth`: tokens, password hashing, the request principal and ownership checks
//! - `db`: connection pool, migrations and seed data
//! - `input`: trimming deserializers for request text fields
//! - `markdown`: filename normalization and image reference parsing
//! - `models`: database models and their queries

pub mod auth;
pub mod db;
pub mod input;
pub mod markdown;
pub mod models;

/// Current version of the mdnote shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
