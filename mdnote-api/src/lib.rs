//! # mdnote API Server Library
//!
//! REST backend for the markdown note editor: accounts, documents and image
//! uploads, the public feed, tags and tasks.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration from environment variables
//! - `error`: Error handling and HTTP response mapping
//! - `extract`: Extractors that reject with the JSON error envelope
//! - `middleware`: Bearer-token authentication and CORS
//! - `response`: Success envelope
//! - `routes`: API route handlers
//! - `storage`: Uploaded image files

pub mod app;
pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod storage;
