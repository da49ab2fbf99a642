//! Request extractors whose rejections use the failure envelope.
//!
//! axum's own `Json`, `Path` and `Query` reject with plain-text bodies and, for
//! JSON payloads that do not match the target type, a 422. These wrappers turn
//! every rejection into an [`ApiError::BadRequest`].

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::ApiError;

#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);
