//! Request extractors that report rejections as JSON errors.

use axum::extract::{FromRequest, FromRequestParts};

use crate::Error;

/// Like [axum::Json], but a malformed body is rejected with [Error::Validation]
/// so the client gets the same JSON error payload as every other failure.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct ApiJson<T>(pub T);

/// Like [axum::extract::Query], but a query string that cannot be deserialized
/// is rejected with [Error::Validation].
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(Error))]
pub struct ApiQuery<T>(pub T);
