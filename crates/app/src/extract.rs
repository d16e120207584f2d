//! Extractors that turn body and query rejections into [`AppError`] so every
//! failure shares the JSON error envelope.

use axum::extract::{FromRequest, FromRequestParts, Query};
use serde::Deserialize;

use crate::error::AppError;

/// `axum::Json` with rejections mapped to a 400 `VALIDATION_ERROR`.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// `axum::extract::Query` with rejections mapped to a 400 `VALIDATION_ERROR`.
#[derive(Debug, FromRequestParts)]
#[from_request(via(Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);

/// `?user_id=` on read endpoints.
#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub user_id: String,
}
