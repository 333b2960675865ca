//! Extractors whose rejections use the API's error envelope.
//!
//! Axum's stock `Json` and `Query` reject with plain-text 4xx bodies; these
//! wrappers route the rejection through [`AppError`] so malformed input
//! gets the same `{ success: false, error }` shape as validation failures.

use axum::extract::FromRequest;
use axum::extract::FromRequestParts;

use crate::error::AppError;

/// `axum::Json` with [`AppError`] rejections.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// `axum::extract::Query` with [`AppError`] rejections.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);
