use axum::extract::FromRequest;

use crate::middleware::error_handling::AppError;

/// JSON request body whose rejections go through [`AppError`], so a missing
/// or mistyped field is a 400 validation error rather than axum's plain-text
/// 422.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct JsonBody<T>(pub T);
