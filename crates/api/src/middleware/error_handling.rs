//! # Error Handling Middleware
//!
//! Maps [`HuddleError`] to HTTP status codes and JSON error bodies so every
//! handler reports failures the same way.
//!
//! Store and internal failures are logged in full and reach the client only
//! as `{"error": "Internal server error"}`. Business-rule conflicts carry
//! their bare message, e.g. `{"error": "All slots are filled"}`.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use huddle_core::errors::{Conflict, HuddleError};
use serde_json::json;
use tracing::{debug, error};

/// Application error wrapper that provides HTTP status code mapping
///
/// # Example
///
/// ```
/// use axum::Json;
/// use huddle_api::middleware::error_handling::AppError;
/// use huddle_core::errors::HuddleError;
///
/// async fn handler(title: String) -> Result<Json<String>, AppError> {
///     if title.is_empty() {
///         return Err(HuddleError::validation("Title is required").into());
///     }
///     Ok(Json(title))
/// }
/// # fn main() {}
/// ```
#[derive(Debug)]
pub struct AppError(pub HuddleError);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            HuddleError::NotFound(_) => StatusCode::NOT_FOUND,
            HuddleError::Validation(_) => StatusCode::BAD_REQUEST,
            HuddleError::Authentication(_) => StatusCode::UNAUTHORIZED,
            HuddleError::Authorization(_) => StatusCode::FORBIDDEN,
            HuddleError::Conflict(_) => StatusCode::CONFLICT,
            HuddleError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            HuddleError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let message = match &self.0 {
            HuddleError::Database(report) => {
                error!("Database failure while handling request: {:?}", report);
                "Internal server error".to_string()
            }
            HuddleError::Internal(err) => {
                error!("Internal failure while handling request: {}", err);
                "Internal server error".to_string()
            }
            HuddleError::Conflict(conflict) => conflict.to_string(),
            other => other.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<HuddleError> for AppError {
    fn from(err: HuddleError) -> Self {
        AppError(err)
    }
}

impl From<Conflict> for AppError {
    fn from(conflict: Conflict) -> Self {
        AppError(HuddleError::Conflict(conflict))
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        debug!("Rejected request body: {}", rejection.body_text());
        let message = match rejection {
            JsonRejection::JsonDataError(_) => "All fields are required",
            JsonRejection::JsonSyntaxError(_) => "Request body is not valid JSON",
            JsonRejection::MissingJsonContentType(_) => "Expected a JSON request body",
            _ => "Invalid request body",
        };
        AppError(HuddleError::validation(message))
    }
}

impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        AppError(HuddleError::Database(err))
    }
}

/// Maps a HuddleError straight to an HTTP response.
pub fn map_error(err: HuddleError) -> Response {
    AppError(err).into_response()
}
