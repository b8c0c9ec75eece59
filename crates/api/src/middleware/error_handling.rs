//! # Error Handling Middleware
//!
//! This module provides a standardized way to handle errors in the Tutorbook
//! API. It maps domain-specific errors to appropriate HTTP status codes and
//! JSON error responses, ensuring a consistent error handling experience
//! across the entire API.
//!
//! A slot rejection is an expected outcome, not a fault: it maps to 409 with
//! the stable reason code in the body, and is never logged as an error. Store
//! failures map to 503 so clients know to retry, and are logged.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tutorbook_core::errors::BookingError;

/// Application error wrapper that provides HTTP status code mapping
///
/// `AppError` wraps domain-specific `BookingError` instances and implements
/// `IntoResponse` to convert them into HTTP responses with appropriate
/// status codes and JSON payloads.
#[derive(Debug)]
pub struct AppError(pub BookingError);

/// Converts application errors to HTTP responses
///
/// This implementation maps each error type to the appropriate HTTP status
/// code and formats the error message into a JSON response body. Rejections
/// additionally carry the stable reason code under `"reason"`.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self.0 {
            BookingError::Rejected(reason) => {
                let body = Json(json!({
                    "error": self.0.to_string(),
                    "reason": reason.as_code(),
                }));
                return (StatusCode::CONFLICT, body).into_response();
            }
            BookingError::Store(report) => {
                tracing::error!("Store error: {report:?}");
            }
            _ => {}
        }

        let status = match &self.0 {
            BookingError::Rejected(_) => StatusCode::CONFLICT,
            BookingError::NotFound(_) => StatusCode::NOT_FOUND,
            BookingError::PermissionDenied(_) => StatusCode::FORBIDDEN,
            BookingError::Validation(_) => StatusCode::BAD_REQUEST,
            BookingError::Invariant(_) => StatusCode::INTERNAL_SERVER_ERROR,
            BookingError::Store(_) => StatusCode::SERVICE_UNAVAILABLE,
        };

        let message = self.0.to_string();
        let body = Json(json!({ "error": message }));

        (status, body).into_response()
    }
}

/// Automatic conversion from BookingError to AppError
///
/// This implementation allows using `?` operator with functions that return
/// `Result<T, BookingError>` in handler functions that return
/// `Result<T, AppError>`.
impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        AppError(err)
    }
}

/// Automatic conversion from eyre::Report to AppError
///
/// This implementation allows using `?` operator with functions that return
/// `Result<T, eyre::Report>` in handler functions that return
/// `Result<T, AppError>`. It wraps the eyre error in a `BookingError::Store`
/// variant.
impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        AppError(BookingError::Store(err))
    }
}

/// Maps a BookingError to an HTTP response
///
/// This function is provided for code that directly uses the error mapping
/// function instead of the `?` operator.
pub fn map_error(err: BookingError) -> Response {
    AppError(err).into_response()
}
