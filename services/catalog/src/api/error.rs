//! API error types and helpers.
//!
//! # Purpose and responsibility
//! Centralizes HTTP error response construction so every catalog endpoint
//! returns the same `{code, message, request_id}` shape.
//!
//! # Key invariants and assumptions
//! - `message` is the user-visible text; `code` is stable for clients.
//! - Status codes must align with the error category.
//!
//! # Security considerations
//! - Internal errors log details server-side but return generic messages.
use crate::api::types::ErrorResponse;
use crate::service::CatalogError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;

pub const INVALID_CAR_MESSAGE: &str = "Invalid car data";
pub const CAR_NOT_FOUND_MESSAGE: &str = "Car not found";
pub const VERSION_CONFLICT_MESSAGE: &str = "Concurrent update conflict";
pub const INVALID_QUERY_MESSAGE: &str = "Invalid query parameters";

/// Structured API error returned by handlers.
///
/// # Invariants
/// - `status` must match the semantics of `body.code`.
///
/// # Example
/// ```rust
/// use axum::http::StatusCode;
/// use catalog::api::error::api_not_found;
///
/// let err = api_not_found("Car not found");
/// assert_eq!(err.status, StatusCode::NOT_FOUND);
/// ```
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorResponse,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status, Json(self.body)).into_response()
    }
}

fn api_error(status: StatusCode, code: &str, message: &str) -> ApiError {
    ApiError {
        status,
        body: ErrorResponse {
            code: code.to_string(),
            message: message.to_string(),
            request_id: None,
        },
    }
}

/// Build a 404 Not Found error.
pub fn api_not_found(message: &str) -> ApiError {
    api_error(StatusCode::NOT_FOUND, "not_found", message)
}

/// Build a 409 Conflict error with a caller-provided code.
pub fn api_conflict(code: &str, message: &str) -> ApiError {
    api_error(StatusCode::CONFLICT, code, message)
}

/// Build a 400 error for a malformed or incomplete car payload.
pub fn api_validation_error(message: &str) -> ApiError {
    api_error(StatusCode::BAD_REQUEST, "validation_error", message)
}

/// Build a 400 error for unknown or malformed search parameters.
pub fn api_invalid_query(message: &str) -> ApiError {
    api_error(StatusCode::BAD_REQUEST, "invalid_query", message)
}

/// Build a 500 error. Details stay in the server log.
pub fn api_internal_message(message: &str) -> ApiError {
    api_error(StatusCode::INTERNAL_SERVER_ERROR, "internal", message)
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Validation(reason) => {
                tracing::debug!(%reason, "rejected car payload");
                api_validation_error(INVALID_CAR_MESSAGE)
            }
            CatalogError::NotFound(_) => api_not_found(CAR_NOT_FOUND_MESSAGE),
            CatalogError::ConcurrencyConflict { id, sent, stored } => {
                tracing::debug!(car_id = %id, ?sent, stored, "stale car version");
                api_conflict("version_conflict", VERSION_CONFLICT_MESSAGE)
            }
            CatalogError::AlreadyExists(_) => api_conflict("already_exists", "Car already exists"),
            CatalogError::InvalidQuery(reason) => {
                tracing::debug!(%reason, "rejected search query");
                api_invalid_query(INVALID_QUERY_MESSAGE)
            }
            CatalogError::Internal(err) => {
                tracing::error!(error = ?err, "catalog storage error");
                api_internal_message("Internal server error")
            }
        }
    }
}
