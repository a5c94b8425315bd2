/// Error handling for the API server
///
/// This module provides a unified error type that maps to HTTP
/// responses. Handlers return `Result<T, ApiError>` which converts to
/// a JSON error body with an appropriate status code. Browser-facing
/// form handlers instead surface errors as flash notices via
/// [`ApiError::user_message`] and redirect, so no request leaves the
/// user on a broken page.
///
/// # Example
///
/// ```no_run
/// use tasknest_api::error::{ApiError, ApiResult};
/// use axum::Json;
/// use serde_json::json;
///
/// async fn handler() -> ApiResult<Json<serde_json::Value>> {
///     Err(ApiError::NotFound("Task not found".to_string()))
/// }
/// ```
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use tasknest_shared::auth::password::PasswordError;
use tasknest_shared::models::task::{ParseFilterError, TaskAccessError};

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
///
/// The first six variants are the domain taxonomy; the rest cover
/// request validation and internal failures.
#[derive(Debug)]
pub enum ApiError {
    /// Username already taken (409)
    DuplicateUsername,

    /// Email already taken (409)
    DuplicateEmail,

    /// Unknown user or wrong password (401)
    ///
    /// Deliberately a single message for both cases.
    InvalidCredentials,

    /// No valid session on a protected JSON endpoint (401)
    Unauthenticated,

    /// Requester is not the owner of the resource (403)
    Unauthorized,

    /// Resource does not exist (404)
    NotFound(String),

    /// Malformed due-date string (400)
    InvalidDateFormat(String),

    /// Unrecognized status/priority filter value (400)
    InvalidFilterValue(String),

    /// Request validation failed (422)
    ValidationError(Vec<ValidationErrorDetail>),

    /// Internal server error (500)
    InternalError(String),
}

/// Validation error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code (e.g., "not_found", "unauthorized")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Optional validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,
}

impl ApiError {
    /// The human-readable notice shown when a browser-facing handler
    /// soft-fails: the message rides a flash cookie across a redirect.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::DuplicateUsername => "Username already exists".to_string(),
            ApiError::DuplicateEmail => "Email already exists".to_string(),
            ApiError::InvalidCredentials => "Invalid username or password".to_string(),
            ApiError::Unauthenticated => "Please log in to continue".to_string(),
            ApiError::Unauthorized => "Unauthorized access".to_string(),
            ApiError::NotFound(_) => "Task not found".to_string(),
            ApiError::InvalidDateFormat(value) => {
                format!("Invalid due date: {value}")
            }
            ApiError::InvalidFilterValue(msg) => msg.clone(),
            ApiError::ValidationError(errors) => errors
                .first()
                .map(|e| e.message.clone())
                .unwrap_or_else(|| "Invalid input".to_string()),
            ApiError::InternalError(_) => "Something went wrong, please try again".to_string(),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::DuplicateUsername => write!(f, "Conflict: username already exists"),
            ApiError::DuplicateEmail => write!(f, "Conflict: email already exists"),
            ApiError::InvalidCredentials => write!(f, "Invalid credentials"),
            ApiError::Unauthenticated => write!(f, "Unauthenticated"),
            ApiError::Unauthorized => write!(f, "Unauthorized"),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::InvalidDateFormat(value) => write!(f, "Invalid date format: {}", value),
            ApiError::InvalidFilterValue(msg) => write!(f, "Invalid filter value: {}", msg),
            ApiError::ValidationError(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = match self {
            ApiError::DuplicateUsername => (
                StatusCode::CONFLICT,
                "duplicate_username",
                "Username already exists".to_string(),
                None,
            ),
            ApiError::DuplicateEmail => (
                StatusCode::CONFLICT,
                "duplicate_email",
                "Email already exists".to_string(),
                None,
            ),
            ApiError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "invalid_credentials",
                "Invalid username or password".to_string(),
                None,
            ),
            ApiError::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                "unauthenticated",
                "Login required".to_string(),
                None,
            ),
            ApiError::Unauthorized => (
                StatusCode::FORBIDDEN,
                "unauthorized",
                "Unauthorized access".to_string(),
                None,
            ),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::InvalidDateFormat(value) => (
                StatusCode::BAD_REQUEST,
                "invalid_date_format",
                format!("Invalid due date: {value}"),
                None,
            ),
            ApiError::InvalidFilterValue(msg) => {
                (StatusCode::BAD_REQUEST, "invalid_filter_value", msg, None)
            }
            ApiError::ValidationError(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_error",
                "Request validation failed".to_string(),
                Some(errors),
            ),
            ApiError::InternalError(msg) => {
                // Log internal errors but don't expose details to clients
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
            details,
        });

        (status, body).into_response()
    }
}

/// Convert sqlx errors to API errors
///
/// The UNIQUE constraints on users are authoritative for duplicate
/// detection: a registration that loses the check-then-insert race
/// still comes back as the right duplicate error.
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".to_string()),
            sqlx::Error::Database(db_err) => {
                let message = db_err.message();
                if message.contains("users.username") {
                    return ApiError::DuplicateUsername;
                }
                if message.contains("users.email") {
                    return ApiError::DuplicateEmail;
                }

                ApiError::InternalError(format!("Database error: {}", db_err))
            }
            _ => ApiError::InternalError(format!("Database error: {}", err)),
        }
    }
}

/// Convert owner-check failures to API errors (403/404)
impl From<TaskAccessError> for ApiError {
    fn from(err: TaskAccessError) -> Self {
        match err {
            TaskAccessError::NotFound => ApiError::NotFound("Task not found".to_string()),
            TaskAccessError::NotOwner => ApiError::Unauthorized,
            TaskAccessError::Database(e) => e.into(),
        }
    }
}

/// Convert password errors to API errors
impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::InternalError(format!("Password operation failed: {}", err))
    }
}

/// Convert filter-parse errors to API errors
impl From<ParseFilterError> for ApiError {
    fn from(err: ParseFilterError) -> Self {
        ApiError::InvalidFilterValue(err.to_string())
    }
}
