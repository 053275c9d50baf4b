use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Canonical user-facing messages, kept in one place so handlers and tests
/// agree on the exact wording.
pub mod msg {
    pub const TRANSACTION_NOT_FOUND: &str = "Payment transaction not found";
    pub const CLIENT_NOT_FOUND: &str = "Client not found";
    pub const MISSING_SIGNATURE: &str = "Missing x-splynx-signature header";
    pub const INVALID_SIGNATURE: &str = "Webhook signature verification failed";
    pub const INVALID_CLIENT_ID: &str = "client_id must be numeric";
    pub const INVALID_AMOUNT: &str = "amount must be numeric";
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("External service error: {0}")]
    ExternalService(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// True when the underlying sqlite error is a UNIQUE constraint violation.
    /// Used by the webhook handler to treat an insert race as a duplicate
    /// delivery rather than a server error.
    pub fn is_unique_violation(&self) -> bool {
        matches!(
            self,
            AppError::Database(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation
        )
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
    message: String,
    #[serde(rename = "missingFields", skip_serializing_if = "Option::is_none")]
    missing_fields: Option<Vec<String>>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, message, missing_fields) = match self {
            AppError::Authentication(msg) => {
                (StatusCode::UNAUTHORIZED, "Authentication error", msg, None)
            }
            AppError::MissingFields(fields) => (
                StatusCode::BAD_REQUEST,
                "Validation error",
                format!("Missing required fields: {}", fields.join(", ")),
                Some(fields),
            ),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "Bad request", msg, None),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "Not found", msg, None),
            AppError::ExternalService(msg) => {
                tracing::error!("External service error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "External service error",
                    msg,
                    None,
                )
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error",
                    "Internal server error".to_string(),
                    None,
                )
            }
            AppError::Pool(e) => {
                tracing::error!("Pool error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error",
                    "Internal server error".to_string(),
                    None,
                )
            }
            AppError::Json(e) => {
                tracing::error!("JSON error: {}", e);
                (
                    StatusCode::BAD_REQUEST,
                    "Bad request",
                    "Invalid JSON".to_string(),
                    None,
                )
            }
            AppError::Http(e) => {
                tracing::error!("HTTP client error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "External service error",
                    e.to_string(),
                    None,
                )
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error",
                    "Internal server error".to_string(),
                    None,
                )
            }
        };

        let body = ErrorBody {
            success: false,
            error: error.to_string(),
            message,
            missing_fields,
        };

        (status, Json(body)).into_response()
    }
}

/// Extension trait for turning `Option<T>` into a 404 with a canonical message.
pub trait OptionExt<T> {
    fn or_not_found(self, message: &str) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn or_not_found(self, message: &str) -> Result<T> {
        self.ok_or_else(|| AppError::NotFound(message.to_string()))
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
