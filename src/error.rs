use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::error::Error;
use std::fmt;

use crate::auth::token::TokenError;

/// The primary error type for the application.
///
/// Repositories report absence as `Ok(None)`; every variant here is a real
/// failure. Orchestrators add use-case context with [`AppError::context`]
/// but never change the class of an error.
#[derive(Debug)]
pub enum AppError {
    /// For internal server errors that are not expected to be handled by the client.
    Internal(anyhow::Error),
    /// For client errors due to invalid requests.
    BadRequest(String),
    /// For when a requested resource is not found.
    NotFound(String),
    /// For when a request conflicts with the current state of the store
    /// (duplicate names, unique or foreign-key violations).
    Conflict(String),
    /// A unit of work failed and its transaction has already been rolled back.
    TransactionAborted(Box<AppError>),
    /// For when the store cannot be reached (pool exhausted or closed, I/O).
    StoreUnavailable(String),
    /// For any other error reported by the store.
    Database(String),
    /// The request context was cancelled or its deadline passed.
    Cancelled(String),
    /// For when a request is not authorized.
    Unauthorized(String),
    /// For when a specific field in a request fails validation.
    ValidationError {
        /// The name of the field that failed validation.
        field: String,
        /// A message describing the validation error.
        message: String,
    },
}

impl AppError {
    /// Prefixes the message with use-case context, keeping the variant.
    pub fn context(self, what: &str) -> Self {
        match self {
            AppError::Internal(e) => AppError::Internal(e.context(what.to_string())),
            AppError::BadRequest(msg) => AppError::BadRequest(format!("{}: {}", what, msg)),
            AppError::NotFound(msg) => AppError::NotFound(format!("{}: {}", what, msg)),
            AppError::Conflict(msg) => AppError::Conflict(format!("{}: {}", what, msg)),
            AppError::StoreUnavailable(msg) => AppError::StoreUnavailable(format!("{}: {}", what, msg)),
            AppError::Database(msg) => AppError::Database(format!("{}: {}", what, msg)),
            AppError::Cancelled(msg) => AppError::Cancelled(format!("{}: {}", what, msg)),
            other => other,
        }
    }

    /// The error that caused a transaction to abort, if this is one.
    pub fn abort_cause(&self) -> Option<&AppError> {
        match self {
            AppError::TransactionAborted(cause) => Some(cause),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::NotFound(_))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, AppError::Cancelled(_))
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Internal(e) => write!(f, "Internal error: {}", e),
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::TransactionAborted(cause) => write!(f, "Transaction aborted: {}", cause),
            AppError::StoreUnavailable(msg) => write!(f, "Store unavailable: {}", msg),
            AppError::Database(msg) => write!(f, "Database error: {}", msg),
            AppError::Cancelled(msg) => write!(f, "Cancelled: {}", msg),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::ValidationError { field, message } => {
                write!(f, "Validation error on field '{}': {}", field, message)
            }
        }
    }
}

impl Error for AppError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            AppError::Internal(e) => Some(e.as_ref()),
            AppError::TransactionAborted(cause) => Some(cause.as_ref()),
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code, error_message, details) = match self {
            AppError::Internal(e) => {
                tracing::error!("Internal error: {:?}", e);
                let error_id = uuid::Uuid::new_v4();
                tracing::error!("Error ID: {}", error_id);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                    Some(json!({ "error_id": error_id.to_string() })),
                )
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg, None),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg, None),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg, None),
            AppError::TransactionAborted(cause) => {
                tracing::warn!("Transaction aborted: {}", cause);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "TRANSACTION_ABORTED",
                    "The operation was rolled back".to_string(),
                    Some(json!({ "cause": cause.to_string() })),
                )
            }
            AppError::StoreUnavailable(msg) => {
                tracing::error!("Store unavailable: {}", msg);
                (StatusCode::SERVICE_UNAVAILABLE, "STORE_UNAVAILABLE", msg, None)
            }
            AppError::Database(msg) => {
                tracing::error!("Database error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                    Some(json!({ "details": msg })),
                )
            }
            AppError::Cancelled(msg) => (StatusCode::REQUEST_TIMEOUT, "CANCELLED", msg, None),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg, None),
            AppError::ValidationError { field, message } => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                format!("Validation failed for field '{}'", field),
                Some(json!({ "field": field, "message": message })),
            ),
        };

        let mut body = json!({
            "error": {
                "code": error_code,
                "message": error_message,
            },
            "status": status.as_u16(),
            "timestamp": chrono::Utc::now().to_rfc3339(),
        });

        if let Some(details) = details {
            body["error"]["details"] = details;
        }

        (status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".to_string()),
            sqlx::Error::Database(db_err) => {
                if db_err.is_unique_violation() || db_err.is_foreign_key_violation() {
                    AppError::Conflict(db_err.message().to_string())
                } else {
                    AppError::Database(db_err.message().to_string())
                }
            }
            sqlx::Error::PoolTimedOut => {
                AppError::StoreUnavailable("Database connection pool timed out".to_string())
            }
            sqlx::Error::PoolClosed => AppError::StoreUnavailable("Database pool is closed".to_string()),
            sqlx::Error::Io(e) => AppError::StoreUnavailable(format!("{}: {}", e.kind(), e)),
            _ => AppError::Database(err.to_string()),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal(anyhow::Error::new(err))
    }
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Signing(msg) => AppError::Internal(anyhow::anyhow!("token signing failed: {}", msg)),
            other => AppError::Unauthorized(other.to_string()),
        }
    }
}

/// A type alias for `Result<T, AppError>`, used throughout the application.
pub type AppResult<T> = Result<T, AppError>;

/// An extension trait for `Option` that provides a convenient way to convert
/// an `Option` to a `Result` with a `NotFound` error.
pub trait OptionExt<T> {
    /// Converts `None` into `AppError::NotFound("<entity> not found")`.
    fn ok_or_not_found(self, entity: &str) -> AppResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_not_found(self, entity: &str) -> AppResult<T> {
        self.ok_or_else(|| AppError::NotFound(format!("{} not found", entity)))
    }
}
