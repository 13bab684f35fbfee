//! Application error type shared by the engine, the storage backends and the HTTP layer.
//!
//! Every failure path of the engine maps to exactly one variant, so callers can
//! tell a bad target from a taken code from a storage outage without parsing
//! messages.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};

use crate::utils::target_validator::TargetRejection;

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

/// Machine-readable error payload returned by the API.
#[derive(Debug, Serialize)]
pub struct ErrorInfo {
    pub code: &'static str,
    pub message: String,
    pub details: Value,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Target address failed format or safety validation.
    #[error("Target rejected: {0}")]
    RejectedTarget(#[from] TargetRejection),

    /// Custom code violates the length or character rules.
    #[error("{message}")]
    RejectedCodeFormat { message: String, details: Value },

    /// Custom code is already held by a live link.
    #[error("Code '{code}' is already in use")]
    Conflict { code: String },

    /// The generator could not find a free code within the attempt bound.
    #[error("Failed to allocate a unique code after {attempts} attempts")]
    Exhausted { attempts: u32 },

    #[error("{message}")]
    NotFound { message: String, details: Value },

    /// Malformed request at the HTTP boundary (body shape, query parameters).
    #[error("{message}")]
    Validation { message: String, details: Value },

    /// Transient storage failure: pool timeout, closed pool, broken connection.
    #[error("Storage unavailable: {message}")]
    Unavailable { message: String },

    /// Non-transient storage failure.
    #[error("Storage error: {message}")]
    Storage { message: String },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }

    pub fn code_format(message: impl Into<String>, details: Value) -> Self {
        Self::RejectedCodeFormat {
            message: message.into(),
            details,
        }
    }

    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            message: message.into(),
            details,
        }
    }

    pub fn conflict(code: impl Into<String>) -> Self {
        Self::Conflict { code: code.into() }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Returns true if retrying the same operation later may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable { .. } | Self::Exhausted { .. })
    }

    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::RejectedTarget(_) => (StatusCode::BAD_REQUEST, "rejected_target"),
            AppError::RejectedCodeFormat { .. } => {
                (StatusCode::BAD_REQUEST, "rejected_code_format")
            }
            AppError::Conflict { .. } => (StatusCode::CONFLICT, "conflict"),
            AppError::Exhausted { .. } => (StatusCode::SERVICE_UNAVAILABLE, "exhausted"),
            AppError::NotFound { .. } => (StatusCode::NOT_FOUND, "not_found"),
            AppError::Validation { .. } => (StatusCode::BAD_REQUEST, "validation_error"),
            AppError::Unavailable { .. } => {
                (StatusCode::SERVICE_UNAVAILABLE, "storage_unavailable")
            }
            AppError::Storage { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }

    /// Converts the error into the serializable payload used in responses.
    pub fn to_error_info(&self) -> ErrorInfo {
        let (_, code) = self.status_and_code();
        let details = match self {
            AppError::RejectedTarget(reason) => json!({ "reason": reason.kind() }),
            AppError::RejectedCodeFormat { details, .. }
            | AppError::NotFound { details, .. }
            | AppError::Validation { details, .. } => details.clone(),
            AppError::Conflict { code } => json!({ "code": code }),
            AppError::Exhausted { attempts } => json!({ "attempts": attempts }),
            // Backend messages may leak connection details.
            AppError::Unavailable { .. } | AppError::Storage { .. } => json!({}),
        };
        let message = match self {
            AppError::Unavailable { .. } => "Storage temporarily unavailable".to_string(),
            AppError::Storage { .. } => "Storage error".to_string(),
            other => other.to_string(),
        };

        ErrorInfo {
            code,
            message,
            details,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, _) = self.status_and_code();

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let body = ErrorBody {
            error: self.to_error_info(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                AppError::unavailable(e.to_string())
            }
            other => AppError::storage(other.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(e: validator::ValidationErrors) -> Self {
        let field_errors = e.field_errors();
        let fields: Vec<&str> = field_errors.keys().map(|k| k.as_ref()).collect();
        AppError::bad_request("Invalid request", json!({ "fields": fields }))
    }
}
