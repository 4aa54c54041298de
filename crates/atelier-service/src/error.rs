//! API error types and responses.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use atelier_store::StoreError;

/// API error type.
///
/// Every operation reports one of these kinds; anything unexpected is wrapped into
/// [`ApiError::Internal`] with the original message kept as detail.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No identity on an operation requiring one.
    #[error("authentication required")]
    Unauthenticated,

    /// Malformed or missing request fields.
    #[error("{0}")]
    InvalidArgument(String),

    /// Referenced entity absent.
    #[error("{0}")]
    NotFound(String),

    /// Business rule violated.
    #[error("{message}")]
    FailedPrecondition {
        /// Human-readable reason.
        message: String,
        /// Structured context for the client.
        details: Option<serde_json::Value>,
    },

    /// Entity already exists.
    #[error("{0}")]
    AlreadyExists(String),

    /// Unexpected failure in the store, a provider, or the transaction machinery.
    #[error("{message}")]
    Internal {
        /// Message safe to show the caller.
        message: String,
        /// The underlying error message.
        detail: Option<String>,
    },
}

impl ApiError {
    /// Wrap an unexpected failure, keeping its message as detail.
    pub fn internal(message: impl Into<String>, detail: impl ToString) -> Self {
        Self::Internal {
            message: message.into(),
            detail: Some(detail.to_string()),
        }
    }

    /// The wire code for this error kind.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::InvalidArgument(_) => "invalid-argument",
            Self::NotFound(_) => "not-found",
            Self::FailedPrecondition { .. } => "failed-precondition",
            Self::AlreadyExists(_) => "already-exists",
            Self::Internal { .. } => "internal",
        }
    }

    /// The HTTP status for this error kind.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::FailedPrecondition { .. } => StatusCode::PRECONDITION_FAILED,
            Self::AlreadyExists(_) => StatusCode::CONFLICT,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// JSON error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        let (message, details) = match self {
            Self::FailedPrecondition { message, details } => (message, details),
            Self::Internal { message, detail } => {
                tracing::error!(message = %message, detail = ?detail, "Internal server error");
                (message, detail.map(serde_json::Value::String))
            }
            other => (other.to_string(), None),
        };

        let body = ErrorResponse {
            error: ErrorBody {
                code,
                message,
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, id } => Self::NotFound(format!("{entity} not found: {id}")),
            StoreError::InsufficientCoins { balance, required } => Self::FailedPrecondition {
                message: format!("insufficient coins: balance {balance}, required {required}"),
                details: Some(serde_json::json!({
                    "balance": balance,
                    "required": required
                })),
            },
            StoreError::SelfPurchase => Self::FailedPrecondition {
                message: "you cannot purchase your own character".into(),
                details: None,
            },
            StoreError::AlreadyExists { entity, id } => {
                Self::AlreadyExists(format!("{entity} already exists: {id}"))
            }
            StoreError::Core(e) => Self::InvalidArgument(e.to_string()),
            e @ StoreError::Conflict { .. } => {
                Self::internal("transaction aborted by concurrent updates", e)
            }
            StoreError::Database(msg) | StoreError::Serialization(msg) => {
                Self::internal("storage failure", msg)
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidArgument(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::InvalidArgument(rejection.body_text())
    }
}

impl From<atelier_core::CoreError> for ApiError {
    fn from(err: atelier_core::CoreError) -> Self {
        Self::InvalidArgument(err.to_string())
    }
}
