//! Error handling module
//!
//! Centralized error types and HTTP response conversion.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::domain::{Cancelled, DomainError};

/// Application-wide Result type
pub type AppResult<T> = Result<T, AppError>;

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Data access
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    #[error("Failed to decode account row: {0}")]
    Scan(String),

    #[error("No rows affected updating account {0}")]
    NoRowsAffected(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    // Request and business rules
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Domain(#[from] DomainError),

    // Infrastructure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Auth token error: {0}")]
    AuthToken(String),
}

impl From<Cancelled> for AppError {
    fn from(_: Cancelled) -> Self {
        AppError::Cancelled
    }
}

impl AppError {
    /// Rejected by validation or a business rule; retrying the same request
    /// will not help
    pub fn is_rejection(&self) -> bool {
        matches!(self, AppError::InvalidRequest(_) | AppError::Domain(_))
    }

    /// Failure after which the unit of work was rolled back, so the request
    /// may be retried as a whole. Cancellation counts because it is never
    /// honoured once COMMIT has been sent.
    pub fn is_retry_safe(&self) -> bool {
        matches!(
            self,
            AppError::Database(_) | AppError::Persistence(_) | AppError::Cancelled
        )
    }

    /// Stable machine-readable code for this error kind
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::AccountNotFound(_) => "account_not_found",
            AppError::Scan(_) => "scan_error",
            AppError::NoRowsAffected(_) => "no_rows_affected",
            AppError::Persistence(_) => "persistence_error",
            AppError::InvalidRequest(_) => "invalid_request",
            AppError::Domain(DomainError::InsufficientFunds { .. }) => "insufficient_funds",
            AppError::Domain(DomainError::InvalidAmount(_)) => "invalid_amount",
            AppError::Domain(DomainError::SameAccountTransfer) => "same_account_transfer",
            AppError::Domain(DomainError::BalanceOverflow(_)) => "balance_overflow",
            AppError::Database(_) => "database_error",
            AppError::Cancelled => "cancelled",
            AppError::AuthToken(_) => "auth_token_error",
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, details) = match &self {
            // 404 Not Found
            AppError::AccountNotFound(id) => (StatusCode::NOT_FOUND, Some(id.clone())),

            // Business rejections
            AppError::InvalidRequest(reason) => (StatusCode::BAD_REQUEST, Some(reason.clone())),
            AppError::Domain(DomainError::InsufficientFunds { .. }) => {
                (StatusCode::UNPROCESSABLE_ENTITY, None)
            }
            AppError::Domain(DomainError::BalanceOverflow(id)) => {
                (StatusCode::UNPROCESSABLE_ENTITY, Some(id.clone()))
            }
            AppError::Domain(domain_err) => {
                (StatusCode::BAD_REQUEST, Some(domain_err.to_string()))
            }

            // 504 Gateway Timeout
            AppError::Cancelled => (StatusCode::GATEWAY_TIMEOUT, None),

            // 500 Internal Server Error
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, None)
            }
            AppError::Scan(_)
            | AppError::NoRowsAffected(_)
            | AppError::Persistence(_)
            | AppError::AuthToken(_) => {
                tracing::error!("Internal error: {}", self);
                (StatusCode::INTERNAL_SERVER_ERROR, None)
            }
        };

        let body = ErrorResponse {
            error: self.to_string(),
            error_code: self.error_code().to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}
