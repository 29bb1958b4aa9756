//! Unified Error Handling
//!
//! Application-wide error type and its HTTP mapping. Business-rule failures
//! (stock, state machine, checkout) carry enough structure for the caller to
//! react; infrastructure failures are logged and collapsed to generic codes.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use shared::ApiResponse;
use tracing::error;

use crate::db::repository::RepoError;

/// Application-level error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // ========== Caller Errors ==========
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Resource already exists: {0}")]
    Conflict(String),

    // ========== Business Rule Errors ==========
    #[error("Insufficient stock for product {product_id}: {available} available")]
    InsufficientStock { product_id: i64, available: i64 },

    #[error("Invalid transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    #[error("No selected items to check out")]
    EmptyCheckout,

    #[error("Order sequence unavailable: {0}")]
    SequenceExhausted(String),

    // ========== System Errors ==========
    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        AppError::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        AppError::Conflict(msg.into())
    }

    pub fn database(msg: impl Into<String>) -> Self {
        AppError::Database(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }

    pub fn invalid_transition(from: impl ToString, to: impl ToString) -> Self {
        AppError::InvalidTransition {
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, data) = match &self {
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "E0002", msg.clone(), None)
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "E0003", msg.clone(), None),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "E0004", msg.clone(), None),

            AppError::InsufficientStock {
                product_id,
                available,
            } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "E1001",
                self.to_string(),
                Some(json!({ "product_id": product_id, "available": available })),
            ),
            AppError::InvalidTransition { from, to } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "E1002",
                self.to_string(),
                Some(json!({ "from": from, "to": to })),
            ),
            AppError::EmptyCheckout => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "E1003",
                self.to_string(),
                None,
            ),
            AppError::SequenceExhausted(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "E1004",
                msg.clone(),
                None,
            ),

            AppError::Database(msg) => {
                error!(target: "database", error = %msg, "Database error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "E9002",
                    "Database error".to_string(),
                    None,
                )
            }
            AppError::Internal(msg) => {
                error!(target: "internal", error = %msg, "Internal error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "E9001",
                    "Internal server error".to_string(),
                    None,
                )
            }
        };

        let body = Json(ApiResponse::<serde_json::Value> {
            code: code.to_string(),
            message,
            data,
        });

        (status, body).into_response()
    }
}

impl From<RepoError> for AppError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::NotFound(msg) => AppError::NotFound(msg),
            RepoError::Duplicate(msg) => AppError::Conflict(msg),
            RepoError::Validation(msg) => AppError::Validation(msg),
            RepoError::Database(msg) => AppError::Database(msg),
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::Database(e.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(e: validator::ValidationErrors) -> Self {
        AppError::Validation(e.to_string())
    }
}

/// Result type for handlers and services
pub type AppResult<T> = Result<T, AppError>;
