//! Error handling for the Warehouse Management Platform
//!
//! Provides consistent error responses in English and Vietnamese

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication errors
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    // Validation errors
    #[error("Validation error: {message}")]
    Validation {
        field: String,
        message: String,
        message_vi: String,
    },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Duplicate entry: {0}")]
    DuplicateKey(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    // Business logic errors
    #[error("Insufficient stock: {requested} requested, {available} available")]
    InsufficientStock {
        available: Decimal,
        requested: Decimal,
    },

    #[error("Delete blocked by dependent rows on {resource}")]
    DependencyConflict {
        resource: String,
        dependents: Vec<BlockingDependents>,
    },

    // Database errors
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Internal errors
    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

/// One relation blocking a delete, with its row count
#[derive(Debug, Clone, Serialize)]
pub struct BlockingDependents {
    pub relation: String,
    pub count: i64,
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message_en: String,
    pub message_vi: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_detail) = match &self {
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                ErrorDetail {
                    code: "INVALID_CREDENTIALS".to_string(),
                    message_en: "Invalid username or password".to_string(),
                    message_vi: "Tên đăng nhập hoặc mật khẩu không đúng".to_string(),
                    field: None,
                    details: None,
                },
            ),
            AppError::TokenExpired => (
                StatusCode::UNAUTHORIZED,
                ErrorDetail {
                    code: "TOKEN_EXPIRED".to_string(),
                    message_en: "Token has expired".to_string(),
                    message_vi: "Phiên đăng nhập đã hết hạn".to_string(),
                    field: None,
                    details: None,
                },
            ),
            AppError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                ErrorDetail {
                    code: "INVALID_TOKEN".to_string(),
                    message_en: "Invalid token".to_string(),
                    message_vi: "Phiên đăng nhập không hợp lệ".to_string(),
                    field: None,
                    details: None,
                },
            ),
            AppError::Validation {
                field,
                message,
                message_vi,
            } => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "VALIDATION_ERROR".to_string(),
                    message_en: message.clone(),
                    message_vi: message_vi.clone(),
                    field: Some(field.clone()),
                    details: None,
                },
            ),
            AppError::ValidationError(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "VALIDATION_ERROR".to_string(),
                    message_en: msg.clone(),
                    message_vi: format!("Dữ liệu không hợp lệ: {}", msg),
                    field: None,
                    details: None,
                },
            ),
            AppError::DuplicateKey(field) => (
                StatusCode::CONFLICT,
                ErrorDetail {
                    code: "DUPLICATE_KEY".to_string(),
                    message_en: format!("A record with this {} already exists", field),
                    message_vi: format!("{} này đã tồn tại", field),
                    field: Some(field.clone()),
                    details: None,
                },
            ),
            AppError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                ErrorDetail {
                    code: "NOT_FOUND".to_string(),
                    message_en: format!("{} not found", resource),
                    message_vi: format!("Không tìm thấy {}", resource),
                    field: None,
                    details: None,
                },
            ),
            AppError::InsufficientStock {
                available,
                requested,
            } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorDetail {
                    code: "INSUFFICIENT_STOCK".to_string(),
                    message_en: format!(
                        "Requested quantity {} exceeds available stock {}",
                        requested, available
                    ),
                    message_vi: format!(
                        "Số lượng yêu cầu {} vượt quá tồn kho hiện tại {}",
                        requested, available
                    ),
                    field: None,
                    details: Some(serde_json::json!({
                        "available": available,
                        "requested": requested,
                    })),
                },
            ),
            AppError::DependencyConflict {
                resource,
                dependents,
            } => (
                StatusCode::CONFLICT,
                ErrorDetail {
                    code: "DEPENDENCY_CONFLICT".to_string(),
                    message_en: format!("Cannot delete {} with dependent records", resource),
                    message_vi: format!("Không thể xóa {} đang có dữ liệu liên quan", resource),
                    field: None,
                    details: serde_json::to_value(dependents).ok(),
                },
            ),
            AppError::DatabaseError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "DATABASE_ERROR".to_string(),
                    message_en: "A database error occurred".to_string(),
                    message_vi: "Lỗi cơ sở dữ liệu".to_string(),
                    field: None,
                    details: None,
                },
            ),
            AppError::InternalError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "INTERNAL_ERROR".to_string(),
                    message_en: "An internal server error occurred".to_string(),
                    message_vi: "Lỗi máy chủ nội bộ".to_string(),
                    field: None,
                    details: None,
                },
            ),
        };

        // Log the error for debugging
        tracing::error!("Error: {:?}", self);

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

impl AppError {
    /// Map a sqlx error to `DuplicateKey` when it is a unique-constraint
    /// violation on the given natural key, passing it through otherwise.
    pub fn on_unique_violation(err: sqlx::Error, field: &str) -> AppError {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                AppError::DuplicateKey(field.to_string())
            }
            _ => AppError::DatabaseError(err),
        }
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
