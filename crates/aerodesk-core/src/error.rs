use axum::http::StatusCode;
use sea_orm::{DbErr, SqlErr};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::response::ApiResponse;

/// Standard error type for AeroDesk.
#[derive(Debug, Error)]
pub enum AerodeskError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// A permission or role with the same name already exists.
    #[error("Uniqueness violation: {0}")]
    UniquenessViolation(String),

    /// A role definition names a permission that is not in the catalog.
    #[error("Reference not found: {0}")]
    ReferenceNotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Validation errors")]
    ValidationErrors(Vec<FieldError>),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl AerodeskError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AerodeskError::NotFound(_) => StatusCode::NOT_FOUND,
            AerodeskError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AerodeskError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AerodeskError::Forbidden(_) => StatusCode::FORBIDDEN,
            AerodeskError::Conflict(_) => StatusCode::CONFLICT,
            AerodeskError::UniquenessViolation(_) => StatusCode::CONFLICT,
            AerodeskError::ReferenceNotFound(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AerodeskError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AerodeskError::ValidationErrors(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AerodeskError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AerodeskError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code string for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AerodeskError::NotFound(_) => "NOT_FOUND",
            AerodeskError::BadRequest(_) => "BAD_REQUEST",
            AerodeskError::Unauthorized(_) => "UNAUTHORIZED",
            AerodeskError::Forbidden(_) => "FORBIDDEN",
            AerodeskError::Conflict(_) => "CONFLICT",
            AerodeskError::UniquenessViolation(_) => "UNIQUENESS_VIOLATION",
            AerodeskError::ReferenceNotFound(_) => "REFERENCE_NOT_FOUND",
            AerodeskError::Validation(_) => "VALIDATION_ERROR",
            AerodeskError::ValidationErrors(_) => "VALIDATION_ERROR",
            AerodeskError::Internal(_) => "INTERNAL_ERROR",
            AerodeskError::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Create a validation error with field-level details.
    pub fn validation_fields(errors: Vec<FieldError>) -> Self {
        AerodeskError::ValidationErrors(errors)
    }

    /// Map an insert failure, turning unique-constraint errors into
    /// [`AerodeskError::UniquenessViolation`] for the given record description.
    pub fn from_insert(err: DbErr, what: &str) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                AerodeskError::UniquenessViolation(format!("{what} already exists"))
            }
            _ => AerodeskError::Database(err),
        }
    }
}

/// Error detail for API responses.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<FieldError>>,
}

/// Field-level validation error.
///
/// ```json
/// {
///   "field": "email",
///   "message": "must be a valid email address",
///   "code": "email"
/// }
/// ```
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FieldError {
    pub field: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl FieldError {
    /// Create a new field error.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        FieldError {
            field: field.into(),
            message: message.into(),
            code: None,
        }
    }

    /// Create a new field error with a code.
    pub fn with_code(
        field: impl Into<String>,
        message: impl Into<String>,
        code: impl Into<String>,
    ) -> Self {
        FieldError {
            field: field.into(),
            message: message.into(),
            code: Some(code.into()),
        }
    }
}

impl From<validator::ValidationErrors> for AerodeskError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<FieldError> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                let field = field.to_string();
                errs.iter()
                    .map(|e| {
                        let message = e
                            .message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| format!("{field} is invalid"));
                        FieldError::with_code(field.clone(), message, e.code.to_string())
                    })
                    .collect::<Vec<_>>()
            })
            .collect();
        // HashMap iteration order is unstable; keep responses deterministic.
        fields.sort_by(|a, b| a.field.cmp(&b.field));
        AerodeskError::ValidationErrors(fields)
    }
}

impl axum::response::IntoResponse for AerodeskError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.error_code(), "{}", self);
        }
        let fields = match &self {
            AerodeskError::ValidationErrors(errs) => Some(errs.clone()),
            _ => None,
        };
        let message = match &self {
            AerodeskError::ValidationErrors(errs) => errs
                .iter()
                .map(|e| format!("{}: {}", e.field, e.message))
                .collect::<Vec<_>>()
                .join("; "),
            _ => self.to_string(),
        };
        let body: ApiResponse<()> = ApiResponse {
            success: false,
            data: None,
            error: Some(ErrorDetail {
                code: self.error_code().to_string(),
                message,
                fields,
            }),
        };

        (status, axum::Json(body)).into_response()
    }
}
