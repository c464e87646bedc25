//! # Error Handling
//!
//! This module provides unified error handling for the Estates API:
//! domain errors raised by the repositories, and their problem+json HTTP
//! representation with trace ID propagation.

use axum::{
    extract::rejection::JsonRejection,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use utoipa::ToSchema;

use crate::password::PasswordError;
use crate::telemetry;

/// Unified API error response structure
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ApiError {
    /// HTTP status code for the response
    #[serde(skip_serializing, skip_deserializing)]
    pub status: StatusCode,
    /// Error code for programmatic handling
    pub code: Box<str>,
    /// Human-readable error message
    pub message: Box<str>,
    /// Additional error details (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Box<serde_json::Value>>,
    /// Correlation trace ID for debugging (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<Box<str>>,
}

impl ApiError {
    /// Create a new API error with the given status code and message
    pub fn new<S: Into<String>>(status: StatusCode, code: S, message: S) -> Self {
        Self {
            status,
            code: code.into().into_boxed_str(),
            message: message.into().into_boxed_str(),
            details: None,
            trace_id: Self::current_trace_id(),
        }
    }

    /// Add details to the error
    pub fn with_details<V: Into<serde_json::Value>>(mut self, details: V) -> Self {
        self.details = Some(Box::new(details.into()));
        self
    }

    /// Extract current trace ID from the active tracing span (falls back to generated correlation ID)
    fn current_trace_id() -> Option<Box<str>> {
        telemetry::current_trace_id()
            .map(|trace_id| trace_id.into_boxed_str())
            .or_else(|| {
                // Fallback: generate a correlation ID for basic client-server log correlation
                Some(format!("corr-{}", &uuid::Uuid::new_v4().to_string()[..8]).into_boxed_str())
            })
    }
}

/// Unique indexes created by the migrations and the field each guards.
/// Postgres names the index in the error.
const UNIQUE_INDEXES: &[(&str, &str)] = &[
    ("idx_properties_ref_code", "ref_code"),
    ("idx_properties_slug", "slug"),
    ("idx_users_username", "username"),
    ("idx_users_email", "email"),
];

/// SQLite names the columns instead: `UNIQUE constraint failed: users.email`.
const UNIQUE_COLUMNS: &[(&str, &str)] = &[
    ("properties.ref_code", "ref_code"),
    ("properties.slug", "slug"),
    ("users.username", "username"),
    ("users.email", "email"),
];

/// The field guarded by the unique index `error` violated, or `None` when
/// `error` is not a unique violation. Unknown indexes map to `"record"`.
pub(crate) fn unique_violation(error: &sea_orm::DbErr) -> Option<&'static str> {
    use sea_orm::{DbErr, RuntimeErr};

    let sqlx_err = match error {
        DbErr::Query(RuntimeErr::SqlxError(sqlx_err))
        | DbErr::Exec(RuntimeErr::SqlxError(sqlx_err)) => sqlx_err,
        _ => return None,
    };

    let db_error = sqlx_err.as_database_error()?;
    if !db_error.is_unique_violation() {
        return None;
    }

    let field = match db_error.constraint() {
        Some(index) => field_for_index(index),
        None => field_for_sqlite_message(db_error.message()),
    };
    Some(field.unwrap_or("record"))
}

fn field_for_index(index: &str) -> Option<&'static str> {
    UNIQUE_INDEXES
        .iter()
        .find(|(name, _)| *name == index)
        .map(|(_, field)| *field)
}

fn field_for_sqlite_message(message: &str) -> Option<&'static str> {
    let columns = message.strip_prefix("UNIQUE constraint failed: ")?;
    columns.split(", ").find_map(|column| {
        UNIQUE_COLUMNS
            .iter()
            .find(|(name, _)| *name == column.trim())
            .map(|(_, field)| *field)
    })
}

/// Errors raised by the repository layer.
///
/// Validation always runs before anything is written, so a `Validation`
/// error guarantees the store was left untouched.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("invalid {field}: {message}")]
    Validation { field: &'static str, message: String },
    #[error("{field} already exists")]
    Uniqueness { field: &'static str },
    #[error("not found: {0}")]
    NotFound(String),
    #[error("still referenced: {0}")]
    InUse(String),
    #[error(transparent)]
    Password(#[from] PasswordError),
    #[error("database error: {0}")]
    Database(sea_orm::DbErr),
}

impl RepositoryError {
    pub fn validation_error<M: Into<String>>(field: &'static str, message: M) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    /// Wrap a store error, classifying unique-index violations.
    pub fn database_error(error: sea_orm::DbErr) -> Self {
        if let Some(field) = unique_violation(&error) {
            return Self::Uniqueness { field };
        }
        Self::Database(error)
    }
}

impl From<sea_orm::DbErr> for RepositoryError {
    fn from(error: sea_orm::DbErr) -> Self {
        Self::database_error(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut headers = HeaderMap::new();
        headers.insert(
            "content-type",
            HeaderValue::from_static("application/problem+json"),
        );

        (self.status, headers, axum::Json(self)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let message = match rejection {
            JsonRejection::JsonDataError(err) => format!("Invalid JSON: {}", err),
            JsonRejection::JsonSyntaxError(err) => format!("JSON syntax error: {}", err),
            JsonRejection::MissingJsonContentType(_) => {
                "Missing 'Content-Type: application/json' header".to_string()
            }
            _ => "Invalid request body".to_string(),
        };

        Self::new(StatusCode::BAD_REQUEST, "VALIDATION_FAILED", &message)
    }
}

impl From<sea_orm::DbErr> for ApiError {
    fn from(error: sea_orm::DbErr) -> Self {
        if unique_violation(&error).is_some() {
            tracing::debug!(?error, "Unique constraint violation detected");
            return Self::new(StatusCode::CONFLICT, "CONFLICT", "Resource already exists");
        }

        match error {
            sea_orm::DbErr::RecordNotFound(record) => Self::new(
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                &format!("Record not found: {}", record),
            ),
            sea_orm::DbErr::Query(query_err) => {
                tracing::error!("Database query error: {:?}", query_err);
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_SERVER_ERROR",
                    "Database error occurred",
                )
            }
            sea_orm::DbErr::Exec(exec_err) => {
                tracing::error!("Database execution error: {:?}", exec_err);
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_SERVER_ERROR",
                    "Database error occurred",
                )
            }
            sea_orm::DbErr::Conn(connection_err) => {
                tracing::error!("Database connection error: {:?}", connection_err);
                Self::new(
                    StatusCode::SERVICE_UNAVAILABLE,
                    "SERVICE_UNAVAILABLE",
                    "Database service unavailable",
                )
            }
            _ => {
                tracing::error!("Database error: {:?}", error);
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_SERVER_ERROR",
                    "Database error occurred",
                )
            }
        }
    }
}

impl From<RepositoryError> for ApiError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::Validation { field, message } => {
                validation_error("Validation failed", json!({ field: message }))
            }
            RepositoryError::Uniqueness { field } => Self::new(
                StatusCode::CONFLICT,
                "CONFLICT",
                &format!("A record with this {} already exists", field),
            )
            .with_details(json!({ "field": field })),
            RepositoryError::NotFound(what) => {
                Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", &what)
            }
            RepositoryError::InUse(what) => Self::new(StatusCode::CONFLICT, "CONFLICT", &what),
            RepositoryError::Password(err) => {
                tracing::error!(error = %err, "Password hashing failed");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_SERVER_ERROR",
                    "An internal error occurred",
                )
            }
            RepositoryError::Database(db_err) => db_err.into(),
        }
    }
}

/// Create an unauthorized error (401)
pub fn unauthorized(message: Option<&str>) -> ApiError {
    let msg = message.unwrap_or("Authentication required");
    ApiError::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg)
}

/// Create an unauthorized error (401) with explicit trace_id
pub fn unauthorized_with_trace_id(message: Option<&str>, trace_id: String) -> ApiError {
    let msg = message.unwrap_or("Authentication required");
    let mut error = ApiError::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg);
    error.trace_id = Some(trace_id.into_boxed_str());
    error
}

/// Create a validation error with field details
pub fn validation_error(message: &str, field_errors: serde_json::Value) -> ApiError {
    ApiError::new(StatusCode::BAD_REQUEST, "VALIDATION_FAILED", message).with_details(field_errors)
}
