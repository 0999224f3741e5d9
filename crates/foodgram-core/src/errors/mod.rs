// ABOUTME: Unified error handling with error codes, field-level details, and HTTP mapping
// ABOUTME: Defines AppError, ErrorCode, and the JSON error envelope returned by the API
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Foodgram

//! # Unified Error Handling System
//!
//! Every fallible operation in the workspace returns [`AppResult`]. Errors are
//! recovered at the request boundary and rendered as a structured JSON body:
//!
//! ```json
//! {"error": {"code": "INVALID_INPUT", "message": "...", "details": {"tags": ["..."]}}}
//! ```
//!
//! The taxonomy maps onto error codes as follows:
//!
//! | Kind | Codes |
//! |---|---|
//! | validation | `INVALID_INPUT`, `MISSING_REQUIRED_FIELD`, `INVALID_FORMAT`, `VALUE_OUT_OF_RANGE` |
//! | not found | `RESOURCE_NOT_FOUND` |
//! | conflict | `RESOURCE_ALREADY_EXISTS` |
//! | permission | `AUTH_REQUIRED`, `AUTH_INVALID`, `PERMISSION_DENIED` |
//! | not present | `RELATION_NOT_PRESENT` |

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Standard error codes used throughout the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Authentication & Authorization
    /// No credentials were supplied for an operation that needs them
    AuthRequired,
    /// Credentials were supplied but could not be verified
    AuthInvalid,
    /// Authenticated, but not allowed to touch this object
    PermissionDenied,

    // Validation
    /// Generic malformed input
    InvalidInput,
    /// A required field is absent or empty
    MissingRequiredField,
    /// A field could not be decoded (e.g. image payload)
    InvalidFormat,
    /// A numeric field is outside its allowed range
    ValueOutOfRange,
    /// Request body exceeds the configured limit
    PayloadTooLarge,

    // Resource Management
    /// Referenced entity does not exist
    ResourceNotFound,
    /// Uniqueness violation
    ResourceAlreadyExists,
    /// The referenced entities exist but the relation between them does not
    RelationNotPresent,

    // Internal Errors
    /// Unexpected server failure
    InternalError,
    /// Storage layer failure
    DatabaseError,
    /// Media storage failure
    StorageError,
    /// Invalid or missing configuration
    ConfigError,
}

impl ErrorCode {
    /// Get the HTTP status code for this error
    #[must_use]
    pub const fn http_status(self) -> u16 {
        match self {
            Self::InvalidInput
            | Self::MissingRequiredField
            | Self::InvalidFormat
            | Self::ValueOutOfRange
            | Self::RelationNotPresent => 400,

            Self::AuthRequired | Self::AuthInvalid => 401,

            Self::PermissionDenied => 403,

            Self::ResourceNotFound => 404,

            Self::ResourceAlreadyExists => 409,

            Self::PayloadTooLarge => 413,

            Self::InternalError | Self::DatabaseError | Self::StorageError | Self::ConfigError => {
                500
            }
        }
    }

    /// Get a user-friendly description of this error
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::AuthRequired => "Authentication credentials were not provided",
            Self::AuthInvalid => "The provided authentication credentials are invalid",
            Self::PermissionDenied => "You do not have permission to perform this action",
            Self::InvalidInput => "The provided input is invalid",
            Self::MissingRequiredField => "A required field is missing from the request",
            Self::InvalidFormat => "The data format is invalid",
            Self::ValueOutOfRange => "The provided value is outside the acceptable range",
            Self::PayloadTooLarge => "The request body is too large",
            Self::ResourceNotFound => "The requested resource was not found",
            Self::ResourceAlreadyExists => "A resource with this identifier already exists",
            Self::RelationNotPresent => "The requested relation does not exist",
            Self::InternalError => "An internal server error occurred",
            Self::DatabaseError => "Database operation failed",
            Self::StorageError => "Storage operation failed",
            Self::ConfigError => "Configuration error encountered",
        }
    }

    /// Whether errors with this code are caused by the client and safe to echo back verbatim
    #[must_use]
    pub const fn is_client_error(self) -> bool {
        self.http_status() < 500
    }
}

/// Unified error type for the application
#[derive(Debug, Error)]
pub struct AppError {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Structured details; for validation errors a `{"field": ["message", ...]}` object
    pub details: Value,
    /// Source error for error chaining
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new `AppError` with the given code and message
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: Value::Null,
            source: None,
        }
    }

    /// Attach structured details to the error
    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = details;
        self
    }

    /// Attach a source error for error chaining
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Prefix the message with where the error happened
    #[must_use]
    pub fn context(mut self, context: impl fmt::Display) -> Self {
        self.message = format!("{context}: {}", self.message);
        self
    }

    /// Get the HTTP status code for this error
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        self.code.http_status()
    }

    /// Field name -> messages, when this is a field-tagged validation error
    #[must_use]
    pub fn field_errors(&self) -> Option<&Map<String, Value>> {
        self.details.as_object()
    }

    /// Whether this error carries a message for `field`
    #[must_use]
    pub fn has_field(&self, field: &str) -> bool {
        self.field_errors().is_some_and(|m| m.contains_key(field))
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.description(), self.message)
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

/// Convenience functions for creating common errors
impl AppError {
    /// Authentication required
    #[must_use]
    pub fn auth_required() -> Self {
        Self::new(ErrorCode::AuthRequired, "Authentication required")
    }

    /// Invalid authentication
    #[must_use]
    pub fn auth_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::AuthInvalid, message)
    }

    /// Authenticated, but not allowed
    #[must_use]
    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::PermissionDenied, message)
    }

    /// Resource not found
    #[must_use]
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ResourceNotFound,
            format!("{} not found", resource.into()),
        )
    }

    /// Invalid input without a specific field
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// Field-tagged validation error
    #[must_use]
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        Self::field_with_code(ErrorCode::InvalidInput, field, message)
    }

    /// Field-tagged validation error with a more specific validation code
    #[must_use]
    pub fn field_with_code(code: ErrorCode, field: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        let mut details = Map::new();
        details.insert(
            field.to_owned(),
            Value::Array(vec![Value::String(message.clone())]),
        );
        Self::new(code, message).with_details(Value::Object(details))
    }

    /// Body over the size limit
    #[must_use]
    pub fn payload_too_large(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::PayloadTooLarge, message)
    }

    /// Uniqueness violation
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ResourceAlreadyExists, message)
    }

    /// Relation to remove does not exist
    #[must_use]
    pub fn not_present(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::RelationNotPresent, message)
    }

    /// Internal server error
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Database error
    #[must_use]
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DatabaseError, message)
    }

    /// Media storage error
    #[must_use]
    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::StorageError, message)
    }

    /// Configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, message)
    }
}

/// HTTP error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error payload
    pub error: ErrorResponseDetails,
}

/// Body of [`ErrorResponse`]
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponseDetails {
    /// Machine-readable code
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Field-level detail, omitted when empty
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub details: Value,
}

impl From<AppError> for ErrorResponse {
    fn from(error: AppError) -> Self {
        // Server-side failures keep their message in the logs only
        let message = if error.code.is_client_error() {
            error.message
        } else {
            error.code.description().to_owned()
        };
        Self {
            error: ErrorResponseDetails {
                code: error.code,
                message,
                details: error.details,
            },
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::invalid_input(format!("Malformed JSON payload: {error}"))
    }
}

#[cfg(feature = "http-response")]
mod http_response {
    use axum::response::{IntoResponse, Response};
    use axum::Json;
    use http::StatusCode;

    use super::{AppError, ErrorResponse};

    impl IntoResponse for AppError {
        fn into_response(self) -> Response {
            let status = StatusCode::from_u16(self.http_status())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            if status.is_server_error() {
                tracing::error!(code = ?self.code, error = %self.message, "Request failed");
            } else {
                tracing::debug!(code = ?self.code, error = %self.message, "Request rejected");
            }
            (status, Json(ErrorResponse::from(self))).into_response()
        }
    }
}

#[cfg(feature = "database-errors")]
pub use database_errors::DatabaseResultExt;

#[cfg(feature = "database-errors")]
mod database_errors {
    use std::fmt::Display;

    use super::{AppError, AppResult, ErrorCode};

    impl From<sqlx::Error> for AppError {
        fn from(error: sqlx::Error) -> Self {
            let mapped = match &error {
                sqlx::Error::Database(db) if db.is_unique_violation() => {
                    Self::conflict("record already exists")
                }
                sqlx::Error::RowNotFound => Self::not_found("Row"),
                other => Self::database(other.to_string()),
            };
            mapped.with_source(error)
        }
    }

    /// Attach call-site context to sqlx results
    pub trait DatabaseResultExt<T> {
        /// Map through `From<sqlx::Error>` and prefix the message with `context`
        ///
        /// # Errors
        ///
        /// Returns the mapped error when `self` is `Err`
        fn db_context(self, context: impl Display) -> AppResult<T>;

        /// Like [`db_context`](Self::db_context), but a unique violation becomes a
        /// conflict carrying `conflict` as its client-facing message
        ///
        /// # Errors
        ///
        /// Returns the mapped error when `self` is `Err`
        fn db_unique(self, conflict: impl Into<String>, context: impl Display) -> AppResult<T>;
    }

    impl<T> DatabaseResultExt<T> for Result<T, sqlx::Error> {
        fn db_context(self, context: impl Display) -> AppResult<T> {
            self.map_err(|e| AppError::from(e).context(context))
        }

        fn db_unique(self, conflict: impl Into<String>, context: impl Display) -> AppResult<T> {
            self.db_context(context).map_err(|e| {
                if e.code == ErrorCode::ResourceAlreadyExists {
                    AppError::conflict(conflict)
                } else {
                    e
                }
            })
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_http_status() {
        assert_eq!(ErrorCode::AuthRequired.http_status(), 401);
        assert_eq!(ErrorCode::PermissionDenied.http_status(), 403);
        assert_eq!(ErrorCode::ResourceNotFound.http_status(), 404);
        assert_eq!(ErrorCode::ResourceAlreadyExists.http_status(), 409);
        assert_eq!(ErrorCode::RelationNotPresent.http_status(), 400);
        assert_eq!(ErrorCode::PayloadTooLarge.http_status(), 413);
        assert_eq!(ErrorCode::DatabaseError.http_status(), 500);
    }

    #[test]
    fn test_field_error_details() {
        let error = AppError::field("tags", "Tag list must not be empty");
        assert_eq!(error.code, ErrorCode::InvalidInput);
        assert!(error.has_field("tags"));
        assert!(!error.has_field("ingredients"));
        assert_eq!(
            error.details["tags"][0].as_str(),
            Some("Tag list must not be empty")
        );
    }

    #[test]
    fn test_error_response_hides_internal_messages() {
        let error = AppError::database("near \"SELEC\": syntax error");
        let response = ErrorResponse::from(error);
        assert_eq!(response.error.message, "Database operation failed");

        let json = serde_json::to_string(&ErrorResponse::from(AppError::conflict(
            "Recipe is already in favorites",
        )))
        .unwrap();
        assert!(json.contains("RESOURCE_ALREADY_EXISTS"));
        assert!(json.contains("Recipe is already in favorites"));
        assert!(!json.contains("details"));
    }
}
