//! Typed error handling for the courses API
//!
//! Every failure a request can hit is a variant of [`ApiError`], which knows
//! its HTTP status code and how to render itself as a JSON body.
//!
//! # Error Categories
//!
//! - [`ApiError::Validation`]: field-level violations on create/update (400)
//! - [`ApiError::Parse`]: malformed list query parameters (400)
//! - [`ApiError::NotFound`]: unknown course identifier (404)
//! - [`ApiError::InvalidPage`]: page number outside the result set (404)
//! - [`ApiError::MalformedBody`]: request body is not a JSON object (400)
//! - [`ApiError::UnsupportedMediaType`]: body not sent as `application/json` (415)
//! - [`ApiError::BadRequest`]: any other malformed request (400)
//! - [`ApiError::Storage`]: the storage backend failed (500)
//!
//! # Example
//!
//! ```rust,ignore
//! async fn retrieve(service: &dyn CourseService, id: i64) -> Result<Course, ApiError> {
//!     service.get(id).await?.ok_or(ApiError::NotFound)
//! }
//!
//! match result {
//!     Err(ApiError::Validation(errors)) => println!("rejected: {}", errors),
//!     Err(ApiError::NotFound) => println!("no such course"),
//!     _ => {}
//! }
//! ```

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::fmt;

/// Mapping of field name to a human-readable message
///
/// Serializes as a flat JSON object, e.g.
/// `{"end_date": "End date cannot be earlier than start date"}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error for a field
    ///
    /// The first message recorded for a field wins.
    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_insert_with(|| message.into());
    }

    /// Merge another set of errors into this one
    pub fn extend(&mut self, other: FieldErrors) {
        for (field, message) in other.0 {
            self.insert(field, message);
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msgs: Vec<String> = self
            .0
            .iter()
            .map(|(field, message)| format!("{}: {}", field, message))
            .collect();
        write!(f, "{}", msgs.join(", "))
    }
}

/// The error type returned by course handlers and services
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Field-level semantic violations on write
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    /// Malformed query-parameter input on list
    #[error("Invalid query parameters: {0}")]
    Parse(FieldErrors),

    /// Missing identifier on retrieve/update/delete
    #[error("Not found.")]
    NotFound,

    /// Requested page does not exist
    #[error("Invalid page.")]
    InvalidPage,

    /// Request body could not be read as a JSON object
    #[error("JSON parse error - {0}")]
    MalformedBody(String),

    /// Body sent without a JSON content type
    #[error("Unsupported media type \"{0}\" in request.")]
    UnsupportedMediaType(String),

    /// Any other malformed request
    #[error("{0}")]
    BadRequest(String),

    /// Storage backend failure
    #[error("Storage error: {0:#}")]
    Storage(#[from] anyhow::Error),
}

impl ApiError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_)
            | ApiError::Parse(_)
            | ApiError::MalformedBody(_)
            | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound | ApiError::InvalidPage => StatusCode::NOT_FOUND,
            ApiError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get a stable code for logs and programmatic matching
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "VALIDATION_ERROR",
            ApiError::Parse(_) => "PARSE_ERROR",
            ApiError::NotFound => "NOT_FOUND",
            ApiError::InvalidPage => "INVALID_PAGE",
            ApiError::MalformedBody(_) => "MALFORMED_BODY",
            ApiError::UnsupportedMediaType(_) => "UNSUPPORTED_MEDIA_TYPE",
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::Storage(_) => "STORAGE_ERROR",
        }
    }

    /// The JSON body sent to the client
    ///
    /// Field errors are sent as the bare field map; everything else is a
    /// `{"detail": ...}` object. Storage failures never leak their cause.
    pub fn body(&self) -> Value {
        match self {
            ApiError::Validation(errors) | ApiError::Parse(errors) => json!(errors),
            ApiError::Storage(_) => json!({ "detail": "A server error occurred." }),
            other => json!({ "detail": other.to_string() }),
        }
    }

    /// Field errors carried by this error, if any
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            ApiError::Validation(errors) | ApiError::Parse(errors) => Some(errors),
            _ => None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if let ApiError::Storage(err) = &self {
            tracing::error!(code = self.error_code(), error = %format!("{:#}", err), "storage failure");
        } else {
            tracing::debug!(code = self.error_code(), %status, "request rejected");
        }
        (status, Json(self.body())).into_response()
    }
}
