//! Axum extractors for course requests
//!
//! - [`CourseJson`] reads a JSON body into a [`ParsedPayload`]: the fields
//!   that parsed plus a message for each one that did not.
//! - [`RequestUrl`] reconstructs the absolute URL of the current request, used
//!   for `url`, `next` and `previous` links.

use super::handlers::CourseState;
use crate::core::course::{CoursePayload, ParsedPayload};
use crate::core::error::ApiError;
use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, OriginalUri, Request, rejection::JsonRejection},
    http::{
        HeaderMap,
        header::{CONTENT_TYPE, HOST},
        request::Parts,
    },
};
use serde_json::Value;
use url::Url;

const FALLBACK_BASE: &str = "http://localhost";

/// Course payload extracted from a JSON body
///
/// Only body-level problems reject the request here: a missing JSON
/// content type is [`ApiError::UnsupportedMediaType`], anything that is not a
/// JSON object is [`ApiError::MalformedBody`]. Per-field type errors travel
/// inside the [`ParsedPayload`] so they can be reported with the rest.
///
/// # Usage
///
/// ```rust,ignore
/// pub async fn create_course(
///     CourseJson(parsed): CourseJson,
/// ) -> Result<Json<CourseDetail>, ApiError> {
///     let new_course = validate_new(parsed)?;
/// }
/// ```
pub struct CourseJson(pub ParsedPayload);

impl<S> FromRequest<S> for CourseJson
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();

        let Json(body): Json<Value> =
            Json::from_request(req, state).await.map_err(|e| match e {
                JsonRejection::MissingJsonContentType(_) => {
                    ApiError::UnsupportedMediaType(content_type)
                }
                other => ApiError::MalformedBody(other.body_text()),
            })?;

        CoursePayload::parse_json(&body).map(CourseJson)
    }
}

/// Absolute URL of the current request
#[derive(Debug, Clone)]
pub struct RequestUrl {
    base: String,
    current: Url,
}

impl RequestUrl {
    /// Build from a base (scheme + host, optionally a path prefix) and a
    /// request path with query
    pub fn new(base: &str, path_and_query: &str) -> Result<Self, url::ParseError> {
        let base = base.trim_end_matches('/').to_string();
        let current = Url::parse(&format!("{}{}", base, path_and_query))?;
        Ok(Self { base, current })
    }

    /// The full URL of this request, query string included
    pub fn current(&self) -> &Url {
        &self.current
    }

    /// Link to the detail endpoint of a course
    pub fn course_url(&self, id: i64) -> String {
        format!("{}/courses/{}/", self.base, id)
    }
}

/// Origin derived from the `Host` header
fn host_base(headers: &HeaderMap) -> Option<String> {
    let host = headers.get(HOST)?.to_str().ok()?;
    let base = format!("http://{}", host);
    Url::parse(&base).ok().map(|_| base)
}

impl FromRequestParts<CourseState> for RequestUrl {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &CourseState,
    ) -> Result<Self, Self::Rejection> {
        let uri = parts
            .extensions
            .get::<OriginalUri>()
            .map(|original| original.0.clone())
            .unwrap_or_else(|| parts.uri.clone());
        let path_and_query = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");

        let base = state
            .public_url
            .clone()
            .or_else(|| host_base(&parts.headers))
            .unwrap_or_else(|| FALLBACK_BASE.to_string());

        RequestUrl::new(&base, path_and_query)
            .or_else(|_| RequestUrl::new(FALLBACK_BASE, path_and_query))
            .map_err(|e| ApiError::BadRequest(format!("Invalid request URL: {}", e)))
    }
}
