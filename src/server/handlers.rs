//! HTTP handlers for the course resource
//!
//! Handlers stay thin: parse the request, call the explicit validation step,
//! talk to the [`CourseService`], and project the result.

use super::extractors::{CourseJson, RequestUrl};
use super::projection::{CourseDetail, CourseListItem};
use crate::core::course::Course;
use crate::core::error::ApiError;
use crate::core::pagination::{PageNumber, PaginatedResponse, PaginationSettings, paginate};
use crate::core::query::CourseListParams;
use crate::core::service::CourseService;
use crate::core::validation::{validate_new, validate_replace, validate_update};
use axum::{
    Json,
    extract::{Path, Query, State, rejection::QueryRejection},
    http::StatusCode,
};
use std::sync::Arc;

/// State shared by all course handlers
#[derive(Clone)]
pub struct CourseState {
    pub service: Arc<dyn CourseService>,
    pub pagination: PaginationSettings,
    /// Base for absolute links; `None` means derive it from the `Host` header
    pub public_url: Option<String>,
}

/// Parse the `{id}` path segment
///
/// Anything that is not an integer cannot name a course, so it is a 404.
pub fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>().map_err(|_| ApiError::NotFound)
}

/// List courses
///
/// GET /courses/?name=&start_date=&end_date=&page=&page_size=
pub async fn list_courses(
    State(state): State<CourseState>,
    urls: RequestUrl,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Json<PaginatedResponse<CourseListItem>>, ApiError> {
    let Query(pairs) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let params = CourseListParams::from_pairs(pairs);

    let filter = params.filter()?;
    let page_number = PageNumber::parse(params.page())?;
    let page_size = state.pagination.page_size(params.page_size());

    let courses = state.service.list(&filter).await?;
    let page = paginate(courses, page_number, page_size)?;

    tracing::debug!(
        count = page.count,
        page = page.number,
        page_size = page.page_size,
        "listed courses"
    );

    let page = page.map(|course| CourseListItem::project(&course, &urls));
    Ok(Json(page.into_response(urls.current())))
}

/// Create a course
///
/// POST /courses/
pub async fn create_course(
    State(state): State<CourseState>,
    urls: RequestUrl,
    CourseJson(parsed): CourseJson,
) -> Result<(StatusCode, Json<CourseDetail>), ApiError> {
    let new_course = validate_new(parsed)?;
    let course = state.service.create(new_course).await?;

    tracing::info!(id = course.id, name = %course.name, "course created");

    Ok((
        StatusCode::CREATED,
        Json(CourseDetail::project(&course, &urls)),
    ))
}

/// Retrieve one course
///
/// GET /courses/{id}/
pub async fn retrieve_course(
    State(state): State<CourseState>,
    Path(id): Path<String>,
    urls: RequestUrl,
) -> Result<Json<CourseDetail>, ApiError> {
    let id = parse_id(&id)?;
    let course = state.service.get(id).await?.ok_or(ApiError::NotFound)?;

    Ok(Json(CourseDetail::project(&course, &urls)))
}

/// Partially update a course
///
/// PATCH /courses/{id}/
///
/// Body problems are only reported once the course is known to exist.
pub async fn update_course(
    State(state): State<CourseState>,
    Path(id): Path<String>,
    urls: RequestUrl,
    payload: Result<CourseJson, ApiError>,
) -> Result<Json<CourseDetail>, ApiError> {
    let id = parse_id(&id)?;

    let course = state
        .service
        .update(
            id,
            Box::new(move |current: &Course| {
                let patch = payload?.0.into_partial()?;
                validate_update(current, &patch)
            }),
        )
        .await?
        .ok_or(ApiError::NotFound)?;

    tracing::info!(id = course.id, "course updated");

    Ok(Json(CourseDetail::project(&course, &urls)))
}

/// Replace every field of a course
///
/// PUT /courses/{id}/
pub async fn replace_course(
    State(state): State<CourseState>,
    Path(id): Path<String>,
    urls: RequestUrl,
    payload: Result<CourseJson, ApiError>,
) -> Result<Json<CourseDetail>, ApiError> {
    let id = parse_id(&id)?;

    let course = state
        .service
        .update(
            id,
            Box::new(move |current: &Course| {
                let CourseJson(replacement) = payload?;
                validate_replace(current, replacement)
            }),
        )
        .await?
        .ok_or(ApiError::NotFound)?;

    tracing::info!(id = course.id, "course replaced");

    Ok(Json(CourseDetail::project(&course, &urls)))
}

/// Delete a course
///
/// DELETE /courses/{id}/
pub async fn delete_course(
    State(state): State<CourseState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id)?;

    if !state.service.delete(id).await? {
        return Err(ApiError::NotFound);
    }

    tracing::info!(id, "course deleted");
    Ok(StatusCode::NO_CONTENT)
}
