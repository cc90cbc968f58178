//! Route table for the course resource

use super::handlers::{
    CourseState, create_course, delete_course, list_courses, replace_course, retrieve_course,
    update_course,
};
use axum::{Json, Router, routing::get};
use serde_json::{Value, json};

/// Build course routes
///
/// - GET    /courses/       - List courses (filtered, paginated)
/// - POST   /courses/       - Create a course
/// - GET    /courses/{id}/  - Retrieve a course
/// - PUT    /courses/{id}/  - Replace a course
/// - PATCH  /courses/{id}/  - Partially update a course
/// - DELETE /courses/{id}/  - Delete a course
pub fn build_course_routes(state: CourseState) -> Router {
    Router::new()
        .route("/courses/", get(list_courses).post(create_course))
        .route(
            "/courses/{id}/",
            get(retrieve_course)
                .put(replace_course)
                .patch(update_course)
                .delete(delete_course),
        )
        .with_state(state)
}

/// Build health check routes
pub fn health_routes() -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/healthz", get(health_check))
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "courses-api"
    }))
}
