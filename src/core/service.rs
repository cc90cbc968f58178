//! Storage-facing service trait for courses

use crate::core::course::{Course, NewCourse};
use crate::core::error::ApiError;
use crate::core::query::CourseFilter;
use anyhow::Result;
use async_trait::async_trait;

/// Read-merge-validate step applied inside an atomic update
///
/// Receives the currently stored course and returns the course to store, or
/// an error that aborts the update and leaves storage untouched.
pub type CourseMutation = Box<dyn FnOnce(&Course) -> Result<Course, ApiError> + Send>;

/// Service trait for persisting courses
///
/// Implementations own their connection/lock lifecycle. Listing must return
/// courses in ascending `id` order so that pagination is stable.
#[async_trait]
pub trait CourseService: Send + Sync {
    /// Persist a new course and assign its identifier
    async fn create(&self, course: NewCourse) -> Result<Course>;

    /// Get a course by ID
    async fn get(&self, id: i64) -> Result<Option<Course>>;

    /// List courses matching a filter, ordered by ID
    async fn list(&self, filter: &CourseFilter) -> Result<Vec<Course>>;

    /// Atomically read, transform and write back one course
    ///
    /// Returns `Ok(None)` when the course does not exist. An error returned by
    /// `mutation` is passed through unchanged.
    async fn update(&self, id: i64, mutation: CourseMutation)
    -> Result<Option<Course>, ApiError>;

    /// Delete a course; returns whether it existed
    async fn delete(&self, id: i64) -> Result<bool>;

    /// Number of stored courses
    async fn count(&self) -> Result<usize>;

    /// Release backend resources at shutdown
    async fn close(&self) {}
}
