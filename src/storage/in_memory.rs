//! In-memory implementation of CourseService for testing and development

use crate::core::course::{Course, NewCourse};
use crate::core::error::ApiError;
use crate::core::query::CourseFilter;
use crate::core::service::{CourseMutation, CourseService};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug)]
struct Table {
    next_id: i64,
    rows: BTreeMap<i64, Course>,
}

/// In-memory course service
///
/// Rows are kept in a `BTreeMap` keyed by ID, so listing is naturally in
/// creation order. Uses an async `RwLock`; updates hold the write lock for the
/// whole read-modify-write.
#[derive(Clone)]
pub struct InMemoryCourseService {
    table: Arc<RwLock<Table>>,
}

impl InMemoryCourseService {
    /// Create an empty service; identifiers start at 1
    pub fn new() -> Self {
        Self {
            table: Arc::new(RwLock::new(Table {
                next_id: 1,
                rows: BTreeMap::new(),
            })),
        }
    }
}

impl Default for InMemoryCourseService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CourseService for InMemoryCourseService {
    async fn create(&self, course: NewCourse) -> Result<Course> {
        let mut table = self.table.write().await;
        let id = table.next_id;
        table.next_id += 1;

        let course = course.with_id(id);
        table.rows.insert(id, course.clone());

        Ok(course)
    }

    async fn get(&self, id: i64) -> Result<Option<Course>> {
        let table = self.table.read().await;
        Ok(table.rows.get(&id).cloned())
    }

    async fn list(&self, filter: &CourseFilter) -> Result<Vec<Course>> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .values()
            .filter(|course| filter.matches(course))
            .cloned()
            .collect())
    }

    async fn update(
        &self,
        id: i64,
        mutation: CourseMutation,
    ) -> Result<Option<Course>, ApiError> {
        let mut table = self.table.write().await;
        let Some(current) = table.rows.get(&id) else {
            return Ok(None);
        };

        let mut updated = mutation(current)?;
        updated.id = id;
        table.rows.insert(id, updated.clone());

        Ok(Some(updated))
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let mut table = self.table.write().await;
        Ok(table.rows.remove(&id).is_some())
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.table.read().await.rows.len())
    }
}
