//! PostgreSQL storage backend using sqlx.
//!
//! Provides `PostgresCourseService`, backed by a `courses` table accessed
//! through a `sqlx::PgPool`. Course filters are translated into a `WHERE`
//! clause with bound parameters.
//!
//! # Feature flag
//!
//! This module is gated behind the `postgres` feature flag:
//! ```toml
//! [dependencies]
//! courses-api = { version = "0.1", features = ["postgres"] }
//! ```

use crate::core::course::{Course, NewCourse};
use crate::core::error::ApiError;
use crate::core::query::{CourseFilter, Predicate};
use crate::core::service::{CourseMutation, CourseService};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Postgres, QueryBuilder, Row};

const SELECT_COURSES: &str =
    "SELECT id, name, start_date, end_date, number_of_lectures FROM courses";

const SELECT_FOR_UPDATE: &str = "SELECT id, name, start_date, end_date, number_of_lectures \
     FROM courses WHERE id = $1 FOR UPDATE";

const SELECT_BY_ID: &str = "SELECT id, name, start_date, end_date, number_of_lectures \
     FROM courses WHERE id = $1";

const INSERT_COURSE: &str = "INSERT INTO courses (name, start_date, end_date, number_of_lectures) \
     VALUES ($1, $2, $3, $4) \
     RETURNING id, name, start_date, end_date, number_of_lectures";

const UPDATE_COURSE: &str = "UPDATE courses \
     SET name = $1, start_date = $2, end_date = $3, number_of_lectures = $4 \
     WHERE id = $5";

/// Course storage service backed by PostgreSQL.
#[derive(Clone, Debug)]
pub struct PostgresCourseService {
    pool: PgPool,
}

impl PostgresCourseService {
    /// Create a new `PostgresCourseService` with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a connection pool against `database_url`.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .context("failed to connect to PostgreSQL")?;
        Ok(Self::new(pool))
    }

    /// Apply the bundled schema migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("failed to run course migrations")?;
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn course_from_row(row: &PgRow) -> Result<Course, sqlx::Error> {
    Ok(Course {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        start_date: row.try_get("start_date")?,
        end_date: row.try_get("end_date")?,
        number_of_lectures: row.try_get("number_of_lectures")?,
    })
}

/// Escape `LIKE` wildcards so the needle matches literally
fn escape_like(needle: &str) -> String {
    needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Append the `WHERE` clause for a filter
fn push_filter(query: &mut QueryBuilder<'_, Postgres>, filter: &CourseFilter) {
    for (i, predicate) in filter.predicates().iter().enumerate() {
        query.push(if i == 0 { " WHERE " } else { " AND " });
        match predicate {
            Predicate::NameContains(needle) => {
                query.push("name ILIKE ");
                query.push_bind(format!("%{}%", escape_like(needle)));
            }
            Predicate::StartsOnOrAfter(date) => {
                query.push("start_date >= ");
                query.push_bind(*date);
            }
            Predicate::EndsOnOrBefore(date) => {
                query.push("end_date <= ");
                query.push_bind(*date);
            }
        }
    }
}

#[async_trait]
impl CourseService for PostgresCourseService {
    async fn create(&self, course: NewCourse) -> Result<Course> {
        let row = sqlx::query(INSERT_COURSE)
            .bind(&course.name)
            .bind(course.start_date)
            .bind(course.end_date)
            .bind(course.number_of_lectures)
            .fetch_one(&self.pool)
            .await
            .context("failed to insert course")?;

        course_from_row(&row).context("failed to decode course row")
    }

    async fn get(&self, id: i64) -> Result<Option<Course>> {
        let row = sqlx::query(SELECT_BY_ID)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("failed to fetch course")?;

        row.as_ref()
            .map(course_from_row)
            .transpose()
            .context("failed to decode course row")
    }

    async fn list(&self, filter: &CourseFilter) -> Result<Vec<Course>> {
        let mut query = QueryBuilder::<Postgres>::new(SELECT_COURSES);
        push_filter(&mut query, filter);
        query.push(" ORDER BY id");

        let rows = query
            .build()
            .fetch_all(&self.pool)
            .await
            .context("failed to list courses")?;

        rows.iter()
            .map(course_from_row)
            .collect::<Result<Vec<_>, _>>()
            .context("failed to decode course row")
    }

    async fn update(
        &self,
        id: i64,
        mutation: CourseMutation,
    ) -> Result<Option<Course>, ApiError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("failed to begin transaction")?;

        let row = sqlx::query(SELECT_FOR_UPDATE)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .context("failed to lock course")?;
        let Some(row) = row else {
            return Ok(None);
        };
        let current = course_from_row(&row).context("failed to decode course row")?;

        // Dropping `tx` on error rolls back and releases the row lock
        let mut updated = mutation(&current)?;
        updated.id = id;

        sqlx::query(UPDATE_COURSE)
            .bind(&updated.name)
            .bind(updated.start_date)
            .bind(updated.end_date)
            .bind(updated.number_of_lectures)
            .bind(id)
            .execute(&mut *tx)
            .await
            .context("failed to update course")?;

        tx.commit().await.context("failed to commit course update")?;

        Ok(Some(updated))
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("failed to delete course")?;

        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> Result<usize> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM courses")
            .fetch_one(&self.pool)
            .await
            .context("failed to count courses")?;

        Ok(usize::try_from(count).unwrap_or_default())
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
