//! # Courses API
//!
//! A REST service managing a catalog of courses, each with a name, a start
//! and end date and a number of lectures.
//!
//! ## Features
//!
//! - **CRUD over HTTP**: list, create, retrieve, update (partial or full), delete
//! - **Filtering**: name substring and start/end date bounds on the list endpoint
//! - **Pagination**: page-number pagination with absolute `next`/`previous` links
//! - **Validation**: per-field errors reported together as a JSON map
//! - **Pluggable storage**: in-memory or PostgreSQL (`postgres` feature)
//! - **YAML configuration**: server, pagination, storage and logging settings
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use courses::prelude::*;
//!
//! let app = ServerBuilder::new()
//!     .with_service(InMemoryCourseService::new())
//!     .with_config(AppConfig::default())
//!     .build()?;
//!
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:8000").await?;
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod core;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        course::{Course, CoursePayload, NewCourse, ParsedPayload},
        error::{ApiError, FieldErrors},
        pagination::{PageNumber, PaginatedResponse, PaginationSettings, paginate},
        query::{CourseFilter, CourseListParams, Predicate, build_filter},
        service::{CourseMutation, CourseService},
        validation::{validate_course, validate_new, validate_replace, validate_update},
    };

    // === Storage ===
    pub use crate::storage::InMemoryCourseService;
    #[cfg(feature = "postgres")]
    pub use crate::storage::PostgresCourseService;

    // === Config ===
    pub use crate::config::{AppConfig, LoggingConfig, ServerConfig, StorageBackend, StorageConfig};

    // === Server ===
    pub use crate::server::{CourseDetail, CourseListItem, CourseState, ServerBuilder};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use chrono::NaiveDate;
    pub use serde::{Deserialize, Serialize};

    // === Axum ===
    pub use axum::Router;
}
