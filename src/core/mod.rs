//! Core domain types: the course record, validation, filtering and pagination

pub mod course;
pub mod error;
pub mod pagination;
pub mod query;
pub mod service;
pub mod validation;

pub use course::{Course, CoursePayload, NewCourse, ParsedPayload};
pub use error::{ApiError, FieldErrors};
pub use pagination::{Page, PageNumber, PaginatedResponse, PaginationSettings};
pub use query::{CourseFilter, CourseListParams, Predicate};
pub use service::{CourseMutation, CourseService};
