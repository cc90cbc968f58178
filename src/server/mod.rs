//! HTTP layer: extractors, handlers, projections and the server builder
//!
//! `ServerBuilder` assembles:
//! - CRUD routes for the course resource
//! - Health check routes
//! - Any custom routes supplied by the caller

pub mod builder;
pub mod extractors;
pub mod handlers;
pub mod projection;
pub mod router;

pub use builder::ServerBuilder;
pub use handlers::CourseState;
pub use projection::{CourseDetail, CourseListItem};
