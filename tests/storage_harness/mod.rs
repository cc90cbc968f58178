//! Shared test harness for course storage backends
//!
//! Provides course fixtures and two macro-generated suites that any
//! `CourseService` implementation must pass:
//! - `course_service_tests!` exercises the service trait directly
//! - `rest_integration_tests!` drives the full router over HTTP
//!
//! # Usage
//!
//! From any integration test file in `tests/`:
//! ```rust,ignore
//! #[macro_use]
//! mod storage_harness;
//! use storage_harness::*;
//!
//! course_service_tests!(InMemoryCourseService::new());
//! rest_integration_tests!(InMemoryCourseService::new());
//! ```

#![allow(dead_code)]

#[macro_use]
pub mod rest_tests;

use axum::Router;
use axum_test::TestServer;
use chrono::NaiveDate;
use courses::config::AppConfig;
use courses::core::course::NewCourse;
use courses::core::service::CourseService;
use courses::server::ServerBuilder;
use std::sync::Arc;

/// Base URL used for links in HTTP tests
pub const TEST_BASE_URL: &str = "http://testserver";

pub fn date(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap()
}

pub fn new_course(name: &str, start: &str, end: &str, lectures: i32) -> NewCourse {
    NewCourse {
        name: name.to_string(),
        start_date: date(start),
        end_date: date(end),
        number_of_lectures: lectures,
    }
}

/// The `i`-th course of the fifteen-course catalog
///
/// Course `i` is named `New course{i}`, starts on 2021-05-(i+1) and ends six
/// days later.
pub fn catalog_course(i: u32) -> NewCourse {
    let start = date("2021-05-01") + chrono::Days::new(u64::from(i));
    NewCourse {
        name: format!("New course{}", i),
        start_date: start,
        end_date: start + chrono::Days::new(6),
        number_of_lectures: 10 + i as i32,
    }
}

/// Store the fifteen-course catalog, in order
pub async fn seed_catalog(service: &dyn CourseService) {
    for i in 0..15 {
        service.create(catalog_course(i)).await.unwrap();
    }
}

/// Router with links rooted at [`TEST_BASE_URL`]
pub fn build_test_router(service: Arc<dyn CourseService>) -> Router {
    let mut config = AppConfig::default();
    config.server.public_url = Some(TEST_BASE_URL.to_string());

    ServerBuilder::new()
        .with_shared_service(service)
        .with_config(config)
        .build()
        .unwrap()
}

pub fn test_server(service: Arc<dyn CourseService>) -> TestServer {
    TestServer::try_new(build_test_router(service)).unwrap()
}

/// Turn an absolute link from a response into a request on the test server
pub fn follow(server: &TestServer, link: &str) -> axum_test::TestRequest {
    let url = url::Url::parse(link).unwrap();
    assert_eq!(url.origin().ascii_serialization(), TEST_BASE_URL);

    let mut request = server.get(url.path());
    for (key, value) in url.query_pairs() {
        request = request.add_query_param(&key, &*value);
    }
    request
}
