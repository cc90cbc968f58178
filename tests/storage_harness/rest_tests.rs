//! Macro-generated HTTP suite run against the full router.
//!
//! # Generated Tests
//!
//! ## Delete
//! - `test_delete_nonexistent` / `test_delete_existing`
//!
//! ## Retrieve
//! - `test_retrieve_existing` / `test_retrieve_nonexistent` / `test_retrieve_non_integer_id`
//!
//! ## Create
//! - `test_create` / `test_create_missing_fields` / `test_create_invalid_values` /
//!   `test_create_malformed_body` / `test_create_requires_json_content_type`
//! - `test_create_reports_type_and_required_errors_together`
//!
//! ## Update
//! - one partial update per field, validation failures, replace, 404 ordering
//!
//! ## List
//! - following `next` across every page, each filter, page size clamping,
//!   invalid pages, malformed filter values and repeated query keys

#[macro_export]
macro_rules! rest_integration_tests {
    ($factory:expr) => {
        mod rest_integration_tests {
            use super::*;
            use axum::http::StatusCode;
            use axum_test::TestServer;
            use courses::core::query::CourseFilter;
            use courses::core::service::CourseService;
            use serde_json::{Value, json};
            use std::sync::Arc;

            async fn make_server() -> (TestServer, Arc<dyn CourseService>) {
                let service: Arc<dyn CourseService> = Arc::new($factory);
                (storage_harness::test_server(service.clone()), service)
            }

            /// Server holding one course: "New course", 2021-05-05..2021-05-10, 10 lectures
            async fn make_server_with_course() -> (TestServer, Arc<dyn CourseService>, i64) {
                let (server, service) = make_server().await;
                let course = service
                    .create(storage_harness::new_course("New course", "2021-05-05", "2021-05-10", 10))
                    .await
                    .unwrap();
                (server, service, course.id)
            }

            /// Collect `results` from every page, following `next`
            async fn collect_pages(server: &TestServer, first: Value) -> Vec<Value> {
                let mut results = first["results"].as_array().unwrap().clone();
                let mut next = first["next"].as_str().map(String::from);
                while let Some(link) = next {
                    let response = storage_harness::follow(server, &link).await;
                    response.assert_status_ok();
                    let body: Value = response.json();
                    results.extend(body["results"].as_array().unwrap().iter().cloned());
                    next = body["next"].as_str().map(String::from);
                }
                results
            }

            /// Expected list items for the stored courses matching `filter`
            async fn expected_items(service: &Arc<dyn CourseService>, filter: CourseFilter) -> Vec<Value> {
                service
                    .list(&filter)
                    .await
                    .unwrap()
                    .iter()
                    .map(|c| {
                        json!({
                            "name": c.name,
                            "url": format!("{}/courses/{}/", storage_harness::TEST_BASE_URL, c.id)
                        })
                    })
                    .collect()
            }

            // ==============================================================
            // Health
            // ==============================================================

            #[tokio::test]
            async fn test_health_endpoints() {
                let (server, _) = make_server().await;
                for path in ["/health", "/healthz"] {
                    let response = server.get(path).await;
                    response.assert_status_ok();
                    let body: Value = response.json();
                    assert_eq!(body["status"], "ok");
                    assert_eq!(body["service"], "courses-api");
                }
            }

            // ==============================================================
            // Delete
            // ==============================================================

            #[tokio::test]
            async fn test_delete_nonexistent() {
                let (server, service, _) = make_server_with_course().await;

                let response = server.delete("/courses/123456/").await;

                response.assert_status(StatusCode::NOT_FOUND);
                assert_eq!(service.count().await.unwrap(), 1);
            }

            #[tokio::test]
            async fn test_delete_existing() {
                let (server, service, id) = make_server_with_course().await;

                let response = server.delete(&format!("/courses/{}/", id)).await;

                response.assert_status(StatusCode::NO_CONTENT);
                assert!(response.as_bytes().is_empty());
                assert_eq!(service.count().await.unwrap(), 0);
            }

            // ==============================================================
            // Retrieve
            // ==============================================================

            #[tokio::test]
            async fn test_retrieve_existing() {
                let (server, _, id) = make_server_with_course().await;

                let response = server.get(&format!("/courses/{}/", id)).await;

                response.assert_status_ok();
                response.assert_json(&json!({
                    "name": "New course",
                    "id": id,
                    "url": format!("{}/courses/{}/", storage_harness::TEST_BASE_URL, id),
                    "start_date": "2021-05-05",
                    "end_date": "2021-05-10",
                    "number_of_lectures": 10
                }));
            }

            #[tokio::test]
            async fn test_retrieve_nonexistent() {
                let (server, _, _) = make_server_with_course().await;

                let response = server.get("/courses/123456/").await;

                response.assert_status(StatusCode::NOT_FOUND);
                response.assert_json(&json!({ "detail": "Not found." }));
            }

            #[tokio::test]
            async fn test_retrieve_non_integer_id() {
                let (server, _, _) = make_server_with_course().await;
                server.get("/courses/abc/").await.assert_status(StatusCode::NOT_FOUND);
            }

            // ==============================================================
            // Create
            // ==============================================================

            #[tokio::test]
            async fn test_create() {
                let (server, service) = make_server().await;

                let response = server
                    .post("/courses/")
                    .json(&json!({
                        "name": "  Rust for beginners ",
                        "start_date": "2021-06-01",
                        "end_date": "2021-06-01",
                        "number_of_lectures": 0
                    }))
                    .await;

                response.assert_status(StatusCode::CREATED);
                let body: Value = response.json();
                let id = body["id"].as_i64().unwrap();
                assert_eq!(body["name"], "Rust for beginners");
                assert_eq!(
                    body["url"],
                    format!("{}/courses/{}/", storage_harness::TEST_BASE_URL, id)
                );
                assert_eq!(body["start_date"], "2021-06-01");
                assert_eq!(body["number_of_lectures"], 0);

                let stored = service.get(id).await.unwrap().unwrap();
                assert_eq!(stored.name, "Rust for beginners");
            }

            #[tokio::test]
            async fn test_create_ignores_read_only_fields() {
                let (server, _) = make_server().await;

                let response = server
                    .post("/courses/")
                    .json(&json!({
                        "id": 999,
                        "url": "http://elsewhere/",
                        "name": "Algebra",
                        "start_date": "2021-06-01",
                        "end_date": "2021-06-02",
                        "number_of_lectures": "12"
                    }))
                    .await;

                response.assert_status(StatusCode::CREATED);
                let body: Value = response.json();
                assert_ne!(body["id"], 999);
                assert_eq!(body["number_of_lectures"], 12);
            }

            #[tokio::test]
            async fn test_create_missing_fields() {
                let (server, service) = make_server().await;

                let response = server.post("/courses/").json(&json!({ "name": "Algebra" })).await;

                response.assert_status(StatusCode::BAD_REQUEST);
                response.assert_json(&json!({
                    "start_date": "This field is required.",
                    "end_date": "This field is required.",
                    "number_of_lectures": "This field is required."
                }));
                assert_eq!(service.count().await.unwrap(), 0);
            }

            #[tokio::test]
            async fn test_create_invalid_values() {
                let (server, service) = make_server().await;

                let response = server
                    .post("/courses/")
                    .json(&json!({
                        "name": "Algebra",
                        "start_date": "2021-06-10",
                        "end_date": "2021-06-01",
                        "number_of_lectures": -1
                    }))
                    .await;

                response.assert_status(StatusCode::BAD_REQUEST);
                response.assert_json(&json!({
                    "end_date": "End date cannot be earlier than start date",
                    "number_of_lectures": "Number of lectures must be positive integer"
                }));
                assert_eq!(service.count().await.unwrap(), 0);
            }

            #[tokio::test]
            async fn test_create_bad_field_types() {
                let (server, _) = make_server().await;

                let response = server
                    .post("/courses/")
                    .json(&json!({
                        "name": "",
                        "start_date": "05/06/2021",
                        "end_date": null,
                        "number_of_lectures": "many"
                    }))
                    .await;

                response.assert_status(StatusCode::BAD_REQUEST);
                let body: Value = response.json();
                assert_eq!(body["name"], "This field may not be blank.");
                assert_eq!(
                    body["start_date"],
                    "Date has wrong format. Use one of these formats instead: YYYY-MM-DD."
                );
                assert_eq!(body["end_date"], "This field may not be null.");
                assert_eq!(body["number_of_lectures"], "A valid integer is required.");
            }

            #[tokio::test]
            async fn test_create_malformed_body() {
                let (server, _) = make_server().await;

                let response = server
                    .post("/courses/")
                    .content_type("application/json")
                    .bytes("{not json".into())
                    .await;
                response.assert_status(StatusCode::BAD_REQUEST);
                let body: Value = response.json();
                assert!(body["detail"].as_str().unwrap().starts_with("JSON parse error"));

                let response = server.post("/courses/").json(&json!([1, 2, 3])).await;
                response.assert_status(StatusCode::BAD_REQUEST);
            }

            #[tokio::test]
            async fn test_create_reports_type_and_required_errors_together() {
                let (server, service) = make_server().await;

                let response = server
                    .post("/courses/")
                    .json(&json!({ "name": "", "start_date": "2021-05-01" }))
                    .await;

                response.assert_status(StatusCode::BAD_REQUEST);
                response.assert_json(&json!({
                    "name": "This field may not be blank.",
                    "end_date": "This field is required.",
                    "number_of_lectures": "This field is required."
                }));
                assert_eq!(service.count().await.unwrap(), 0);
            }

            #[tokio::test]
            async fn test_create_requires_json_content_type() {
                let (server, service) = make_server().await;

                let response = server
                    .post("/courses/")
                    .text(r#"{"name": "Algebra", "start_date": "2021-05-01", "end_date": "2021-05-02", "number_of_lectures": 1}"#)
                    .await;

                response.assert_status(StatusCode::UNSUPPORTED_MEDIA_TYPE);
                let body: Value = response.json();
                assert!(body["detail"].as_str().unwrap().starts_with("Unsupported media type"));
                assert_eq!(service.count().await.unwrap(), 0);
            }

            // ==============================================================
            // Update
            // ==============================================================

            #[tokio::test]
            async fn test_patch_course_name() {
                let (server, service, id) = make_server_with_course().await;

                let response = server
                    .patch(&format!("/courses/{}/", id))
                    .json(&json!({ "name": "New patched course" }))
                    .await;

                response.assert_status_ok();
                let body: Value = response.json();
                assert_eq!(body["name"], "New patched course");

                let stored = service.get(id).await.unwrap().unwrap();
                assert_eq!(stored.name, "New patched course");
                assert_eq!(stored.number_of_lectures, 10);
            }

            #[tokio::test]
            async fn test_patch_course_start_date() {
                let (server, service, id) = make_server_with_course().await;

                let response = server
                    .patch(&format!("/courses/{}/", id))
                    .json(&json!({ "start_date": "2021-05-07" }))
                    .await;

                response.assert_status_ok();
                let body: Value = response.json();
                assert_eq!(body["start_date"], "2021-05-07");

                let stored = service.get(id).await.unwrap().unwrap();
                assert_eq!(stored.start_date, storage_harness::date("2021-05-07"));
                assert_eq!(stored.name, "New course");
            }

            #[tokio::test]
            async fn test_patch_course_end_date() {
                let (server, service, id) = make_server_with_course().await;

                let response = server
                    .patch(&format!("/courses/{}/", id))
                    .json(&json!({ "end_date": "2021-06-07" }))
                    .await;

                response.assert_status_ok();
                let body: Value = response.json();
                assert_eq!(body["end_date"], "2021-06-07");

                let stored = service.get(id).await.unwrap().unwrap();
                assert_eq!(stored.end_date, storage_harness::date("2021-06-07"));
            }

            #[tokio::test]
            async fn test_patch_course_lectures() {
                let (server, service, id) = make_server_with_course().await;

                let response = server
                    .patch(&format!("/courses/{}/", id))
                    .json(&json!({ "number_of_lectures": 43 }))
                    .await;

                response.assert_status_ok();
                let body: Value = response.json();
                assert_eq!(body["number_of_lectures"], 43);

                let stored = service.get(id).await.unwrap().unwrap();
                assert_eq!(stored.number_of_lectures, 43);
            }

            #[tokio::test]
            async fn test_patch_validates_merged_record() {
                let (server, service, id) = make_server_with_course().await;
                let before = service.get(id).await.unwrap().unwrap();

                let response = server
                    .patch(&format!("/courses/{}/", id))
                    .json(&json!({ "end_date": "2021-05-01" }))
                    .await;

                response.assert_status(StatusCode::BAD_REQUEST);
                response.assert_json(&json!({
                    "end_date": "End date cannot be earlier than start date"
                }));
                assert_eq!(service.get(id).await.unwrap().unwrap(), before);
            }

            #[tokio::test]
            async fn test_patch_negative_lectures() {
                let (server, service, id) = make_server_with_course().await;

                let response = server
                    .patch(&format!("/courses/{}/", id))
                    .json(&json!({ "number_of_lectures": -5 }))
                    .await;

                response.assert_status(StatusCode::BAD_REQUEST);
                let body: Value = response.json();
                assert_eq!(
                    body["number_of_lectures"],
                    "Number of lectures must be positive integer"
                );
                assert_eq!(service.get(id).await.unwrap().unwrap().number_of_lectures, 10);
            }

            #[tokio::test]
            async fn test_patch_requires_json_content_type() {
                let (server, _, id) = make_server_with_course().await;

                let response = server
                    .patch(&format!("/courses/{}/", id))
                    .text(r#"{"name": "Renamed"}"#)
                    .await;
                response.assert_status(StatusCode::UNSUPPORTED_MEDIA_TYPE);
            }

            #[tokio::test]
            async fn test_patch_nonexistent_before_body_errors() {
                let (server, _, _) = make_server_with_course().await;

                let response = server
                    .patch("/courses/123456/")
                    .json(&json!({ "number_of_lectures": "many" }))
                    .await;

                response.assert_status(StatusCode::NOT_FOUND);
            }

            #[tokio::test]
            async fn test_put_replaces_course() {
                let (server, service, id) = make_server_with_course().await;

                let response = server
                    .put(&format!("/courses/{}/", id))
                    .json(&json!({
                        "name": "Replaced",
                        "start_date": "2022-01-01",
                        "end_date": "2022-02-01",
                        "number_of_lectures": 3
                    }))
                    .await;

                response.assert_status_ok();
                let stored = service.get(id).await.unwrap().unwrap();
                assert_eq!(stored.name, "Replaced");
                assert_eq!(stored.start_date, storage_harness::date("2022-01-01"));
                assert_eq!(stored.number_of_lectures, 3);
            }

            #[tokio::test]
            async fn test_put_requires_every_field() {
                let (server, service, id) = make_server_with_course().await;

                let response = server
                    .put(&format!("/courses/{}/", id))
                    .json(&json!({ "name": "Replaced" }))
                    .await;

                response.assert_status(StatusCode::BAD_REQUEST);
                let body: Value = response.json();
                assert_eq!(body["start_date"], "This field is required.");
                assert_eq!(service.get(id).await.unwrap().unwrap().name, "New course");
            }

            // ==============================================================
            // List
            // ==============================================================

            #[tokio::test]
            async fn test_list_courses() {
                let (server, service) = make_server().await;
                storage_harness::seed_catalog(service.as_ref()).await;

                let response = server.get("/courses/").await;
                response.assert_status_ok();
                let first: Value = response.json();
                assert_eq!(first["count"], 15);
                assert_eq!(first["limit"], 10);
                assert_eq!(first["previous"], Value::Null);
                assert_eq!(
                    first["next"],
                    format!("{}/courses/?page=2", storage_harness::TEST_BASE_URL)
                );

                let results = collect_pages(&server, first).await;
                assert_eq!(results, expected_items(&service, CourseFilter::all()).await);
            }

            #[tokio::test]
            async fn test_list_last_page_links() {
                let (server, service) = make_server().await;
                storage_harness::seed_catalog(service.as_ref()).await;

                let response = server.get("/courses/").add_query_param("page", "last").await;
                response.assert_status_ok();
                let body: Value = response.json();
                assert_eq!(body["results"].as_array().unwrap().len(), 5);
                assert_eq!(body["next"], Value::Null);
                assert_eq!(
                    body["previous"],
                    format!("{}/courses/", storage_harness::TEST_BASE_URL)
                );
            }

            #[tokio::test]
            async fn test_list_links_keep_filters() {
                let (server, service) = make_server().await;
                storage_harness::seed_catalog(service.as_ref()).await;

                let response = server
                    .get("/courses/")
                    .add_query_param("page_size", "2")
                    .add_query_param("name", "course1")
                    .add_query_param("page", "2")
                    .await;
                response.assert_status_ok();
                let body: Value = response.json();
                assert_eq!(body["count"], 6);
                assert_eq!(body["limit"], 2);
                assert_eq!(
                    body["next"],
                    format!(
                        "{}/courses/?name=course1&page=3&page_size=2",
                        storage_harness::TEST_BASE_URL
                    )
                );
                assert_eq!(
                    body["previous"],
                    format!(
                        "{}/courses/?name=course1&page_size=2",
                        storage_harness::TEST_BASE_URL
                    )
                );
            }

            #[tokio::test]
            async fn test_search_by_start_date() {
                let (server, service) = make_server().await;
                storage_harness::seed_catalog(service.as_ref()).await;

                let response = server.get("/courses/").add_query_param("start_date", "2021-05-09").await;
                response.assert_status_ok();
                let body: Value = response.json();
                let results = collect_pages(&server, body).await;

                let expected = expected_items(
                    &service,
                    courses::core::query::build_filter(None, Some("2021-05-09"), None).unwrap(),
                )
                .await;
                assert_eq!(results.len(), 7);
                assert_eq!(results, expected);
            }

            #[tokio::test]
            async fn test_search_by_end_date() {
                let (server, service) = make_server().await;
                storage_harness::seed_catalog(service.as_ref()).await;

                let response = server.get("/courses/").add_query_param("end_date", "2021-05-09").await;
                response.assert_status_ok();
                let body: Value = response.json();

                let expected = expected_items(
                    &service,
                    courses::core::query::build_filter(None, None, Some("2021-05-09")).unwrap(),
                )
                .await;
                assert_eq!(body["results"].as_array().unwrap(), &expected);
                assert_eq!(expected.len(), 3);
            }

            #[tokio::test]
            async fn test_search_by_name() {
                let (server, service) = make_server().await;
                storage_harness::seed_catalog(service.as_ref()).await;

                let response = server.get("/courses/").add_query_param("name", "1").await;
                response.assert_status_ok();
                let body: Value = response.json();

                let expected = expected_items(
                    &service,
                    courses::core::query::build_filter(Some("1"), None, None).unwrap(),
                )
                .await;
                assert_eq!(body["count"], 6);
                assert_eq!(body["results"].as_array().unwrap(), &expected);
            }

            #[tokio::test]
            async fn test_empty_filter_values_are_ignored() {
                let (server, service) = make_server().await;
                storage_harness::seed_catalog(service.as_ref()).await;

                let response = server
                    .get("/courses/")
                    .add_query_param("name", "")
                    .add_query_param("start_date", "")
                    .await;
                response.assert_status_ok();
                let body: Value = response.json();
                assert_eq!(body["count"], 15);
            }

            #[tokio::test]
            async fn test_page_size_is_clamped() {
                let (server, service) = make_server().await;
                for i in 0..120 {
                    service
                        .create(storage_harness::new_course(
                            &format!("Course {}", i),
                            "2021-05-01",
                            "2021-05-02",
                            1,
                        ))
                        .await
                        .unwrap();
                }

                let response = server.get("/courses/").add_query_param("page_size", "500").await;
                response.assert_status_ok();
                let body: Value = response.json();
                assert_eq!(body["count"], 120);
                assert_eq!(body["limit"], 100);
                assert_eq!(body["results"].as_array().unwrap().len(), 100);
            }

            #[tokio::test]
            async fn test_bad_page_size_falls_back_to_default() {
                let (server, service) = make_server().await;
                storage_harness::seed_catalog(service.as_ref()).await;

                for raw in ["0", "-3", "lots"] {
                    let response = server.get("/courses/").add_query_param("page_size", raw).await;
                    response.assert_status_ok();
                    let body: Value = response.json();
                    assert_eq!(body["limit"], 10);
                }
            }

            #[tokio::test]
            async fn test_invalid_page() {
                let (server, service) = make_server().await;
                storage_harness::seed_catalog(service.as_ref()).await;

                for raw in ["3", "0", "abc"] {
                    let response = server.get("/courses/").add_query_param("page", raw).await;
                    response.assert_status(StatusCode::NOT_FOUND);
                    response.assert_json(&json!({ "detail": "Invalid page." }));
                }
            }

            #[tokio::test]
            async fn test_empty_catalog_has_one_page() {
                let (server, _) = make_server().await;

                let response = server.get("/courses/").await;
                response.assert_status_ok();
                response.assert_json(&json!({
                    "next": null,
                    "previous": null,
                    "count": 0,
                    "limit": 10,
                    "results": []
                }));
            }

            #[tokio::test]
            async fn test_malformed_date_filter() {
                let (server, service) = make_server().await;
                storage_harness::seed_catalog(service.as_ref()).await;

                let response = server
                    .get("/courses/")
                    .add_query_param("start_date", "not-a-date")
                    .add_query_param("end_date", "2021-13-01")
                    .await;

                response.assert_status(StatusCode::BAD_REQUEST);
                response.assert_json(&json!({
                    "start_date": "Date has wrong format. Use these formats instead: YYYY-MM-DD.",
                    "end_date": "Date has wrong format. Use these formats instead: YYYY-MM-DD."
                }));
            }

            #[tokio::test]
            async fn test_padded_date_filter_is_malformed() {
                let (server, service) = make_server().await;
                storage_harness::seed_catalog(service.as_ref()).await;

                let response = server.get("/courses/?start_date=%202021-05-09").await;

                response.assert_status(StatusCode::BAD_REQUEST);
                response.assert_json(&json!({
                    "start_date": "Date has wrong format. Use these formats instead: YYYY-MM-DD."
                }));
            }

            #[tokio::test]
            async fn test_repeated_filter_key_uses_last_value() {
                let (server, service) = make_server().await;
                storage_harness::seed_catalog(service.as_ref()).await;

                let response = server.get("/courses/?name=zzz&name=1").await;

                response.assert_status_ok();
                let body: Value = response.json();
                assert_eq!(body["count"], 6);
            }
        }
    };
}
