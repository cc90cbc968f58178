//! Response projections of a stored course

use super::extractors::RequestUrl;
use crate::core::course::Course;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Item of the list endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseListItem {
    pub name: String,
    pub url: String,
}

impl CourseListItem {
    pub fn project(course: &Course, urls: &RequestUrl) -> Self {
        Self {
            name: course.name.clone(),
            url: urls.course_url(course.id),
        }
    }
}

/// Full representation returned by create, retrieve and update
///
/// Dates serialize as `YYYY-MM-DD`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseDetail {
    pub name: String,
    pub id: i64,
    pub url: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub number_of_lectures: i32,
}

impl CourseDetail {
    pub fn project(course: &Course, urls: &RequestUrl) -> Self {
        Self {
            name: course.name.clone(),
            id: course.id,
            url: urls.course_url(course.id),
            start_date: course.start_date,
            end_date: course.end_date,
            number_of_lectures: course.number_of_lectures,
        }
    }
}
