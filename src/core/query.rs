//! List query parameters and the course filter builder
//!
//! Raw string parameters are turned into a [`CourseFilter`]: a conjunction of
//! field predicates that each storage backend translates into its own native
//! query form.

use crate::core::course::{Course, parse_iso_date};
use crate::core::error::{ApiError, FieldErrors};
use chrono::NaiveDate;

pub const QUERY_DATE_FORMAT: &str =
    "Date has wrong format. Use these formats instead: YYYY-MM-DD.";

/// Query parameters accepted by the list endpoint
///
/// Every value is kept as a raw string so that malformed input can be
/// reported per field instead of rejecting the whole query string. A key
/// given more than once keeps its last value; unknown keys are ignored.
///
/// # Example
/// ```text
/// GET /courses/?name=rust&start_date=2021-05-09&page=2&page_size=20
/// ```
#[derive(Debug, Clone, Default)]
pub struct CourseListParams {
    /// Case-insensitive substring of the course name
    pub name: Option<String>,

    /// Only courses starting on or after this date
    pub start_date: Option<String>,

    /// Only courses ending on or before this date
    pub end_date: Option<String>,

    /// 1-based page number, or `last`
    pub page: Option<String>,

    /// Requested page size
    pub page_size: Option<String>,
}

impl CourseListParams {
    /// Fold decoded `key=value` pairs into the parameter set
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut params = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "name" => &mut params.name,
                "start_date" => &mut params.start_date,
                "end_date" => &mut params.end_date,
                "page" => &mut params.page,
                "page_size" => &mut params.page_size,
                _ => continue,
            };
            *slot = Some(value);
        }
        params
    }

    /// Build the storage filter from the filtering parameters
    pub fn filter(&self) -> Result<CourseFilter, ApiError> {
        build_filter(
            present(&self.name),
            present(&self.start_date),
            present(&self.end_date),
        )
    }

    pub fn page(&self) -> Option<&str> {
        present(&self.page)
    }

    pub fn page_size(&self) -> Option<&str> {
        present(&self.page_size)
    }
}

/// An empty query value counts as absent
fn present(raw: &Option<String>) -> Option<&str> {
    raw.as_deref().filter(|v| !v.is_empty())
}

/// A single condition on a course
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// `name` contains the value, ignoring case
    NameContains(String),
    /// `start_date >= value`
    StartsOnOrAfter(NaiveDate),
    /// `end_date <= value`
    EndsOnOrBefore(NaiveDate),
}

impl Predicate {
    pub fn matches(&self, course: &Course) -> bool {
        match self {
            Predicate::NameContains(needle) => {
                course.name.to_lowercase().contains(&needle.to_lowercase())
            }
            Predicate::StartsOnOrAfter(date) => course.start_date >= *date,
            Predicate::EndsOnOrBefore(date) => course.end_date <= *date,
        }
    }
}

/// Conjunction of predicates; empty means "all courses"
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseFilter {
    predicates: Vec<Predicate>,
}

impl CourseFilter {
    /// The unfiltered query
    pub fn all() -> Self {
        Self::default()
    }

    /// Add a predicate (AND)
    pub fn and(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn matches(&self, course: &Course) -> bool {
        self.predicates.iter().all(|p| p.matches(course))
    }
}

/// Turn raw filtering parameters into a filter
///
/// Date parse failures are accumulated and reported together as
/// [`ApiError::Parse`], even when other parameters were valid.
pub fn build_filter(
    name: Option<&str>,
    start_date: Option<&str>,
    end_date: Option<&str>,
) -> Result<CourseFilter, ApiError> {
    let mut filter = CourseFilter::all();
    let mut errors = FieldErrors::new();

    if let Some(name) = name {
        filter = filter.and(Predicate::NameContains(name.to_string()));
    }

    if let Some(raw) = start_date {
        match parse_iso_date(raw) {
            Some(date) => filter = filter.and(Predicate::StartsOnOrAfter(date)),
            None => errors.insert("start_date", QUERY_DATE_FORMAT),
        }
    }

    if let Some(raw) = end_date {
        match parse_iso_date(raw) {
            Some(date) => filter = filter.and(Predicate::EndsOnOrBefore(date)),
            None => errors.insert("end_date", QUERY_DATE_FORMAT),
        }
    }

    if !errors.is_empty() {
        tracing::warn!(%errors, "rejected course list filters");
        return Err(ApiError::Parse(errors));
    }

    Ok(filter)
}
