//! The Course record and the client-supplied payload used to create or patch it

use crate::core::error::{ApiError, FieldErrors};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Wire format for dates, both in bodies and in query strings
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Maximum length of a course name, in characters
pub const NAME_MAX_LENGTH: usize = 255;

pub(crate) const REQUIRED: &str = "This field is required.";
pub(crate) const NOT_NULL: &str = "This field may not be null.";
pub(crate) const BLANK: &str = "This field may not be blank.";
pub(crate) const NOT_A_STRING: &str = "Not a valid string.";
pub(crate) const INVALID_INTEGER: &str = "A valid integer is required.";
pub(crate) const BODY_DATE_FORMAT: &str =
    "Date has wrong format. Use one of these formats instead: YYYY-MM-DD.";

/// A stored course
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    /// Identifier assigned by storage, ascending in creation order
    pub id: i64,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub number_of_lectures: i32,
}

/// A validated course that has not been persisted yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCourse {
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub number_of_lectures: i32,
}

impl NewCourse {
    /// Attach a storage-assigned identifier
    pub fn with_id(self, id: i64) -> Course {
        Course {
            id,
            name: self.name,
            start_date: self.start_date,
            end_date: self.end_date,
            number_of_lectures: self.number_of_lectures,
        }
    }
}

/// Parse a `YYYY-MM-DD` string
///
/// Surrounding whitespace makes the value malformed.
pub fn parse_iso_date(value: &str) -> Option<NaiveDate> {
    if value.chars().any(char::is_whitespace) {
        return None;
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT).ok()
}

/// Fields supplied by a client on create or partial update
///
/// A `None` field was not present in the request body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoursePayload {
    pub name: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub number_of_lectures: Option<i32>,
}

/// A payload together with the field-level errors found while reading it
///
/// Fields with errors are left as `None` in `payload`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedPayload {
    pub payload: CoursePayload,
    pub errors: FieldErrors,
}

impl ParsedPayload {
    /// The payload for a partial update, failing on any field error
    pub fn into_partial(self) -> Result<CoursePayload, ApiError> {
        if self.errors.is_empty() {
            Ok(self.payload)
        } else {
            Err(ApiError::Validation(self.errors))
        }
    }
}

impl From<CoursePayload> for ParsedPayload {
    fn from(payload: CoursePayload) -> Self {
        Self {
            payload,
            errors: FieldErrors::new(),
        }
    }
}

impl CoursePayload {
    /// Read a payload out of a JSON request body, keeping field errors aside
    ///
    /// Only a body that is not a JSON object fails outright. Unknown keys,
    /// `id` and `url` are ignored.
    pub fn parse_json(body: &Value) -> Result<ParsedPayload, ApiError> {
        let Some(object) = body.as_object() else {
            return Err(ApiError::MalformedBody(
                "expected a JSON object".to_string(),
            ));
        };

        let mut errors = FieldErrors::new();
        let payload = Self {
            name: field(object, "name", parse_name, &mut errors),
            start_date: field(object, "start_date", parse_body_date, &mut errors),
            end_date: field(object, "end_date", parse_body_date, &mut errors),
            number_of_lectures: field(object, "number_of_lectures", parse_integer, &mut errors),
        };

        Ok(ParsedPayload { payload, errors })
    }

    /// The effective record: supplied fields laid over an existing course
    pub fn merged_onto(&self, existing: &Course) -> CoursePayload {
        CoursePayload {
            name: Some(self.name.clone().unwrap_or_else(|| existing.name.clone())),
            start_date: Some(self.start_date.unwrap_or(existing.start_date)),
            end_date: Some(self.end_date.unwrap_or(existing.end_date)),
            number_of_lectures: Some(
                self.number_of_lectures
                    .unwrap_or(existing.number_of_lectures),
            ),
        }
    }

    /// Names of the fields this payload does not carry
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.name.is_none() {
            missing.push("name");
        }
        if self.start_date.is_none() {
            missing.push("start_date");
        }
        if self.end_date.is_none() {
            missing.push("end_date");
        }
        if self.number_of_lectures.is_none() {
            missing.push("number_of_lectures");
        }
        missing
    }

    /// Convert a fully populated payload into a [`NewCourse`]
    ///
    /// Returns `None` if any field is missing.
    pub fn into_new_course(self) -> Option<NewCourse> {
        Some(NewCourse {
            name: self.name?,
            start_date: self.start_date?,
            end_date: self.end_date?,
            number_of_lectures: self.number_of_lectures?,
        })
    }
}

/// Parse one optional field, recording its error
fn field<T>(
    object: &Map<String, Value>,
    key: &str,
    parse: fn(&Value) -> Result<T, String>,
    errors: &mut FieldErrors,
) -> Option<T> {
    let value = object.get(key)?;
    if value.is_null() {
        errors.insert(key, NOT_NULL);
        return None;
    }
    match parse(value) {
        Ok(parsed) => Some(parsed),
        Err(message) => {
            errors.insert(key, message);
            None
        }
    }
}

fn parse_name(value: &Value) -> Result<String, String> {
    let name = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return Err(NOT_A_STRING.to_string()),
    };
    if name.is_empty() {
        return Err(BLANK.to_string());
    }
    Ok(name)
}

fn parse_body_date(value: &Value) -> Result<NaiveDate, String> {
    value
        .as_str()
        .and_then(parse_iso_date)
        .ok_or_else(|| BODY_DATE_FORMAT.to_string())
}

fn parse_integer(value: &Value) -> Result<i32, String> {
    let wide = match value {
        Value::Number(n) => match n.as_i64() {
            Some(i) => i,
            None => match n.as_f64() {
                Some(f) if f.fract() == 0.0 && f.is_finite() => f as i64,
                _ => return Err(INVALID_INTEGER.to_string()),
            },
        },
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| INVALID_INTEGER.to_string())?,
        _ => return Err(INVALID_INTEGER.to_string()),
    };

    if wide > i64::from(i32::MAX) {
        return Err(format!(
            "Ensure this value is less than or equal to {}.",
            i32::MAX
        ));
    }
    if wide < i64::from(i32::MIN) {
        return Err(format!(
            "Ensure this value is greater than or equal to {}.",
            i32::MIN
        ));
    }
    Ok(wide as i32)
}
