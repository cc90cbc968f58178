//! Validation applied to course records before they are persisted
//!
//! Validation is an explicit step: handlers call [`validate_new`] or
//! [`validate_update`] and persist only what comes back. Every rule is
//! evaluated and all violations are reported together.

use crate::core::course::{
    Course, CoursePayload, NAME_MAX_LENGTH, NewCourse, ParsedPayload, REQUIRED,
};
use crate::core::error::{ApiError, FieldErrors};
use validator::Validate;

pub const END_BEFORE_START: &str = "End date cannot be earlier than start date";
pub const NEGATIVE_LECTURES: &str = "Number of lectures must be positive integer";

/// Per-field range rules
#[derive(Debug, Validate)]
struct FieldRules {
    #[validate(range(min = 0, message = "Number of lectures must be positive integer"))]
    number_of_lectures: Option<i32>,
}

/// Single-field rules on whichever fields are present
fn field_rule_errors(effective: &CoursePayload) -> FieldErrors {
    let mut errors = FieldErrors::new();

    if let Some(name) = &effective.name {
        if name.chars().count() > NAME_MAX_LENGTH {
            errors.insert(
                "name",
                format!("Ensure this field has no more than {} characters.", NAME_MAX_LENGTH),
            );
        }
    }

    let rules = FieldRules {
        number_of_lectures: effective.number_of_lectures,
    };
    if let Err(violations) = rules.validate() {
        for (field, field_errors) in violations.field_errors() {
            if let Some(message) = field_errors.iter().find_map(|e| e.message.as_ref()) {
                errors.insert(field.to_string(), message.to_string());
            }
        }
    }

    errors
}

/// Date ordering, only when both dates are present
fn check_dates(effective: &CoursePayload, errors: &mut FieldErrors) {
    if let (Some(start), Some(end)) = (effective.start_date, effective.end_date) {
        if end < start {
            errors.insert("end_date", END_BEFORE_START);
        }
    }
}

fn into_result(errors: FieldErrors) -> Result<(), ApiError> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::Validation(errors))
    }
}

/// Check an effective record (full or merged)
///
/// Fields that are absent are skipped; the date ordering rule only applies
/// when both dates are present.
pub fn validate_course(effective: &CoursePayload) -> Result<(), ApiError> {
    let mut errors = field_rule_errors(effective);
    check_dates(effective, &mut errors);
    into_result(errors)
}

/// Validate a create payload
///
/// Field errors from parsing, missing fields and rule violations are all
/// reported in one map. A field keeps the first error recorded for it.
pub fn validate_new(parsed: impl Into<ParsedPayload>) -> Result<NewCourse, ApiError> {
    let ParsedPayload {
        payload,
        mut errors,
    } = parsed.into();

    for field in payload.missing_fields() {
        errors.insert(field, REQUIRED);
    }
    errors.extend(field_rule_errors(&payload));
    check_dates(&payload, &mut errors);
    into_result(errors)?;

    payload
        .into_new_course()
        .ok_or_else(|| ApiError::Validation(FieldErrors::new()))
}

/// Merge a partial payload onto an existing course and validate the result
///
/// The returned course keeps the existing identifier.
pub fn validate_update(existing: &Course, patch: &CoursePayload) -> Result<Course, ApiError> {
    let effective = patch.merged_onto(existing);
    validate_course(&effective)?;

    effective
        .into_new_course()
        .map(|course| course.with_id(existing.id))
        .ok_or_else(|| ApiError::Validation(FieldErrors::new()))
}

/// Validate a full replacement for an existing course
///
/// Every field is required, exactly as on create.
pub fn validate_replace(
    existing: &Course,
    replacement: impl Into<ParsedPayload>,
) -> Result<Course, ApiError> {
    validate_new(replacement).map(|course| course.with_id(existing.id))
}
