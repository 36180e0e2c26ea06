//! Form field validation
//!
//! Checks that run on a draft before any compression or network work starts.

use chrono::NaiveDate;

/// A field-level validation failure, carrying the message shown in the form.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Fails when `value` is empty after trimming
pub fn require_text(field: &str, value: &str, message: &str) -> Result<(), FieldError> {
    if value.trim().is_empty() {
        return Err(FieldError::new(field, message));
    }
    Ok(())
}

/// Accepts an empty value or an ISO `YYYY-MM-DD` date
pub fn validate_optional_date(field: &str, value: &str) -> Result<(), FieldError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| FieldError::new(field, format!("{} must be a date (YYYY-MM-DD)", field)))
}
