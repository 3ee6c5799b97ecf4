//! Boundary validation for form payloads
//!
//! Payloads are validated once, when the route layer decodes them into
//! typed records; nothing inside the table or drawer re-validates. The
//! collector accumulates per-field errors so a submission reports every
//! problem at once.

use crate::core::error::{FieldValidationError, ValidationError};
use crate::core::field::{FieldFormat, FieldValue, SelectOption};

/// Accumulates field validation errors during payload decode
#[derive(Debug, Default)]
pub struct FieldChecks {
    errors: Vec<FieldValidationError>,
}

impl FieldChecks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Field must be present and non-empty; returns the trimmed value
    pub fn required<'a>(&mut self, field: &str, value: Option<&'a str>) -> Option<&'a str> {
        match value.map(str::trim) {
            Some(s) if !s.is_empty() => Some(s),
            _ => {
                self.push(field, "is required");
                None
            }
        }
    }

    /// String must not exceed the maximum length
    pub fn max_length(&mut self, field: &str, value: &str, max: usize) {
        if value.len() > max {
            self.push(field, format!("must not exceed {} characters", max));
        }
    }

    /// Value must be one of the configured select options
    pub fn in_options(&mut self, field: &str, value: &str, options: &[SelectOption]) {
        if !options.iter().any(|opt| opt.value == value) {
            self.push(field, "is not one of the configured options");
        }
    }

    /// Value must match the given format
    pub fn format(&mut self, field: &str, value: &str, format: &FieldFormat) {
        if !format.validate(&FieldValue::String(value.to_string())) {
            self.push(field, "has an invalid format");
        }
    }

    /// Value must parse as a UUID; returns the parsed id
    pub fn uuid(&mut self, field: &str, value: &str) -> Option<uuid::Uuid> {
        match uuid::Uuid::parse_str(value) {
            Ok(id) => Some(id),
            Err(_) => {
                self.push(field, "is not a valid id");
                None
            }
        }
    }

    /// Record a failure established outside the built-in checks
    pub fn fail(&mut self, field: &str, message: impl Into<String>) {
        self.push(field, message);
    }

    fn push(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(FieldValidationError {
            field: field.to_string(),
            message: message.into(),
        });
    }

    /// Finish the decode: Ok if no check failed
    pub fn finish(self) -> Result<(), ValidationError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::FieldErrors(self.errors))
        }
    }
}
