//! Input checks that report every defect at once.

use crate::error::{ApiError, FieldError};

/// Message of the aggregated 422 error
pub const INVALID_INPUT: &str = "Invalid Input.";

/// Collects field errors; [`Validator::finish`] turns any into one `ValidationFailed`
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `message` for `field` unless `ok`
    pub fn check(&mut self, ok: bool, field: &str, message: &str) -> &mut Self {
        if !ok {
            self.errors.push(FieldError::new(field, message));
        }
        self
    }

    pub fn finish(self) -> Result<(), ApiError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::validation_failed(INVALID_INPUT, self.errors))
        }
    }
}

/// Length in characters, not bytes
pub fn has_min_length(value: &str, min: usize) -> bool {
    value.chars().count() >= min
}

/// Syntactic email check: one `@`, non-empty local part, dotted domain, no whitespace
pub fn is_email(email: &str) -> bool {
    if email.is_empty() || email.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }

    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2
        && labels.iter().all(|label| {
            !label.is_empty()
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|c| c.is_alphanumeric() || c == '-')
        })
}

/// Canonical form used for storage and uniqueness: trimmed and lowercased
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
