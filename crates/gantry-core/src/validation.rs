//! `validator` glue: request checking and custom field rules.

use crate::GantryError;
use validator::{Validate, ValidationErrors};

/// One failed rule on one request field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
    pub code: String,
}

/// Runs `validator` rules and reports failures as [`GantryError::Validation`].
pub trait ValidateExt: Validate {
    fn validate_request(&self) -> Result<(), GantryError> {
        self.validate().map_err(validation_errors_to_gantry_error)
    }
}

impl<T: Validate> ValidateExt for T {}

/// Flattens `errors` into one entry per failed rule, ordered by field name.
#[must_use]
pub fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut fields: Vec<FieldError> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| FieldError {
                field: (*field).to_string(),
                message: error
                    .message
                    .as_ref()
                    .map_or_else(|| error.code.to_string(), ToString::to_string),
                code: error.code.to_string(),
            })
        })
        .collect();
    fields.sort_by(|a, b| a.field.cmp(&b.field));
    fields
}

/// Joins every failure as `field: message`, separated by `; `.
#[must_use]
pub fn validation_errors_to_gantry_error(errors: ValidationErrors) -> GantryError {
    let message = field_errors(&errors)
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ");

    GantryError::Validation(message)
}

/// Functions usable with `#[validate(custom(function = ...))]`.
pub mod rules {
    use validator::ValidationError;

    /// Rejects empty and whitespace-only strings.
    pub fn not_blank(value: &str) -> Result<(), ValidationError> {
        if value.trim().is_empty() {
            return Err(ValidationError::new("not_blank"));
        }
        Ok(())
    }

    /// Like [`not_blank`], but an empty string passes: it means "unchanged".
    pub fn empty_or_not_blank(value: &str) -> Result<(), ValidationError> {
        if value.is_empty() {
            return Ok(());
        }
        not_blank(value)
    }

    /// Short names end up inside cache keys, so glob metacharacters and
    /// whitespace are refused.
    pub fn valid_short_name(value: &str) -> Result<(), ValidationError> {
        if value.chars().any(char::is_whitespace) {
            return Err(ValidationError::new("short_name_whitespace"));
        }
        if value.chars().any(|c| matches!(c, '*' | '?' | '[' | ']')) {
            return Err(ValidationError::new("short_name_invalid_characters"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::rules::*;
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Sample {
        #[validate(length(min = 1, max = 4))]
        name: String,
    }

    #[test]
    fn test_not_blank() {
        assert!(not_blank("hello").is_ok());
        assert!(not_blank("   ").is_err());
        assert!(not_blank("").is_err());
    }

    #[test]
    fn test_empty_or_not_blank() {
        assert!(empty_or_not_blank("").is_ok());
        assert!(empty_or_not_blank("Amazon").is_ok());
        assert!(empty_or_not_blank("   ").is_err());
    }

    #[test]
    fn test_valid_short_name() {
        assert!(valid_short_name("aws").is_ok());
        assert!(valid_short_name("aws-eu_1").is_ok());
        assert!(valid_short_name("a ws").is_err());
        assert!(valid_short_name("aws*").is_err());
        assert!(valid_short_name("[aws]").is_err());
    }

    #[test]
    fn test_validate_request_maps_to_validation_error() {
        let sample = Sample {
            name: "too long".to_string(),
        };
        let err = sample.validate_request().unwrap_err();
        assert!(matches!(err, GantryError::Validation(ref msg) if msg.starts_with("name:")));
    }

    #[test]
    fn test_validate_request_ok() {
        let sample = Sample {
            name: "ok".to_string(),
        };
        assert!(sample.validate_request().is_ok());
    }
}
