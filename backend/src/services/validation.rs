//! Input validation for service operations.
//!
//! Field rules live on the input types as `validator` derives; this module
//! runs them and turns the collected errors into `BookingError::Validation`.

use validator::{Validate, ValidationError, ValidationErrors};

use super::error::{BookingError, BookingResult};
use crate::models::NewAvailabilityRule;

fn describe(field: &str, error: &ValidationError) -> String {
    let message = error
        .message
        .as_ref()
        .map(|message| message.to_string())
        .unwrap_or_else(|| format!("failed '{}' check", error.code));
    if field == "__all__" {
        message
    } else {
        format!("{field} {message}")
    }
}

impl From<ValidationErrors> for BookingError {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields: Vec<(String, Vec<ValidationError>)> = errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| (field.to_string(), errs.clone()))
            .collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0));

        let messages: Vec<String> = fields
            .iter()
            .flat_map(|(field, errs)| errs.iter().map(move |error| describe(field, error)))
            .collect();
        BookingError::Validation(messages.join("; "))
    }
}

pub fn validate_input<T: Validate>(input: &T) -> BookingResult<()> {
    input.validate()?;
    Ok(())
}

pub fn validate_rules(rules: &[NewAvailabilityRule]) -> BookingResult<()> {
    rules.iter().try_for_each(validate_input)
}
