//! Custom rules referenced from `#[validate(...)]` attributes on input types.

use std::borrow::Cow;

use validator::ValidationError;

use super::{NewAvailabilityRule, NewDateOverride};

fn rejected(code: &'static str, message: String) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Owned(message));
    error
}

pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(rejected("blank", "must not be blank".to_string()));
    }
    Ok(())
}

/// Lowercase letters, digits and hyphens only.
pub fn slug_chars(slug: &str) -> Result<(), ValidationError> {
    if slug
        .bytes()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
    {
        Ok(())
    } else {
        Err(rejected(
            "slug",
            "may contain only lowercase letters, numbers and hyphens".to_string(),
        ))
    }
}

/// `#RRGGBB`.
pub fn hex_color(color: &str) -> Result<(), ValidationError> {
    match color.strip_prefix('#') {
        Some(hex) if hex.len() == 6 && hex.bytes().all(|b| b.is_ascii_hexdigit()) => Ok(()),
        _ => Err(rejected(
            "color",
            format!("'{color}' must be a hex value like #0069ff"),
        )),
    }
}

pub fn rule_window(rule: &NewAvailabilityRule) -> Result<(), ValidationError> {
    if rule.start_time < rule.end_time {
        Ok(())
    } else {
        Err(rejected(
            "window",
            format!(
                "rule start {} must be before end {}",
                rule.start_time, rule.end_time
            ),
        ))
    }
}

/// Available overrides need an ordered window; blocked dates need nothing.
pub fn override_window(date_override: &NewDateOverride) -> Result<(), ValidationError> {
    if date_override.is_unavailable {
        return Ok(());
    }
    match (date_override.start_time, date_override.end_time) {
        (Some(start), Some(end)) if start < end => Ok(()),
        (Some(start), Some(end)) => Err(rejected(
            "window",
            format!("override start {start} must be before end {end}"),
        )),
        _ => Err(rejected(
            "window",
            "an available override needs both start_time and end_time".to_string(),
        )),
    }
}
