//! Per-type value validation

use chrono::{DateTime, NaiveDate};
use dashmap::DashMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

use crate::schema::{Field, FieldType, FieldValue};

const STEP_TOLERANCE: f64 = 1e-9;

/// What is wrong with an entered value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValueViolationKind {
    Required,
    PatternMismatch,
    TooShort,
    TooLong,
    NotANumber,
    BelowMinimum,
    AboveMaximum,
    StepMismatch,
    UnknownOption,
    NotABoolean,
    InvalidDate,
    InvalidEmail,
    InvalidUrl,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueViolation {
    pub kind: ValueViolationKind,
    pub message: String,
}

impl ValueViolation {
    fn new(kind: ValueViolationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValueViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Check `value` against the field's type and declared constraints
///
/// Required-ness is checked here; callers decide whether the field is
/// visible and therefore subject to validation at all. Empty values of
/// optional fields are always accepted.
pub fn validate_value(field: &Field, value: Option<&FieldValue>) -> Vec<ValueViolation> {
    if field.field_type == FieldType::Checkbox {
        return validate_checkbox(field, value);
    }

    let Some(value) = value.filter(|v| !v.is_empty()) else {
        return if field.required {
            vec![ValueViolation::new(
                ValueViolationKind::Required,
                format!("{} is required", field.label),
            )]
        } else {
            Vec::new()
        };
    };

    match field.field_type {
        FieldType::Text | FieldType::Textarea | FieldType::Email | FieldType::Url => {
            validate_text(field, &value.display_value())
        }
        FieldType::Number => validate_number(field, value),
        FieldType::Select | FieldType::Radio => validate_choice(field, value),
        FieldType::Date => validate_date(&value.display_value()),
        // Handled before the emptiness check
        FieldType::Checkbox => Vec::new(),
    }
}

fn validate_checkbox(field: &Field, value: Option<&FieldValue>) -> Vec<ValueViolation> {
    let checked = match value {
        None => false,
        Some(v) if v.is_empty() => false,
        Some(v) => match v.as_bool() {
            Some(b) => b,
            None => {
                return vec![ValueViolation::new(
                    ValueViolationKind::NotABoolean,
                    format!("must be true or false, got '{v}'"),
                )]
            }
        },
    };
    if field.required && !checked {
        vec![ValueViolation::new(
            ValueViolationKind::Required,
            format!("{} must be checked", field.label),
        )]
    } else {
        Vec::new()
    }
}

fn validate_text(field: &Field, text: &str) -> Vec<ValueViolation> {
    let mut violations = Vec::new();

    if let Some(rules) = &field.validation {
        if let Some(pattern) = &rules.pattern {
            // An uncompilable pattern is a schema violation, not a value one
            if let Some(re) = compiled_pattern(pattern) {
                if !re.is_match(text) {
                    violations.push(ValueViolation::new(
                        ValueViolationKind::PatternMismatch,
                        format!("does not match pattern '{pattern}'"),
                    ));
                }
            }
        }
        let length = text.chars().count();
        if let Some(min) = rules.min_length {
            if length < min {
                violations.push(ValueViolation::new(
                    ValueViolationKind::TooShort,
                    format!("must be at least {min} characters"),
                ));
            }
        }
        if let Some(max) = rules.max_length {
            if length > max {
                violations.push(ValueViolation::new(
                    ValueViolationKind::TooLong,
                    format!("must be at most {max} characters"),
                ));
            }
        }
    }

    match field.field_type {
        FieldType::Email if !email_regex().is_match(text.trim()) => {
            violations.push(ValueViolation::new(
                ValueViolationKind::InvalidEmail,
                format!("'{text}' is not a valid email address"),
            ));
        }
        FieldType::Url if !url_regex().is_match(text.trim()) => {
            violations.push(ValueViolation::new(
                ValueViolationKind::InvalidUrl,
                format!("'{text}' is not a valid http(s) URL"),
            ));
        }
        _ => {}
    }

    violations
}

fn validate_number(field: &Field, value: &FieldValue) -> Vec<ValueViolation> {
    let Some(number) = value.as_number() else {
        return vec![ValueViolation::new(
            ValueViolationKind::NotANumber,
            format!("'{value}' is not a number"),
        )];
    };

    let mut violations = Vec::new();
    if let Some(rules) = &field.validation {
        if let Some(min) = rules.min {
            if number < min {
                violations.push(ValueViolation::new(
                    ValueViolationKind::BelowMinimum,
                    format!("must be at least {min}"),
                ));
            }
        }
        if let Some(max) = rules.max {
            if number > max {
                violations.push(ValueViolation::new(
                    ValueViolationKind::AboveMaximum,
                    format!("must be at most {max}"),
                ));
            }
        }
        if let Some(step) = rules.step.filter(|s| s.is_finite() && *s > 0.0) {
            let base = rules.min.unwrap_or(0.0);
            let steps = (number - base) / step;
            if (steps - steps.round()).abs() > STEP_TOLERANCE {
                violations.push(ValueViolation::new(
                    ValueViolationKind::StepMismatch,
                    format!("must be a multiple of {step} from {base}"),
                ));
            }
        }
    }
    violations
}

fn validate_choice(field: &Field, value: &FieldValue) -> Vec<ValueViolation> {
    let chosen = value.display_value();
    if field.has_option(&chosen) {
        Vec::new()
    } else {
        vec![ValueViolation::new(
            ValueViolationKind::UnknownOption,
            format!("'{chosen}' is not one of the available options"),
        )]
    }
}

fn validate_date(text: &str) -> Vec<ValueViolation> {
    let text = text.trim();
    let parses = NaiveDate::parse_from_str(text, "%Y-%m-%d").is_ok()
        || DateTime::parse_from_rfc3339(text).is_ok();
    if parses {
        Vec::new()
    } else {
        vec![ValueViolation::new(
            ValueViolationKind::InvalidDate,
            format!("'{text}' is not an ISO date"),
        )]
    }
}

/// Anchored compilation of a field pattern, cached for the process
fn compiled_pattern(pattern: &str) -> Option<Regex> {
    static PATTERNS: OnceLock<DashMap<String, Option<Regex>>> = OnceLock::new();
    let patterns = PATTERNS.get_or_init(DashMap::new);
    if let Some(cached) = patterns.get(pattern) {
        return cached.clone();
    }
    let compiled = Regex::new(&format!("^(?:{pattern})$")).ok();
    patterns.insert(pattern.to_string(), compiled.clone());
    compiled
}

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap_or_else(|e| panic!("email regex: {e}"))
    })
}

fn url_regex() -> &'static Regex {
    static URL: OnceLock<Regex> = OnceLock::new();
    URL.get_or_init(|| {
        Regex::new(r"^https?://[^\s/?#]+\.[^\s/?#]+(?:[/?#]\S*)?$")
            .unwrap_or_else(|e| panic!("url regex: {e}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldOption, FieldValidation};

    fn kinds(field: &Field, value: Option<FieldValue>) -> Vec<ValueViolationKind> {
        validate_value(field, value.as_ref())
            .into_iter()
            .map(|v| v.kind)
            .collect()
    }

    mod required {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_missing_required_value() {
            let field = Field::new("title", "Title", FieldType::Text).required();
            assert_eq!(kinds(&field, None), vec![ValueViolationKind::Required]);
            assert_eq!(
                kinds(&field, Some(FieldValue::text("   "))),
                vec![ValueViolationKind::Required]
            );
            let violations = validate_value(&field, None);
            assert_eq!(violations[0].message, "Title is required");
        }

        #[test]
        fn test_empty_optional_value_skips_other_rules() {
            let field = Field::new("n", "N", FieldType::Number).with_validation(FieldValidation {
                min: Some(5.0),
                ..Default::default()
            });
            assert!(kinds(&field, Some(FieldValue::text(""))).is_empty());
            assert!(kinds(&field, None).is_empty());
        }

        #[test]
        fn test_required_checkbox_must_be_checked() {
            let field = Field::new("agree", "Agree", FieldType::Checkbox).required();
            assert_eq!(kinds(&field, None), vec![ValueViolationKind::Required]);
            assert_eq!(
                kinds(&field, Some(FieldValue::Bool(false))),
                vec![ValueViolationKind::Required]
            );
            assert!(kinds(&field, Some(FieldValue::Bool(true))).is_empty());
            assert!(kinds(&field, Some(FieldValue::text("true"))).is_empty());
        }
    }

    mod text {
        use super::*;
        use pretty_assertions::assert_eq;

        fn code_field() -> Field {
            Field::new("code", "Code", FieldType::Text).with_validation(FieldValidation {
                pattern: Some("[A-Z]{3}-[0-9]+".to_string()),
                min_length: Some(5),
                max_length: Some(8),
                ..Default::default()
            })
        }

        #[test]
        fn test_valid_text() {
            assert!(kinds(&code_field(), Some(FieldValue::text("ABC-12"))).is_empty());
        }

        #[test]
        fn test_pattern_must_match_whole_value() {
            assert_eq!(
                kinds(&code_field(), Some(FieldValue::text("xABC-12"))),
                vec![ValueViolationKind::PatternMismatch]
            );
        }

        #[test]
        fn test_length_bounds_count_characters() {
            assert_eq!(
                kinds(&code_field(), Some(FieldValue::text("ABC-"))),
                vec![ValueViolationKind::PatternMismatch, ValueViolationKind::TooShort]
            );
            assert_eq!(
                kinds(&code_field(), Some(FieldValue::text("ABC-123456"))),
                vec![ValueViolationKind::TooLong]
            );
            let field = Field::new("t", "T", FieldType::Textarea).with_validation(FieldValidation {
                max_length: Some(3),
                ..Default::default()
            });
            assert!(kinds(&field, Some(FieldValue::text("äöü"))).is_empty());
        }

        #[test]
        fn test_invalid_pattern_is_ignored_at_value_level() {
            let field = Field::new("t", "T", FieldType::Text).with_validation(FieldValidation {
                pattern: Some("([".to_string()),
                ..Default::default()
            });
            assert!(kinds(&field, Some(FieldValue::text("anything"))).is_empty());
        }

        #[test]
        fn test_compiled_patterns_are_reused() {
            let first = compiled_pattern("[0-9]{3}-[0-9]{4}").unwrap();
            let second = compiled_pattern("[0-9]{3}-[0-9]{4}").unwrap();
            assert_eq!(first.as_str(), second.as_str());
            assert!(first.is_match("555-1234"));
            assert!(!first.is_match("x555-1234"));
            assert!(compiled_pattern("[unclosed").is_none());
            assert!(compiled_pattern("[unclosed").is_none());
        }

        #[test]
        fn test_email_format() {
            let field = Field::new("e", "E", FieldType::Email);
            assert!(kinds(&field, Some(FieldValue::text("a@b.io"))).is_empty());
            assert_eq!(
                kinds(&field, Some(FieldValue::text("not-an-email"))),
                vec![ValueViolationKind::InvalidEmail]
            );
        }

        #[test]
        fn test_url_format() {
            let field = Field::new("u", "U", FieldType::Url);
            assert!(kinds(&field, Some(FieldValue::text("https://example.com/a?b=c"))).is_empty());
            assert!(kinds(&field, Some(FieldValue::text("http://example.org"))).is_empty());
            assert_eq!(
                kinds(&field, Some(FieldValue::text("ftp://example.com"))),
                vec![ValueViolationKind::InvalidUrl]
            );
            assert_eq!(
                kinds(&field, Some(FieldValue::text("example.com"))),
                vec![ValueViolationKind::InvalidUrl]
            );
        }
    }

    mod number {
        use super::*;
        use pretty_assertions::assert_eq;

        fn quantity() -> Field {
            Field::new("q", "Quantity", FieldType::Number).with_validation(FieldValidation {
                min: Some(1.0),
                max: Some(10.0),
                step: Some(0.5),
                ..Default::default()
            })
        }

        #[test]
        fn test_parses_text_and_numbers() {
            assert!(kinds(&quantity(), Some(FieldValue::text("2.5"))).is_empty());
            assert!(kinds(&quantity(), Some(FieldValue::Number(3.0))).is_empty());
        }

        #[test]
        fn test_not_a_number() {
            assert_eq!(
                kinds(&quantity(), Some(FieldValue::text("lots"))),
                vec![ValueViolationKind::NotANumber]
            );
        }

        #[test]
        fn test_bounds() {
            assert_eq!(
                kinds(&quantity(), Some(FieldValue::Number(0.0))),
                vec![ValueViolationKind::BelowMinimum]
            );
            assert_eq!(
                kinds(&quantity(), Some(FieldValue::Number(11.0))),
                vec![ValueViolationKind::AboveMaximum]
            );
        }

        #[test]
        fn test_step_is_relative_to_min() {
            assert_eq!(
                kinds(&quantity(), Some(FieldValue::Number(1.2))),
                vec![ValueViolationKind::StepMismatch]
            );
            assert!(kinds(&quantity(), Some(FieldValue::Number(1.5))).is_empty());
        }
    }

    mod choice {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_value_must_be_an_option() {
            let field = Field::new("s", "Source", FieldType::Select).with_options(vec![
                FieldOption::new("Produced", "Produced"),
                FieldOption::new("Procured", "Procured"),
            ]);
            assert!(kinds(&field, Some(FieldValue::text("Procured"))).is_empty());
            assert_eq!(
                kinds(&field, Some(FieldValue::text("Stolen"))),
                vec![ValueViolationKind::UnknownOption]
            );
        }

        #[test]
        fn test_numeric_option_values_compare_as_text() {
            let field = Field::new("r", "Rating", FieldType::Radio)
                .with_options(vec![FieldOption::new("1", "One"), FieldOption::new("2", "Two")]);
            assert!(kinds(&field, Some(FieldValue::Number(2.0))).is_empty());
        }
    }

    mod other_types {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_checkbox_rejects_non_boolean() {
            let field = Field::new("c", "C", FieldType::Checkbox);
            assert_eq!(
                kinds(&field, Some(FieldValue::text("maybe"))),
                vec![ValueViolationKind::NotABoolean]
            );
            assert!(kinds(&field, Some(FieldValue::text("false"))).is_empty());
        }

        #[test]
        fn test_date_formats() {
            let field = Field::new("d", "Due", FieldType::Date);
            assert!(kinds(&field, Some(FieldValue::text("2024-02-29"))).is_empty());
            assert!(kinds(&field, Some(FieldValue::text("2024-02-29T10:00:00Z"))).is_empty());
            assert_eq!(
                kinds(&field, Some(FieldValue::text("2023-02-29"))),
                vec![ValueViolationKind::InvalidDate]
            );
            assert_eq!(
                kinds(&field, Some(FieldValue::text("29/02/2024"))),
                vec![ValueViolationKind::InvalidDate]
            );
        }
    }
}
