//! Structural validation of a form configuration

use regex::Regex;
use std::collections::HashSet;

use super::{
    DependencyGraph, Field, FormConfiguration, Section, Violation, ViolationKind,
    ViolationLocation,
};
use crate::engine;

/// Check every schema invariant, returning all violations found
///
/// An empty result means the configuration may be persisted.
pub fn validate(config: &FormConfiguration) -> Vec<Violation> {
    let mut violations = Vec::new();
    let mut section_keys = HashSet::new();

    for (index, section) in config.sections.iter().enumerate() {
        let location = ViolationLocation::section(&section.section_key);
        if section.section_key.trim().is_empty() {
            violations.push(Violation::new(
                location.clone(),
                ViolationKind::EmptyKey,
                "section key must not be empty",
            ));
        } else if !section_keys.insert(section.section_key.as_str()) {
            violations.push(Violation::new(
                location.clone(),
                ViolationKind::DuplicateSectionKey,
                format!("duplicate section key '{}'", section.section_key),
            ));
        }
        if section.order != index as u32 + 1 {
            violations.push(Violation::new(
                location,
                ViolationKind::NonContiguousOrder,
                format!("section order {} at position {}", section.order, index + 1),
            ));
        }
        validate_section(section, &mut violations);
    }

    violations.extend(DependencyGraph::build(config).violations());
    violations
}

fn validate_section(section: &Section, violations: &mut Vec<Violation>) {
    let mut field_keys = HashSet::new();
    for (index, field) in section.fields.iter().enumerate() {
        let location = ViolationLocation::field(&section.section_key, &field.field_key);
        if field.field_key.trim().is_empty() {
            violations.push(Violation::new(
                location.clone(),
                ViolationKind::EmptyKey,
                "field key must not be empty",
            ));
        } else if !field_keys.insert(field.field_key.as_str()) {
            violations.push(Violation::new(
                location.clone(),
                ViolationKind::DuplicateFieldKey,
                format!(
                    "duplicate field key '{}' in section '{}'",
                    field.field_key, section.section_key
                ),
            ));
        }
        if field.order != index as u32 + 1 {
            violations.push(Violation::new(
                location.clone(),
                ViolationKind::NonContiguousOrder,
                format!("field order {} at position {}", field.order, index + 1),
            ));
        }
        validate_options(field, &location, violations);
        validate_rules(field, &location, violations);
        validate_default(field, &location, violations);
    }
}

fn validate_options(field: &Field, location: &ViolationLocation, violations: &mut Vec<Violation>) {
    if field.field_type.has_options() && field.options.is_empty() {
        violations.push(Violation::new(
            location.clone(),
            ViolationKind::MissingOptions,
            format!("{} field requires at least one option", field.field_type),
        ));
    }

    let mut values = HashSet::new();
    for (index, option) in field.options.iter().enumerate() {
        if option.value.trim().is_empty() {
            violations.push(Violation::new(
                location.clone(),
                ViolationKind::EmptyOptionValue,
                format!("option {} has no value", index + 1),
            ));
        } else if !values.insert(option.value.as_str()) {
            violations.push(Violation::new(
                location.clone(),
                ViolationKind::DuplicateOptionValue,
                format!("duplicate option value '{}'", option.value),
            ));
        }
        if option.label.trim().is_empty() {
            violations.push(Violation::new(
                location.clone(),
                ViolationKind::EmptyOptionLabel,
                format!("option {} has no label", index + 1),
            ));
        }
    }
}

fn validate_rules(field: &Field, location: &ViolationLocation, violations: &mut Vec<Violation>) {
    let Some(rules) = &field.validation else {
        return;
    };

    if let Some(pattern) = &rules.pattern {
        if let Err(err) = Regex::new(pattern) {
            violations.push(Violation::new(
                location.clone(),
                ViolationKind::InvalidPattern,
                format!("pattern does not compile: {err}"),
            ));
        }
    }
    if let (Some(min), Some(max)) = (rules.min_length, rules.max_length) {
        if min > max {
            violations.push(Violation::new(
                location.clone(),
                ViolationKind::InvalidRange,
                format!("minLength {min} exceeds maxLength {max}"),
            ));
        }
    }
    if let (Some(min), Some(max)) = (rules.min, rules.max) {
        if min > max {
            violations.push(Violation::new(
                location.clone(),
                ViolationKind::InvalidRange,
                format!("min {min} exceeds max {max}"),
            ));
        }
    }
    if let Some(step) = rules.step {
        if !(step.is_finite() && step > 0.0) {
            violations.push(Violation::new(
                location.clone(),
                ViolationKind::InvalidRange,
                format!("step must be positive, got {step}"),
            ));
        }
    }
}

fn validate_default(field: &Field, location: &ViolationLocation, violations: &mut Vec<Violation>) {
    let Some(default) = &field.default_value else {
        return;
    };
    for problem in engine::validate_value(field, Some(default)) {
        if problem.kind == engine::ValueViolationKind::Required {
            continue;
        }
        violations.push(Violation::new(
            location.clone(),
            ViolationKind::InvalidDefaultValue,
            format!("default value {}", problem.message),
        ));
    }
}
