//! Combined visibility + validation pass over a schema

use serde::Serialize;
use std::collections::BTreeMap;

use super::visibility::{current_value, is_visible, FieldIndex, FieldValues};
use super::{validate_value, ValueViolation};
use crate::schema::{Field, FormConfiguration};

/// Outcome of evaluating a schema against the current values
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation<'a> {
    /// Visible fields in render order
    pub visible_fields: Vec<&'a Field>,
    /// Violations of visible fields only; hidden fields never appear here
    pub violations_by_field_key: BTreeMap<String, Vec<ValueViolation>>,
}

impl<'a> Evaluation<'a> {
    pub fn is_valid(&self) -> bool {
        self.violations_by_field_key.is_empty()
    }

    pub fn is_visible(&self, field_key: &str) -> bool {
        self.visible_fields.iter().any(|f| f.field_key == field_key)
    }

    pub fn violations_for(&self, field_key: &str) -> &[ValueViolation] {
        self.violations_by_field_key
            .get(field_key)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn visible_keys(&self) -> Vec<&'a str> {
        self.visible_fields
            .iter()
            .map(|f| f.field_key.as_str())
            .collect()
    }
}

/// Single pass computing visible fields and their violations
///
/// This is the one evaluation both the editable form and the read-only
/// preview are built from.
pub fn evaluate<'a>(schema: &'a FormConfiguration, values: &FieldValues) -> Evaluation<'a> {
    let index = FieldIndex::new(schema);
    let mut visible_fields = Vec::new();
    let mut violations_by_field_key: BTreeMap<String, Vec<ValueViolation>> = BTreeMap::new();

    for (section, field) in schema.fields() {
        if !is_visible(&index, section, field, values) {
            continue;
        }
        visible_fields.push(field);

        let violations = validate_value(field, current_value(field, values));
        if !violations.is_empty() {
            violations_by_field_key
                .entry(field.field_key.clone())
                .or_default()
                .extend(violations);
        }
    }

    Evaluation {
        visible_fields,
        violations_by_field_key,
    }
}
