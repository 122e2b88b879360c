//! Render-time visibility of fields

use std::collections::HashMap;

use crate::schema::{Field, FieldType, FieldValue, FormConfiguration, Section};

/// Current values entered in a form, keyed by field key
pub type FieldValues = HashMap<String, FieldValue>;

/// Key lookup over a configuration's fields, first occurrence wins
///
/// Dependencies are resolved through this index rather than by position, so
/// a field may depend on one rendered after it.
pub struct FieldIndex<'a> {
    by_key: HashMap<&'a str, &'a Field>,
}

impl<'a> FieldIndex<'a> {
    pub fn new(schema: &'a FormConfiguration) -> Self {
        let mut by_key = HashMap::new();
        for (_, field) in schema.fields() {
            by_key.entry(field.field_key.as_str()).or_insert(field);
        }
        Self { by_key }
    }

    pub fn get(&self, field_key: &str) -> Option<&'a Field> {
        self.by_key.get(field_key).copied()
    }
}

static UNCHECKED: FieldValue = FieldValue::Bool(false);

/// The value a field currently holds: the entered value, else its default
///
/// A checkbox with neither reads as unchecked, the state its control shows.
pub fn current_value<'v>(field: &'v Field, values: &'v FieldValues) -> Option<&'v FieldValue> {
    values
        .get(&field.field_key)
        .or(field.default_value.as_ref())
        .or_else(|| (field.field_type == FieldType::Checkbox).then_some(&UNCHECKED))
}

/// Fields that should be rendered, in render order
///
/// A field is visible when its section is visible, the field itself is
/// visible, and its `visibleWhen` rule (if any) is satisfied by the
/// referenced field's current value. Rules are not chained: a dependency
/// that is itself hidden still contributes its value.
pub fn compute_visible_fields<'a>(
    schema: &'a FormConfiguration,
    values: &FieldValues,
) -> Vec<&'a Field> {
    let index = FieldIndex::new(schema);
    schema
        .fields()
        .filter(|(section, field)| is_visible(&index, section, field, values))
        .map(|(_, field)| field)
        .collect()
}

pub(crate) fn is_visible(
    index: &FieldIndex<'_>,
    section: &Section,
    field: &Field,
    values: &FieldValues,
) -> bool {
    if !section.visible || !field.visible {
        return false;
    }
    let Some(rule) = &field.visible_when else {
        return true;
    };
    let Some(dependency) = index.get(&rule.field_key) else {
        return false;
    };
    current_value(dependency, values)
        .is_some_and(|value| value.matches(&rule.value, dependency.field_type))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldOption, FieldType};
    use pretty_assertions::assert_eq;

    fn keys(fields: &[&Field]) -> Vec<String> {
        fields.iter().map(|f| f.field_key.clone()).collect()
    }

    fn values(pairs: &[(&str, FieldValue)]) -> FieldValues {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn sourcing() -> FormConfiguration {
        FormConfiguration::new(
            "cfg",
            "Sourcing",
            vec![Section::new("main", "Main").with_fields(vec![
                Field::new("A", "Source", FieldType::Select).with_options(vec![
                    FieldOption::new("Produced", "Produced"),
                    FieldOption::new("Procured", "Procured"),
                ]),
                Field::new("B", "Supplier", FieldType::Text).visible_when("A", "Procured"),
            ])],
        )
    }

    #[test]
    fn test_produced_hides_supplier() {
        let schema = sourcing();
        let visible = compute_visible_fields(&schema, &values(&[("A", "Produced".into())]));
        assert_eq!(keys(&visible), vec!["A"]);
    }

    #[test]
    fn test_procured_shows_supplier() {
        let schema = sourcing();
        let visible = compute_visible_fields(&schema, &values(&[("A", "Procured".into())]));
        assert_eq!(keys(&visible), vec!["A", "B"]);
    }

    #[test]
    fn test_missing_dependency_value_hides_dependent() {
        let schema = sourcing();
        let visible = compute_visible_fields(&schema, &FieldValues::new());
        assert_eq!(keys(&visible), vec!["A"]);
    }

    #[test]
    fn test_dependency_default_counts_as_current_value() {
        let mut schema = sourcing();
        schema.sections[0].fields[0].default_value = Some("Procured".into());
        let visible = compute_visible_fields(&schema, &FieldValues::new());
        assert_eq!(keys(&visible), vec!["A", "B"]);
        let visible = compute_visible_fields(&schema, &values(&[("A", "Produced".into())]));
        assert_eq!(keys(&visible), vec!["A"]);
    }

    #[test]
    fn test_forward_reference() {
        let schema = FormConfiguration::new(
            "cfg",
            "Forward",
            vec![
                Section::new("first", "First").with_fields(vec![
                    Field::new("details", "Details", FieldType::Textarea).visible_when("more", true)
                ]),
                Section::new("second", "Second")
                    .with_fields(vec![Field::new("more", "More", FieldType::Checkbox)]),
            ],
        );
        let shown = compute_visible_fields(&schema, &values(&[("more", FieldValue::Bool(true))]));
        assert_eq!(keys(&shown), vec!["details", "more"]);
        let hidden = compute_visible_fields(&schema, &values(&[("more", "false".into())]));
        assert_eq!(keys(&hidden), vec!["more"]);
    }

    #[test]
    fn test_hidden_section_hides_all_fields() {
        let mut schema = sourcing();
        schema.sections[0].visible = false;
        let visible = compute_visible_fields(&schema, &values(&[("A", "Procured".into())]));
        assert!(visible.is_empty());
    }

    #[test]
    fn test_hidden_field_is_excluded() {
        let mut schema = sourcing();
        schema.sections[0].fields[0].visible = false;
        let visible = compute_visible_fields(&schema, &values(&[("A", "Procured".into())]));
        assert_eq!(keys(&visible), vec!["B"]);
    }

    #[test]
    fn test_number_dependency_compares_numerically() {
        let schema = FormConfiguration::new(
            "cfg",
            "Numbers",
            vec![Section::new("main", "Main").with_fields(vec![
                Field::new("count", "Count", FieldType::Number),
                Field::new("why", "Why", FieldType::Text).visible_when("count", 3.0),
            ])],
        );
        let visible = compute_visible_fields(&schema, &values(&[("count", "3".into())]));
        assert_eq!(keys(&visible), vec!["count", "why"]);
    }

    #[test]
    fn test_untouched_checkbox_counts_as_unchecked() {
        let schema = FormConfiguration::new(
            "cfg",
            "Consent",
            vec![Section::new("main", "Main").with_fields(vec![
                Field::new("agree", "Agree", FieldType::Checkbox),
                Field::new("why_not", "Why not?", FieldType::Text).visible_when("agree", false),
            ])],
        );
        let visible = compute_visible_fields(&schema, &FieldValues::new());
        assert_eq!(keys(&visible), vec!["agree", "why_not"]);
        let visible = compute_visible_fields(&schema, &values(&[("agree", FieldValue::Bool(true))]));
        assert_eq!(keys(&visible), vec!["agree"]);
    }

    #[test]
    fn test_unknown_dependency_hides_field() {
        let schema = FormConfiguration::new(
            "cfg",
            "Broken",
            vec![Section::new("main", "Main").with_fields(vec![
                Field::new("x", "X", FieldType::Text).visible_when("ghost", "y"),
            ])],
        );
        assert!(compute_visible_fields(&schema, &values(&[("ghost", "y".into())])).is_empty());
    }
}
