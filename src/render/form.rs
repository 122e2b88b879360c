//! Editable and preview form views built from one evaluation

use serde::Serialize;
use std::collections::BTreeMap;

use super::{describe_control, ControlDescriptor};
use crate::engine::{current_value, evaluate, FieldValues, ValueViolation};
use crate::error::{FormError, Result};
use crate::schema::{FieldValue, FormConfiguration};

/// How the form is being shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RenderMode {
    /// Production form: controls follow their `editable` flag
    #[default]
    Editable,
    /// Administrator preview: every control is read-only
    Preview,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedControl {
    pub control: ControlDescriptor,
    pub value: Option<FieldValue>,
    pub read_only: bool,
    pub violations: Vec<ValueViolation>,
}

impl RenderedControl {
    /// Get the display value for rendering
    pub fn display_value(&self) -> String {
        match &self.value {
            Some(value) if !value.is_empty() => value.display_value(),
            _ => "(empty)".to_string(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedSection {
    pub section_key: String,
    pub name: String,
    pub description: String,
    pub controls: Vec<RenderedControl>,
}

/// A fully evaluated form, ready to draw
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedForm {
    pub mode: RenderMode,
    pub sections: Vec<RenderedSection>,
    pub violations_by_field_key: BTreeMap<String, Vec<ValueViolation>>,
}

impl RenderedForm {
    /// The form drawn when no schema could be loaded
    pub fn empty(mode: RenderMode) -> Self {
        Self {
            mode,
            sections: Vec::new(),
            violations_by_field_key: BTreeMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn is_valid(&self) -> bool {
        self.violations_by_field_key.is_empty()
    }

    pub fn controls(&self) -> impl Iterator<Item = &RenderedControl> {
        self.sections.iter().flat_map(|s| s.controls.iter())
    }

    pub fn control(&self, field_key: &str) -> Option<&RenderedControl> {
        self.controls().find(|c| c.control.field_key == field_key)
    }

    pub fn visible_keys(&self) -> Vec<&str> {
        self.controls().map(|c| c.control.field_key.as_str()).collect()
    }
}

/// Build the form for `schema` under the current values
///
/// Sections with no visible field are omitted.
pub fn render_form(schema: &FormConfiguration, values: &FieldValues, mode: RenderMode) -> RenderedForm {
    let evaluation = evaluate(schema, values);
    let mut sections = Vec::new();

    for section in &schema.sections {
        let controls: Vec<RenderedControl> = section
            .fields
            .iter()
            .filter(|field| {
                evaluation
                    .visible_fields
                    .iter()
                    .any(|visible| std::ptr::eq(*visible, *field))
            })
            .map(|field| {
                let control = describe_control(field);
                RenderedControl {
                    read_only: mode == RenderMode::Preview || !control.editable,
                    value: current_value(field, values).cloned(),
                    violations: evaluation.violations_for(&field.field_key).to_vec(),
                    control,
                }
            })
            .collect();

        if !controls.is_empty() {
            sections.push(RenderedSection {
                section_key: section.section_key.clone(),
                name: section.name.clone(),
                description: section.description.clone(),
                controls,
            });
        }
    }

    RenderedForm {
        mode,
        sections,
        violations_by_field_key: evaluation.violations_by_field_key,
    }
}

/// Render a schema lookup result, treating a missing schema as an empty form
pub fn render_active_form(
    schema: Result<FormConfiguration>,
    values: &FieldValues,
    mode: RenderMode,
) -> Result<RenderedForm> {
    match schema {
        Ok(schema) => Ok(render_form(&schema, values, mode)),
        Err(FormError::NotFound(what)) => {
            tracing::warn!(%what, "no schema available, rendering empty form");
            Ok(RenderedForm::empty(mode))
        }
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::WidgetKind;
    use crate::schema::{Field, FieldType, Section};
    use pretty_assertions::assert_eq;

    fn values(pairs: &[(&str, FieldValue)]) -> FieldValues {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn seeded() -> FormConfiguration {
        FormConfiguration::seeded("default", "Default")
    }

    #[test]
    fn test_preview_matches_editable() {
        let schema = seeded();
        for current in [
            values(&[]),
            values(&[("source_type", "Procured".into())]),
            values(&[("urgent", FieldValue::Bool(true)), ("quantity", "abc".into())]),
        ] {
            let editable = render_form(&schema, &current, RenderMode::Editable);
            let preview = render_form(&schema, &current, RenderMode::Preview);
            assert_eq!(editable.visible_keys(), preview.visible_keys());
            assert_eq!(editable.violations_by_field_key, preview.violations_by_field_key);
            assert!(preview.controls().all(|c| c.read_only));
        }
    }

    #[test]
    fn test_editable_mode_respects_editable_flag() {
        let mut schema = seeded();
        schema.sections[0].fields[0].editable = false;
        let form = render_form(&schema, &FieldValues::new(), RenderMode::Editable);
        assert!(form.control("title").unwrap().read_only);
        assert!(!form.control("description").unwrap().read_only);
    }

    #[test]
    fn test_sections_without_visible_fields_are_omitted() {
        let schema = FormConfiguration::new(
            "cfg",
            "Sparse",
            vec![
                Section::new("shown", "Shown")
                    .with_fields(vec![Field::new("a", "A", FieldType::Text)]),
                Section::new("gated", "Gated").with_fields(vec![
                    Field::new("b", "B", FieldType::Text).visible_when("a", "open")
                ]),
            ],
        );
        let form = render_form(&schema, &FieldValues::new(), RenderMode::Editable);
        assert_eq!(form.sections.len(), 1);
        let form = render_form(&schema, &values(&[("a", "open".into())]), RenderMode::Editable);
        assert_eq!(form.sections.len(), 2);
    }

    #[test]
    fn test_controls_carry_values_and_violations() {
        let schema = seeded();
        let form = render_form(
            &schema,
            &values(&[("quantity", FieldValue::Number(0.0))]),
            RenderMode::Editable,
        );
        let quantity = form.control("quantity").unwrap();
        assert_eq!(quantity.control.widget, WidgetKind::NumberInput);
        assert_eq!(quantity.display_value(), "0");
        assert!(!quantity.is_valid());

        let priority = form.control("priority").unwrap();
        assert_eq!(priority.value, Some(FieldValue::text("medium")));

        let description = form.control("description").unwrap();
        assert_eq!(description.display_value(), "(empty)");
        assert!(!form.is_valid());
    }

    #[test]
    fn test_missing_schema_renders_empty_form() {
        let form = render_active_form(
            Err(FormError::NotFound("configuration 'x'".to_string())),
            &FieldValues::new(),
            RenderMode::Preview,
        )
        .unwrap();
        assert!(form.is_empty());
        assert!(form.is_valid());
        assert_eq!(form.mode, RenderMode::Preview);
    }

    #[test]
    fn test_other_errors_propagate() {
        let result = render_active_form(
            Err(FormError::InvalidOperation("boom".to_string())),
            &FieldValues::new(),
            RenderMode::Editable,
        );
        assert!(matches!(result, Err(FormError::InvalidOperation(_))));
    }
}
