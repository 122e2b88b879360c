//! Interactive fill-in state for one schema

use std::collections::BTreeMap;

use super::{render_form, RenderMode, RenderedForm};
use crate::engine::{compute_visible_fields, current_value, evaluate, FieldValues, ValueViolation};
use crate::error::{FormError, Result};
use crate::schema::{Field, FieldType, FieldValue, FormConfiguration};

/// Trait for common form operations
pub trait Form {
    fn field_count(&self) -> usize;
    fn active_field(&self) -> usize;
    fn set_active_field(&mut self, index: usize);
    fn next_field(&mut self) {
        let count = self.field_count();
        if count == 0 {
            return;
        }
        let current = self.active_field();
        self.set_active_field((current + 1) % count);
    }
    fn prev_field(&mut self) {
        let count = self.field_count();
        if count == 0 {
            return;
        }
        let current = self.active_field();
        if current == 0 {
            self.set_active_field(count - 1);
        } else {
            self.set_active_field(current - 1);
        }
    }
}

/// Keyboard-driven session over the visible, editable fields of a schema
///
/// Values start from field defaults and the form is re-evaluated after every
/// change, so fields appear and disappear as dependencies are answered.
#[derive(Debug, Clone)]
pub struct FormSession {
    schema: FormConfiguration,
    values: FieldValues,
    focusable: Vec<String>,
    active_field_index: usize,
    violations: BTreeMap<String, Vec<ValueViolation>>,
}

impl FormSession {
    pub fn new(schema: FormConfiguration) -> Self {
        let values = schema
            .fields()
            .filter_map(|(_, field)| {
                field
                    .default_value
                    .clone()
                    .map(|value| (field.field_key.clone(), value))
            })
            .collect();
        let mut session = Self {
            schema,
            values,
            focusable: Vec::new(),
            active_field_index: 0,
            violations: BTreeMap::new(),
        };
        session.refresh();
        session
    }

    pub fn schema(&self) -> &FormConfiguration {
        &self.schema
    }

    pub fn values(&self) -> &FieldValues {
        &self.values
    }

    pub fn violations(&self) -> &BTreeMap<String, Vec<ValueViolation>> {
        &self.violations
    }

    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    /// Keys reachable by keyboard navigation, in render order
    pub fn focusable_keys(&self) -> &[String] {
        &self.focusable
    }

    pub fn active_field_key(&self) -> Option<&str> {
        self.focusable
            .get(self.active_field_index)
            .map(String::as_str)
    }

    pub fn active_field_def(&self) -> Option<&Field> {
        self.active_field_key()
            .and_then(|key| self.schema.field_by_key(key))
    }

    pub fn is_active_field_multiline(&self) -> bool {
        self.active_field_def()
            .is_some_and(|f| f.field_type == FieldType::Textarea)
    }

    /// Push a character to the active field
    pub fn push_char(&mut self, c: char) {
        if self
            .active_field_def()
            .is_some_and(|f| f.field_type.has_options())
        {
            return;
        }
        if let Some(value) = self.active_value_mut() {
            value.push_char(c);
            self.refresh();
        }
    }

    /// Remove the last character from the active field
    pub fn pop_char(&mut self) {
        if let Some(value) = self.active_value_mut() {
            value.pop_char();
            self.refresh();
        }
    }

    /// Clear the active field
    pub fn clear(&mut self) {
        if let Some(value) = self.active_value_mut() {
            value.clear();
            self.refresh();
        }
    }

    /// Select the next option of the active select or radio field (wraps around)
    pub fn next_option(&mut self) {
        self.cycle_option(true);
    }

    /// Select the previous option of the active select or radio field (wraps around)
    pub fn prev_option(&mut self) {
        self.cycle_option(false);
    }

    /// Set a field's value directly
    pub fn set_value(&mut self, field_key: &str, value: impl Into<FieldValue>) -> Result<()> {
        let field = self
            .schema
            .field_by_key(field_key)
            .ok_or_else(|| FormError::NotFound(format!("field '{field_key}'")))?;
        if !field.editable {
            return Err(FormError::InvalidOperation(format!(
                "field '{field_key}' is not editable"
            )));
        }
        self.values.insert(field_key.to_string(), value.into());
        self.refresh();
        Ok(())
    }

    pub fn render(&self, mode: RenderMode) -> RenderedForm {
        render_form(&self.schema, &self.values, mode)
    }

    /// Values of the visible fields, or the outstanding violations
    ///
    /// Values entered into fields that are hidden at submit time are dropped.
    pub fn submit(&self) -> std::result::Result<FieldValues, BTreeMap<String, Vec<ValueViolation>>> {
        if !self.violations.is_empty() {
            return Err(self.violations.clone());
        }
        Ok(compute_visible_fields(&self.schema, &self.values)
            .into_iter()
            .filter_map(|field| {
                current_value(field, &self.values)
                    .map(|value| (field.field_key.clone(), value.clone()))
            })
            .collect())
    }

    fn active_value_mut(&mut self) -> Option<&mut FieldValue> {
        let key = self.focusable.get(self.active_field_index)?.clone();
        let field_type = self.schema.field_by_key(&key)?.field_type;
        Some(
            self.values
                .entry(key)
                .or_insert_with(|| FieldValue::empty_for(field_type)),
        )
    }

    fn cycle_option(&mut self, forward: bool) {
        let Some(field) = self.active_field_def() else {
            return;
        };
        if !field.field_type.has_options() || field.options.is_empty() {
            return;
        }
        let count = field.options.len();
        let position = current_value(field, &self.values)
            .map(FieldValue::display_value)
            .and_then(|current| field.options.iter().position(|o| o.value == current));
        let next = match (position, forward) {
            (None, true) => 0,
            (None, false) => count - 1,
            (Some(i), true) => (i + 1) % count,
            (Some(0), false) => count - 1,
            (Some(i), false) => i - 1,
        };
        let key = field.field_key.clone();
        let value = FieldValue::text(field.options[next].value.clone());

        self.values.insert(key, value);
        self.refresh();
    }

    /// Re-evaluate and keep focus on the same field when it is still reachable
    fn refresh(&mut self) {
        let active_key = self.active_field_key().map(str::to_string);
        let evaluation = evaluate(&self.schema, &self.values);

        self.focusable = evaluation
            .visible_fields
            .iter()
            .filter(|field| field.editable)
            .map(|field| field.field_key.clone())
            .collect();
        self.violations = evaluation.violations_by_field_key;

        self.active_field_index = active_key
            .and_then(|key| self.focusable.iter().position(|k| *k == key))
            .unwrap_or_else(|| {
                self.active_field_index
                    .min(self.focusable.len().saturating_sub(1))
            });
    }
}

impl Form for FormSession {
    fn field_count(&self) -> usize {
        self.focusable.len()
    }
    fn active_field(&self) -> usize {
        self.active_field_index
    }
    fn set_active_field(&mut self, index: usize) {
        self.active_field_index = index.min(self.focusable.len().saturating_sub(1));
    }
}
