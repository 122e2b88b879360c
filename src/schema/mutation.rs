//! Validated mutation API over a configuration's sections
//!
//! Every mutation works on a copy: orders are re-derived, the whole
//! candidate is validated, and only a clean candidate is returned. The
//! caller's configuration is never touched.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use uuid::Uuid;

use super::model::renumber;
use super::{
    validate, Field, FieldOption, FieldType, FieldValidation, FieldValue, FormConfiguration,
    GridColumn, Section, VisibleWhen,
};
use crate::error::{FormError, Result};

/// A single editable property of a field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", content = "value", rename_all = "camelCase")]
pub enum FieldProperty {
    Label(String),
    Type(FieldType),
    Required(bool),
    Visible(bool),
    Editable(bool),
    DefaultValue(Option<FieldValue>),
    Placeholder(Option<String>),
    HelpText(Option<String>),
    Validation(Option<FieldValidation>),
    GridColumn(GridColumn),
    VisibleWhen(Option<VisibleWhen>),
}

impl FieldProperty {
    fn apply_to(&self, field: &mut Field) {
        match self.clone() {
            Self::Label(label) => field.label = label,
            Self::Type(field_type) => field.field_type = field_type,
            Self::Required(required) => field.required = required,
            Self::Visible(visible) => field.visible = visible,
            Self::Editable(editable) => field.editable = editable,
            Self::DefaultValue(value) => field.default_value = value,
            Self::Placeholder(placeholder) => field.placeholder = placeholder,
            Self::HelpText(help_text) => field.help_text = help_text,
            Self::Validation(validation) => field.validation = validation,
            Self::GridColumn(grid_column) => field.grid_column = grid_column,
            Self::VisibleWhen(rule) => field.visible_when = rule,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Label(_) => "label",
            Self::Type(_) => "type",
            Self::Required(_) => "required",
            Self::Visible(_) => "visible",
            Self::Editable(_) => "editable",
            Self::DefaultValue(_) => "defaultValue",
            Self::Placeholder(_) => "placeholder",
            Self::HelpText(_) => "helpText",
            Self::Validation(_) => "validation",
            Self::GridColumn(_) => "gridColumn",
            Self::VisibleWhen(_) => "visibleWhen",
        }
    }
}

/// A single editable property of a section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "name", content = "value", rename_all = "camelCase")]
pub enum SectionProperty {
    Name(String),
    Description(String),
    Visible(bool),
}

impl SectionProperty {
    fn apply_to(&self, section: &mut Section) {
        match self.clone() {
            Self::Name(name) => section.name = name,
            Self::Description(description) => section.description = description,
            Self::Visible(visible) => section.visible = visible,
        }
    }
}

/// Structural edits an administrator can make to a schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum SchemaMutation {
    /// Append a custom section; an empty key is generated
    AddSection { section: Section },
    DeleteSection { section_key: String },
    /// Append a custom field; an empty key is generated
    AddField { section_key: String, field: Field },
    DeleteField { section_key: String, field_key: String },
    /// New section order, naming every existing key exactly once
    ReorderSections { section_keys: Vec<String> },
    ReorderFields { section_key: String, field_keys: Vec<String> },
    SetFieldProperty {
        section_key: String,
        field_key: String,
        property: FieldProperty,
    },
    SetSectionProperty {
        section_key: String,
        property: SectionProperty,
    },
    SetFieldOptions {
        section_key: String,
        field_key: String,
        options: Vec<FieldOption>,
    },
    AddFieldOption {
        section_key: String,
        field_key: String,
        option: FieldOption,
    },
}

impl SchemaMutation {
    /// Apply to a copy of `config`, returning the validated candidate
    pub fn apply(&self, config: &FormConfiguration) -> Result<FormConfiguration> {
        let mut candidate = config.clone();
        self.apply_in_place(&mut candidate.sections)?;
        renumber(&mut candidate.sections);

        let violations = validate(&candidate);
        if !violations.is_empty() {
            return Err(FormError::Validation(violations));
        }

        candidate.refresh_metadata();
        Ok(candidate)
    }

    fn apply_in_place(&self, sections: &mut Vec<Section>) -> Result<()> {
        match self {
            Self::AddSection { section } => {
                let mut section = section.clone();
                section.is_custom = true;
                if section.section_key.trim().is_empty() {
                    section.section_key = generated_key("section");
                }
                for field in &mut section.fields {
                    field.is_custom = true;
                }
                sections.push(section);
            }
            Self::DeleteSection { section_key } => {
                let index = section_index(sections, section_key)?;
                if !sections[index].is_custom {
                    return Err(FormError::Permission(format!(
                        "section '{section_key}' is built-in and cannot be deleted"
                    )));
                }
                sections.remove(index);
            }
            Self::AddField { section_key, field } => {
                let section = section_mut(sections, section_key)?;
                let mut field = field.clone();
                field.is_custom = true;
                if field.field_key.trim().is_empty() {
                    field.field_key = generated_key("field");
                }
                section.fields.push(field);
            }
            Self::DeleteField {
                section_key,
                field_key,
            } => {
                let section = section_mut(sections, section_key)?;
                let index = section
                    .fields
                    .iter()
                    .position(|f| &f.field_key == field_key)
                    .ok_or_else(|| field_not_found(section_key, field_key))?;
                if !section.fields[index].is_custom {
                    return Err(FormError::Permission(format!(
                        "field '{field_key}' is built-in and cannot be deleted"
                    )));
                }
                section.fields.remove(index);
            }
            Self::ReorderSections { section_keys } => {
                let current: Vec<&str> = sections.iter().map(|s| s.section_key.as_str()).collect();
                ensure_permutation("sections", &current, section_keys)?;
                let mut reordered = Vec::with_capacity(sections.len());
                for key in section_keys {
                    let index = section_index(sections, key)?;
                    reordered.push(sections.remove(index));
                }
                *sections = reordered;
            }
            Self::ReorderFields {
                section_key,
                field_keys,
            } => {
                let section = section_mut(sections, section_key)?;
                let current: Vec<&str> =
                    section.fields.iter().map(|f| f.field_key.as_str()).collect();
                ensure_permutation("fields", &current, field_keys)?;
                let mut reordered = Vec::with_capacity(section.fields.len());
                for key in field_keys {
                    let index = section
                        .fields
                        .iter()
                        .position(|f| &f.field_key == key)
                        .ok_or_else(|| field_not_found(section_key, key))?;
                    reordered.push(section.fields.remove(index));
                }
                section.fields = reordered;
            }
            Self::SetFieldProperty {
                section_key,
                field_key,
                property,
            } => {
                let field = field_mut(sections, section_key, field_key)?;
                property.apply_to(field);
            }
            Self::SetSectionProperty {
                section_key,
                property,
            } => {
                property.apply_to(section_mut(sections, section_key)?);
            }
            Self::SetFieldOptions {
                section_key,
                field_key,
                options,
            } => {
                field_mut(sections, section_key, field_key)?.options = options.clone();
            }
            Self::AddFieldOption {
                section_key,
                field_key,
                option,
            } => {
                field_mut(sections, section_key, field_key)?
                    .options
                    .push(option.clone());
            }
        }
        Ok(())
    }

    /// Key of the section this mutation targets, if any
    pub fn section_key(&self) -> Option<&str> {
        match self {
            Self::AddSection { section } => Some(section.section_key.as_str()),
            Self::ReorderSections { .. } => None,
            Self::DeleteSection { section_key }
            | Self::AddField { section_key, .. }
            | Self::DeleteField { section_key, .. }
            | Self::ReorderFields { section_key, .. }
            | Self::SetFieldProperty { section_key, .. }
            | Self::SetSectionProperty { section_key, .. }
            | Self::SetFieldOptions { section_key, .. }
            | Self::AddFieldOption { section_key, .. } => Some(section_key.as_str()),
        }
    }
}

impl fmt::Display for SchemaMutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AddSection { section } => write!(f, "add section '{}'", section.section_key),
            Self::DeleteSection { section_key } => write!(f, "delete section '{section_key}'"),
            Self::AddField { section_key, field } => {
                write!(f, "add field '{}' to '{section_key}'", field.field_key)
            }
            Self::DeleteField {
                section_key,
                field_key,
            } => write!(f, "delete field '{section_key}.{field_key}'"),
            Self::ReorderSections { .. } => f.write_str("reorder sections"),
            Self::ReorderFields { section_key, .. } => {
                write!(f, "reorder fields of '{section_key}'")
            }
            Self::SetFieldProperty {
                section_key,
                field_key,
                property,
            } => write!(f, "set {} of '{section_key}.{field_key}'", property.name()),
            Self::SetSectionProperty { section_key, .. } => {
                write!(f, "update section '{section_key}'")
            }
            Self::SetFieldOptions {
                section_key,
                field_key,
                ..
            } => write!(f, "set options of '{section_key}.{field_key}'"),
            Self::AddFieldOption {
                section_key,
                field_key,
                option,
            } => write!(
                f,
                "add option '{}' to '{section_key}.{field_key}'",
                option.value
            ),
        }
    }
}

fn generated_key(prefix: &str) -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("{prefix}_{}", &id[..8])
}

fn section_index(sections: &[Section], section_key: &str) -> Result<usize> {
    sections
        .iter()
        .position(|s| s.section_key == section_key)
        .ok_or_else(|| FormError::NotFound(format!("section '{section_key}'")))
}

fn section_mut<'a>(sections: &'a mut [Section], section_key: &str) -> Result<&'a mut Section> {
    let index = section_index(sections, section_key)?;
    Ok(&mut sections[index])
}

fn field_mut<'a>(
    sections: &'a mut [Section],
    section_key: &str,
    field_key: &str,
) -> Result<&'a mut Field> {
    section_mut(sections, section_key)?
        .field_mut(field_key)
        .ok_or_else(|| field_not_found(section_key, field_key))
}

fn field_not_found(section_key: &str, field_key: &str) -> FormError {
    FormError::NotFound(format!("field '{section_key}.{field_key}'"))
}

fn ensure_permutation(what: &str, current: &[&str], requested: &[String]) -> Result<()> {
    let current_set: HashSet<&str> = current.iter().copied().collect();
    let requested_set: HashSet<&str> = requested.iter().map(String::as_str).collect();
    if requested.len() != current.len()
        || requested_set.len() != requested.len()
        || current_set != requested_set
    {
        return Err(FormError::InvalidOperation(format!(
            "reorder of {what} must name each of [{}] exactly once",
            current.join(", ")
        )));
    }
    Ok(())
}
