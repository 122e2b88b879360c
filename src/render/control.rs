//! Field type -> input control mapping

use serde::Serialize;

use crate::schema::{Field, FieldOption, FieldType, GridColumn};

/// Input abstraction a field renders as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum WidgetKind {
    TextInput,
    EmailInput,
    UrlInput,
    TextArea,
    NumberInput,
    Dropdown,
    RadioGroup,
    Checkbox,
    DatePicker,
}

impl WidgetKind {
    pub fn for_type(field_type: FieldType) -> Self {
        match field_type {
            FieldType::Text => Self::TextInput,
            FieldType::Email => Self::EmailInput,
            FieldType::Url => Self::UrlInput,
            FieldType::Textarea => Self::TextArea,
            FieldType::Number => Self::NumberInput,
            FieldType::Select => Self::Dropdown,
            FieldType::Radio => Self::RadioGroup,
            FieldType::Checkbox => Self::Checkbox,
            FieldType::Date => Self::DatePicker,
        }
    }

    pub fn is_multiline(&self) -> bool {
        matches!(self, Self::TextArea)
    }

    /// Widgets edited by choosing among options rather than typing
    pub fn is_choice(&self) -> bool {
        matches!(self, Self::Dropdown | Self::RadioGroup)
    }
}

/// Constraints a control enforces, limited to those meaningful for its widget
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlConstraints {
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub allowed_values: Vec<String>,
}

/// Everything a front end needs to draw one field
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlDescriptor {
    pub field_key: String,
    pub label: String,
    pub widget: WidgetKind,
    pub constraints: ControlConstraints,
    pub grid_column: GridColumn,
    pub editable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<FieldOption>,
}

/// Describe the control for a field; pure and stateless
pub fn describe_control(field: &Field) -> ControlDescriptor {
    let widget = WidgetKind::for_type(field.field_type);
    ControlDescriptor {
        field_key: field.field_key.clone(),
        label: field.label.clone(),
        widget,
        constraints: constraints_for(field),
        grid_column: field.grid_column,
        editable: field.editable,
        placeholder: field.placeholder.clone(),
        help_text: field.help_text.clone(),
        options: if widget.is_choice() {
            field.options.clone()
        } else {
            Vec::new()
        },
    }
}

fn constraints_for(field: &Field) -> ControlConstraints {
    let mut constraints = ControlConstraints {
        required: field.required,
        ..Default::default()
    };
    let rules = field.validation.clone().unwrap_or_default();

    match field.field_type {
        t if t.is_textual() => {
            constraints.pattern = rules.pattern;
            constraints.min_length = rules.min_length;
            constraints.max_length = rules.max_length;
        }
        FieldType::Number => {
            constraints.min = rules.min;
            constraints.max = rules.max;
            constraints.step = rules.step;
        }
        t if t.has_options() => {
            constraints.allowed_values = field.options.iter().map(|o| o.value.clone()).collect();
        }
        _ => {}
    }
    constraints
}
