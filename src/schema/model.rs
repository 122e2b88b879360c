//! Form configuration data model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::FieldValue;

/// Two-part schema version, written `"<major>.<minor>"`
///
/// Only the minor component is ever changed by publish and rollback; the
/// major component is reserved for incompatible migrations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SchemaVersion {
    pub major: u32,
    pub minor: u32,
}

impl SchemaVersion {
    pub const INITIAL: SchemaVersion = SchemaVersion { major: 1, minor: 0 };

    pub fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// The next minor version ("1.2" -> "1.3")
    pub fn next_minor(self) -> Self {
        Self {
            major: self.major,
            minor: self.minor.saturating_add(1),
        }
    }

    /// The previous minor version, floored at `<major>.0`
    pub fn previous_minor(self) -> Self {
        Self {
            major: self.major,
            minor: self.minor.saturating_sub(1),
        }
    }
}

impl Default for SchemaVersion {
    fn default() -> Self {
        Self::INITIAL
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid schema version '{0}', expected \"<major>.<minor>\"")]
pub struct ParseVersionError(String);

impl FromStr for SchemaVersion {
    type Err = ParseVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (major, minor) = s
            .split_once('.')
            .ok_or_else(|| ParseVersionError(s.to_string()))?;
        let major = major
            .parse()
            .map_err(|_| ParseVersionError(s.to_string()))?;
        let minor = minor
            .parse()
            .map_err(|_| ParseVersionError(s.to_string()))?;
        Ok(Self { major, minor })
    }
}

impl TryFrom<String> for SchemaVersion {
    type Error = ParseVersionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SchemaVersion> for String {
    fn from(value: SchemaVersion) -> Self {
        value.to_string()
    }
}

/// Declared type of a field, selecting its control and validation rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    #[default]
    Text,
    Textarea,
    Number,
    Select,
    Radio,
    Checkbox,
    Date,
    Email,
    Url,
}

impl FieldType {
    pub const ALL: [FieldType; 9] = [
        FieldType::Text,
        FieldType::Textarea,
        FieldType::Number,
        FieldType::Select,
        FieldType::Radio,
        FieldType::Checkbox,
        FieldType::Date,
        FieldType::Email,
        FieldType::Url,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Text => "Text",
            Self::Textarea => "Text Area",
            Self::Number => "Number",
            Self::Select => "Dropdown",
            Self::Radio => "Radio Buttons",
            Self::Checkbox => "Checkbox",
            Self::Date => "Date",
            Self::Email => "Email",
            Self::Url => "URL",
        }
    }

    /// Types validated as free text (pattern and length rules apply)
    pub fn is_textual(&self) -> bool {
        matches!(self, Self::Text | Self::Textarea | Self::Email | Self::Url)
    }

    /// Types whose value must be one of the declared options
    pub fn has_options(&self) -> bool {
        matches!(self, Self::Select | Self::Radio)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Text => "text",
            Self::Textarea => "textarea",
            Self::Number => "number",
            Self::Select => "select",
            Self::Radio => "radio",
            Self::Checkbox => "checkbox",
            Self::Date => "date",
            Self::Email => "email",
            Self::Url => "url",
        };
        f.write_str(name)
    }
}

/// Horizontal space a control occupies in a 12-column grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GridColumn {
    #[default]
    Full,
    Half,
    Third,
    Quarter,
}

impl GridColumn {
    pub fn span(&self) -> u8 {
        match self {
            Self::Full => 12,
            Self::Half => 6,
            Self::Third => 4,
            Self::Quarter => 3,
        }
    }
}

/// One choice of a select or radio field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOption {
    pub value: String,
    pub label: String,
}

impl FieldOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// Declared constraints; which ones apply depends on the field type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldValidation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
}

/// Cross-field visibility rule: render only when `field_key` currently equals `value`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisibleWhen {
    pub field_key: String,
    pub value: FieldValue,
}

impl VisibleWhen {
    pub fn new(field_key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self {
            field_key: field_key.into(),
            value: value.into(),
        }
    }
}

/// A single field of a section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub field_key: String,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub required: bool,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default = "default_true")]
    pub editable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<FieldValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<FieldOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<FieldValidation>,
    #[serde(default)]
    pub grid_column: GridColumn,
    #[serde(default)]
    pub order: u32,
    #[serde(default)]
    pub is_custom: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible_when: Option<VisibleWhen>,
}

impl Field {
    /// Create a new custom field with visible/editable defaults
    pub fn new(field_key: &str, label: &str, field_type: FieldType) -> Self {
        Self {
            field_key: field_key.to_string(),
            label: label.to_string(),
            field_type,
            required: false,
            visible: true,
            editable: true,
            default_value: None,
            placeholder: None,
            help_text: None,
            options: Vec::new(),
            validation: None,
            grid_column: GridColumn::Full,
            order: 0,
            is_custom: true,
            visible_when: None,
        }
    }

    /// Mark as a seeded, undeletable field
    pub fn built_in(mut self) -> Self {
        self.is_custom = false;
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_options(mut self, options: Vec<FieldOption>) -> Self {
        self.options = options;
        self
    }

    pub fn with_validation(mut self, validation: FieldValidation) -> Self {
        self.validation = Some(validation);
        self
    }

    pub fn with_default(mut self, value: impl Into<FieldValue>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn with_placeholder(mut self, placeholder: &str) -> Self {
        self.placeholder = Some(placeholder.to_string());
        self
    }

    pub fn with_help_text(mut self, help_text: &str) -> Self {
        self.help_text = Some(help_text.to_string());
        self
    }

    pub fn with_grid(mut self, grid_column: GridColumn) -> Self {
        self.grid_column = grid_column;
        self
    }

    pub fn visible_when(mut self, field_key: &str, value: impl Into<FieldValue>) -> Self {
        self.visible_when = Some(VisibleWhen::new(field_key, value));
        self
    }

    /// Whether `value` is one of this field's option values
    pub fn has_option(&self, value: &str) -> bool {
        self.options.iter().any(|o| o.value == value)
    }
}

/// A titled group of fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub section_key: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub order: u32,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default)]
    pub is_custom: bool,
    #[serde(default)]
    pub fields: Vec<Field>,
}

impl Section {
    /// Create a new custom, visible section
    pub fn new(section_key: &str, name: &str) -> Self {
        Self {
            section_key: section_key.to_string(),
            name: name.to_string(),
            description: String::new(),
            order: 0,
            visible: true,
            is_custom: true,
            fields: Vec::new(),
        }
    }

    pub fn built_in(mut self) -> Self {
        self.is_custom = false;
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn with_fields(mut self, fields: Vec<Field>) -> Self {
        self.fields = fields;
        self
    }

    pub fn field(&self, field_key: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.field_key == field_key)
    }

    pub(crate) fn field_mut(&mut self, field_key: &str) -> Option<&mut Field> {
        self.fields.iter_mut().find(|f| f.field_key == field_key)
    }

    /// Re-derive field order as 1..N in list order
    pub(crate) fn renumber_fields(&mut self) {
        for (index, field) in self.fields.iter_mut().enumerate() {
            field.order = index as u32 + 1;
        }
    }
}

/// Derived counts; recomputed, never authoritative
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurationMetadata {
    pub total_fields: usize,
    pub custom_fields_count: usize,
    pub section_count: usize,
}

impl ConfigurationMetadata {
    pub fn from_sections(sections: &[Section]) -> Self {
        let fields = sections.iter().flat_map(|s| s.fields.iter());
        let (total_fields, custom_fields_count) =
            fields.fold((0, 0), |(total, custom), f| (total + 1, custom + usize::from(f.is_custom)));
        Self {
            total_fields,
            custom_fields_count,
            section_count: sections.len(),
        }
    }
}

/// Root aggregate: a versioned form schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormConfiguration {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
    pub version: SchemaVersion,
    pub published_version: SchemaVersion,
    #[serde(default)]
    pub is_draft: bool,
    #[serde(default)]
    pub last_published_at: Option<DateTime<Utc>>,
    pub sections: Vec<Section>,
    /// Current published baseline, served to end users
    #[serde(default)]
    pub published_sections: Vec<Section>,
    /// Baseline superseded by the most recent publish; the rollback target
    #[serde(default)]
    pub last_published_sections: Vec<Section>,
    #[serde(default)]
    pub metadata: ConfigurationMetadata,
}

impl FormConfiguration {
    /// A published configuration whose baseline is `sections`
    pub fn new(id: &str, name: &str, mut sections: Vec<Section>) -> Self {
        renumber(&mut sections);
        let metadata = ConfigurationMetadata::from_sections(&sections);
        Self {
            id: id.to_string(),
            name: name.to_string(),
            template_id: None,
            version: SchemaVersion::INITIAL,
            published_version: SchemaVersion::INITIAL,
            is_draft: false,
            last_published_at: None,
            published_sections: sections.clone(),
            sections,
            last_published_sections: Vec::new(),
            metadata,
        }
    }

    pub fn with_template(mut self, template_id: &str) -> Self {
        self.template_id = Some(template_id.to_string());
        self
    }

    pub fn section(&self, section_key: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.section_key == section_key)
    }

    pub fn field(&self, section_key: &str, field_key: &str) -> Option<&Field> {
        self.section(section_key).and_then(|s| s.field(field_key))
    }

    /// First field with this key in render order, across all sections
    pub fn field_by_key(&self, field_key: &str) -> Option<&Field> {
        self.fields().map(|(_, f)| f).find(|f| f.field_key == field_key)
    }

    /// Flattened (section, field) pairs in render order
    pub fn fields(&self) -> impl Iterator<Item = (&Section, &Field)> {
        self.sections
            .iter()
            .flat_map(|s| s.fields.iter().map(move |f| (s, f)))
    }

    pub fn has_rollback_snapshot(&self) -> bool {
        !self.last_published_sections.is_empty()
    }

    /// Whether the working sections differ from the published baseline
    pub fn has_unpublished_changes(&self) -> bool {
        self.sections != self.published_sections
    }

    /// Whether a published baseline is recorded for the working sections
    pub fn has_published_baseline(&self) -> bool {
        !self.published_sections.is_empty() || self.sections.is_empty()
    }

    /// Fill in the published baseline of a document stored without one
    ///
    /// A published document's working sections are its baseline. A draft's
    /// baseline cannot be recovered, so it stays empty and discarding that
    /// draft is refused.
    pub fn restore_missing_baseline(&mut self) {
        if !self.is_draft && !self.has_published_baseline() {
            self.published_sections = self.sections.clone();
        }
    }

    /// The schema end users are served
    ///
    /// While a draft is open this is the published baseline at the published
    /// version; the working sections stay with the editor. A draft with no
    /// recorded baseline serves its working sections.
    pub fn live_schema(&self) -> FormConfiguration {
        let mut live = self.clone();
        if self.is_draft && self.has_published_baseline() {
            live.sections = self.published_sections.clone();
            live.version = self.published_version;
            live.is_draft = false;
            live.refresh_metadata();
        }
        live
    }

    pub fn refresh_metadata(&mut self) {
        self.metadata = ConfigurationMetadata::from_sections(&self.sections);
    }
}

/// Re-derive section and field order as contiguous 1..N sequences
pub(crate) fn renumber(sections: &mut [Section]) {
    for (index, section) in sections.iter_mut().enumerate() {
        section.order = index as u32 + 1;
        section.renumber_fields();
    }
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    mod schema_version {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_parse_and_display() {
            let version: SchemaVersion = "1.3".parse().unwrap();
            assert_eq!(version, SchemaVersion::new(1, 3));
            assert_eq!(version.to_string(), "1.3");
        }

        #[test]
        fn test_parse_rejects_malformed() {
            assert!("1".parse::<SchemaVersion>().is_err());
            assert!("1.x".parse::<SchemaVersion>().is_err());
            assert!("1.2.3".parse::<SchemaVersion>().is_err());
            assert!("".parse::<SchemaVersion>().is_err());
        }

        #[test]
        fn test_next_minor() {
            assert_eq!(SchemaVersion::new(1, 2).next_minor(), SchemaVersion::new(1, 3));
        }

        #[test]
        fn test_previous_minor_floors_at_zero() {
            assert_eq!(SchemaVersion::new(2, 1).previous_minor(), SchemaVersion::new(2, 0));
            assert_eq!(SchemaVersion::new(2, 0).previous_minor(), SchemaVersion::new(2, 0));
        }

        #[test]
        fn test_serializes_as_string() {
            let json = serde_json::to_string(&SchemaVersion::new(2, 7)).unwrap();
            assert_eq!(json, "\"2.7\"");
            let parsed: SchemaVersion = serde_json::from_str("\"2.7\"").unwrap();
            assert_eq!(parsed, SchemaVersion::new(2, 7));
            assert!(serde_json::from_str::<SchemaVersion>("\"two\"").is_err());
        }
    }

    mod field_type {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_serde_lowercase() {
            assert_eq!(serde_json::to_string(&FieldType::Textarea).unwrap(), "\"textarea\"");
            let parsed: FieldType = serde_json::from_str("\"url\"").unwrap();
            assert_eq!(parsed, FieldType::Url);
        }

        #[test]
        fn test_display_matches_serde_name() {
            for field_type in FieldType::ALL {
                let json = serde_json::to_string(&field_type).unwrap();
                assert_eq!(json, format!("\"{field_type}\""));
            }
        }

        #[test]
        fn test_classification() {
            assert!(FieldType::Email.is_textual());
            assert!(!FieldType::Number.is_textual());
            assert!(FieldType::Radio.has_options());
            assert!(!FieldType::Checkbox.has_options());
        }
    }

    mod document {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_field_deserializes_with_defaults() {
            let json = r#"{"fieldKey": "title", "label": "Title", "type": "text"}"#;
            let field: Field = serde_json::from_str(json).unwrap();
            assert_eq!(field.field_key, "title");
            assert!(field.visible);
            assert!(field.editable);
            assert!(!field.required);
            assert!(!field.is_custom);
            assert_eq!(field.grid_column, GridColumn::Full);
            assert!(field.options.is_empty());
        }

        #[test]
        fn test_configuration_uses_camel_case() {
            let config = FormConfiguration::new(
                "default",
                "Default",
                vec![Section::new("basic", "Basic").with_fields(vec![Field::new(
                    "title",
                    "Title",
                    FieldType::Text,
                )])],
            );
            let json = serde_json::to_value(&config).unwrap();
            assert_eq!(json["publishedVersion"], "1.0");
            assert_eq!(json["isDraft"], false);
            assert_eq!(json["sections"][0]["sectionKey"], "basic");
            assert_eq!(json["sections"][0]["fields"][0]["fieldKey"], "title");
            assert_eq!(json["metadata"]["totalFields"], 1);
        }

        #[test]
        fn test_visible_when_round_trips_value_type() {
            let field = Field::new("supplier", "Supplier", FieldType::Text)
                .visible_when("urgent", true);
            let json = serde_json::to_string(&field).unwrap();
            let parsed: Field = serde_json::from_str(&json).unwrap();
            assert_eq!(
                parsed.visible_when.unwrap().value,
                FieldValue::Bool(true)
            );
        }
    }

    mod configuration {
        use super::*;
        use pretty_assertions::assert_eq;

        fn sample() -> FormConfiguration {
            FormConfiguration::new(
                "cfg",
                "Sample",
                vec![
                    Section::new("a", "A").with_fields(vec![
                        Field::new("x", "X", FieldType::Text).built_in(),
                        Field::new("y", "Y", FieldType::Text),
                    ]),
                    Section::new("b", "B")
                        .with_fields(vec![Field::new("z", "Z", FieldType::Number)]),
                ],
            )
        }

        #[test]
        fn test_new_renumbers_and_counts() {
            let config = sample();
            assert_eq!(config.sections[0].order, 1);
            assert_eq!(config.sections[1].order, 2);
            assert_eq!(config.sections[0].fields[1].order, 2);
            assert_eq!(
                config.metadata,
                ConfigurationMetadata {
                    total_fields: 3,
                    custom_fields_count: 2,
                    section_count: 2,
                }
            );
        }

        #[test]
        fn test_new_is_published_baseline() {
            let config = sample();
            assert!(!config.is_draft);
            assert_eq!(config.version, SchemaVersion::INITIAL);
            assert_eq!(config.sections, config.published_sections);
            assert!(!config.has_rollback_snapshot());
            assert!(!config.has_unpublished_changes());
        }

        #[test]
        fn test_lookup_helpers() {
            let config = sample();
            assert_eq!(config.field("b", "z").unwrap().label, "Z");
            assert!(config.field("a", "z").is_none());
            assert_eq!(config.field_by_key("y").unwrap().label, "Y");
            assert_eq!(config.fields().count(), 3);
        }

        #[test]
        fn test_live_schema_serves_baseline_during_draft() {
            let mut config = sample();
            config.version = SchemaVersion::new(1, 4);
            config.published_version = config.version;
            config.is_draft = true;
            config.sections[0].visible = false;
            config.sections.pop();

            let live = config.live_schema();
            assert!(!live.is_draft);
            assert_eq!(live.sections, sample().sections);
            assert_eq!(live.version.to_string(), "1.4");
            assert_eq!(live.metadata.section_count, 2);
        }

        #[test]
        fn test_live_schema_of_published_is_unchanged() {
            let config = sample();
            assert_eq!(config.live_schema(), config);
        }

        #[test]
        fn test_missing_baseline_restored_for_published_document() {
            let mut json = serde_json::to_value(sample()).unwrap();
            json.as_object_mut().unwrap().remove("publishedSections");
            let mut config: FormConfiguration = serde_json::from_value(json).unwrap();
            assert!(!config.has_published_baseline());

            config.restore_missing_baseline();
            assert_eq!(config.published_sections, config.sections);
            assert!(!config.has_unpublished_changes());
        }

        #[test]
        fn test_missing_baseline_not_invented_for_draft() {
            let mut config = sample();
            config.published_sections.clear();
            config.is_draft = true;

            config.restore_missing_baseline();
            assert!(config.published_sections.is_empty());
            assert_eq!(config.live_schema().sections, config.sections);
        }
    }
}
