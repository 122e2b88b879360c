//! Built-in ticket form seeded into every new configuration

use super::{
    Field, FieldOption, FieldType, FieldValidation, FormConfiguration, GridColumn, Section,
};

/// Id of the system default configuration used when a template has none
pub const DEFAULT_CONFIGURATION_ID: &str = "default";

impl FormConfiguration {
    /// A fresh, published configuration holding the built-in sections
    pub fn seeded(id: &str, name: &str) -> Self {
        FormConfiguration::new(id, name, built_in_sections())
    }
}

/// The protected sections every configuration starts from
pub fn built_in_sections() -> Vec<Section> {
    vec![basic_section(), customer_section(), production_section()]
}

fn basic_section() -> Section {
    Section::new("basic", "Basic Information")
        .with_description("What the ticket is about")
        .built_in()
        .with_fields(vec![
            Field::new("title", "Title", FieldType::Text)
                .built_in()
                .required()
                .with_placeholder("Short summary")
                .with_validation(FieldValidation {
                    max_length: Some(200),
                    ..Default::default()
                }),
            Field::new("description", "Description", FieldType::Textarea).built_in(),
            Field::new("priority", "Priority", FieldType::Select)
                .built_in()
                .with_options(vec![
                    FieldOption::new("low", "Low"),
                    FieldOption::new("medium", "Medium"),
                    FieldOption::new("high", "High"),
                ])
                .with_default("medium")
                .with_grid(GridColumn::Half),
            Field::new("due_date", "Due Date", FieldType::Date)
                .built_in()
                .with_grid(GridColumn::Half),
        ])
}

fn customer_section() -> Section {
    Section::new("customer", "Customer")
        .with_description("Who requested the work")
        .built_in()
        .with_fields(vec![
            Field::new("customer_name", "Customer Name", FieldType::Text)
                .built_in()
                .required()
                .with_grid(GridColumn::Half),
            Field::new("customer_email", "Customer Email", FieldType::Email)
                .built_in()
                .with_grid(GridColumn::Half),
            Field::new("website", "Website", FieldType::Url)
                .built_in()
                .with_placeholder("https://"),
        ])
}

fn production_section() -> Section {
    Section::new("production", "Production")
        .with_description("How the item is sourced")
        .built_in()
        .with_fields(vec![
            Field::new("source_type", "Source", FieldType::Radio)
                .built_in()
                .with_options(vec![
                    FieldOption::new("Produced", "Produced in-house"),
                    FieldOption::new("Procured", "Procured from a supplier"),
                ])
                .with_default("Produced"),
            Field::new("supplier", "Supplier", FieldType::Text)
                .built_in()
                .required()
                .visible_when("source_type", "Procured"),
            Field::new("quantity", "Quantity", FieldType::Number)
                .built_in()
                .with_validation(FieldValidation {
                    min: Some(1.0),
                    step: Some(1.0),
                    ..Default::default()
                })
                .with_default(1.0)
                .with_grid(GridColumn::Third),
            Field::new("urgent", "Urgent", FieldType::Checkbox)
                .built_in()
                .with_grid(GridColumn::Third),
            Field::new("urgency_reason", "Reason for Urgency", FieldType::Textarea)
                .built_in()
                .visible_when("urgent", true)
                .with_help_text("Explain why this cannot wait"),
        ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaVersion;

    #[test]
    fn test_seeded_is_published_at_initial_version() {
        let config = FormConfiguration::seeded(DEFAULT_CONFIGURATION_ID, "Default");
        assert_eq!(config.version, SchemaVersion::new(1, 0));
        assert_eq!(config.published_version, config.version);
        assert!(!config.is_draft);
        assert!(config.last_published_at.is_none());
        assert_eq!(config.sections, config.published_sections);
    }

    #[test]
    fn test_everything_seeded_is_built_in() {
        let config = FormConfiguration::seeded("x", "X");
        assert!(config.sections.iter().all(|s| !s.is_custom));
        assert!(config.fields().all(|(_, f)| !f.is_custom));
        assert_eq!(config.metadata.custom_fields_count, 0);
        assert_eq!(config.metadata.total_fields, 12);
    }

    #[test]
    fn test_orders_are_contiguous() {
        let config = FormConfiguration::seeded("x", "X");
        for (i, section) in config.sections.iter().enumerate() {
            assert_eq!(section.order, i as u32 + 1);
            for (j, field) in section.fields.iter().enumerate() {
                assert_eq!(field.order, j as u32 + 1);
            }
        }
    }
}
