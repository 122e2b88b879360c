//! Field/section schema model
//!
//! Data structures for a form configuration, the structural validator that
//! guards every invariant, the explicit `visibleWhen` dependency graph and
//! the validated mutation API.

mod defaults;
mod dependency;
mod model;
mod mutation;
mod validate;
mod value;
mod violation;

pub use defaults::{built_in_sections, DEFAULT_CONFIGURATION_ID};
pub use dependency::{DependencyGraph, DependencyRef};
pub use model::{
    ConfigurationMetadata, Field, FieldOption, FieldType, FieldValidation, FormConfiguration,
    GridColumn, ParseVersionError, SchemaVersion, Section, VisibleWhen,
};
pub use mutation::{FieldProperty, SchemaMutation, SectionProperty};
pub use validate::validate;
pub use value::FieldValue;
pub use violation::{Violation, ViolationKind, ViolationLocation};
