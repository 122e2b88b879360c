//! Schema invariant violations

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which invariant a violation breaks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ViolationKind {
    EmptyKey,
    DuplicateSectionKey,
    DuplicateFieldKey,
    NonContiguousOrder,
    MissingOptions,
    EmptyOptionValue,
    EmptyOptionLabel,
    DuplicateOptionValue,
    UnknownDependency,
    AmbiguousDependency,
    SelfDependency,
    DependencyCycle,
    InvalidPattern,
    InvalidRange,
    InvalidDefaultValue,
}

/// Where in the configuration a violation was found
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViolationLocation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_key: Option<String>,
}

impl ViolationLocation {
    pub fn configuration() -> Self {
        Self::default()
    }

    pub fn section(section_key: &str) -> Self {
        Self {
            section_key: Some(section_key.to_string()),
            field_key: None,
        }
    }

    pub fn field(section_key: &str, field_key: &str) -> Self {
        Self {
            section_key: Some(section_key.to_string()),
            field_key: Some(field_key.to_string()),
        }
    }
}

impl fmt::Display for ViolationLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.section_key, &self.field_key) {
            (Some(section), Some(field)) => write!(f, "{section}.{field}"),
            (Some(section), None) => f.write_str(section),
            (None, Some(field)) => f.write_str(field),
            (None, None) => f.write_str("configuration"),
        }
    }
}

/// A single broken invariant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    pub location: ViolationLocation,
    pub kind: ViolationKind,
    pub message: String,
}

impl Violation {
    pub fn new(location: ViolationLocation, kind: ViolationKind, message: impl Into<String>) -> Self {
        Self {
            location,
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.location, self.message)
    }
}
