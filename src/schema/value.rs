//! Field value objects

use serde::{Deserialize, Serialize};
use std::fmt;

use super::FieldType;

/// Type-safe field values
///
/// Documents store values untagged, so `true`, `3` and `"Procured"` all
/// deserialize into the matching variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl Default for FieldValue {
    fn default() -> Self {
        FieldValue::Text(String::new())
    }
}

impl FieldValue {
    /// Create a text value
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }

    /// The empty value a control of the given type starts from
    pub fn empty_for(field_type: FieldType) -> Self {
        match field_type {
            FieldType::Checkbox => FieldValue::Bool(false),
            _ => FieldValue::Text(String::new()),
        }
    }

    /// True for blank text; numbers and booleans are never empty
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Text(s) => s.trim().is_empty(),
            FieldValue::Number(_) | FieldValue::Bool(_) => false,
        }
    }

    /// Boolean reading, accepting the textual forms `true` / `false`
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            FieldValue::Text(s) => match s.trim() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            FieldValue::Number(_) => None,
        }
    }

    /// Numeric reading, parsing text when needed
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            FieldValue::Bool(_) => None,
        }
    }

    /// Get the display value for rendering
    pub fn display_value(&self) -> String {
        match self {
            FieldValue::Text(s) => s.clone(),
            FieldValue::Number(n) => format_number(*n),
            FieldValue::Bool(b) => b.to_string(),
        }
    }

    /// Compare two values the way a field of `field_type` compares them
    ///
    /// Checkboxes compare as booleans, numbers numerically, everything else
    /// as exact strings.
    pub fn matches(&self, other: &FieldValue, field_type: FieldType) -> bool {
        match field_type {
            FieldType::Checkbox => match (self.as_bool(), other.as_bool()) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
            FieldType::Number => match (self.as_number(), other.as_number()) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
            _ => self.display_value() == other.display_value(),
        }
    }

    /// Push a character to the field value
    pub fn push_char(&mut self, c: char) {
        match self {
            FieldValue::Text(s) => s.push(c),
            FieldValue::Number(n) => {
                let mut s = format_number(*n);
                s.push(c);
                *self = FieldValue::Text(s);
            }
            FieldValue::Bool(b) => {
                // Space toggles, like a checkbox under the cursor
                if c == ' ' {
                    *b = !*b;
                }
            }
        }
    }

    /// Remove the last character from the field value
    pub fn pop_char(&mut self) {
        match self {
            FieldValue::Text(s) => {
                s.pop();
            }
            FieldValue::Number(n) => {
                let mut s = format_number(*n);
                s.pop();
                *self = FieldValue::Text(s);
            }
            FieldValue::Bool(_) => {
                // Booleans don't support backspace
            }
        }
    }

    /// Clear the field value
    pub fn clear(&mut self) {
        match self {
            FieldValue::Text(s) => s.clear(),
            FieldValue::Number(_) => *self = FieldValue::Text(String::new()),
            FieldValue::Bool(b) => *b = false,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_value())
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Number(value as f64)
    }
}

/// Integral numbers print without a trailing `.0`
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}
