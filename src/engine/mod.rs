//! Visibility & validation engine
//!
//! Pure, allocation-light functions run on every value change. No I/O.

mod evaluate;
mod validation;
mod visibility;

pub use evaluate::{evaluate, Evaluation};
pub use validation::{validate_value, ValueViolation, ValueViolationKind};
pub use visibility::{compute_visible_fields, current_value, FieldIndex, FieldValues};
